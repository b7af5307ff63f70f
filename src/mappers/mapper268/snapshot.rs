use crate::mappers::mapper268::control_registers::ControlRegisters;
use crate::mappers::mapper268::flash::{CommandSequence, COMMAND_SEQUENCE_CAPACITY};
use crate::memory::raw_memory::RawMemory;

const REGISTERS_TAG: &[u8; 4] = b"EXPR";
const SEQUENCE_LENGTH_TAG: &[u8; 4] = b"FLST";
const SEQUENCE_ADDRESSES_TAG: &[u8; 4] = b"FLBA";
const SEQUENCE_VALUES_TAG: &[u8; 4] = b"FLBV";
const CFI_MODE_TAG: &[u8; 4] = b"CFIM";
const FLASH_CONTENTS_TAG: &[u8; 4] = b"FLAS";

// Everything about the flash chip that a save state must reproduce, including a command that is
// only partway written.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct FlashState {
    pub sequence: CommandSequence,
    pub cfi_mode: bool,
    pub contents: Vec<u8>,
}

// The board state that goes into save files: the outer registers, plus the flash chip for battery
// cartridges.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct BoardState {
    pub registers: ControlRegisters,
    pub flash: Option<FlashState>,
}

impl BoardState {
    // A sequence of chunks, each a 4-byte tag, a little-endian u32 length, then the payload.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        write_chunk(&mut bytes, REGISTERS_TAG, &self.registers.to_raw());
        if let Some(flash) = &self.flash {
            let addresses: Vec<u8> = flash.sequence.addresses()
                .iter()
                .flat_map(|address| address.to_le_bytes())
                .collect();
            write_chunk(&mut bytes, SEQUENCE_LENGTH_TAG, &[flash.sequence.len() as u8]);
            write_chunk(&mut bytes, SEQUENCE_ADDRESSES_TAG, &addresses);
            write_chunk(&mut bytes, SEQUENCE_VALUES_TAG, &flash.sequence.values());
            write_chunk(&mut bytes, CFI_MODE_TAG, &[u8::from(flash.cfi_mode)]);
            write_chunk(&mut bytes, FLASH_CONTENTS_TAG, &flash.contents);
        }

        bytes
    }

    pub fn from_bytes(mut bytes: &[u8]) -> Result<BoardState, String> {
        let mut registers = None;
        let mut length = None;
        let mut addresses: Option<[u16; COMMAND_SEQUENCE_CAPACITY]> = None;
        let mut values: Option<[u8; COMMAND_SEQUENCE_CAPACITY]> = None;
        let mut cfi_mode = None;
        let mut contents = None;

        while !bytes.is_empty() {
            let (tag, payload, rest) = read_chunk(bytes)?;
            bytes = rest;
            match &tag {
                REGISTERS_TAG => registers = Some(ControlRegisters::from_raw(fixed(&tag, payload)?)),
                SEQUENCE_LENGTH_TAG => length = Some(fixed::<1>(&tag, payload)?[0]),
                SEQUENCE_ADDRESSES_TAG => {
                    let raw: [u8; 2 * COMMAND_SEQUENCE_CAPACITY] = fixed(&tag, payload)?;
                    let mut parsed = [0; COMMAND_SEQUENCE_CAPACITY];
                    for (address, pair) in parsed.iter_mut().zip(raw.chunks_exact(2)) {
                        *address = u16::from_le_bytes([pair[0], pair[1]]);
                    }

                    addresses = Some(parsed);
                }
                SEQUENCE_VALUES_TAG => values = Some(fixed(&tag, payload)?),
                CFI_MODE_TAG => cfi_mode = Some(fixed::<1>(&tag, payload)?[0] != 0),
                FLASH_CONTENTS_TAG => contents = Some(payload.to_vec()),
                _ => return Err(format!("Unknown save state chunk '{}'.", String::from_utf8_lossy(&tag))),
            }
        }

        let registers = registers.ok_or("Save state is missing its EXPR chunk.")?;
        let flash = match (length, addresses, values, cfi_mode, contents) {
            (None, None, None, None, None) => None,
            (Some(length), Some(addresses), Some(values), Some(cfi_mode), Some(contents)) => {
                let sequence = CommandSequence::from_parts(addresses, values, length)?;
                Some(FlashState { sequence, cfi_mode, contents })
            }
            _ => return Err("Save state has an incomplete set of flash chunks.".to_string()),
        };

        Ok(BoardState { registers, flash })
    }
}

// A full copy of a mapper's state, including the RAM it owns and its base controller.
#[derive(Clone, Debug)]
pub struct Mapper268Snapshot<C> {
    pub board: BoardState,
    pub mmc3: C,
    pub work_ram: RawMemory,
    pub chr_ram: RawMemory,
}

fn write_chunk(bytes: &mut Vec<u8>, tag: &[u8; 4], payload: &[u8]) {
    bytes.extend_from_slice(tag);
    bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    bytes.extend_from_slice(payload);
}

fn read_chunk(bytes: &[u8]) -> Result<([u8; 4], &[u8], &[u8]), String> {
    if bytes.len() < 8 {
        return Err(format!("Save state chunk header needs 8 bytes, but only {} remain.", bytes.len()));
    }

    let (header, rest) = bytes.split_at(8);
    let tag = [header[0], header[1], header[2], header[3]];
    let length = u32::from_le_bytes([header[4], header[5], header[6], header[7]]) as usize;
    if rest.len() < length {
        return Err(format!("Save state chunk '{}' claims {length} bytes, but only {} remain.",
            String::from_utf8_lossy(&tag), rest.len()));
    }

    let (payload, rest) = rest.split_at(length);
    Ok((tag, payload, rest))
}

fn fixed<const N: usize>(tag: &[u8; 4], payload: &[u8]) -> Result<[u8; N], String> {
    payload.try_into()
        .map_err(|_| format!("Save state chunk '{}' must be {N} bytes, but was {}.",
            String::from_utf8_lossy(tag), payload.len()))
}
