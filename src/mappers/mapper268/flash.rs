use log::{error, info, warn};

use crate::mappers::mapper268::cfi::CfiTable;
use crate::memory::flash_store::FlashStore;
use crate::util::unit::KIBIBYTE;

pub const FLASH_SECTOR_SIZE: u32 = 128 * KIBIBYTE;
pub const COMMAND_SEQUENCE_CAPACITY: usize = 10;

// The only two addresses (after masking to 12 bits) that command bytes may be written to.
const ANCHOR_A: u16 = 0x0AAA;
const ANCHOR_B: u16 = 0x0555;

const ENTER_CFI: [(u16, u8); 1] = [(ANCHOR_A, 0x98)];
const ERASE_PREFIX: [(u16, u8); 5] = [
    (ANCHOR_A, 0xAA), (ANCHOR_B, 0x55), (ANCHOR_A, 0x80), (ANCHOR_A, 0xAA), (ANCHOR_B, 0x55),
];
const PROGRAM_PREFIX: [(u16, u8); 3] = [(ANCHOR_A, 0xAA), (ANCHOR_B, 0x55), (ANCHOR_A, 0xA0)];

const SECTOR_ERASE: u8 = 0x30;
const CHIP_ERASE: u8 = 0x10;
const RESET: u8 = 0xF0;

// The bytes written to ROM space since the command sequence was last reset, addresses masked to
// 12 bits. Holds at most ten writes; later writes are dropped until the sequence resets.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub struct CommandSequence {
    addresses: [u16; COMMAND_SEQUENCE_CAPACITY],
    values: [u8; COMMAND_SEQUENCE_CAPACITY],
    len: u8,
}

impl CommandSequence {
    pub const fn new() -> Self {
        Self {
            addresses: [0; COMMAND_SEQUENCE_CAPACITY],
            values: [0; COMMAND_SEQUENCE_CAPACITY],
            len: 0,
        }
    }

    pub fn from_parts(
        addresses: [u16; COMMAND_SEQUENCE_CAPACITY],
        values: [u8; COMMAND_SEQUENCE_CAPACITY],
        len: u8,
    ) -> Result<Self, String> {
        if usize::from(len) > COMMAND_SEQUENCE_CAPACITY {
            return Err(format!(
                "Flash command sequence length must be at most {COMMAND_SEQUENCE_CAPACITY}, but was {len}."));
        }

        Ok(Self { addresses, values, len })
    }

    pub fn len(&self) -> usize {
        usize::from(self.len)
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() == COMMAND_SEQUENCE_CAPACITY
    }

    pub fn addresses(&self) -> [u16; COMMAND_SEQUENCE_CAPACITY] {
        self.addresses
    }

    pub fn values(&self) -> [u8; COMMAND_SEQUENCE_CAPACITY] {
        self.values
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    // Returns false if the sequence was already full.
    fn push(&mut self, address: u16, value: u8) -> bool {
        if self.is_full() {
            return false;
        }

        self.addresses[self.len()] = address & 0x0FFF;
        self.values[self.len()] = value;
        self.len += 1;
        true
    }

    fn starts_with(&self, prefix: &[(u16, u8)]) -> bool {
        prefix.len() <= self.len()
            && prefix.iter()
                .enumerate()
                .all(|(i, &(address, value))| self.addresses[i] == address && self.values[i] == value)
    }

    fn is(&self, pattern: &[(u16, u8)]) -> bool {
        self.len() == pattern.len() && self.starts_with(pattern)
    }

    fn last_value(&self) -> Option<u8> {
        self.len().checked_sub(1).map(|i| self.values[i])
    }
}

// What a single write to ROM space did to the flash chip.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum FlashOutcome {
    // Part of a command that hasn't completed yet.
    Pending,
    // Not part of any command. The sequence is idle.
    NoCommand,
    EnteredCfi,
    SectorErased { sector: u32 },
    ChipErased,
    ByteProgrammed { offset: u32, value: u8 },
    // The target byte wasn't erased, so nothing was written.
    ProgramRejected { offset: u32, current: u8 },
    // An erase or program whose target address isn't backed by flash.
    Unmapped,
    // The reset value cleared the sequence and left CFI mode.
    Reset,
}

impl FlashOutcome {
    pub fn is_command(self) -> bool {
        !matches!(self, FlashOutcome::Pending | FlashOutcome::NoCommand)
    }
}

// An emulated JEDEC-style NOR flash chip standing in for PRG ROM.
pub struct FlashChip {
    store: FlashStore,
    cfi: CfiTable,
    sequence: CommandSequence,
    cfi_mode: bool,
}

impl FlashChip {
    pub fn new(store: FlashStore) -> Self {
        Self {
            store,
            cfi: CfiTable::new(),
            sequence: CommandSequence::new(),
            cfi_mode: false,
        }
    }

    pub fn store(&self) -> &FlashStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut FlashStore {
        &mut self.store
    }

    pub fn cfi(&self) -> &CfiTable {
        &self.cfi
    }

    pub fn sequence(&self) -> CommandSequence {
        self.sequence
    }

    pub fn cfi_mode(&self) -> bool {
        self.cfi_mode
    }

    pub fn restore_command_state(&mut self, sequence: CommandSequence, cfi_mode: bool) {
        self.sequence = sequence;
        self.cfi_mode = cfi_mode;
    }

    // Back to read-array mode with no command in progress.
    pub fn reset(&mut self) {
        self.sequence.clear();
        self.cfi_mode = false;
    }

    // Feeds one ROM-space write into the command sequence. `target` is the flash offset that
    // `cpu_address` currently maps to, if it maps to flash at all.
    pub fn write(&mut self, cpu_address: u16, value: u8, target: Option<u32>) -> FlashOutcome {
        let mut outcome = if self.sequence.push(cpu_address, value) {
            self.execute(target)
        } else {
            FlashOutcome::Pending
        };

        if outcome.is_command() {
            self.sequence.clear();
        }

        if !matches!(cpu_address & 0x0FFF, ANCHOR_A | ANCHOR_B) {
            self.sequence.clear();
        }

        if value == RESET {
            self.reset();
            if !outcome.is_command() {
                outcome = FlashOutcome::Reset;
            }
        }

        if outcome == FlashOutcome::Pending && self.sequence.is_empty() {
            outcome = FlashOutcome::NoCommand;
        }

        outcome
    }

    // Runs the command that the sequence spells out, if it spells one out yet.
    fn execute(&mut self, target: Option<u32>) -> FlashOutcome {
        let seq = &self.sequence;
        if seq.is(&ENTER_CFI) {
            self.cfi_mode = true;
            info!(target: "flash", "Entered CFI query mode.");
            return FlashOutcome::EnteredCfi;
        }

        if seq.len() == ERASE_PREFIX.len() + 1 && seq.starts_with(&ERASE_PREFIX) {
            match seq.last_value() {
                Some(SECTOR_ERASE) => return self.erase_sector(target),
                Some(CHIP_ERASE) => return self.erase_chip(),
                _ => {}
            }
        }

        if seq.len() == PROGRAM_PREFIX.len() + 1 && seq.starts_with(&PROGRAM_PREFIX) {
            let value = seq.last_value().unwrap_or(0xFF);
            return self.program_byte(target, value);
        }

        FlashOutcome::Pending
    }

    fn erase_sector(&mut self, target: Option<u32>) -> FlashOutcome {
        let Some(offset) = target else {
            warn!("Sector erase targeted an address that isn't backed by flash. Ignoring it.");
            return FlashOutcome::Unmapped;
        };

        let size = self.store.size();
        let sector = offset / FLASH_SECTOR_SIZE;
        let start = sector * FLASH_SECTOR_SIZE;
        for index in start..start + FLASH_SECTOR_SIZE {
            self.store[index % size] = 0xFF;
        }

        info!(target: "flash", "Flash sector #{sector} erased (0x{start:08X} - 0x{:08X}).", start + FLASH_SECTOR_SIZE);
        FlashOutcome::SectorErased { sector }
    }

    fn erase_chip(&mut self) -> FlashOutcome {
        self.store.fill(0xFF);
        info!(target: "flash", "Flash chip erased.");
        FlashOutcome::ChipErased
    }

    // Programming can only clear bits, so the target must have been erased first.
    fn program_byte(&mut self, target: Option<u32>, value: u8) -> FlashOutcome {
        let Some(offset) = target else {
            warn!("Byte program targeted an address that isn't backed by flash. Ignoring it.");
            return FlashOutcome::Unmapped;
        };

        let current = self.store[offset];
        if current != 0xFF {
            error!(target: "flash", "Can't write to 0x{offset:08X}, flash sector is not erased (found {current:02X}).");
            return FlashOutcome::ProgramRejected { offset, current };
        }

        self.store[offset] = value;
        info!(target: "flash", "Programmed 0x{offset:08X} = {value:02X}.");
        FlashOutcome::ByteProgrammed { offset, value }
    }
}
