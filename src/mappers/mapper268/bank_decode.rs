// Address-to-bank decoding for the SMD132/SMD133. Each MMC3 bank request is combined with the
// outer registers to produce the final bank. Both decoders are pure: the same registers, bank
// select, and request always produce the same bank.
use crate::mappers::mapper268::control_registers::ControlRegisters;
use crate::mappers::mmc3::mmc3::BankRequest;
use crate::memory::cpu::prg_memory_map::{PrgChip, PrgPage};

// The final 1 KiB CHR bank for a CHR request.
pub fn decode_chr(
    regs: ControlRegisters,
    bank_select: u8,
    buffered_chr_registers: (u8, u8),
    request: BankRequest,
) -> u8 {
    let mask = regs.chr_mask();
    let mut value = request.value;
    if regs.gnrom_mode() {
        if regs.weird_mode() {
            value = weird_gnrom_chr_value(bank_select, request.address, value);
        }

        let window_bits = ((request.address >> 10) & 0b111) as u8;
        // Bit 7 from the MMC3 or the alternate A17, bits 6-3 from the GNROM offset,
        // bits 2-0 from the address.
        (value & 0x80 & mask)
            | (regs.alternate_chr_a17() & !mask)
            | regs.gnrom_chr_offset()
            | window_bits
    } else {
        if regs.weird_mode() {
            value = weird_mmc3_chr_value(bank_select, buffered_chr_registers, request.address, value);
        }

        (value & mask) | (regs.alternate_chr_a17() & !mask)
    }
}

// The final PRG page for a PRG request. `chip` is whichever chip holds PRG data (ROM, or flash
// when the cartridge has a battery).
pub fn decode_prg(
    regs: ControlRegisters,
    bank_select: u8,
    request: BankRequest,
    chip: PrgChip,
    cfi_mode: bool,
) -> PrgPage {
    if cfi_mode && request.address != 0xE000 {
        return PrgPage::CFI;
    }

    let mask = regs.prg_mask();
    let base = regs.prg_offset();

    let value = if regs.weird_mode() {
        last_banks_first(bank_select, request.address, request.value)
    } else {
        request.value
    };
    let value = u16::from(value);

    let bank = if !regs.gnrom_mode() {
        // Regular MMC3 banking, extendable to 2 MiB.
        ((base << 4) & !mask) | (value & mask)
    } else {
        // NROM-like banking across the full 32 MiB in 16 KiB or 32 KiB units.
        let mask = mask & 0xF0;
        ((base << 4) & !mask)
            | (value & mask)
            | u16::from(regs.gnrom_prg_offset(request.address))
            | ((request.address & 0x2000) >> 13)
    };

    PrgPage::new(chip, bank)
}

// In weird GNROM mode, the odd 1 KiB halves of the 2 KiB CHR windows lose bank bit 7.
fn weird_gnrom_chr_value(bank_select: u8, address: u16, value: u8) -> u8 {
    match relative_chr_address(bank_select, address) {
        0x0400 | 0x0C00 => value & 0x7F,
        _ => value,
    }
}

// In weird MMC3 mode, the 2 KiB CHR windows use their full register values for their first half
// and bank 0 for their second half.
fn weird_mmc3_chr_value(bank_select: u8, (r0, r1): (u8, u8), address: u16, value: u8) -> u8 {
    match relative_chr_address(bank_select, address) {
        0x0000 => r0,
        0x0800 => r1,
        0x0400 | 0x0C00 => 0,
        _ => value,
    }
}

// Undoes the MMC3 CHR inversion so that the 2 KiB windows are always at 0x0000 and 0x0800.
fn relative_chr_address(bank_select: u8, address: u16) -> u16 {
    (u16::from(bank_select & 0b1000_0000) << 5) ^ address
}

// In weird mode, the fixed last banks at 0xC000 and 0xE000 become bank 0, unless the MMC3 has
// swapped its R6 window to 0xC000.
fn last_banks_first(bank_select: u8, address: u16, value: u8) -> u8 {
    let r6_at_c000 = bank_select & 0b0100_0000 != 0;
    if value >= 0xFE && !r6_at_c000 && matches!(address & 0xE000, 0xC000 | 0xE000) {
        0
    } else {
        value
    }
}
