use rayon::prelude::*;

use coolboy::mappers::mapper268::bank_decode::{decode_chr, decode_prg};
use coolboy::mappers::mapper268::control_registers::ControlRegisters;
use coolboy::mappers::mmc3::mmc3::BankRequest;
use coolboy::memory::cpu::prg_memory_map::PrgChip;

// Compatible, GNROM, weird, and weird GNROM, with both GNROM bank sizes via register 1.
const REGISTER_3_VALUES: [u8; 4] = [0x00, 0x1E, 0x40, 0x5A];
const BANK_SELECT_VALUES: [u8; 4] = [0x00, 0x40, 0x80, 0xC0];
const BANK_VALUES: [u8; 5] = [0x00, 0x01, 0x7F, 0xFE, 0xFF];

#[test]
fn decoding_depends_only_on_its_inputs() {
    (0..=0xFFFFu32).into_par_iter().for_each(|r0_r1| {
        let r0 = (r0_r1 >> 8) as u8;
        let r1 = r0_r1 as u8;
        for r3 in REGISTER_3_VALUES {
            let regs = ControlRegisters::from_raw([r0, r1, 0x0A, r3]);
            for bank_select in BANK_SELECT_VALUES {
                for value in BANK_VALUES {
                    for address in [0x8000, 0xA000, 0xC000, 0xE000] {
                        let request = BankRequest::new(address, value);
                        let first = decode_prg(regs, bank_select, request, PrgChip::Flash, false);
                        let second = decode_prg(regs, bank_select, request, PrgChip::Flash, false);
                        assert_eq!(first, second);
                        assert_eq!(first.chip, PrgChip::Flash);
                        // Twelve bank bits cover 32 MiB in 8 KiB banks.
                        assert!(first.bank <= 0xFFF, "regs={:02X?} bank={:X}", regs.to_raw(), first.bank);
                    }

                    for address in (0x0000..0x2000).step_by(0x400) {
                        let request = BankRequest::new(address, value);
                        let first = decode_chr(regs, bank_select, (value, !value), request);
                        let second = decode_chr(regs, bank_select, (value, !value), request);
                        assert_eq!(first, second);
                    }
                }
            }
        }
    });
}

#[test]
fn gnrom_mode_maps_consecutive_banks() {
    (0..=0xFFFFu32).into_par_iter().for_each(|r0_r1| {
        let regs = ControlRegisters::from_raw([(r0_r1 >> 8) as u8, r0_r1 as u8, 0, 0x1E]);
        for value in BANK_VALUES {
            let bank = |address| decode_prg(regs, 0, BankRequest::new(address, value), PrgChip::Rom, false).bank;
            // A13 picks the 8 KiB half of each 16 KiB unit.
            assert_eq!(bank(0xA000), bank(0x8000) | 1);
            assert_eq!(bank(0xE000), bank(0xC000) | 1);
            assert_eq!(bank(0x8000) & 1, 0);
        }
    });
}
