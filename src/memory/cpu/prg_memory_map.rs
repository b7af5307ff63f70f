use enum_iterator::Sequence;
use strum_macros::Display;

use crate::util::unit::KIBIBYTE;

pub const PRG_PAGE_SIZE: u32 = 8 * KIBIBYTE;
const PRG_WINDOW_COUNT: usize = 4;

// The chips that can back a PRG window.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Display)]
pub enum PrgChip {
    Rom,
    Flash,
    Cfi,
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct PrgPage {
    pub chip: PrgChip,
    // An 8 KiB bank number within the chip. Ignored for the CFI chip.
    pub bank: u16,
}

impl PrgPage {
    pub const CFI: PrgPage = PrgPage { chip: PrgChip::Cfi, bank: 0 };

    pub const fn new(chip: PrgChip, bank: u16) -> Self {
        Self { chip, bank }
    }
}

// The four 8 KiB windows in 0x8000 through 0xFFFF.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Sequence)]
pub enum PrgWindowId {
    W8000,
    WA000,
    WC000,
    WE000,
}

impl PrgWindowId {
    pub fn from_address(cpu_address: u16) -> Self {
        match cpu_address {
            0x0000..=0x7FFF => panic!("PRG windows start at 0x8000, but got {cpu_address:04X}."),
            0x8000..=0x9FFF => PrgWindowId::W8000,
            0xA000..=0xBFFF => PrgWindowId::WA000,
            0xC000..=0xDFFF => PrgWindowId::WC000,
            0xE000..=0xFFFF => PrgWindowId::WE000,
        }
    }

    pub fn start(self) -> u16 {
        0x8000 + 0x2000 * self as u16
    }
}

// Which page each PRG window currently points at, plus the sizes needed to wrap bank numbers.
#[derive(Clone, Debug)]
pub struct PrgMemoryMap {
    pages: [Option<PrgPage>; PRG_WINDOW_COUNT],
    rom_size: u32,
    cfi_size: u32,
}

impl PrgMemoryMap {
    pub fn new(rom_size: u32, cfi_size: u32) -> Self {
        Self {
            pages: [None; PRG_WINDOW_COUNT],
            rom_size,
            cfi_size,
        }
    }

    // Unmaps every window.
    pub fn clear(&mut self) {
        self.pages = [None; PRG_WINDOW_COUNT];
    }

    pub fn set_page(&mut self, window_id: PrgWindowId, page: PrgPage) {
        self.pages[window_id as usize] = Some(page);
    }

    pub fn page(&self, window_id: PrgWindowId) -> Option<PrgPage> {
        self.pages[window_id as usize]
    }

    // Resolves a CPU address to the chip that backs it and the offset within that chip.
    pub fn index_for_address(&self, cpu_address: u16) -> Option<(PrgChip, u32)> {
        let window_id = PrgWindowId::from_address(cpu_address);
        let page = self.pages[window_id as usize]?;
        let index = match page.chip {
            // The CFI table is presented from 0x8000 onwards, mirrored across the window.
            PrgChip::Cfi => {
                if self.cfi_size == 0 {
                    return None;
                }

                u32::from(cpu_address - 0x8000) % self.cfi_size
            }
            PrgChip::Rom | PrgChip::Flash => {
                if self.rom_size == 0 {
                    return None;
                }

                let offset = u32::from(cpu_address) % PRG_PAGE_SIZE;
                (u32::from(page.bank) * PRG_PAGE_SIZE + offset) % self.rom_size
            }
        };

        Some((page.chip, index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmapped_windows_resolve_to_nothing() {
        let map = PrgMemoryMap::new(512 * KIBIBYTE, 256);
        assert_eq!(map.index_for_address(0x8000), None);
        assert_eq!(map.index_for_address(0xFFFF), None);
    }

    #[test]
    fn bank_numbers_wrap_around_the_chip() {
        let mut map = PrgMemoryMap::new(32 * KIBIBYTE, 256);
        map.set_page(PrgWindowId::WA000, PrgPage::new(PrgChip::Rom, 5));
        // 5 % 4 banks = bank 1
        assert_eq!(map.index_for_address(0xA123), Some((PrgChip::Rom, 0x2123)));
    }

    #[test]
    fn cfi_is_mirrored_from_0x8000() {
        let mut map = PrgMemoryMap::new(32 * KIBIBYTE, 256);
        map.set_page(PrgWindowId::W8000, PrgPage::CFI);
        map.set_page(PrgWindowId::WA000, PrgPage::CFI);
        assert_eq!(map.index_for_address(0x8020), Some((PrgChip::Cfi, 0x20)));
        assert_eq!(map.index_for_address(0x8120), Some((PrgChip::Cfi, 0x20)));
        assert_eq!(map.index_for_address(0xA0FF), Some((PrgChip::Cfi, 0xFF)));
    }

    #[test]
    fn window_ids_follow_address_order() {
        let starts: Vec<u16> = enum_iterator::all::<PrgWindowId>().map(PrgWindowId::start).collect();
        assert_eq!(starts, vec![0x8000, 0xA000, 0xC000, 0xE000]);
        assert_eq!(PrgWindowId::from_address(0xDFFF), PrgWindowId::WC000);
    }
}
