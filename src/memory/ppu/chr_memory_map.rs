use crate::util::unit::KIBIBYTE;

pub const CHR_PAGE_SIZE: u32 = KIBIBYTE;
const CHR_WINDOW_COUNT: usize = 8;

// The eight 1 KiB pattern table windows in 0x0000 through 0x1FFF, all backed by CHR RAM.
#[derive(Clone, Debug)]
pub struct ChrMemoryMap {
    banks: [Option<u8>; CHR_WINDOW_COUNT],
    ram_size: u32,
}

impl ChrMemoryMap {
    pub fn new(ram_size: u32) -> Self {
        Self {
            banks: [None; CHR_WINDOW_COUNT],
            ram_size,
        }
    }

    pub fn clear(&mut self) {
        self.banks = [None; CHR_WINDOW_COUNT];
    }

    pub fn set_bank(&mut self, ppu_address: u16, bank: u8) {
        self.banks[Self::window_index(ppu_address)] = Some(bank);
    }

    pub fn bank(&self, ppu_address: u16) -> Option<u8> {
        self.banks[Self::window_index(ppu_address)]
    }

    pub fn banks(&self) -> [Option<u8>; CHR_WINDOW_COUNT] {
        self.banks
    }

    pub fn index_for_address(&self, ppu_address: u16) -> Option<u32> {
        if self.ram_size == 0 {
            return None;
        }

        let bank = self.banks[Self::window_index(ppu_address)]?;
        let offset = u32::from(ppu_address) % CHR_PAGE_SIZE;
        Some((u32::from(bank) * CHR_PAGE_SIZE + offset) % self.ram_size)
    }

    // Pattern tables end at 0x1FFF. Higher addresses mirror down.
    fn window_index(ppu_address: u16) -> usize {
        usize::from((ppu_address & 0x1FFF) >> 10)
    }
}
