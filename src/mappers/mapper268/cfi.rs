// Common Flash Interface query data for a Macronix 256 Mbit chip.
const CFI_DATA: [u8; 128] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x51, 0x52, 0x59, 0x02, 0x00, 0x40, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x27, 0x36, 0x00, 0x00, 0x03,
    0x06, 0x09, 0x13, 0x03, 0x05, 0x03, 0x02, 0x19,
    0x02, 0x00, 0x06, 0x00, 0x01, 0xFF, 0x00, 0x00,
    0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF,
    0x50, 0x52, 0x49, 0x31, 0x33, 0x14, 0x02, 0x01,
    0x00, 0x08, 0x00, 0x00, 0x02, 0x95, 0xA5, 0x05,
    0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
];

pub const CFI_PRESENTATION_SIZE: u32 = 2 * CFI_DATA.len() as u32;

// The query data as the CPU sees it: the chip sits on an 8-bit bus in 16-bit mode, so every entry
// appears twice.
#[derive(Clone, Debug)]
pub struct CfiTable {
    presentation: [u8; CFI_PRESENTATION_SIZE as usize],
}

impl CfiTable {
    pub fn new() -> Self {
        let mut presentation = [0; CFI_PRESENTATION_SIZE as usize];
        for (pair, &value) in presentation.chunks_exact_mut(2).zip(CFI_DATA.iter()) {
            pair.fill(value);
        }

        Self { presentation }
    }

    pub fn peek(&self, index: u32) -> u8 {
        self.presentation[(index % CFI_PRESENTATION_SIZE) as usize]
    }

    // The raw query entry, as a 16-bit-aware host would see it.
    pub fn entry(index: usize) -> u8 {
        CFI_DATA[index]
    }
}

impl Default for CfiTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_string_is_doubled() {
        let table = CfiTable::new();
        assert_eq!(table.peek(0x20), b'Q');
        assert_eq!(table.peek(0x21), b'Q');
        assert_eq!(table.peek(0x22), b'R');
        assert_eq!(table.peek(0x24), b'Y');
        assert_eq!(table.peek(0x80), b'P');
        assert_eq!(table.peek(0x82), b'R');
        assert_eq!(table.peek(0x84), b'I');
    }

    #[test]
    fn every_entry_appears_twice() {
        let table = CfiTable::new();
        for index in 0..CFI_DATA.len() {
            assert_eq!(table.peek(2 * index as u32), CfiTable::entry(index));
            assert_eq!(table.peek(2 * index as u32 + 1), CfiTable::entry(index));
        }

        // Mirrored past the end.
        assert_eq!(table.peek(CFI_PRESENTATION_SIZE + 0x20), b'Q');
    }
}
