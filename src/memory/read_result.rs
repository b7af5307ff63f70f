#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct ReadResult {
    pub value: u8,
    pub mask: u8,
}

impl ReadResult {
    pub const OPEN_BUS: Self = Self { value: 0, mask: 0b0000_0000 };

    pub fn full(value: u8) -> Self {
        Self { value, mask: 0b1111_1111 }
    }

    pub fn is_open_bus(self) -> bool {
        self.mask == 0b0000_0000
    }

    pub fn unwrap(self) -> u8 {
        assert_eq!(self.mask, 0b1111_1111);
        self.value
    }
}
