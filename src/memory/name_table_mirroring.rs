use strum_macros::Display;

#[derive(PartialEq, Eq, Clone, Copy, Debug, Display)]
pub enum NameTableMirroring {
    Vertical,
    Horizontal,
}

impl NameTableMirroring {
    // MMC3 $A000: bit 0 selects the mirroring.
    pub fn from_mmc3_value(value: u8) -> Self {
        if value & 1 == 0 {
            NameTableMirroring::Vertical
        } else {
            NameTableMirroring::Horizontal
        }
    }
}
