use crate::cartridge::cartridge::Cartridge;
use crate::mappers::mapper268::mapper268::{Mapper268, RegisterLayout};
use crate::mappers::mmc3::mmc3::Mmc3;

// MINDKIDS (SMD132/SMD133 with outer registers at $5000-$5FFF)
pub fn mapper268_1(cartridge: &Cartridge) -> Mapper268 {
    Mapper268::new(cartridge, RegisterLayout::Mindkids, Mmc3::new())
}
