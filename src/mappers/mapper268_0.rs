use crate::cartridge::cartridge::Cartridge;
use crate::mappers::mapper268::mapper268::{Mapper268, RegisterLayout};
use crate::mappers::mmc3::mmc3::Mmc3;

// COOLBOY (SMD132/SMD133 with outer registers at $6000-$6FFF)
pub fn mapper268_0(cartridge: &Cartridge) -> Mapper268 {
    Mapper268::new(cartridge, RegisterLayout::Coolboy, Mmc3::new())
}
