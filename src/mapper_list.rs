use num_traits::FromPrimitive;

use crate::mapper::{Cartridge, LookupResult, Mapper};
use crate::mappers as m;
use crate::mappers::mapper268::mapper268::RegisterLayout;

pub fn lookup_mapper(cartridge: &Cartridge) -> Result<Box<dyn Mapper>, String> {
    let number = cartridge.mapper_number();
    let sub_number = cartridge.submapper_number();

    match try_lookup_mapper(cartridge) {
        LookupResult::Supported(supported_mapper) => Ok(supported_mapper),
        LookupResult::UnsupportedMapper =>
            Err(format!("Mapper {number} is not supported. Only mapper 268 (COOLBOY/MINDKIDS) is.")),
        LookupResult::UnassignedSubmapper =>
            Err(format!("Submapper {} of mapper {number} is not in use.", sub_number.unwrap_or(0))),
    }
}

pub fn try_lookup_mapper(cartridge: &Cartridge) -> LookupResult {
    use LookupResult::*;
    match (cartridge.mapper_number(), cartridge.submapper_number()) {
        // SMD132/SMD133. A missing submapper is a COOLBOY.
        (268, submapper) => match RegisterLayout::from_u8(submapper.unwrap_or(0)) {
            Some(RegisterLayout::Coolboy) => m::mapper268_0::mapper268_0(cartridge).supported(),
            Some(RegisterLayout::Mindkids) => m::mapper268_1::mapper268_1(cartridge).supported(),
            None => UnassignedSubmapper,
        },

        _ => UnsupportedMapper,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::cartridge::test_data;
    use crate::util::unit::KIBIBYTE;

    #[test]
    fn submappers_select_the_register_layout() {
        for submapper in [None, Some(0)] {
            let mut mapper = lookup_mapper(&test_data::cartridge(submapper, 64 * KIBIBYTE, false)).unwrap();
            mapper.write_register(0xA001, 0x80);
            mapper.write_register(0x5000, 0x80);
            // Register 0 bit 7 would have cleared CHR bank bit 7.
            mapper.write_register(0x8000, 0x02);
            mapper.write_register(0x8001, 0x80);
            assert!(mapper.describe_mappings().contains(&"CHR 1000: bank 80".to_string()));
        }

        let mut mapper = lookup_mapper(&test_data::cartridge(Some(1), 64 * KIBIBYTE, false)).unwrap();
        mapper.write_register(0x5000, 0x80);
        mapper.write_register(0x8000, 0x02);
        mapper.write_register(0x8001, 0x80);
        assert!(mapper.describe_mappings().contains(&"CHR 1000: bank 00".to_string()));
    }

    #[test]
    fn unknown_submapper_is_a_configuration_error() {
        let err = lookup_mapper(&test_data::cartridge(Some(2), 64 * KIBIBYTE, false)).err().unwrap();
        assert!(err.contains("Submapper 2"), "{err}");
    }

    #[test]
    fn other_mappers_are_unsupported() {
        let cartridge = Cartridge::new(4, Some(0), vec![0; 8 * KIBIBYTE as usize]).unwrap();
        assert!(lookup_mapper(&cartridge).is_err());
    }
}
