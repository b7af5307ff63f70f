use coolboy::cartridge::cartridge::Cartridge;
use coolboy::mapper::Mapper;
use coolboy::mappers::mapper268::cfi::CfiTable;
use coolboy::mappers::mapper268::flash::FlashOutcome;
use coolboy::mappers::mapper268::mapper268::Mapper268;
use coolboy::mappers::mapper268_0::mapper268_0;
use coolboy::util::unit::KIBIBYTE;

const PRG_ROM_SIZE: u32 = 512 * KIBIBYTE;
const SECTOR_SIZE: usize = 128 * KIBIBYTE as usize;

// Every byte holds the number of the 8KiB bank it is in.
fn banked_prg_rom() -> Vec<u8> {
    (0..PRG_ROM_SIZE).map(|index| (index / (8 * KIBIBYTE)) as u8).collect()
}

fn battery_cartridge() -> Cartridge {
    Cartridge::new(268, Some(0), banked_prg_rom()).unwrap().with_battery(true)
}

// Command bytes go to the MMC3 IRQ ports, which leaves the PRG banks alone. At power-on $C000 maps
// bank 0x3E, so $CAAA is in the fourth 128KiB sector.
fn write_all(mapper: &mut Mapper268, writes: &[(u16, u8)]) {
    for &(cpu_address, value) in writes {
        mapper.write_register(cpu_address, value);
    }
}

fn erase_sector_at_caaa(mapper: &mut Mapper268) {
    write_all(mapper, &[(0xCAAA, 0xAA), (0xC555, 0x55), (0xCAAA, 0x80), (0xCAAA, 0xAA), (0xC555, 0x55), (0xCAAA, 0x30)]);
}

fn program(mapper: &mut Mapper268, cpu_address: u16, value: u8) {
    write_all(mapper, &[(0xCAAA, 0xAA), (0xC555, 0x55), (0xCAAA, 0xA0), (cpu_address, value)]);
}

#[test]
fn sector_erase_clears_exactly_one_sector() {
    let mut mapper = mapper268_0(&battery_cartridge());
    erase_sector_at_caaa(&mut mapper);
    assert_eq!(mapper.last_flash_outcome(), Some(FlashOutcome::SectorErased { sector: 3 }));

    let rom = banked_prg_rom();
    let flash = mapper.flash_contents().unwrap();
    assert_eq!(flash[..3 * SECTOR_SIZE], rom[..3 * SECTOR_SIZE]);
    assert!(flash[3 * SECTOR_SIZE..].iter().all(|&b| b == 0xFF));

    assert_eq!(mapper.peek_cartridge_space(0xC000).unwrap(), 0xFF);
    assert_eq!(mapper.peek_cartridge_space(0xE000).unwrap(), 0xFF);
    assert_eq!(mapper.peek_cartridge_space(0x8000).unwrap(), 0x00);
}

#[test]
fn chip_erase_clears_everything() {
    let mut mapper = mapper268_0(&battery_cartridge());
    write_all(&mut mapper, &[(0xCAAA, 0xAA), (0xC555, 0x55), (0xCAAA, 0x80), (0xCAAA, 0xAA), (0xC555, 0x55), (0xCAAA, 0x10)]);
    assert_eq!(mapper.last_flash_outcome(), Some(FlashOutcome::ChipErased));
    assert!(mapper.flash_contents().unwrap().iter().all(|&b| b == 0xFF));
}

#[test]
fn byte_program_needs_an_erased_target() {
    let mut mapper = mapper268_0(&battery_cartridge());
    program(&mut mapper, 0xE123, 0x42);
    assert!(matches!(mapper.last_flash_outcome(), Some(FlashOutcome::ProgramRejected { .. })));
    assert_eq!(mapper.peek_cartridge_space(0xE123).unwrap(), 0x3F);

    erase_sector_at_caaa(&mut mapper);
    program(&mut mapper, 0xE123, 0x42);
    assert_eq!(mapper.last_flash_outcome(), Some(FlashOutcome::ByteProgrammed { offset: 0x7_E123, value: 0x42 }));
    assert_eq!(mapper.peek_cartridge_space(0xE123).unwrap(), 0x42);

    // Bits can't be set again without an erase.
    program(&mut mapper, 0xE123, 0xFF);
    assert_eq!(mapper.last_flash_outcome(), Some(FlashOutcome::ProgramRejected { offset: 0x7_E123, current: 0x42 }));
    assert_eq!(mapper.peek_cartridge_space(0xE123).unwrap(), 0x42);
}

#[test]
fn cfi_round_trip() {
    let mut mapper = mapper268_0(&battery_cartridge());
    mapper.write_register(0xCAAA, 0x98);
    assert!(mapper.cfi_mode());
    for index in 0..128 {
        let cpu_address = 0x8000 + 2 * index as u16;
        assert_eq!(mapper.peek_cartridge_space(cpu_address).unwrap(), CfiTable::entry(index));
        assert_eq!(mapper.peek_cartridge_space(cpu_address + 1).unwrap(), CfiTable::entry(index));
    }

    mapper.write_register(0xC000, 0xF0);
    assert!(!mapper.cfi_mode());
    assert_eq!(mapper.peek_cartridge_space(0x8000).unwrap(), 0x00);
    assert_eq!(mapper.peek_cartridge_space(0xA000).unwrap(), 0x01);
}

#[test]
fn reset_value_clears_cfi_mode_and_pending_bytes() {
    let mut mapper = mapper268_0(&battery_cartridge());
    mapper.write_register(0xCAAA, 0x98);
    write_all(&mut mapper, &[(0xCAAA, 0xAA), (0xC555, 0x55)]);
    assert_eq!(mapper.flash_chip().unwrap().sequence().len(), 2);

    mapper.write_register(0xC555, 0xF0);
    assert!(!mapper.cfi_mode());
    assert!(mapper.flash_chip().unwrap().sequence().is_empty());
    assert_eq!(mapper.last_flash_outcome(), Some(FlashOutcome::Reset));

    // The interrupted erase doesn't resume.
    write_all(&mut mapper, &[(0xCAAA, 0x80), (0xCAAA, 0xAA), (0xC555, 0x55), (0xCAAA, 0x30)]);
    assert_eq!(mapper.peek_cartridge_space(0xC000).unwrap(), 0x3E);
}

#[test]
fn soft_reset_clears_flash_command_state_but_keeps_contents() {
    let mut mapper = mapper268_0(&battery_cartridge());
    erase_sector_at_caaa(&mut mapper);
    mapper.write_register(0xCAAA, 0x98);
    mapper.write_register(0x6003, 0x80);

    mapper.reset();
    assert!(!mapper.cfi_mode());
    assert_eq!(mapper.registers().to_raw(), [0; 4]);
    assert_eq!(mapper.peek_cartridge_space(0xC000).unwrap(), 0xFF);
}

#[test]
fn save_file_keeps_erased_sectors() {
    let path = std::env::temp_dir().join(format!("coolboy-integration-{}.sav", std::process::id()));
    let _ = std::fs::remove_file(&path);
    let cartridge = battery_cartridge().with_save_path(Some(path.clone()));

    let mut mapper = mapper268_0(&cartridge);
    erase_sector_at_caaa(&mut mapper);
    mapper.flush_save().unwrap();
    drop(mapper);

    let mapper = mapper268_0(&cartridge);
    assert_eq!(mapper.peek_cartridge_space(0xC000).unwrap(), 0xFF);
    assert_eq!(mapper.peek_cartridge_space(0x8000).unwrap(), 0x00);
    drop(mapper);

    std::fs::remove_file(&path).unwrap();
}
