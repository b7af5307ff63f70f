use std::fmt;
use std::path::{Path, PathBuf};

use log::info;

use crate::memory::raw_memory::RawMemory;
use crate::util::unit::{KIBIBYTE, MEBIBYTE};

pub const MAX_PRG_ROM_SIZE: u32 = 32 * MEBIBYTE;
pub const DEFAULT_CHR_RAM_SIZE: u32 = 256 * KIBIBYTE;
pub const WORK_RAM_SIZE: u32 = 8 * KIBIBYTE;

// Everything a mapper needs to know about the cartridge it is installed in. Header parsing happens
// elsewhere; this is built directly from the PRG image and the declared board properties.
#[derive(Clone, Debug)]
pub struct Cartridge {
    mapper_number: u16,
    submapper_number: Option<u8>,
    prg_rom: RawMemory,
    prg_rom_hash: u32,
    chr_ram_size: u32,
    has_battery: bool,
    save_path: Option<PathBuf>,
}

impl Cartridge {
    pub fn new(mapper_number: u16, submapper_number: Option<u8>, prg_rom: Vec<u8>) -> Result<Cartridge, String> {
        let prg_rom = RawMemory::from_vec(prg_rom)?;
        if prg_rom.is_empty() {
            return Err("PRG ROM must not be empty.".to_string());
        }

        if prg_rom.size() % (8 * KIBIBYTE) != 0 {
            return Err(format!("PRG ROM size must be a multiple of 8KiB, but was {} bytes.", prg_rom.size()));
        }

        if prg_rom.size() > MAX_PRG_ROM_SIZE {
            return Err(format!("PRG ROM can be at most {}MiB, but was {} bytes.", MAX_PRG_ROM_SIZE / MEBIBYTE, prg_rom.size()));
        }

        let prg_rom_hash = crc32fast::hash(prg_rom.as_slice());
        info!("PRG ROM: {}KiB, CRC32: {prg_rom_hash:08X}", prg_rom.size() / KIBIBYTE);

        Ok(Cartridge {
            mapper_number,
            submapper_number,
            prg_rom,
            prg_rom_hash,
            chr_ram_size: DEFAULT_CHR_RAM_SIZE,
            has_battery: false,
            save_path: None,
        })
    }

    pub fn with_battery(mut self, has_battery: bool) -> Self {
        self.has_battery = has_battery;
        self
    }

    pub fn with_chr_ram_size(mut self, chr_ram_size: u32) -> Self {
        self.chr_ram_size = chr_ram_size;
        self
    }

    pub fn with_save_path(mut self, save_path: Option<PathBuf>) -> Self {
        self.save_path = save_path;
        self
    }

    pub fn mapper_number(&self) -> u16 {
        self.mapper_number
    }

    pub fn submapper_number(&self) -> Option<u8> {
        self.submapper_number
    }

    pub fn prg_rom(&self) -> &RawMemory {
        &self.prg_rom
    }

    pub fn chr_ram_size(&self) -> u32 {
        self.chr_ram_size
    }

    pub fn has_battery(&self) -> bool {
        self.has_battery
    }

    pub fn save_path(&self) -> Option<&Path> {
        self.save_path.as_deref()
    }
}

impl fmt::Display for Cartridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Mapper: {}", self.mapper_number)?;
        match self.submapper_number {
            Some(number) => writeln!(f, "Submapper: {number}")?,
            None => writeln!(f, "Submapper: (unspecified)")?,
        }
        writeln!(f, "PRG ROM: {}KiB (CRC32 {:08X})", self.prg_rom.size() / KIBIBYTE, self.prg_rom_hash)?;
        writeln!(f, "CHR RAM: {}KiB", self.chr_ram_size / KIBIBYTE)?;
        write!(f, "Battery: {}", self.has_battery)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_misaligned_prg_rom() {
        let err = Cartridge::new(268, Some(0), vec![0; 1000]).unwrap_err();
        assert!(err.contains("multiple of 8KiB"), "{err}");
    }

    #[test]
    fn rejects_empty_prg_rom() {
        assert!(Cartridge::new(268, Some(0), Vec::new()).is_err());
    }

    #[test]
    fn defaults_to_256_kib_chr_ram_without_battery() {
        let cartridge = test_data::cartridge(Some(1), 64 * KIBIBYTE, false);
        assert_eq!(cartridge.chr_ram_size(), 256 * KIBIBYTE);
        assert!(!cartridge.has_battery());
        assert_eq!(cartridge.prg_rom().size(), 64 * KIBIBYTE);
        assert_eq!(cartridge.prg_rom()[8 * KIBIBYTE], 1);
    }
}
