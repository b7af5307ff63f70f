use std::fs;
use std::path::PathBuf;

use log::warn;
use structopt::StructOpt;

use crate::cartridge::cartridge::Cartridge;
use crate::script::{parse_script, BusOperation};
use crate::util::unit::KIBIBYTE;

const COOLBOY_MAPPER_NUMBER: u16 = 268;

pub struct Config {
    cartridge: Cartridge,
    script: Vec<BusOperation>,
}

impl Config {
    pub fn new(opt: &Opt) -> Result<Config, String> {
        let chr_ram_size = opt.chr_ram_kib.checked_mul(KIBIBYTE)
            .ok_or_else(|| format!("CHR RAM size of {}KiB is too large.", opt.chr_ram_kib))?;

        println!("Loading PRG ROM '{}'.", opt.prg_rom_path.display());
        let prg_rom = fs::read(&opt.prg_rom_path)
            .map_err(|err| format!("Failed to read PRG ROM '{}'. {err}", opt.prg_rom_path.display()))?;

        // A save file only makes sense with flash, which only battery boards have.
        let has_battery = opt.battery || opt.save.is_some();
        if opt.save.is_some() && !opt.battery {
            warn!("A save file was specified without --battery. Enabling flash emulation anyway.");
        }

        let cartridge = Cartridge::new(COOLBOY_MAPPER_NUMBER, opt.submapper, prg_rom)?
            .with_battery(has_battery)
            .with_chr_ram_size(chr_ram_size)
            .with_save_path(opt.save.clone());
        println!("PRG ROM loaded.\n{cartridge}");

        let script = match &opt.script_path {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .map_err(|err| format!("Failed to read script '{}'. {err}", path.display()))?;
                parse_script(&text)?
            }
            None => Vec::new(),
        };

        Ok(Config { cartridge, script })
    }

    pub fn cartridge(&self) -> &Cartridge {
        &self.cartridge
    }

    pub fn script(&self) -> &[BusOperation] {
        &self.script
    }
}

#[derive(Debug, StructOpt)]
#[structopt(name = "COOLBOY", about = "SMD132/SMD133 (COOLBOY/MINDKIDS) cartridge board emulator.")]
pub struct Opt {
    #[structopt(name = "PRG_ROM", parse(from_os_str))]
    pub prg_rom_path: PathBuf,

    // 0: COOLBOY, 1: MINDKIDS
    #[structopt(long)]
    pub submapper: Option<u8>,

    #[structopt(long)]
    pub battery: bool,

    #[structopt(name = "save", long, parse(from_os_str))]
    pub save: Option<PathBuf>,

    #[structopt(name = "chr-ram-kib", long, default_value = "256")]
    pub chr_ram_kib: u32,

    #[structopt(name = "script", long, parse(from_os_str))]
    pub script_path: Option<PathBuf>,

    #[structopt(name = "log-flash", long)]
    pub log_flash: bool,

    #[structopt(name = "log-banking", long)]
    pub log_banking: bool,

    #[structopt(name = "log-registers", long)]
    pub log_registers: bool,
}
