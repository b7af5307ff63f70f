use log::error;
use structopt::StructOpt;

use coolboy::config::{Config, Opt};
use coolboy::logging::logger::{self, Logger};
use coolboy::mapper_list::lookup_mapper;
use coolboy::script::BusOperation;

fn main() {
    let opt = Opt::from_args();
    let logger = Logger {
        log_flash: opt.log_flash,
        log_banking: opt.log_banking,
        log_registers: opt.log_registers,
    };
    if let Err(err) = logger::init(logger) {
        eprintln!("Failed to initialize logging. {err}");
    }

    if let Err(err) = run(&opt) {
        error!("{err}");
        std::process::exit(1);
    }
}

fn run(opt: &Opt) -> Result<(), String> {
    let config = Config::new(opt)?;
    let mut mapper = lookup_mapper(config.cartridge())?;

    for &operation in config.script() {
        match operation {
            BusOperation::Write { cpu_address, value } => mapper.write_register(cpu_address, value),
            BusOperation::Read { cpu_address } => {
                let result = mapper.read_from_cartridge_space(cpu_address);
                if result.is_open_bus() {
                    println!("{cpu_address:04X}: open bus");
                } else {
                    println!("{cpu_address:04X}: {:02X}", result.value);
                }
            }
            BusOperation::Reset => mapper.reset(),
        }
    }

    for line in mapper.describe_mappings() {
        println!("{line}");
    }

    if let Some(flash) = mapper.flash_contents() {
        println!("Flash CRC32: {:08X}", crc32fast::hash(flash));
    }

    mapper.flush_save()
}
