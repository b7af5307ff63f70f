use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};

pub fn init(logger: Logger) -> Result<(), SetLoggerError> {
    log::set_boxed_logger(Box::new(logger))
        .map(|()| log::set_max_level(LevelFilter::Info))
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Logger {
    pub log_flash: bool,
    pub log_banking: bool,
    pub log_registers: bool,
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        // Problems are always shown, whatever their target.
        if metadata.level() <= Level::Warn {
            return true;
        }

        match metadata.target() {
            "" => true,
            "flash" => self.log_flash,
            "banking" => self.log_banking,
            "registers" => self.log_registers,
            target => {
                let chunks: Vec<&str> = target.split("::").collect();
                matches!(chunks[..], ["coolboy", ..])
            }
        }
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            if record.level() < Level::Info {
                print!("{} - ", record.level());
            }

            match record.target() {
                "flash" => print!("FLASH "),
                "banking" => print!("BANKING "),
                "registers" => print!("REGISTERS "),
                _ => {}
            }

            println!("{}", record.args());
        }
    }

    fn flush(&self) {}
}
