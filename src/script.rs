use std::str::FromStr;

// One step of a replayed bus session.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum BusOperation {
    Write { cpu_address: u16, value: u8 },
    Read { cpu_address: u16 },
    Reset,
}

impl FromStr for BusOperation {
    type Err = String;

    fn from_str(line: &str) -> Result<BusOperation, String> {
        let words: Vec<&str> = line.split_whitespace().collect();
        match words[..] {
            ["w" | "W", address, value] => Ok(BusOperation::Write {
                cpu_address: parse_cartridge_address(address)?,
                value: parse_hex_u8(value)?,
            }),
            ["r" | "R", address] => Ok(BusOperation::Read { cpu_address: parse_cartridge_address(address)? }),
            ["reset"] => Ok(BusOperation::Reset),
            _ => Err(format!("Invalid bus operation: '{line}'")),
        }
    }
}

// Blank lines and everything after a '#' are ignored.
pub fn parse_script(text: &str) -> Result<Vec<BusOperation>, String> {
    text.lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let line = line.split('#').next().unwrap_or("").trim();
            (!line.is_empty()).then_some((index + 1, line))
        })
        .map(|(line_number, line)| line.parse::<BusOperation>().map_err(|err| format!("Line {line_number}: {err}")))
        .collect()
}

// Accepts "8000", "$8000", and "0x8000".
pub fn parse_hex_u16(text: &str) -> Result<u16, String> {
    let digits = text.strip_prefix('$')
        .or_else(|| text.strip_prefix("0x"))
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    u16::from_str_radix(digits, 16).map_err(|err| format!("Invalid hex value '{text}': {err}"))
}

pub fn parse_hex_u8(text: &str) -> Result<u8, String> {
    let value = parse_hex_u16(text)?;
    u8::try_from(value).map_err(|_| format!("Value '{text}' doesn't fit in a byte."))
}

fn parse_cartridge_address(text: &str) -> Result<u16, String> {
    let cpu_address = parse_hex_u16(text)?;
    if cpu_address < 0x4020 {
        return Err(format!("Address {cpu_address:04X} is outside of cartridge space (4020-FFFF)."));
    }

    Ok(cpu_address)
}
