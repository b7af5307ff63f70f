pub mod bank_decode;
pub mod cfi;
pub mod control_registers;
pub mod flash;
pub mod mapper268;
pub mod snapshot;
