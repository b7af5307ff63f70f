pub const KIBIBYTE: u32 = 1024;
pub const MEBIBYTE: u32 = 1024 * KIBIBYTE;
