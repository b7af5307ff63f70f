pub mod cpu;
pub mod flash_store;
pub mod name_table_mirroring;
pub mod ppu;
pub mod raw_memory;
pub mod read_result;
