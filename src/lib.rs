pub mod cartridge;
pub mod config;
pub mod logging;
pub mod mapper;
pub mod mapper_list;
pub mod mappers;
pub mod memory;
pub mod script;
pub mod util;
