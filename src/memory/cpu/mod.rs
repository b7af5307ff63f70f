pub mod prg_memory_map;
