pub mod chr_memory_map;
