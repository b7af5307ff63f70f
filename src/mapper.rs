pub use crate::cartridge::cartridge::Cartridge;
pub use crate::memory::name_table_mirroring::NameTableMirroring;
pub use crate::memory::read_result::ReadResult;

// A cartridge board as seen from the console: CPU accesses to 0x4020 through 0xFFFF, PPU accesses
// to the pattern tables, and the signals that the board feeds back.
pub trait Mapper {
    fn power_on(&mut self);
    fn reset(&mut self);

    fn write_register(&mut self, cpu_address: u16, value: u8);

    fn peek_cartridge_space(&self, cpu_address: u16) -> ReadResult;

    // Most mappers have no read side effects.
    fn read_from_cartridge_space(&mut self, cpu_address: u16) -> ReadResult {
        self.peek_cartridge_space(cpu_address)
    }

    fn chr_peek(&self, ppu_address: u16) -> ReadResult;
    fn chr_write(&mut self, ppu_address: u16, value: u8);

    // Most mappers don't care about changes to the current PPU address.
    fn on_ppu_address_change(&mut self, _ppu_address: u16) {}
    // Most mappers don't care about PPU cycles.
    fn on_end_of_ppu_cycle(&mut self) {}
    fn irq_pending(&self) -> bool { false }

    fn name_table_mirroring(&self) -> NameTableMirroring;

    // Only boards with writable PRG storage have anything here.
    fn flash_contents(&self) -> Option<&[u8]> { None }
    fn flush_save(&self) -> Result<(), String> { Ok(()) }

    fn save_state(&self) -> Vec<u8>;
    fn load_state(&mut self, bytes: &[u8]) -> Result<(), String>;

    // Human-readable bank assignments, one line per window.
    fn describe_mappings(&self) -> Vec<String> { Vec::new() }

    fn supported(self) -> LookupResult where Self: Sized, Self: 'static {
        LookupResult::Supported(Box::new(self))
    }
}

pub enum LookupResult {
    Supported(Box<dyn Mapper>),
    UnsupportedMapper,
    UnassignedSubmapper,
}
