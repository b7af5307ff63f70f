use splitbits::splitbits;

use crate::mappers::mmc3::irq_state::IrqState;
use crate::memory::name_table_mirroring::NameTableMirroring;

// Bank register values after power-on and reset.
const INITIAL_BANK_REGISTERS: [u8; 8] = [0, 2, 4, 5, 6, 7, 0, 1];

// A bank value that the MMC3 wants placed at a window. Boards built around an MMC3 decide what
// that value actually selects.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct BankRequest {
    pub address: u16,
    pub value: u8,
}

impl BankRequest {
    pub const fn new(address: u16, value: u8) -> Self {
        Self { address, value }
    }
}

// The parts of an MMC3 that a board wrapped around one needs to see and drive.
pub trait Mmc3Controller {
    fn power_on(&mut self);
    fn reset(&mut self);

    // 0x8000 through 0xBFFF
    fn write_command(&mut self, cpu_address: u16, value: u8);
    // 0xC000 through 0xFFFF
    fn write_irq(&mut self, cpu_address: u16, value: u8);

    fn bank_select(&self) -> u8;
    fn bank_register(&self, index: usize) -> u8;
    fn prg_ram_enabled(&self) -> bool;
    fn prg_ram_writable(&self) -> bool;
    fn name_table_mirroring(&self) -> NameTableMirroring;

    // Most boards don't care about PPU activity beyond the scanline counter.
    fn on_ppu_address_change(&mut self, _ppu_address: u16) {}
    fn on_end_of_ppu_cycle(&mut self) {}
    fn irq_pending(&self) -> bool { false }

    // The two 2KiB CHR registers, before their low bits are forced.
    fn buffered_chr_registers(&self) -> (u8, u8) {
        (self.bank_register(0), self.bank_register(1))
    }

    // Values for 0x8000, 0xA000, 0xC000, and 0xE000 given a bank select command.
    // The fixed banks are requested as 0xFE (second-last) and 0xFF (last).
    fn prg_bank_requests(&self, bank_select: u8) -> [BankRequest; 4] {
        let fixed_c000 = bank_select & 0b0100_0000 != 0;
        let (r6_address, second_last_address) = if fixed_c000 { (0xC000, 0x8000) } else { (0x8000, 0xC000) };
        [
            BankRequest::new(r6_address, self.bank_register(6)),
            BankRequest::new(second_last_address, 0xFE),
            BankRequest::new(0xA000, self.bank_register(7)),
            BankRequest::new(0xE000, 0xFF),
        ]
    }

    // Values for each 1KiB pattern table window given a bank select command.
    fn chr_bank_requests(&self, bank_select: u8) -> [BankRequest; 8] {
        let base: u16 = u16::from(bank_select & 0b1000_0000) << 5;
        let (r0, r1) = (self.bank_register(0), self.bank_register(1));
        [
            BankRequest::new(base ^ 0x0000, r0 & !1),
            BankRequest::new(base ^ 0x0400, r0 | 1),
            BankRequest::new(base ^ 0x0800, r1 & !1),
            BankRequest::new(base ^ 0x0C00, r1 | 1),
            BankRequest::new(base ^ 0x1000, self.bank_register(2)),
            BankRequest::new(base ^ 0x1400, self.bank_register(3)),
            BankRequest::new(base ^ 0x1800, self.bank_register(4)),
            BankRequest::new(base ^ 0x1C00, self.bank_register(5)),
        ]
    }
}

// MMC3 (Sharp IRQs)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mmc3 {
    bank_select: u8,
    bank_registers: [u8; 8],
    mirroring: NameTableMirroring,
    prg_ram_protect: u8,
    irq_state: IrqState,
}

impl Mmc3 {
    pub const fn new() -> Self {
        Self {
            bank_select: 0,
            bank_registers: INITIAL_BANK_REGISTERS,
            mirroring: NameTableMirroring::Vertical,
            prg_ram_protect: 0,
            irq_state: IrqState::new(),
        }
    }

    fn write_register(&mut self, cpu_address: u16, value: u8) {
        match cpu_address & 0xE001 {
            0x8000 => self.bank_select = value,
            0x8001 => self.bank_registers[usize::from(self.bank_select & 0b111)] = value,
            0xA000 => self.mirroring = NameTableMirroring::from_mmc3_value(value),
            0xA001 => self.prg_ram_protect = value,
            0xC000 => self.irq_state.set_counter_reload_value(value),
            0xC001 => self.irq_state.reload_counter(),
            0xE000 => self.irq_state.disable(),
            0xE001 => self.irq_state.enable(),
            _ => { /* Below cartridge ROM space. Do nothing. */ }
        }
    }
}

impl Default for Mmc3 {
    fn default() -> Self {
        Self::new()
    }
}

impl Mmc3Controller for Mmc3 {
    fn power_on(&mut self) {
        self.mirroring = NameTableMirroring::Vertical;
        self.prg_ram_protect = 0;
        self.reset();
    }

    fn reset(&mut self) {
        self.bank_select = 0;
        self.bank_registers = INITIAL_BANK_REGISTERS;
        self.irq_state = IrqState::new();
    }

    fn write_command(&mut self, cpu_address: u16, value: u8) {
        debug_assert!(matches!(cpu_address, 0x8000..=0xBFFF));
        self.write_register(cpu_address, value);
    }

    fn write_irq(&mut self, cpu_address: u16, value: u8) {
        debug_assert!(matches!(cpu_address, 0xC000..=0xFFFF));
        self.write_register(cpu_address, value);
    }

    fn bank_select(&self) -> u8 {
        self.bank_select
    }

    fn bank_register(&self, index: usize) -> u8 {
        self.bank_registers[index]
    }

    fn prg_ram_enabled(&self) -> bool {
        splitbits!(self.prg_ram_protect, "ew......").e
    }

    fn prg_ram_writable(&self) -> bool {
        let fields = splitbits!(self.prg_ram_protect, "ew......");
        fields.e && !fields.w
    }

    fn name_table_mirroring(&self) -> NameTableMirroring {
        self.mirroring
    }

    fn on_ppu_address_change(&mut self, ppu_address: u16) {
        self.irq_state.tick_counter(ppu_address);
    }

    fn on_end_of_ppu_cycle(&mut self) {
        self.irq_state.decrement_suppression_cycle_count();
    }

    fn irq_pending(&self) -> bool {
        self.irq_state.pending()
    }
}
