use enum_iterator::all;
use log::info;
use num_derive::FromPrimitive;
use strum_macros::Display;

use crate::cartridge::cartridge::{Cartridge, WORK_RAM_SIZE};
use crate::mapper::Mapper;
use crate::mappers::mapper268::bank_decode::{decode_chr, decode_prg};
use crate::mappers::mapper268::cfi::CFI_PRESENTATION_SIZE;
use crate::mappers::mapper268::control_registers::ControlRegisters;
use crate::mappers::mapper268::flash::{FlashChip, FlashOutcome};
use crate::mappers::mapper268::snapshot::{BoardState, FlashState, Mapper268Snapshot};
use crate::mappers::mmc3::mmc3::{Mmc3, Mmc3Controller};
use crate::memory::cpu::prg_memory_map::{PrgChip, PrgMemoryMap, PrgPage, PrgWindowId};
use crate::memory::flash_store::FlashStore;
use crate::memory::name_table_mirroring::NameTableMirroring;
use crate::memory::ppu::chr_memory_map::ChrMemoryMap;
use crate::memory::raw_memory::RawMemory;
use crate::memory::read_result::ReadResult;

// Where the outer registers live. Chosen by submapper.
#[derive(PartialEq, Eq, Clone, Copy, Debug, FromPrimitive, Display)]
pub enum RegisterLayout {
    // $6000-$6FFF, shared with work RAM writes.
    Coolboy = 0,
    // $5000-$5FFF
    Mindkids = 1,
}

// SMD132/SMD133 (COOLBOY, MINDKIDS): an MMC3 clone with outer banking up to 32 MiB PRG, 256 KiB
// CHR RAM, and an optional self-writable flash chip in place of PRG ROM.
pub struct Mapper268<C: Mmc3Controller = Mmc3> {
    register_layout: RegisterLayout,
    mmc3: C,
    regs: ControlRegisters,
    prg_rom: RawMemory,
    // Only present for cartridges with a battery.
    flash: Option<FlashChip>,
    last_flash_outcome: Option<FlashOutcome>,
    work_ram: RawMemory,
    chr_ram: RawMemory,
    prg_memory_map: PrgMemoryMap,
    chr_memory_map: ChrMemoryMap,
}

impl<C: Mmc3Controller + 'static> Mapper268<C> {
    pub fn new(cartridge: &Cartridge, register_layout: RegisterLayout, mmc3: C) -> Self {
        let prg_rom = cartridge.prg_rom().clone();
        let flash = cartridge.has_battery().then(|| {
            let store = match cartridge.save_path() {
                Some(path) => FlashStore::open(path, prg_rom.as_slice()),
                None => FlashStore::from_rom(prg_rom.as_slice()),
            };
            FlashChip::new(store)
        });

        let mut mapper = Self {
            register_layout,
            mmc3,
            regs: ControlRegisters::new(),
            prg_memory_map: PrgMemoryMap::new(prg_rom.size(), CFI_PRESENTATION_SIZE),
            prg_rom,
            flash,
            last_flash_outcome: None,
            work_ram: RawMemory::new(WORK_RAM_SIZE),
            chr_ram: RawMemory::new(cartridge.chr_ram_size()),
            chr_memory_map: ChrMemoryMap::new(cartridge.chr_ram_size()),
        };
        mapper.power_on();
        mapper
    }

    pub fn registers(&self) -> ControlRegisters {
        self.regs
    }

    pub fn has_flash(&self) -> bool {
        self.flash.is_some()
    }

    pub fn cfi_mode(&self) -> bool {
        self.flash.as_ref().is_some_and(FlashChip::cfi_mode)
    }

    pub fn flash_chip(&self) -> Option<&FlashChip> {
        self.flash.as_ref()
    }

    // What the most recent ROM-space write did to the flash chip.
    pub fn last_flash_outcome(&self) -> Option<FlashOutcome> {
        self.last_flash_outcome
    }

    pub fn prg_page(&self, window_id: PrgWindowId) -> Option<PrgPage> {
        self.prg_memory_map.page(window_id)
    }

    pub fn chr_bank(&self, ppu_address: u16) -> Option<u8> {
        self.chr_memory_map.bank(ppu_address)
    }

    pub fn work_ram(&self) -> &RawMemory {
        &self.work_ram
    }

    pub fn board_state(&self) -> BoardState {
        BoardState {
            registers: self.regs,
            flash: self.flash.as_ref().map(|flash| FlashState {
                sequence: flash.sequence(),
                cfi_mode: flash.cfi_mode(),
                contents: flash.store().as_slice().to_vec(),
            }),
        }
    }

    pub fn restore_board_state(&mut self, board: &BoardState) -> Result<(), String> {
        self.check_board_state(board)?;
        if let (Some(flash), Some(state)) = (&mut self.flash, &board.flash) {
            flash.store_mut().copy_from(&state.contents)?;
            flash.restore_command_state(state.sequence, state.cfi_mode);
        }

        self.regs = board.registers;
        self.update_prg_mappings();
        self.update_chr_mappings();
        Ok(())
    }

    // Rejects a board state that doesn't fit this cartridge, before anything is overwritten.
    fn check_board_state(&self, board: &BoardState) -> Result<(), String> {
        match (&self.flash, &board.flash) {
            (None, None) => Ok(()),
            (Some(flash), Some(state)) if state.contents.len() != flash.store().size() as usize =>
                Err(format!("Save state has {} bytes of flash, but this cartridge has {}.",
                    state.contents.len(), flash.store().size())),
            (Some(_), Some(_)) => Ok(()),
            (None, Some(_)) => Err("Save state has flash contents, but this cartridge has no flash.".to_string()),
            (Some(_), None) => Err("Save state is missing the flash contents.".to_string()),
        }
    }

    fn write_control_register(&mut self, cpu_address: u16, value: u8) {
        if self.regs.write(cpu_address, value) {
            info!(target: "registers", "Outer register {} = {value:02X} ({cpu_address:04X})", cpu_address & 0b11);
            self.update_prg_mappings();
            self.update_chr_mappings();
        } else {
            info!(target: "registers", "Outer registers are locked. Ignoring {value:02X} at {cpu_address:04X}.");
        }
    }

    // The board's own work RAM strobe only looks at the MMC3 enable bit.
    fn write_work_ram(&mut self, cpu_address: u16, value: u8) {
        if self.mmc3.prg_ram_enabled() {
            self.work_ram[u32::from(cpu_address - 0x6000)] = value;
        }
    }

    // Writes that the MMC3 handles itself also honor its write protection.
    fn write_mmc3_work_ram(&mut self, cpu_address: u16, value: u8) {
        if self.mmc3.prg_ram_writable() {
            self.work_ram[u32::from(cpu_address - 0x6000)] = value;
        }
    }

    // The MMC3 and the flash chip both observe every write to ROM space.
    fn write_rom_space(&mut self, cpu_address: u16, value: u8) {
        if cpu_address < 0xC000 {
            self.mmc3.write_command(cpu_address, value);
        } else {
            self.mmc3.write_irq(cpu_address, value);
        }

        self.update_prg_mappings();
        self.update_chr_mappings();

        let target = self.flash_offset(cpu_address);
        let Some(flash) = self.flash.as_mut() else {
            return;
        };

        let cfi_mode_before = flash.cfi_mode();
        let outcome = flash.write(cpu_address, value, target);
        self.last_flash_outcome = Some(outcome);
        if flash.cfi_mode() != cfi_mode_before {
            self.update_prg_mappings();
        }
    }

    // The flash offset that a CPU address currently maps to, if any.
    fn flash_offset(&self, cpu_address: u16) -> Option<u32> {
        match self.prg_memory_map.index_for_address(cpu_address) {
            Some((PrgChip::Flash, index)) => Some(index),
            _ => None,
        }
    }

    fn peek_prg(&self, cpu_address: u16) -> ReadResult {
        let Some((chip, index)) = self.prg_memory_map.index_for_address(cpu_address) else {
            return ReadResult::OPEN_BUS;
        };

        match (chip, &self.flash) {
            (PrgChip::Rom, _) => ReadResult::full(self.prg_rom[index]),
            (PrgChip::Flash, Some(flash)) => ReadResult::full(flash.store()[index]),
            (PrgChip::Cfi, Some(flash)) => ReadResult::full(flash.cfi().peek(index)),
            (PrgChip::Flash | PrgChip::Cfi, None) => ReadResult::OPEN_BUS,
        }
    }

    fn update_prg_mappings(&mut self) {
        let bank_select = self.mmc3.bank_select();
        let chip = if self.flash.is_some() { PrgChip::Flash } else { PrgChip::Rom };
        let cfi_mode = self.cfi_mode();
        for request in self.mmc3.prg_bank_requests(bank_select) {
            let page = decode_prg(self.regs, bank_select, request, chip, cfi_mode);
            let window_id = PrgWindowId::from_address(request.address);
            if self.prg_memory_map.page(window_id) != Some(page) {
                info!(target: "banking", "PRG {:04X}: {} bank {:03X}", request.address, page.chip, page.bank);
                self.prg_memory_map.set_page(window_id, page);
            }
        }
    }

    fn update_chr_mappings(&mut self) {
        let bank_select = self.mmc3.bank_select();
        let buffered_chr_registers = self.mmc3.buffered_chr_registers();
        for request in self.mmc3.chr_bank_requests(bank_select) {
            let bank = decode_chr(self.regs, bank_select, buffered_chr_registers, request);
            if self.chr_memory_map.bank(request.address) != Some(bank) {
                info!(target: "banking", "CHR {:04X}: bank {bank:02X}", request.address);
                self.chr_memory_map.set_bank(request.address, bank);
            }
        }
    }
}

impl<C: Mmc3Controller + Clone + 'static> Mapper268<C> {
    pub fn snapshot(&self) -> Mapper268Snapshot<C> {
        Mapper268Snapshot {
            board: self.board_state(),
            mmc3: self.mmc3.clone(),
            work_ram: self.work_ram.clone(),
            chr_ram: self.chr_ram.clone(),
        }
    }

    // Either everything is restored or nothing is.
    pub fn restore(&mut self, snapshot: &Mapper268Snapshot<C>) -> Result<(), String> {
        self.check_board_state(&snapshot.board)?;
        if snapshot.work_ram.size() != self.work_ram.size() {
            return Err(format!("Snapshot has {} bytes of work RAM, but this cartridge has {}.",
                snapshot.work_ram.size(), self.work_ram.size()));
        }

        if snapshot.chr_ram.size() != self.chr_ram.size() {
            return Err(format!("Snapshot has {} bytes of CHR RAM, but this cartridge has {}.",
                snapshot.chr_ram.size(), self.chr_ram.size()));
        }

        self.work_ram.copy_from(snapshot.work_ram.as_slice())?;
        self.chr_ram.copy_from(snapshot.chr_ram.as_slice())?;
        self.mmc3 = snapshot.mmc3.clone();
        // Re-decodes every mapping against the restored MMC3.
        self.restore_board_state(&snapshot.board)
    }
}

impl<C: Mmc3Controller + 'static> Mapper for Mapper268<C> {
    fn power_on(&mut self) {
        self.mmc3.power_on();
        self.regs.clear();
        if let Some(flash) = &mut self.flash {
            flash.reset();
        }

        self.last_flash_outcome = None;
        // Start from nothing so that no mapping from a previous session survives.
        self.prg_memory_map.clear();
        self.chr_memory_map.clear();
        self.update_prg_mappings();
        self.update_chr_mappings();
    }

    fn reset(&mut self) {
        self.mmc3.reset();
        self.regs.clear();
        if let Some(flash) = &mut self.flash {
            flash.reset();
        }

        self.last_flash_outcome = None;
        self.update_prg_mappings();
        self.update_chr_mappings();
    }

    fn write_register(&mut self, cpu_address: u16, value: u8) {
        use RegisterLayout::*;
        match (self.register_layout, cpu_address) {
            (_, 0x0000..=0x401F) => unreachable!(),
            (_, 0x4020..=0x4FFF) => { /* Nothing is mapped here. */ }
            (Coolboy, 0x5000..=0x5FFF) => { /* Unused on COOLBOY boards. */ }
            (Mindkids, 0x5000..=0x5FFF) => self.write_control_register(cpu_address, value),
            (Coolboy, 0x6000..=0x6FFF) => {
                self.write_work_ram(cpu_address, value);
                self.write_control_register(cpu_address, value);
            }
            (Coolboy, 0x7000..=0x7FFF) => self.write_mmc3_work_ram(cpu_address, value),
            (Mindkids, 0x6000..=0x7FFF) => self.write_work_ram(cpu_address, value),
            (_, 0x8000..=0xFFFF) => self.write_rom_space(cpu_address, value),
        }
    }

    fn peek_cartridge_space(&self, cpu_address: u16) -> ReadResult {
        match cpu_address {
            0x0000..=0x401F => unreachable!(),
            0x4020..=0x5FFF => ReadResult::OPEN_BUS,
            0x6000..=0x7FFF if self.mmc3.prg_ram_enabled() => ReadResult::full(self.work_ram[u32::from(cpu_address - 0x6000)]),
            0x6000..=0x7FFF => ReadResult::OPEN_BUS,
            0x8000..=0xFFFF => self.peek_prg(cpu_address),
        }
    }

    fn chr_peek(&self, ppu_address: u16) -> ReadResult {
        match self.chr_memory_map.index_for_address(ppu_address) {
            Some(index) => ReadResult::full(self.chr_ram[index]),
            None => ReadResult::OPEN_BUS,
        }
    }

    fn chr_write(&mut self, ppu_address: u16, value: u8) {
        if let Some(index) = self.chr_memory_map.index_for_address(ppu_address) {
            self.chr_ram[index] = value;
        }
    }

    fn on_ppu_address_change(&mut self, ppu_address: u16) {
        self.mmc3.on_ppu_address_change(ppu_address);
    }

    fn on_end_of_ppu_cycle(&mut self) {
        self.mmc3.on_end_of_ppu_cycle();
    }

    fn irq_pending(&self) -> bool {
        self.mmc3.irq_pending()
    }

    fn name_table_mirroring(&self) -> NameTableMirroring {
        self.mmc3.name_table_mirroring()
    }

    fn flash_contents(&self) -> Option<&[u8]> {
        self.flash.as_ref().map(|flash| flash.store().as_slice())
    }

    fn flush_save(&self) -> Result<(), String> {
        match &self.flash {
            Some(flash) => flash.store().flush(),
            None => Ok(()),
        }
    }

    fn save_state(&self) -> Vec<u8> {
        self.board_state().to_bytes()
    }

    fn load_state(&mut self, bytes: &[u8]) -> Result<(), String> {
        let board = BoardState::from_bytes(bytes)?;
        self.restore_board_state(&board)
    }

    fn describe_mappings(&self) -> Vec<String> {
        let mut lines: Vec<String> = all::<PrgWindowId>()
            .map(|window_id| match self.prg_memory_map.page(window_id) {
                Some(page) => format!("PRG {:04X}: {} bank {:03X}", window_id.start(), page.chip, page.bank),
                None => format!("PRG {:04X}: unmapped", window_id.start()),
            })
            .collect();
        for (window, bank) in self.chr_memory_map.banks().iter().enumerate() {
            match bank {
                Some(bank) => lines.push(format!("CHR {:04X}: bank {bank:02X}", window * 0x400)),
                None => lines.push(format!("CHR {:04X}: unmapped", window * 0x400)),
            }
        }

        lines
    }
}
