use crate::util::edge_detector::EdgeDetector;

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum PatternTableSide {
    Left,
    Right,
}

impl PatternTableSide {
    pub fn from_ppu_address(ppu_address: u16) -> Self {
        if ppu_address & 0x1000 == 0 {
            PatternTableSide::Left
        } else {
            PatternTableSide::Right
        }
    }
}

// Sharp MMC3 scanline counter, clocked by PPU A12 rising edges.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IrqState {
    counter: u8,
    reload_value: u8,
    force_reload: bool,
    enabled: bool,
    pending: bool,
    counter_suppression_cycles: u8,
    pattern_table_side_detector: EdgeDetector<PatternTableSide>,
}

impl IrqState {
    pub const fn new() -> Self {
        Self {
            counter: 0,
            reload_value: 0,
            force_reload: false,
            enabled: false,
            pending: false,
            counter_suppression_cycles: 0,
            pattern_table_side_detector: EdgeDetector::new(PatternTableSide::Right, PatternTableSide::Left),
        }
    }

    // Every time the PPU address changes.
    pub fn tick_counter(&mut self, ppu_address: u16) {
        if ppu_address & 0x3FFF >= 0x2000 {
            return;
        }

        let side = PatternTableSide::from_ppu_address(ppu_address);
        let edge_detected = self.pattern_table_side_detector.set_value_then_detect(side);
        let should_tick_irq_counter = edge_detected && self.counter_suppression_cycles == 0;
        // Keep re-suppressing ticks for as long as A12 stays high.
        if self.pattern_table_side_detector.matches_target(side) {
            self.counter_suppression_cycles = 16;
        }

        if should_tick_irq_counter {
            if self.counter == 0 || self.force_reload {
                self.counter = self.reload_value;
                self.force_reload = false;
            } else {
                self.counter -= 1;
            }

            if self.enabled && self.counter == 0 {
                self.pending = true;
            }
        }
    }

    pub fn decrement_suppression_cycle_count(&mut self) {
        self.counter_suppression_cycles = self.counter_suppression_cycles.saturating_sub(1);
    }

    // Write 0xC000 (even addresses)
    pub fn set_counter_reload_value(&mut self, value: u8) {
        self.reload_value = value;
    }

    // Write 0xC001 (odd addresses)
    pub fn reload_counter(&mut self) {
        self.counter = 0;
        self.force_reload = true;
    }

    // Write 0xE000 (even addresses)
    pub fn disable(&mut self) {
        self.enabled = false;
        self.pending = false;
    }

    // Write 0xE001 (odd addresses)
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn pending(&self) -> bool {
        self.pending
    }

    pub fn counter(&self) -> u8 {
        self.counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // One scanline's worth of pattern fetches: background from the left table, sprites from the right.
    fn scanline(irq_state: &mut IrqState) {
        irq_state.tick_counter(0x0000);
        irq_state.tick_counter(0x1000);
        for _ in 0..20 {
            irq_state.decrement_suppression_cycle_count();
        }

        irq_state.tick_counter(0x0000);
    }

    #[test]
    fn fires_after_reload_value_scanlines() {
        let mut irq_state = IrqState::new();
        irq_state.set_counter_reload_value(2);
        irq_state.reload_counter();
        irq_state.enable();

        scanline(&mut irq_state);
        assert_eq!(irq_state.counter(), 2);
        assert!(!irq_state.pending());
        scanline(&mut irq_state);
        assert!(!irq_state.pending());
        scanline(&mut irq_state);
        assert!(irq_state.pending());

        irq_state.disable();
        assert!(!irq_state.pending());
    }

    #[test]
    fn rapid_a12_toggles_are_suppressed() {
        let mut irq_state = IrqState::new();
        irq_state.set_counter_reload_value(5);
        irq_state.reload_counter();

        irq_state.tick_counter(0x1000);
        assert_eq!(irq_state.counter(), 5);
        irq_state.tick_counter(0x0000);
        irq_state.tick_counter(0x1000);
        assert_eq!(irq_state.counter(), 5);
    }

    #[test]
    fn name_table_addresses_are_ignored() {
        let mut irq_state = IrqState::new();
        irq_state.set_counter_reload_value(5);
        irq_state.tick_counter(0x2000);
        irq_state.tick_counter(0x3000);
        assert_eq!(irq_state.counter(), 0);
    }
}
