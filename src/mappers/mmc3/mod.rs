pub mod irq_state;
pub mod mmc3;
