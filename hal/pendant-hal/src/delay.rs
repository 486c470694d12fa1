//! Blocking delays
//!
//! Controller bring-up needs fixed settle times between commands. These run
//! once at boot, before the scheduler has anything else to do, so a blocking
//! delay is sufficient.

/// Blocking millisecond delay
pub trait DelayMs {
    /// Block for at least `ms` milliseconds
    fn delay_ms(&mut self, ms: u32);
}
