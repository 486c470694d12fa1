//! Blocking delay over the embassy time driver

use embassy_time::{block_for, Duration};
use pendant_hal::DelayMs;

/// Busy-waits on the embassy timer
///
/// Only for boot-time controller bring-up; tasks should use
/// `embassy_time::Timer` instead.
#[derive(Debug, Default, Clone, Copy)]
pub struct BlockingDelay;

impl DelayMs for BlockingDelay {
    fn delay_ms(&mut self, ms: u32) {
        block_for(Duration::from_millis(ms as u64));
    }
}
