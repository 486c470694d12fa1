//! DMA transfer engine abstraction
//!
//! Models a single memory-to-peripheral channel feeding a transmit FIFO.
//! The channel raises a completion interrupt when the last byte has been
//! handed to the peripheral; the interrupt handler acknowledges it with
//! [`DmaChannel::acknowledge`].
//!
//! # Buffer lifetime
//!
//! [`DmaChannel::start`] only borrows the source for the duration of the
//! call, but the hardware keeps reading it until completion. Callers must
//! keep the buffer alive and unmodified until the completion has been
//! acknowledged. `pendant-core`'s flush pipeline does this by holding the
//! frame buffer in its in-flight slot.

/// Completion status reported by the channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DmaStatus {
    /// No transfer programmed, or the last one has been acknowledged
    Idle,
    /// Transfer running
    Busy,
    /// Transfer finished, completion flag raised and not yet acknowledged
    Done,
}

/// Memory-to-peripheral DMA channel
pub trait DmaChannel {
    /// Error type for channel operations
    type Error;

    /// Program source address and byte count and start the transfer
    ///
    /// Returns immediately; completion is reported through the channel's
    /// interrupt and [`DmaChannel::status`].
    fn start(&mut self, source: &[u8]) -> Result<(), Self::Error>;

    /// Current channel status
    fn status(&self) -> DmaStatus;

    /// Clear the completion flag
    ///
    /// Returns `true` if a completion was pending for this channel.
    fn acknowledge(&mut self) -> bool;

    /// Stop a running transfer and clear any pending completion
    fn abort(&mut self);
}
