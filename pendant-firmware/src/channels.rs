//! Inter-task communication channels
//!
//! The DMA completion interrupt hands drained frame buffers back to the UI
//! task through [`FLUSH_READY`]. The channel holds as many entries as there
//! are frame buffers, so a send from the interrupt can never be refused.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use pendant_core::flush::{CompletionNotifier, FrameBuffer};

/// Number of frame buffers in circulation
pub const FRAME_BUFFER_COUNT: usize = 2;

/// Buffers released by a completed transfer
pub static FLUSH_READY: ReadyChannel = Channel::new();

type ReadyChannel = Channel<CriticalSectionRawMutex, FrameBuffer<'static>, FRAME_BUFFER_COUNT>;

/// Completion notifier posting into [`FLUSH_READY`]
pub struct ChannelNotifier;

impl CompletionNotifier<'static> for ChannelNotifier {
    fn notify(&self, buffer: FrameBuffer<'static>) {
        if let Err(err) = FLUSH_READY.try_send(buffer) {
            // Only reachable if a third buffer ever enters circulation
            let embassy_sync::channel::TrySendError::Full(lost) = err;
            defmt::error!("flush-ready channel full, buffer {} dropped", lost.slot());
        }
    }
}
