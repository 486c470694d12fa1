//! DMA-driven flush orchestration
//!
//! [`DmaFlusher`] ties the flush state machine to a display window and a
//! DMA channel:
//!
//! - [`DmaFlusher::flush`] runs in the render loop. It drains the previous
//!   pixel stream, programs the address window, opens a new stream and
//!   starts the DMA channel, then returns without waiting.
//! - [`DmaFlusher::on_interrupt`] runs in the DMA completion interrupt. It
//!   clears the channel's flag, moves the pipeline back to Idle and hands
//!   the drained buffer to the notifier. Nothing else.
//!
//! In firmware both are called with the flusher borrowed out of the same
//! critical-section mutex.

use core::hint::spin_loop;

use pendant_core::flush::{
    CompletionNotifier, FlushError, FlushJob, FlushPipeline, FlushRejected, FlushStats,
    FrameBuffer, TransferState,
};
use pendant_core::{DirtyRect, PanelGeometry};
use pendant_hal::{DmaChannel, DmaStatus, OutputPin, SpiBus};

use crate::st7789::St7789;

/// A display that accepts a pixel stream into an address window
pub trait WindowTarget {
    /// Error type for window operations
    type Error;

    /// Program the window and leave the bus ready for pixel data
    fn open_window(&mut self, rect: &DirtyRect) -> Result<(), Self::Error>;

    /// Finish the current pixel stream, if one is open
    fn close_window(&mut self) -> Result<(), Self::Error>;
}

impl<SPI, DC, CS, RST, BL> WindowTarget for St7789<SPI, DC, CS, RST, BL>
where
    SPI: SpiBus,
    DC: OutputPin,
    CS: OutputPin,
    RST: OutputPin,
    BL: OutputPin,
{
    type Error = crate::st7789::St7789Error<SPI::Error>;

    fn open_window(&mut self, rect: &DirtyRect) -> Result<(), Self::Error> {
        self.set_window(rect)?;
        self.begin_pixels();
        Ok(())
    }

    fn close_window(&mut self) -> Result<(), Self::Error> {
        self.end_pixels()
    }
}

/// Double-buffered, interrupt-completed display flusher
pub struct DmaFlusher<'a, T, DMA> {
    target: T,
    dma: DMA,
    pipeline: FlushPipeline<'a>,
}

impl<'a, T, DMA> DmaFlusher<'a, T, DMA>
where
    T: WindowTarget,
    DMA: DmaChannel,
{
    /// `timeout_ms` bounds a transfer's lifetime; 0 disables the check
    pub fn new(target: T, dma: DMA, panel: PanelGeometry, timeout_ms: u32) -> Self {
        Self {
            target,
            dma,
            pipeline: FlushPipeline::new(panel, timeout_ms),
        }
    }

    pub fn state(&self) -> TransferState {
        self.pipeline.state()
    }

    pub fn is_idle(&self) -> bool {
        self.pipeline.is_idle()
    }

    pub fn stats(&self) -> FlushStats {
        self.pipeline.stats()
    }

    pub fn target(&mut self) -> &mut T {
        &mut self.target
    }

    /// Start pushing `buffer` into `rect`
    ///
    /// Non-blocking. The buffer comes back through the completion notifier,
    /// or immediately in the error if the request is refused.
    pub fn flush(
        &mut self,
        rect: DirtyRect,
        buffer: FrameBuffer<'a>,
        now_ms: u32,
    ) -> Result<FlushJob, FlushRejected<'a>> {
        let target = &mut self.target;
        let dma = &mut self.dma;
        self.pipeline.begin_with(rect, buffer, now_ms, |job, bytes| {
            // The previous stream ended with the last DMA byte still in the FIFO
            target.close_window().map_err(|_| FlushError::Transfer)?;
            target
                .open_window(&job.rect)
                .map_err(|_| FlushError::Transfer)?;
            if dma.start(bytes).is_err() {
                let _ = target.close_window();
                return Err(FlushError::Transfer);
            }
            Ok(())
        })
    }

    /// DMA completion interrupt
    ///
    /// Returns `true` if a transfer completed and the notifier was called.
    pub fn on_interrupt<N>(&mut self, notifier: &N) -> bool
    where
        N: CompletionNotifier<'a> + ?Sized,
    {
        if !self.dma.acknowledge() {
            return false;
        }
        match self.pipeline.complete() {
            Ok(buffer) => {
                notifier.notify(buffer);
                true
            }
            Err(_) => false,
        }
    }

    /// Abandon a transfer stuck longer than the timeout
    ///
    /// Stops the channel, releases the display bus and returns the buffer.
    pub fn poll_timeout(&mut self, now_ms: u32) -> Option<FrameBuffer<'a>> {
        let buffer = self.pipeline.poll_timeout(now_ms)?;
        self.dma.abort();
        let _ = self.target.close_window();

        #[cfg(feature = "defmt")]
        defmt::warn!("flush timed out, DMA aborted");

        Some(buffer)
    }

    /// Drain the last pixel stream and release the display bus
    ///
    /// Only possible while Idle; returns `Busy` otherwise.
    pub fn release_bus(&mut self) -> Result<(), FlushError> {
        if !self.pipeline.is_idle() {
            return Err(FlushError::Busy);
        }
        self.target
            .close_window()
            .map_err(|_| FlushError::Transfer)
    }

    /// Spin until the in-flight transfer finishes, then complete it here
    ///
    /// Degraded path for use while the completion interrupt is not yet
    /// enabled (boot-time screen clear). Gives up with `Busy` after
    /// `max_spins` polls.
    pub fn wait_idle_blocking(&mut self, max_spins: u32) -> Result<FrameBuffer<'a>, FlushError> {
        if self.pipeline.is_idle() {
            return Err(FlushError::NotInFlight);
        }
        let mut spins = 0;
        while self.dma.status() == DmaStatus::Busy {
            if spins == max_spins {
                return Err(FlushError::Busy);
            }
            spins += 1;
            spin_loop();
        }
        self.dma.acknowledge();
        self.pipeline.complete()
    }
}
