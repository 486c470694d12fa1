//! Shared display flusher
//!
//! The UI task starts transfers and the `DMA_IRQ_1` handler completes them.
//! Both reach the flusher through [`FLUSHER`], a critical-section mutex, so
//! a completion can never interleave with a half-started transfer.

use core::cell::RefCell;

use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::peripherals::{DMA_CH0, SPI0};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use pendant_core::flush::{FlushError, FlushJob, FlushRejected, FlushStats, FrameBuffer};
use pendant_core::DirtyRect;
use pendant_drivers::{DmaFlusher, St7789};
use pendant_hal_rp2040::{Rp2040Output, Rp2040Spi, SpiTxDma};

use crate::channels::ChannelNotifier;

/// The display as wired on this board
pub type Display = St7789<
    Rp2040Spi<'static, SPI0>,
    Rp2040Output<'static>,
    Rp2040Output<'static>,
    Rp2040Output<'static>,
    Rp2040Output<'static>,
>;

/// Display plus its DMA channel
pub type Flusher = DmaFlusher<'static, Display, SpiTxDma<'static, DMA_CH0>>;

static FLUSHER: Mutex<CriticalSectionRawMutex, RefCell<Option<Flusher>>> =
    Mutex::new(RefCell::new(None));

/// Run `f` on the installed flusher
///
/// Returns `None` before [`install`].
pub fn with_flusher<R>(f: impl FnOnce(&mut Flusher) -> R) -> Option<R> {
    FLUSHER.lock(|cell| cell.borrow_mut().as_mut().map(f))
}

/// Hand the flusher over and enable its completion interrupt
///
/// Must be called with the pipeline idle.
pub fn install(flusher: Flusher) {
    FLUSHER.lock(|cell| *cell.borrow_mut() = Some(flusher));

    // Boot-time transfers were completed by polling and may have left the
    // line pending in the NVIC
    cortex_m::peripheral::NVIC::unpend(interrupt::DMA_IRQ_1);
    interrupt::DMA_IRQ_1.set_priority(Priority::P1);
    unsafe { interrupt::DMA_IRQ_1.enable() };
}

/// Start a transfer on the installed flusher
pub fn flush(
    rect: DirtyRect,
    buffer: FrameBuffer<'static>,
    now_ms: u32,
) -> Result<FlushJob, FlushRejected<'static>> {
    FLUSHER.lock(|cell| match cell.borrow_mut().as_mut() {
        Some(flusher) => flusher.flush(rect, buffer, now_ms),
        None => Err(FlushRejected {
            error: FlushError::Transfer,
            buffer,
        }),
    })
}

/// Abandon a stuck transfer, returning its buffer
pub fn poll_timeout(now_ms: u32) -> Option<FrameBuffer<'static>> {
    with_flusher(|f| f.poll_timeout(now_ms)).flatten()
}

/// Counters of the installed flusher
pub fn stats() -> FlushStats {
    with_flusher(|f| f.stats()).unwrap_or_default()
}

#[interrupt]
fn DMA_IRQ_1() {
    with_flusher(|f| f.on_interrupt(&ChannelNotifier));
}
