//! UI task
//!
//! One tick every `poll_interval_ms`:
//!
//! 1. Reclaim buffers released by the DMA interrupt
//! 2. Abandon a transfer stuck past the flush timeout
//! 3. Sample touch and feed the renderer
//! 4. Draw each damaged band into a free buffer and flush it
//!
//! Drawing band N+1 overlaps the DMA transfer of band N. When a flush is
//! refused as busy the task waits for the release notification, never on
//! the transfer itself.

use defmt::*;
use embassy_rp::peripherals::SPI1;
use embassy_time::{with_timeout, Duration, Instant, Ticker};

use pendant_core::flush::{FlushError, FrameBuffer, FramePool};
use pendant_core::render::{FrameScheduler, Renderer};
use pendant_drivers::TouchInput;
use pendant_hal_rp2040::{Rp2040Input, Rp2040Output, Rp2040Spi};

use crate::channels::FLUSH_READY;
use crate::demo::DemoRenderer;
use crate::flush_ctx;

/// Touch controller as wired on this board
pub type Touch = TouchInput<Rp2040Spi<'static, SPI1>, Rp2040Output<'static>, Rp2040Input<'static>>;

/// Pending damage areas tracked by the scheduler
const DAMAGE_SLOTS: usize = 8;

/// Release wait when the flush timeout is disabled
const FALLBACK_WAIT_MS: u64 = 50;

/// Ticks between statistics log lines
const STATS_EVERY_TICKS: u32 = 2000;

/// UI task parameters
pub struct UiConfig {
    pub poll_interval_ms: u32,
    pub flush_timeout_ms: u32,
}

/// Milliseconds since boot, wrapping
fn now_ms() -> u32 {
    Instant::now().as_millis() as u32
}

/// Return a buffer to the pool, reporting a double release
fn park(pool: &mut FramePool<'static>, buffer: FrameBuffer<'static>) {
    if let Err(buffer) = pool.release(buffer) {
        error!("buffer {} released twice, dropped", buffer.slot());
    }
}

/// Wait for one buffer to come back, bounded by the flush timeout
///
/// On expiry the stuck transfer is abandoned and its buffer reclaimed.
async fn reclaim(pool: &mut FramePool<'static>, wait: Duration) {
    let buffer = match with_timeout(wait, FLUSH_READY.receive()).await {
        Ok(buffer) => Some(buffer),
        Err(_) => flush_ctx::poll_timeout(now_ms()),
    };
    if let Some(buffer) = buffer {
        park(pool, buffer);
    }
}

#[embassy_executor::task]
pub async fn ui_task(
    mut touch: Touch,
    mut renderer: DemoRenderer,
    mut scheduler: FrameScheduler<DAMAGE_SLOTS>,
    mut pool: FramePool<'static>,
    config: UiConfig,
) {
    info!("UI task started");

    let wait = Duration::from_millis(match config.flush_timeout_ms {
        0 => FALLBACK_WAIT_MS,
        ms => ms as u64,
    });
    let mut ticker = Ticker::every(Duration::from_millis(config.poll_interval_ms as u64));
    let mut ticks: u32 = 0;

    loop {
        ticker.next().await;
        ticks = ticks.wrapping_add(1);

        while let Ok(buffer) = FLUSH_READY.try_receive() {
            park(&mut pool, buffer);
        }
        if let Some(buffer) = flush_ctx::poll_timeout(now_ms()) {
            park(&mut pool, buffer);
        }

        let sample = touch.get_touch_point();
        renderer.pointer(sample);
        scheduler.collect(&mut renderer);

        while let Some(band) = scheduler.next_band() {
            let mut buffer = loop {
                match pool.acquire() {
                    Some(buffer) => break buffer,
                    None => reclaim(&mut pool, wait).await,
                }
            };
            renderer.draw(&band, &mut buffer);

            loop {
                match flush_ctx::flush(band, buffer, now_ms()) {
                    Ok(_) => break,
                    Err(rejected) if rejected.error == FlushError::Busy => {
                        buffer = rejected.buffer;
                        reclaim(&mut pool, wait).await;
                    }
                    Err(rejected) => {
                        warn!("flush of {} refused: {}", band, rejected.error);
                        park(&mut pool, rejected.buffer);
                        break;
                    }
                }
            }
        }

        if ticks % STATS_EVERY_TICKS == 0 {
            let stats = flush_ctx::stats();
            debug!(
                "flush: started={} completed={} busy={} timeouts={}",
                stats.started, stats.completed, stats.rejected_busy, stats.timeouts
            );
        }
    }
}
