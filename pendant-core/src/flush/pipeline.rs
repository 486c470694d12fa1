//! Flush state machine
//!
//! ```text
//!          begin(rect, buffer)
//!   Idle ──────────────────────▶ InFlight
//!    ▲                              │
//!    └──── complete() / timeout ────┘
//! ```
//!
//! `begin` is called from the render loop, `complete` from the transfer
//! engine's completion interrupt. Both run under the same critical section
//! in firmware, so the pipeline itself holds no locks.

use super::buffer::{BufferSlot, FrameBuffer, BYTES_PER_PIXEL};
use crate::geometry::{DirtyRect, PanelGeometry};

/// Transfer engine state as seen by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferState {
    /// No transfer outstanding
    Idle,
    /// A buffer is being drained to the display
    InFlight,
}

/// Flush protocol errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlushError {
    /// A transfer is already in flight
    Busy,
    /// Completion reported with nothing in flight
    NotInFlight,
    /// Rectangle outside the addressable window
    OutOfBounds,
    /// Rectangle has more pixels than the buffer holds
    BufferTooSmall,
    /// The transfer engine refused to start
    Transfer,
}

/// A flush request that was not accepted
///
/// Carries the caller's buffer back so ownership is never lost.
#[derive(Debug)]
pub struct FlushRejected<'a> {
    pub error: FlushError,
    pub buffer: FrameBuffer<'a>,
}

/// Description of the accepted transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlushJob {
    pub rect: DirtyRect,
    pub slot: BufferSlot,
    /// Bytes the transfer engine must move
    pub byte_len: usize,
}

/// Pipeline counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlushStats {
    /// Transfers started
    pub started: u32,
    /// Transfers completed by interrupt
    pub completed: u32,
    /// Requests refused because a transfer was in flight
    pub rejected_busy: u32,
    /// Transfers abandoned after the timeout
    pub timeouts: u32,
}

/// "Flush ready" notification into the renderer
///
/// Called from interrupt context with the buffer that may now be reused.
/// Implementations must not block.
pub trait CompletionNotifier<'a> {
    fn notify(&self, buffer: FrameBuffer<'a>);
}

/// Flush orchestration state
#[derive(Debug)]
pub struct FlushPipeline<'a> {
    panel: PanelGeometry,
    state: TransferState,
    in_flight: Option<FrameBuffer<'a>>,
    job: Option<FlushJob>,
    started_at_ms: u32,
    /// 0 disables the stuck-transfer check
    timeout_ms: u32,
    stats: FlushStats,
}

impl<'a> FlushPipeline<'a> {
    /// Create an idle pipeline
    pub const fn new(panel: PanelGeometry, timeout_ms: u32) -> Self {
        Self {
            panel,
            state: TransferState::Idle,
            in_flight: None,
            job: None,
            started_at_ms: 0,
            timeout_ms,
            stats: FlushStats {
                started: 0,
                completed: 0,
                rejected_busy: 0,
                timeouts: 0,
            },
        }
    }

    pub fn panel(&self) -> &PanelGeometry {
        &self.panel
    }

    pub fn state(&self) -> TransferState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == TransferState::Idle
    }

    pub fn stats(&self) -> FlushStats {
        self.stats
    }

    /// The transfer currently in flight
    pub fn current_job(&self) -> Option<FlushJob> {
        self.job
    }

    /// Accept a filled buffer for transfer
    ///
    /// On success the pipeline owns `buffer` and is InFlight.
    pub fn begin(
        &mut self,
        rect: DirtyRect,
        buffer: FrameBuffer<'a>,
        now_ms: u32,
    ) -> Result<FlushJob, FlushRejected<'a>> {
        self.begin_with(rect, buffer, now_ms, |_, _| Ok(()))
    }

    /// Accept a filled buffer and start the transfer engine on it
    ///
    /// `start` runs after the request has been admitted and receives the
    /// exact bytes to transfer. If it fails the pipeline stays Idle and the
    /// buffer is handed back with the error.
    pub fn begin_with<F>(
        &mut self,
        rect: DirtyRect,
        buffer: FrameBuffer<'a>,
        now_ms: u32,
        start: F,
    ) -> Result<FlushJob, FlushRejected<'a>>
    where
        F: FnOnce(&FlushJob, &[u8]) -> Result<(), FlushError>,
    {
        if self.state == TransferState::InFlight {
            self.stats.rejected_busy = self.stats.rejected_busy.wrapping_add(1);
            return Err(FlushRejected {
                error: FlushError::Busy,
                buffer,
            });
        }
        if !self.panel.contains(&rect) {
            return Err(FlushRejected {
                error: FlushError::OutOfBounds,
                buffer,
            });
        }
        if rect.pixel_count() > buffer.pixel_capacity() {
            return Err(FlushRejected {
                error: FlushError::BufferTooSmall,
                buffer,
            });
        }

        let job = FlushJob {
            rect,
            slot: buffer.slot(),
            byte_len: rect.pixel_count() * BYTES_PER_PIXEL,
        };
        if let Err(error) = start(&job, &buffer.as_bytes()[..job.byte_len]) {
            return Err(FlushRejected { error, buffer });
        }

        self.in_flight = Some(buffer);
        self.job = Some(job);
        self.started_at_ms = now_ms;
        self.state = TransferState::InFlight;
        self.stats.started = self.stats.started.wrapping_add(1);
        Ok(job)
    }

    /// Bytes of the in-flight transfer
    pub fn in_flight_bytes(&self) -> Option<&[u8]> {
        match (&self.in_flight, &self.job) {
            (Some(buffer), Some(job)) => buffer.as_bytes().get(..job.byte_len),
            _ => None,
        }
    }

    /// Completion acknowledged: InFlight -> Idle
    ///
    /// Returns the drained buffer exactly once per transfer.
    pub fn complete(&mut self) -> Result<FrameBuffer<'a>, FlushError> {
        let buffer = self.finish().ok_or(FlushError::NotInFlight)?;
        self.stats.completed = self.stats.completed.wrapping_add(1);
        Ok(buffer)
    }

    /// Abandon a transfer that has been in flight longer than the timeout
    pub fn poll_timeout(&mut self, now_ms: u32) -> Option<FrameBuffer<'a>> {
        if self.timeout_ms == 0 || self.state != TransferState::InFlight {
            return None;
        }
        if now_ms.wrapping_sub(self.started_at_ms) < self.timeout_ms {
            return None;
        }
        let buffer = self.finish()?;
        self.stats.timeouts = self.stats.timeouts.wrapping_add(1);
        Some(buffer)
    }

    fn finish(&mut self) -> Option<FrameBuffer<'a>> {
        if self.state != TransferState::InFlight {
            return None;
        }
        self.state = TransferState::Idle;
        self.job = None;
        self.in_flight.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flush::buffer::FramePool;
    use crate::geometry::Orientation;

    const PANEL: PanelGeometry = PanelGeometry::new(240, 320, Orientation::Deg0);

    fn band(lines: u16) -> DirtyRect {
        DirtyRect::new(0, 0, 239, lines - 1).unwrap()
    }

    #[test]
    fn test_flush_then_complete() {
        let mut a = [0u8; 240 * 32 * 2];
        let mut b = [0u8; 240 * 32 * 2];
        let mut pool = FramePool::new(&mut a, &mut b);
        let mut pipeline = FlushPipeline::new(PANEL, 100);

        let buf = pool.acquire().unwrap();
        let job = pipeline.begin(band(32), buf, 0).unwrap();
        assert_eq!(pipeline.state(), TransferState::InFlight);
        assert_eq!(job.byte_len, 240 * 32 * 2);
        assert_eq!(pipeline.in_flight_bytes().map(<[u8]>::len), Some(240 * 32 * 2));

        let released = pipeline.complete().unwrap();
        assert_eq!(released.slot(), job.slot);
        assert!(pipeline.is_idle());
        assert!(pipeline.in_flight_bytes().is_none());
    }

    #[test]
    fn test_second_flush_rejected_while_in_flight() {
        let mut a = [0u8; 64];
        let mut b = [0u8; 64];
        let mut pool = FramePool::new(&mut a, &mut b);
        let mut pipeline = FlushPipeline::new(PANEL, 0);
        let rect = DirtyRect::new(0, 0, 3, 3).unwrap();

        pipeline.begin(rect, pool.acquire().unwrap(), 0).unwrap();
        let rejected = pipeline.begin(rect, pool.acquire().unwrap(), 1).unwrap_err();
        assert_eq!(rejected.error, FlushError::Busy);
        assert_eq!(pipeline.stats().rejected_busy, 1);

        // Rejected buffer comes back intact and can be flushed after completion
        let first = pipeline.complete().unwrap();
        pipeline.begin(rect, rejected.buffer, 2).unwrap();
        assert_ne!(first.slot(), pipeline.current_job().unwrap().slot);
    }

    #[test]
    fn test_spurious_completion() {
        let mut pipeline = FlushPipeline::new(PANEL, 0);
        assert_eq!(pipeline.complete().unwrap_err(), FlushError::NotInFlight);
        assert_eq!(pipeline.stats().completed, 0);
    }

    #[test]
    fn test_completion_fires_once() {
        let mut a = [0u8; 8];
        let mut b = [0u8; 8];
        let mut pool = FramePool::new(&mut a, &mut b);
        let mut pipeline = FlushPipeline::new(PANEL, 0);
        let rect = DirtyRect::new(0, 0, 1, 1).unwrap();

        pipeline.begin(rect, pool.acquire().unwrap(), 0).unwrap();
        assert!(pipeline.complete().is_ok());
        assert_eq!(pipeline.complete().unwrap_err(), FlushError::NotInFlight);
        assert_eq!(pipeline.stats().completed, 1);
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let mut a = [0u8; 1024];
        let mut b = [0u8; 8];
        let mut pool = FramePool::new(&mut a, &mut b);
        let mut pipeline = FlushPipeline::new(PANEL, 0);

        let rect = DirtyRect::new(230, 0, 240, 0).unwrap();
        let rejected = pipeline
            .begin(rect, pool.acquire_slot(BufferSlot::A).unwrap(), 0)
            .unwrap_err();
        assert_eq!(rejected.error, FlushError::OutOfBounds);
        assert!(pipeline.is_idle());
    }

    #[test]
    fn test_buffer_too_small() {
        let mut a = [0u8; 8];
        let mut b = [0u8; 8];
        let mut pool = FramePool::new(&mut a, &mut b);
        let mut pipeline = FlushPipeline::new(PANEL, 0);

        let rect = DirtyRect::new(0, 0, 4, 0).unwrap();
        let rejected = pipeline.begin(rect, pool.acquire().unwrap(), 0).unwrap_err();
        assert_eq!(rejected.error, FlushError::BufferTooSmall);
        assert_eq!(pipeline.stats().started, 0);
    }

    #[test]
    fn test_timeout_returns_buffer() {
        let mut a = [0u8; 8];
        let mut b = [0u8; 8];
        let mut pool = FramePool::new(&mut a, &mut b);
        let mut pipeline = FlushPipeline::new(PANEL, 100);
        let rect = DirtyRect::new(0, 0, 1, 0).unwrap();

        pipeline.begin(rect, pool.acquire().unwrap(), u32::MAX - 10).unwrap();
        assert!(pipeline.poll_timeout(50).is_none());
        let buf = pipeline.poll_timeout(90).unwrap();
        assert!(pipeline.is_idle());
        assert_eq!(pipeline.stats().timeouts, 1);

        // Late interrupt after a timeout must not hand out a second buffer
        assert_eq!(pipeline.complete().unwrap_err(), FlushError::NotInFlight);
        pool.release(buf).unwrap();
    }

    #[test]
    fn test_timeout_disabled() {
        let mut a = [0u8; 8];
        let mut b = [0u8; 8];
        let mut pool = FramePool::new(&mut a, &mut b);
        let mut pipeline = FlushPipeline::new(PANEL, 0);
        let rect = DirtyRect::new(0, 0, 0, 0).unwrap();

        pipeline.begin(rect, pool.acquire().unwrap(), 0).unwrap();
        assert!(pipeline.poll_timeout(u32::MAX).is_none());
        assert_eq!(pipeline.state(), TransferState::InFlight);
    }

    #[test]
    fn test_failed_start_leaves_pipeline_idle() {
        let mut a = [0u8; 8];
        let mut b = [0u8; 8];
        let mut pool = FramePool::new(&mut a, &mut b);
        let mut pipeline = FlushPipeline::new(PANEL, 0);
        let rect = DirtyRect::new(0, 0, 1, 0).unwrap();

        let mut seen = 0;
        let rejected = pipeline
            .begin_with(rect, pool.acquire().unwrap(), 0, |job, bytes| {
                seen = bytes.len();
                assert_eq!(job.byte_len, 4);
                Err(FlushError::Transfer)
            })
            .unwrap_err();
        assert_eq!(seen, 4);
        assert_eq!(rejected.error, FlushError::Transfer);
        assert!(pipeline.is_idle());
        assert_eq!(pipeline.stats(), FlushStats::default());
    }
}
