//! Display flush pipeline
//!
//! Moves rendered pixel bands to the display without blocking the renderer
//! for the length of the transfer:
//!
//! ```text
//! Renderer ──fill──▶ FrameBuffer ──begin()──▶ FlushPipeline (InFlight)
//!    ▲                                              │
//!    │                                        DMA completion IRQ
//!    └──────── CompletionNotifier ◀──complete()─────┘
//! ```
//!
//! Two frame buffers exist. At most one is in flight; the renderer may fill
//! the other meanwhile. Buffer ownership moves by value, so a buffer that has
//! been handed to the pipeline cannot be written until it is handed back.

pub mod band;
pub mod buffer;
pub mod pipeline;

pub use band::BandIter;
pub use buffer::{rgb565, BufferSlot, FrameBuffer, FramePool, BYTES_PER_PIXEL};
pub use pipeline::{
    CompletionNotifier, FlushError, FlushJob, FlushPipeline, FlushRejected, FlushStats,
    TransferState,
};
