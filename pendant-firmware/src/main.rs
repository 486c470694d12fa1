//! Pendant - CNC Touchscreen Front-End Firmware
//!
//! Drives a 240x320 ST7789 panel over SPI0 with DMA and an XPT2046 resistive
//! touch controller over SPI1 on an RP2040.
//!
//! | Function        | GPIO | Function   | GPIO |
//! |-----------------|------|------------|------|
//! | Display SCK     | 18   | Touch SCK  | 10   |
//! | Display MOSI    | 19   | Touch MOSI | 11   |
//! | Display CS      | 17   | Touch MISO | 12   |
//! | Display DC      | 20   | Touch CS   | 13   |
//! | Display RST     | 21   | Touch IRQ  | 14   |
//! | Display BL      | 22   |            |      |
//!
//! Boot order:
//!
//! 1. Load `panel.toml` (compiled in)
//! 2. Bring up the display and clear it with interrupts still off
//! 3. Install the flusher and enable the DMA completion interrupt
//! 4. Hand touch, renderer and buffers to the UI task

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::spi::Spi;
use static_cell::ConstStaticCell;
use {defmt_rtt as _, panic_probe as _};

use pendant_core::config::{parse_config, PanelConfig};
use pendant_core::flush::{BandIter, BufferSlot, FrameBuffer, FramePool, BYTES_PER_PIXEL};
use pendant_core::render::FrameScheduler;
use pendant_core::touch::TouchMapper;
use pendant_drivers::{DmaFlusher, St7789, St7789Config, TouchInput, Xpt2046};
use pendant_hal_rp2040::spi::embassy_config;
use pendant_hal_rp2040::{
    BlockingDelay, Rp2040Input, Rp2040Output, Rp2040Spi, SpiConfig, SpiPort, SpiTxDma,
};

mod channels;
mod demo;
mod flush_ctx;
mod tasks;

/// Embedded panel configuration (compiled into firmware)
/// Edit panel.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../panel.toml");

/// Largest supported frame buffer: 320 pixels wide, 32 lines, RGB565
const FRAME_BUFFER_BYTES: usize = 320 * 32 * BYTES_PER_PIXEL;

/// Busy polls per band before the boot clear gives up
const BOOT_CLEAR_SPINS: u32 = 2_000_000;

static BUFFER_A: ConstStaticCell<[u8; FRAME_BUFFER_BYTES]> =
    ConstStaticCell::new([0; FRAME_BUFFER_BYTES]);
static BUFFER_B: ConstStaticCell<[u8; FRAME_BUFFER_BYTES]> =
    ConstStaticCell::new([0; FRAME_BUFFER_BYTES]);

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Pendant firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = load_config();
    let geometry = config.geometry();

    // Display on SPI0, pixels fed by DMA channel 0
    let display_spi_config = SpiConfig::mode0(config.display.spi_frequency_hz);
    let display_spi = Spi::new_blocking_txonly(
        p.SPI0,
        p.PIN_18,
        p.PIN_19,
        embassy_config(&display_spi_config),
    );
    let mut display = St7789::new(
        Rp2040Spi::new(display_spi, &display_spi_config),
        Rp2040Output::new(Output::new(p.PIN_20, Level::High)),
        Rp2040Output::new(Output::new(p.PIN_17, Level::High)),
        Rp2040Output::new(Output::new(p.PIN_21, Level::High)),
        Rp2040Output::new(Output::new(p.PIN_22, Level::Low)),
        config.display.width,
        config.display.height,
    );
    if let Err(e) = display.init(&mut BlockingDelay, &St7789Config::from(&config.display)) {
        defmt::panic!("display init failed: {}", e);
    }

    let dma = SpiTxDma::new(p.DMA_CH0, SpiPort::Spi0);
    let mut flusher = DmaFlusher::new(display, dma, geometry, config.display.flush_timeout_ms);

    // Touch on SPI1
    let touch_spi_config = SpiConfig::mode0(config.touch.spi_frequency_hz);
    let touch_spi = Spi::new_blocking(
        p.SPI1,
        p.PIN_10,
        p.PIN_11,
        p.PIN_12,
        embassy_config(&touch_spi_config),
    );
    let mut controller = Xpt2046::new(
        Rp2040Spi::new(touch_spi, &touch_spi_config),
        Rp2040Output::new(Output::new(p.PIN_13, Level::High)),
        Rp2040Input::new(Input::new(p.PIN_14, Pull::Up)),
    );
    if let Err(e) = controller.init(config.touch.spi_frequency_hz) {
        defmt::panic!("touch init failed: {}", e);
    }
    let touch = TouchInput::new(
        controller,
        TouchMapper::new(config.touch.calibration, geometry),
    );
    info!("Display and touch initialized");

    // Frame buffers, trimmed to the configured band height
    let buffer_bytes = (config.buffer_pixels() * BYTES_PER_PIXEL).min(FRAME_BUFFER_BYTES);
    let a = &mut BUFFER_A.take()[..buffer_bytes];
    let b = &mut BUFFER_B.take()[..buffer_bytes];

    let a = clear_screen(&mut flusher, FrameBuffer::new(BufferSlot::A, a));
    if let Err(e) = flusher.release_bus() {
        defmt::panic!("display bus stuck after clear: {}", e);
    }
    info!("Screen cleared");

    flush_ctx::install(flusher);
    info!("DMA completion interrupt enabled");

    let Some(scheduler) = FrameScheduler::new(&geometry, a.pixel_capacity()) else {
        defmt::panic!("frame buffer narrower than one row");
    };
    let renderer = demo::DemoRenderer::new(&geometry);
    let pool = FramePool::new(a.into_bytes(), b);

    let ui_config = tasks::UiConfig {
        poll_interval_ms: config.touch.poll_interval_ms,
        flush_timeout_ms: config.display.flush_timeout_ms,
    };
    spawner
        .spawn(tasks::ui_task(touch, renderer, scheduler, pool, ui_config))
        .unwrap();

    info!("All tasks spawned, firmware running");
}

/// Parse the embedded panel.toml, falling back to defaults
fn load_config() -> PanelConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!(
                "Panel {}x{}, rotation {}, {} lines per buffer",
                config.display.width,
                config.display.height,
                config.display.orientation.degrees(),
                config.display.buffer_lines
            );
            config
        }
        Err(e) => {
            // Only possible if panel.toml slipped past build-time validation
            error!("Failed to parse embedded config: {}", e);
            error!("Using default configuration");
            PanelConfig::default()
        }
    }
}

/// Fill the screen black, one band at a time, by polling the DMA channel
fn clear_screen(
    flusher: &mut flush_ctx::Flusher,
    mut buffer: FrameBuffer<'static>,
) -> FrameBuffer<'static> {
    let pixels = buffer.pixel_capacity();
    buffer.fill(0x0000, pixels);

    let Some(bounds) = flusher.target().panel().bounds() else {
        return buffer;
    };
    let bands = match BandIter::new(bounds, pixels) {
        Ok(bands) => bands,
        Err(e) => defmt::panic!("cannot split screen into bands: {}", e),
    };
    for band in bands {
        if let Err(rejected) = flusher.flush(band, buffer, 0) {
            defmt::panic!("boot clear flush failed: {}", rejected.error);
        }
        buffer = match flusher.wait_idle_blocking(BOOT_CLEAR_SPINS) {
            Ok(buffer) => buffer,
            Err(e) => defmt::panic!("boot clear transfer stuck: {}", e),
        };
    }
    buffer
}
