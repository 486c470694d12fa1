//! SPI TX DMA channel
//!
//! Drives one RP2040 DMA channel directly through the PAC so that the
//! transfer can outlive the call that started it: the channel reads the
//! frame buffer byte by byte into the SPI data register, paced by the SPI
//! TX DREQ, and raises `DMA_IRQ_1` when the count reaches zero.
//!
//! embassy-rp services `DMA_IRQ_0` for its own transfers, so this channel
//! is removed from `INTE0` and routed to `INTE1` only.
//!
//! # Register Usage
//!
//! - `CHx_READ_ADDR`: frame buffer, incrementing
//! - `CHx_WRITE_ADDR`: `SSPDR`, fixed
//! - `CHx_TRANS_COUNT`: byte count
//! - `CHx_CTRL_TRIG`: byte size, TREQ = SPIx TX, chained to itself, enable

use core::sync::atomic::{compiler_fence, Ordering};

use embassy_rp::dma::Channel;
use embassy_rp::pac;
use embassy_rp::pac::dma::vals::{DataSize, TreqSel};
use embassy_rp::Peri;
use pendant_hal::{DmaChannel, DmaStatus};

/// Which SPI block the channel feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpiPort {
    Spi0,
    Spi1,
}

impl SpiPort {
    fn regs(self) -> pac::spi::Spi {
        match self {
            SpiPort::Spi0 => pac::SPI0,
            SpiPort::Spi1 => pac::SPI1,
        }
    }

    fn tx_dreq(self) -> TreqSel {
        match self {
            SpiPort::Spi0 => TreqSel::SPI0_TX,
            SpiPort::Spi1 => TreqSel::SPI1_TX,
        }
    }
}

/// DMA channel errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DmaError {
    /// Channel still running
    Busy,
    /// Zero-length or oversized source
    Length,
}

/// Memory-to-SPI DMA channel
pub struct SpiTxDma<'d, C: Channel> {
    _channel: Peri<'d, C>,
    number: u8,
    port: SpiPort,
}

impl<'d, C: Channel> SpiTxDma<'d, C> {
    /// Claim `channel` for transfers into `port`'s TX FIFO
    pub fn new(channel: Peri<'d, C>, port: SpiPort) -> Self {
        let number = channel.number();
        let mask = 1u32 << number;

        port.regs().dmacr().modify(|w| w.set_txdmae(true));
        pac::DMA.inte(0).modify(|w| *w &= !mask);
        pac::DMA.ints(1).write_value(mask);
        pac::DMA.inte(1).modify(|w| *w |= mask);

        Self {
            _channel: channel,
            number,
            port,
        }
    }

    fn mask(&self) -> u32 {
        1 << self.number
    }

    fn regs(&self) -> pac::dma::Channel {
        pac::DMA.ch(self.number as usize)
    }
}

impl<C: Channel> DmaChannel for SpiTxDma<'_, C> {
    type Error = DmaError;

    fn start(&mut self, source: &[u8]) -> Result<(), DmaError> {
        let ch = self.regs();
        if ch.ctrl_trig().read().busy() {
            return Err(DmaError::Busy);
        }
        if source.is_empty() || source.len() > u32::MAX as usize {
            return Err(DmaError::Length);
        }

        pac::DMA.ints(1).write_value(self.mask());
        ch.read_addr().write_value(source.as_ptr() as u32);
        ch.write_addr()
            .write_value(self.port.regs().dr().as_ptr() as u32);
        ch.trans_count().write_value(source.len() as u32);

        // Buffer contents must be in memory before the channel reads them
        compiler_fence(Ordering::SeqCst);

        ch.ctrl_trig().write(|w| {
            w.set_treq_sel(self.port.tx_dreq());
            w.set_data_size(DataSize::SIZE_BYTE);
            w.set_incr_read(true);
            w.set_incr_write(false);
            w.set_chain_to(self.number);
            w.set_en(true);
        });
        Ok(())
    }

    fn status(&self) -> DmaStatus {
        if self.regs().ctrl_trig().read().busy() {
            DmaStatus::Busy
        } else if pac::DMA.intr().read() & self.mask() != 0 {
            DmaStatus::Done
        } else {
            DmaStatus::Idle
        }
    }

    fn acknowledge(&mut self) -> bool {
        let mask = self.mask();
        if pac::DMA.intr().read() & mask == 0 {
            return false;
        }
        pac::DMA.ints(1).write_value(mask);
        compiler_fence(Ordering::SeqCst);
        true
    }

    fn abort(&mut self) {
        let mask = self.mask();
        pac::DMA
            .chan_abort()
            .modify(|m| m.set_chan_abort(1 << self.number));
        while self.regs().ctrl_trig().read().busy() {}
        pac::DMA.ints(1).write_value(mask);
    }
}
