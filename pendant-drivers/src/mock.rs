//! Recording HAL doubles for driver tests

use core::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use pendant_hal::{DelayMs, DmaChannel, DmaStatus, InputPin, OutputPin, SpiBus, SpiConfig};

/// Something observable on the bus
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Pin(&'static str, bool),
    Configure(SpiConfig),
    /// Bytes written with the DC and CS levels at the time
    Write { dc: bool, cs: bool, bytes: Vec<u8> },
    Transfer(Vec<u8>),
    Flush,
    Delay(u32),
    DmaStart(usize),
    DmaAbort,
}

pub type Log = Rc<RefCell<Vec<Event>>>;

pub fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

/// Output pin whose level other mocks can observe
pub struct MockPin {
    name: &'static str,
    level: Rc<Cell<bool>>,
    log: Log,
}

impl MockPin {
    pub fn new(name: &'static str, log: &Log) -> Self {
        Self {
            name,
            level: Rc::new(Cell::new(true)),
            log: log.clone(),
        }
    }

    pub fn level(&self) -> Rc<Cell<bool>> {
        self.level.clone()
    }
}

impl OutputPin for MockPin {
    fn set_high(&mut self) {
        self.level.set(true);
        self.log.borrow_mut().push(Event::Pin(self.name, true));
    }

    fn set_low(&mut self) {
        self.level.set(false);
        self.log.borrow_mut().push(Event::Pin(self.name, false));
    }

    fn is_set_high(&self) -> bool {
        self.level.get()
    }
}

/// Input pin driven from the test
#[derive(Clone)]
pub struct MockInput {
    pub level: Rc<Cell<bool>>,
}

impl MockInput {
    pub fn new(high: bool) -> Self {
        Self {
            level: Rc::new(Cell::new(high)),
        }
    }
}

impl InputPin for MockInput {
    fn is_high(&self) -> bool {
        self.level.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

/// SPI master recording writes and replaying canned read bytes
pub struct MockSpi {
    log: Log,
    dc: Rc<Cell<bool>>,
    cs: Rc<Cell<bool>>,
    pub replies: Rc<RefCell<VecDeque<u8>>>,
    pub fail: Rc<Cell<bool>>,
}

impl MockSpi {
    pub fn new(log: &Log, dc: Rc<Cell<bool>>, cs: Rc<Cell<bool>>) -> Self {
        Self {
            log: log.clone(),
            dc,
            cs,
            replies: Rc::new(RefCell::new(VecDeque::new())),
            fail: Rc::new(Cell::new(false)),
        }
    }

    fn check(&self) -> Result<(), MockError> {
        if self.fail.get() {
            Err(MockError)
        } else {
            Ok(())
        }
    }
}

impl SpiBus for MockSpi {
    type Error = MockError;

    fn configure(&mut self, config: &SpiConfig) -> Result<(), MockError> {
        self.log.borrow_mut().push(Event::Configure(*config));
        Ok(())
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), MockError> {
        self.check()?;
        self.log.borrow_mut().push(Event::Transfer(write.to_vec()));
        let mut replies = self.replies.borrow_mut();
        for byte in read.iter_mut() {
            *byte = replies.pop_front().unwrap_or(0);
        }
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> Result<(), MockError> {
        self.check()?;
        self.log.borrow_mut().push(Event::Write {
            dc: self.dc.get(),
            cs: self.cs.get(),
            bytes: data.to_vec(),
        });
        Ok(())
    }

    fn flush(&mut self) -> Result<(), MockError> {
        self.check()?;
        self.log.borrow_mut().push(Event::Flush);
        Ok(())
    }
}

pub struct MockDelay {
    log: Log,
}

impl MockDelay {
    pub fn new(log: &Log) -> Self {
        Self { log: log.clone() }
    }
}

impl DelayMs for MockDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.log.borrow_mut().push(Event::Delay(ms));
    }
}

/// DMA channel whose completion is raised by the test
pub struct MockDma {
    log: Log,
    pub status: Rc<Cell<DmaStatus>>,
    pub fail: bool,
    pub last: Rc<RefCell<Vec<u8>>>,
}

impl MockDma {
    pub fn new(log: &Log) -> Self {
        Self {
            log: log.clone(),
            status: Rc::new(Cell::new(DmaStatus::Idle)),
            fail: false,
            last: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Second view of the same channel, for raising completions
    pub fn handle(&self) -> Self {
        Self {
            log: self.log.clone(),
            status: self.status.clone(),
            fail: false,
            last: self.last.clone(),
        }
    }
}

impl DmaChannel for MockDma {
    type Error = MockError;

    fn start(&mut self, source: &[u8]) -> Result<(), MockError> {
        if self.fail {
            return Err(MockError);
        }
        self.log.borrow_mut().push(Event::DmaStart(source.len()));
        *self.last.borrow_mut() = source.to_vec();
        self.status.set(DmaStatus::Busy);
        Ok(())
    }

    fn status(&self) -> DmaStatus {
        self.status.get()
    }

    fn acknowledge(&mut self) -> bool {
        if self.status.get() == DmaStatus::Done {
            self.status.set(DmaStatus::Idle);
            true
        } else {
            false
        }
    }

    fn abort(&mut self) {
        self.log.borrow_mut().push(Event::DmaAbort);
        self.status.set(DmaStatus::Idle);
    }
}
