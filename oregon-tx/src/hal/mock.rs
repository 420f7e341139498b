//! Simulated clock and recording RF line for tests.
//!
//! Both share one simulated timeline so every line write is stamped with the
//! time the modulator believed it was.

use std::cell::Cell;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::digital::{ErrorType, OutputPin};

use super::Clock;

/// Shared simulated time in microseconds.  `u64` so tests can run the `u32`
/// views across their wrap points.
pub(crate) type Timeline = Rc<Cell<u64>>;

/// Simulated clock.  Delays advance the timeline instantly.
///
/// `overhead_us` is added after every `now_us()` read to model per-bit
/// processing cost on a slow MCU.
#[derive(Debug)]
pub(crate) struct SimClock {
    time: Timeline,
    overhead_us: u64,
    delays: Vec<u32>,
}

impl SimClock {
    pub(crate) fn new() -> Self {
        Self::starting_at(0)
    }

    pub(crate) fn starting_at(us: u64) -> Self {
        Self {
            time: Rc::new(Cell::new(us)),
            overhead_us: 0,
            delays: Vec::new(),
        }
    }

    pub(crate) fn with_overhead(mut self, overhead_us: u64) -> Self {
        self.overhead_us = overhead_us;
        self
    }

    pub(crate) fn timeline(&self) -> Timeline {
        Rc::clone(&self.time)
    }

    pub(crate) fn now(&self) -> u64 {
        self.time.get()
    }

    pub(crate) fn advance_us(&self, us: u64) {
        self.time.set(self.time.get() + us);
    }

    pub(crate) fn advance_ms(&self, ms: u64) {
        self.advance_us(ms * 1_000);
    }

    /// Every delay requested so far, in call order.
    pub(crate) fn delays(&self) -> &[u32] {
        &self.delays
    }
}

impl Clock for SimClock {
    fn now_us(&self) -> u32 {
        let t = self.time.get();
        self.time.set(t + self.overhead_us);
        t as u32
    }

    fn now_ms(&self) -> u32 {
        (self.time.get() / 1_000) as u32
    }

    fn delay_us(&mut self, us: u32) {
        self.delays.push(us);
        self.advance_us(u64::from(us));
    }
}

/// Output pin that records every write with its simulated timestamp.
#[derive(Debug)]
pub(crate) struct RecordingLine {
    time: Timeline,
    writes: Vec<(u64, bool)>,
}

impl RecordingLine {
    pub(crate) fn new(time: Timeline) -> Self {
        Self {
            time,
            writes: Vec::new(),
        }
    }

    pub(crate) fn writes(&self) -> &[(u64, bool)] {
        &self.writes
    }

    /// Level most recently written at or before `t`; LOW before any write.
    pub(crate) fn level_at(&self, t: u64) -> bool {
        self.writes
            .iter()
            .take_while(|(at, _)| *at <= t)
            .last()
            .map(|&(_, high)| high)
            .unwrap_or(false)
    }

    /// Time of the first rising edge, if any.
    pub(crate) fn first_rise(&self) -> Option<u64> {
        self.writes.iter().find(|(_, high)| *high).map(|&(t, _)| t)
    }

    pub(crate) fn last_write(&self) -> Option<(u64, bool)> {
        self.writes.last().copied()
    }

    fn record(&mut self, high: bool) {
        self.writes.push((self.time.get(), high));
    }
}

impl ErrorType for RecordingLine {
    type Error = Infallible;
}

impl OutputPin for RecordingLine {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.record(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.record(true);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_clock_delay_advances_shared_timeline() {
        let mut clock = SimClock::new();
        let mut line = RecordingLine::new(clock.timeline());

        line.set_high().unwrap();
        clock.delay_us(250);
        line.set_low().unwrap();

        assert_eq!(line.writes(), &[(0, true), (250, false)]);
        assert!(line.level_at(249));
        assert!(!line.level_at(250));
        assert_eq!(clock.delays(), &[250]);
    }

    #[test]
    fn sim_clock_overhead_applies_per_read() {
        let clock = SimClock::new().with_overhead(3);
        assert_eq!(clock.now_us(), 0);
        assert_eq!(clock.now_us(), 3);
        assert_eq!(clock.now(), 6);
    }

    #[test]
    fn sim_clock_u32_views_wrap() {
        let clock = SimClock::starting_at(u64::from(u32::MAX) + 11);
        assert_eq!(clock.now_us(), 10);
    }
}
