/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Hardware seams: the monotonic clock and the RF output line.
//!
//! The RF line is any [`embedded_hal::digital::OutputPin`], so a board crate
//! can hand its transmitter GPIO straight to the
//! [`Modulator`](crate::modulator::Modulator).  Time is behind the small
//! [`Clock`] trait because `embedded-hal` 1.0 only models delays, not a
//! readable counter.
//!
//! Both counters are fixed-width `u32` values that wrap (≈71 min for
//! microseconds, ≈49 days for milliseconds).  Every comparison in this crate
//! goes through [`elapsed`] or [`remaining_us`], never a plain subtraction.

#[cfg(test)]
pub(crate) mod mock;

use std::convert::Infallible;
use std::time::{Duration, Instant};

use embedded_hal::digital::{ErrorType, OutputPin};
use tracing::trace;

// ── Clock ─────────────────────────────────────────────────────────────────────

/// Monotonic time source plus blocking delay.
pub trait Clock {
    /// Free-running microsecond counter.  Wraps at `u32::MAX`.
    fn now_us(&self) -> u32;

    /// Free-running millisecond counter.  Wraps at `u32::MAX`.
    fn now_ms(&self) -> u32;

    /// Block the calling thread for `us` microseconds.
    fn delay_us(&mut self, us: u32);
}

/// Wrap-safe `now - since` for either counter.
pub fn elapsed(now: u32, since: u32) -> u32 {
    now.wrapping_sub(since)
}

/// Microseconds left until `deadline`, or `None` when it has already passed.
///
/// The signed reinterpretation of the wrapping difference keeps this correct
/// across a counter wrap as long as deadlines stay within ±35 minutes of now.
pub fn remaining_us(now: u32, deadline: u32) -> Option<u32> {
    let diff = deadline.wrapping_sub(now) as i32;
    if diff > 0 {
        Some(diff as u32)
    } else {
        None
    }
}

/// Host clock backed by [`Instant`] and [`std::thread::sleep`].
#[derive(Debug, Clone)]
pub struct StdClock {
    origin: Instant,
}

impl StdClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for StdClock {
    fn now_us(&self) -> u32 {
        // Truncation is the wrap.
        self.origin.elapsed().as_micros() as u32
    }

    fn now_ms(&self) -> u32 {
        self.origin.elapsed().as_millis() as u32
    }

    fn delay_us(&mut self, us: u32) {
        std::thread::sleep(Duration::from_micros(u64::from(us)));
    }
}

// ── TraceLine ─────────────────────────────────────────────────────────────────

/// Stand-in RF line for hosts without a transmitter.
///
/// Logs every level change at TRACE and counts rising edges, which is enough
/// to watch a dry run with `RUST_LOG=oregon_tx=trace`.
#[derive(Debug, Default)]
pub struct TraceLine {
    high: bool,
    rising_edges: u64,
}

impl TraceLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current output level.
    pub fn is_high(&self) -> bool {
        self.high
    }

    /// Number of LOW→HIGH transitions driven so far.
    pub fn rising_edges(&self) -> u64 {
        self.rising_edges
    }

    fn drive(&mut self, high: bool) {
        if high != self.high {
            if high {
                self.rising_edges += 1;
            }
            trace!(level = if high { "HIGH" } else { "LOW" }, "rf line");
        }
        self.high = high;
    }
}

impl ErrorType for TraceLine {
    type Error = Infallible;
}

impl OutputPin for TraceLine {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(true);
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_survives_counter_wrap() {
        assert_eq!(elapsed(10, u32::MAX - 5), 16);
        assert_eq!(elapsed(1_500, 500), 1_000);
    }

    #[test]
    fn remaining_us_is_none_once_deadline_passed() {
        assert_eq!(remaining_us(100, 100), None);
        assert_eq!(remaining_us(101, 100), None);
        assert_eq!(remaining_us(100, 350), Some(250));
    }

    #[test]
    fn remaining_us_across_wrap() {
        // deadline already wrapped, now has not
        assert_eq!(remaining_us(u32::MAX - 9, 20), Some(30));
        // now wrapped past the deadline
        assert_eq!(remaining_us(5, u32::MAX - 5), None);
    }

    #[test]
    fn trace_line_counts_rising_edges_only() {
        let mut line = TraceLine::new();
        line.set_high().unwrap();
        line.set_high().unwrap();
        line.set_low().unwrap();
        line.set_high().unwrap();
        assert!(line.is_high());
        assert_eq!(line.rising_edges(), 2);
    }

    #[test]
    fn std_clock_is_monotonic_over_a_short_delay() {
        let mut clock = StdClock::new();
        let start = clock.now_us();
        clock.delay_us(2_000);
        assert!(elapsed(clock.now_us(), start) >= 2_000);
    }
}
