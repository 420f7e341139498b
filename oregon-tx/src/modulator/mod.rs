//! Manchester modulation of a [`Payload`] onto the RF line.
//!
//! Each bit occupies one cell of `2 × unit` µs (976 µs at the V3 rate of 1024
//! symbols per second).  The direction of the mid-cell edge carries the bit:
//!
//! ```text
//!            ┌───────┐                          ┌───────┐
//!  bit 1     │  on   │________        bit 0  ___│  on   │
//!            └ cell ─────────┘               └ cell ─────────┘
//!            HIGH → LOW                        LOW → HIGH
//! ```
//!
//! The HIGH part always lasts `on = unit × tuning − shorten` so the
//! transmitter's slow rise can be compensated without moving cell boundaries.
//!
//! # Timing discipline
//!
//! | Approach | Drift over a 104-bit frame |
//! |---|---|
//! | Fixed `delay(cell)` after each bit | per-bit overhead × 104, unbounded |
//! | Absolute deadline, sleep the residual (this module) | bounded by one bit's overhead |
//!
//! All waits go through [`remaining_us`] on the wrapping `u32` counter, so a
//! late deadline yields no sleep rather than a huge one, and a frame that
//! straddles the counter wrap is timed like any other.

pub mod error;

pub use error::{TimingError, TransmitError};

use embedded_hal::digital::{Error as _, OutputPin};
use tracing::{debug, warn};

use crate::hal::{elapsed, remaining_us, Clock};
use crate::payload::{Payload, PAYLOAD_LEN};

// ── Constants ─────────────────────────────────────────────────────────────────

/// Bit order within a byte: high nibble first, each nibble LSB first.
pub const BIT_ORDER: [u8; 8] = [4, 5, 6, 7, 0, 1, 2, 3];

/// Half a 1024 Hz bit cell, rounded down.
pub const DEFAULT_UNIT_US: u32 = 488;

pub const DEFAULT_TUNING_FACTOR: f32 = 1.1;

pub const DEFAULT_SHORTEN_US: u32 = 8;

/// Largest unit for which a full frame, trailing unit included, stays inside
/// the signed half of the wrapping µs counter.
pub const MAX_UNIT_US: u32 = i32::MAX as u32 / (PAYLOAD_LEN as u32 * 8 * 2 + 1);

pub const TUNING_FACTOR_MIN: f32 = 1.0;
pub const TUNING_FACTOR_MAX: f32 = 1.4;

// ── PulseTiming ───────────────────────────────────────────────────────────────

/// Pulse-shape constants.  Part of the de-facto wire format: receivers slice
/// on these widths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseTiming {
    unit_us: u32,
    tuning_factor: f32,
    shorten_us: u32,
}

impl PulseTiming {
    /// # Errors
    /// [`TimingError`] if the unit is zero or above [`MAX_UNIT_US`], the
    /// tuning factor is outside `[1.0, 1.4]`, or `shorten_us` leaves no HIGH
    /// time.
    pub fn new(unit_us: u32, tuning_factor: f32, shorten_us: u32) -> Result<Self, TimingError> {
        if unit_us == 0 {
            return Err(TimingError::ZeroUnit);
        }
        if unit_us > MAX_UNIT_US {
            return Err(TimingError::UnitTooLong {
                unit_us,
                max_us: MAX_UNIT_US,
            });
        }
        if !(TUNING_FACTOR_MIN..=TUNING_FACTOR_MAX).contains(&tuning_factor) {
            return Err(TimingError::TuningOutOfRange {
                value: tuning_factor,
                min: TUNING_FACTOR_MIN,
                max: TUNING_FACTOR_MAX,
            });
        }
        let tuned_us = (unit_us as f32 * tuning_factor) as u32;
        if shorten_us >= tuned_us {
            return Err(TimingError::ShortenTooLarge {
                shorten_us,
                tuned_us,
            });
        }

        Ok(Self {
            unit_us,
            tuning_factor,
            shorten_us,
        })
    }

    pub fn unit_us(&self) -> u32 {
        self.unit_us
    }

    pub fn tuning_factor(&self) -> f32 {
        self.tuning_factor
    }

    pub fn shorten_us(&self) -> u32 {
        self.shorten_us
    }

    /// One Manchester cell, `2 × unit`.
    pub fn bit_period_us(&self) -> u32 {
        2 * self.unit_us
    }

    /// HIGH time inside every cell.  Always shorter than the cell because the
    /// tuning factor is capped below 2.
    pub fn on_us(&self) -> u32 {
        (self.unit_us as f32 * self.tuning_factor) as u32 - self.shorten_us
    }

    /// Wall time [`Modulator::transmit`] needs for `bytes`, trailing LOW
    /// included.
    ///
    /// Saturates at `u32::MAX` for inputs far longer than a frame.
    pub fn frame_duration_us(&self, bytes: &[u8]) -> u32 {
        let cells = u32::try_from(bytes.len())
            .unwrap_or(u32::MAX)
            .saturating_mul(8)
            .saturating_mul(self.bit_period_us());
        match bytes.last() {
            Some(&last) if last & 0x08 == 0 => cells.saturating_add(self.unit_us),
            _ => cells,
        }
    }
}

impl Default for PulseTiming {
    fn default() -> Self {
        Self {
            unit_us: DEFAULT_UNIT_US,
            tuning_factor: DEFAULT_TUNING_FACTOR,
            shorten_us: DEFAULT_SHORTEN_US,
        }
    }
}

// ── Modulator ─────────────────────────────────────────────────────────────────

/// Owns the RF line and the clock that times it.
pub struct Modulator<P, C> {
    line: P,
    clock: C,
    timing: PulseTiming,
}

impl<P, C> Modulator<P, C>
where
    P: OutputPin,
    C: Clock,
{
    pub fn new(line: P, clock: C, timing: PulseTiming) -> Self {
        Self {
            line,
            clock,
            timing,
        }
    }

    pub fn timing(&self) -> &PulseTiming {
        &self.timing
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn line(&self) -> &P {
        &self.line
    }

    /// Give back the line and clock.
    pub fn release(self) -> (P, C) {
        (self.line, self.clock)
    }

    /// Send one frame.  Blocks for
    /// [`frame_duration_us`](PulseTiming::frame_duration_us) and always runs
    /// to completion unless the line itself fails.
    ///
    /// The line is LOW before the first cell and after the last.
    ///
    /// # Errors
    /// [`TransmitError::Line`] if a pin write fails.  The line is driven LOW
    /// (best effort) before returning.
    pub fn transmit(&mut self, payload: &Payload) -> Result<(), TransmitError> {
        let result = self.send_frame(payload.as_bytes());
        if let Err(e) = result {
            warn!(error = %e, "transmission aborted");
            // Best effort: leave the carrier off.
            let _ = self.line.set_low();
        }
        result
    }

    fn send_frame(&mut self, bytes: &[u8]) -> Result<(), TransmitError> {
        let bit_period = self.timing.bit_period_us();
        let on = self.timing.on_us();

        self.drive(false)?;
        let started = self.clock.now_us();
        let mut deadline = started;

        for &byte in bytes {
            for bit in BIT_ORDER {
                let cell_start = deadline;
                deadline = deadline.wrapping_add(bit_period);

                if (byte >> bit) & 1 == 1 {
                    self.drive(true)?;
                    self.wait_until(cell_start.wrapping_add(on));
                    self.drive(false)?;
                } else {
                    self.drive(false)?;
                    self.wait_until(cell_start.wrapping_add(bit_period - on));
                    self.drive(true)?;
                }
                self.wait_until(deadline);
            }
        }

        // A frame ending on 0 finishes HIGH; hold one unit of LOW so the
        // receiver sees a clean last edge.
        if bytes.last().is_some_and(|&last| last & 0x08 == 0) {
            self.drive(false)?;
            deadline = deadline.wrapping_add(self.timing.unit_us);
            self.wait_until(deadline);
        }
        self.drive(false)?;

        debug!(
            bytes = bytes.len(),
            took_us = elapsed(self.clock.now_us(), started),
            expected_us = self.timing.frame_duration_us(bytes),
            "frame sent"
        );
        Ok(())
    }

    fn drive(&mut self, high: bool) -> Result<(), TransmitError> {
        let result = if high {
            self.line.set_high()
        } else {
            self.line.set_low()
        };
        result.map_err(|e| TransmitError::Line(e.kind()))
    }

    /// Sleep the residual to `deadline`; no-op once it has passed.
    fn wait_until(&mut self, deadline: u32) {
        if let Some(us) = remaining_us(self.clock.now_us(), deadline) {
            self.clock.delay_us(us);
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
