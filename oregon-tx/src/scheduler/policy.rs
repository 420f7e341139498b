/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! What happens to the reading after each transmitted frame.
//!
//! Chosen once at construction instead of a build-time switch, so a test
//! sweep and a fixed reading are both available from the same binary.

use crate::sensor::SensorReading;

/// Test-sweep bounds, in tenths of a degree and whole percent.
pub const SWEEP_TEMP_MAX_TENTHS: i32 = 450;
pub const SWEEP_TEMP_RESET_C: f32 = 19.0;
pub const SWEEP_HUMIDITY_MAX: u8 = 95;
pub const SWEEP_HUMIDITY_RESET: u8 = 30;

/// Advances the reading between frames.
pub trait ReadingPolicy {
    fn advance(&mut self, reading: &mut SensorReading);

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Leaves the reading untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct HoldReading;

impl ReadingPolicy for HoldReading {
    fn advance(&mut self, _reading: &mut SensorReading) {}

    fn name(&self) -> &'static str {
        "hold"
    }
}

/// Test mode: +0.1 °C and +1 % per frame.
///
/// Temperature past 45.0 °C restarts at 19.0; humidity past 95 % restarts at
/// 30.  The step is taken on the tenths value so repeated float adds cannot
/// drift off the 0.1 grid.
#[derive(Debug, Default, Clone, Copy)]
pub struct SweepReading;

impl ReadingPolicy for SweepReading {
    fn advance(&mut self, reading: &mut SensorReading) {
        let next = reading.temperature_tenths() + 1;
        reading.temperature_c = if next > SWEEP_TEMP_MAX_TENTHS {
            SWEEP_TEMP_RESET_C
        } else {
            next as f32 / 10.0
        };

        let next = reading.humidity_pct.saturating_add(1);
        reading.humidity_pct = if next > SWEEP_HUMIDITY_MAX {
            SWEEP_HUMIDITY_RESET
        } else {
            next
        };
    }

    fn name(&self) -> &'static str {
        "sweep"
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hold_keeps_reading() {
        let mut r = SensorReading::new(-3.2, 41);
        HoldReading.advance(&mut r);
        assert_eq!(r, SensorReading::new(-3.2, 41));
    }

    #[test]
    fn sweep_steps_both_values() {
        let mut r = SensorReading::new(19.0, 30);
        SweepReading.advance(&mut r);
        assert_eq!(r.temperature_tenths(), 191);
        assert_eq!(r.humidity_pct, 31);
    }

    #[test]
    fn sweep_temperature_wraps_past_45() {
        let mut r = SensorReading::new(44.9, 50);
        SweepReading.advance(&mut r);
        assert_eq!(r.temperature_tenths(), 450, "45.0 itself is still sent");
        SweepReading.advance(&mut r);
        assert_eq!(r.temperature_c, 19.0);
    }

    #[test]
    fn sweep_humidity_wraps_past_95() {
        let mut r = SensorReading::new(20.0, 94);
        SweepReading.advance(&mut r);
        assert_eq!(r.humidity_pct, 95);
        SweepReading.advance(&mut r);
        assert_eq!(r.humidity_pct, 30);
    }

    #[test]
    fn sweep_from_out_of_range_start_resets() {
        let mut r = SensorReading::new(80.0, 255);
        SweepReading.advance(&mut r);
        assert_eq!(r.temperature_c, 19.0);
        assert_eq!(r.humidity_pct, 30);
    }

    #[test]
    fn sweep_full_cycle_stays_on_grid() {
        // 19.0 → 45.0 is 260 steps, then back to 19.0
        let mut r = SensorReading::new(19.0, 30);
        for _ in 0..260 {
            SweepReading.advance(&mut r);
        }
        assert_eq!(r.temperature_tenths(), 450);
        SweepReading.advance(&mut r);
        assert_eq!(r.temperature_tenths(), 190);
    }
}
