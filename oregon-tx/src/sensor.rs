/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Sensor-side data: who the emulated device claims to be, and what it
//! currently measures.
//!
//! ```text
//! SensorIdentity  ─┐
//!                  ├──(PayloadBuilder::build)──►  Payload  ──►  Modulator
//! SensorReading   ─┘
//!   ↑ advanced by a ReadingPolicy after every frame
//! ```
//!
//! # Ownership model
//! Both values are owned by the
//! [`TransmissionScheduler`](crate::scheduler::TransmissionScheduler).  The
//! identity is fixed for the whole session; the reading is the only state that
//! changes between frames.

use rand::Rng;

// ── Constants ─────────────────────────────────────────────────────────────────

/// Sensor-type code of the emulated THGR810-class thermo-hygrometer.
pub const SENSOR_TYPE_THGR810: u16 = 0xF824;

/// Highest channel value that fits in the channel nibble.
pub const MAX_CHANNEL: u8 = 15;

/// Rolling codes are drawn from this closed range; 0x00 and 0xFF are avoided.
pub const ROLLING_CODE_MIN: u8 = 1;
pub const ROLLING_CODE_MAX: u8 = 254;

// ── Battery flag ──────────────────────────────────────────────────────────────

/// Battery status nibble.
///
/// The typed enum replaces a raw nibble so nothing inside the crate can put a
/// meaningless flag on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatteryStatus {
    #[default]
    Ok,
    /// Reported by setting nibble value `0x4`.
    Low,
}

impl BatteryStatus {
    /// Nibble value written into the flag position.
    pub fn to_nibble(self) -> u8 {
        match self {
            BatteryStatus::Ok => 0x0,
            BatteryStatus::Low => 0x4,
        }
    }

    /// Parse a flag nibble.  Any value with the low-battery bit set is `Low`.
    pub fn from_nibble(v: u8) -> Self {
        if v & 0x4 != 0 {
            BatteryStatus::Low
        } else {
            BatteryStatus::Ok
        }
    }
}

// ── SensorIdentity ────────────────────────────────────────────────────────────

/// Fixed identity fields of the emulated sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorIdentity {
    /// 16-bit device-model code.
    pub sensor_type: u16,

    /// Receiver channel, nominally 1–10.  Values above [`MAX_CHANNEL`] are
    /// truncated when encoded.
    pub channel: u8,

    /// Session code the base station uses to tell power-on sessions apart.
    pub rolling_code: u8,

    pub battery: BatteryStatus,
}

impl SensorIdentity {
    /// Identity of a THGR810-class sensor with battery OK.
    pub fn thgr810(channel: u8, rolling_code: u8) -> Self {
        Self {
            sensor_type: SENSOR_TYPE_THGR810,
            channel,
            rolling_code,
            battery: BatteryStatus::Ok,
        }
    }

    /// Channel as it will appear on the wire.
    pub fn encoded_channel(&self) -> u8 {
        self.channel.min(MAX_CHANNEL)
    }
}

impl Default for SensorIdentity {
    fn default() -> Self {
        Self::thgr810(1, ROLLING_CODE_MIN)
    }
}

/// Draw a session rolling code in `[ROLLING_CODE_MIN, ROLLING_CODE_MAX]`.
pub fn random_rolling_code<R: Rng + ?Sized>(rng: &mut R) -> u8 {
    rng.gen_range(ROLLING_CODE_MIN..=ROLLING_CODE_MAX)
}

// ── SensorReading ─────────────────────────────────────────────────────────────

/// One temperature/humidity measurement.
///
/// Temperature has 0.1 °C resolution on the wire, domain roughly
/// [-99.9, 99.9].  Humidity is a whole percentage, domain [0, 100].  Values
/// outside those ranges are not rejected; they wrap digit-wise when encoded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    pub temperature_c: f32,
    pub humidity_pct: u8,
}

impl SensorReading {
    pub fn new(temperature_c: f32, humidity_pct: u8) -> Self {
        Self {
            temperature_c,
            humidity_pct,
        }
    }

    /// Temperature in tenths of a degree, rounded to nearest.
    pub fn temperature_tenths(&self) -> i32 {
        let t10 = (self.temperature_c.abs() * 10.0 + 0.5) as i32;
        if self.temperature_c < 0.0 {
            -t10
        } else {
            t10
        }
    }
}

impl Default for SensorReading {
    /// Starting point of the test-mode sweep.
    fn default() -> Self {
        Self::new(19.0, 30)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn battery_nibbles() {
        assert_eq!(BatteryStatus::Ok.to_nibble(), 0x0);
        assert_eq!(BatteryStatus::Low.to_nibble(), 0x4);
        assert_eq!(BatteryStatus::from_nibble(0x0), BatteryStatus::Ok);
        assert_eq!(BatteryStatus::from_nibble(0x4), BatteryStatus::Low);
        assert_eq!(BatteryStatus::from_nibble(0xC), BatteryStatus::Low);
    }

    #[test]
    fn channel_above_fifteen_is_truncated() {
        assert_eq!(SensorIdentity::thgr810(3, 1).encoded_channel(), 3);
        assert_eq!(SensorIdentity::thgr810(15, 1).encoded_channel(), 15);
        assert_eq!(SensorIdentity::thgr810(200, 1).encoded_channel(), 15);
    }

    #[test]
    fn default_identity_is_thgr810_channel_one() {
        let id = SensorIdentity::default();
        assert_eq!(id.sensor_type, 0xF824);
        assert_eq!(id.channel, 1);
        assert_eq!(id.battery, BatteryStatus::Ok);
    }

    #[test]
    fn random_rolling_code_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..10_000 {
            let code = random_rolling_code(&mut rng);
            assert!((ROLLING_CODE_MIN..=ROLLING_CODE_MAX).contains(&code));
        }
    }

    #[test]
    fn temperature_tenths_rounds_float_error() {
        // 0.1 is not representable; repeated adds drift either side
        let mut t = 19.0_f32;
        for _ in 0..13 {
            t += 0.1;
        }
        assert_eq!(SensorReading::new(t, 0).temperature_tenths(), 203);
        assert_eq!(SensorReading::new(-1.5, 0).temperature_tenths(), -15);
        assert_eq!(SensorReading::new(99.9, 0).temperature_tenths(), 999);
    }
}
