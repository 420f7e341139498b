/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Oregon Scientific V3 frame assembly.
//!
//! A [`Payload`] is 13 bytes (26 nibbles), sent high nibble first:
//!
//! ```text
//! nibble  0-5   6     7-10   11   12-13  14    15-21                 22-23  24-25
//!         FFFFFF A    type   ch   roll   flag  temp/sign/humidity    sum    crc
//!         preamble sync                        7 BCD/flag nibbles     swapped swapped
//! ```
//!
//! Data digits go least significant first: temperature tenths, units, tens,
//! sign (`8` = negative), humidity units, tens, one reserved zero nibble.
//!
//! # Ownership model
//! The builder returns the frame **by value**.  There is no shared output
//! buffer: every tick builds a fresh `Payload` on the stack, lends it to the
//! modulator and drops it.

pub mod checksum;
pub mod error;

pub use error::FrameError;

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::sensor::{BatteryStatus, SensorIdentity, SensorReading};
use checksum::{crc8, nibble_at, simple_checksum};

// ── Constants ─────────────────────────────────────────────────────────────────

/// Frame length in bytes.
pub const PAYLOAD_LEN: usize = 13;

/// Nibbles covered by both checksums: sensor type through the reserved
/// nibble.  Fixed for this sensor layout.
pub const CHECKSUM_NIBBLES: usize = 15;

pub const PREAMBLE_LEN: usize = 3;

pub const SYNC_NIBBLE: u8 = 0xA;

/// Sign nibble set in byte 9 for negative temperatures.
const SIGN_NEGATIVE: u8 = 0x80;

const SIMPLE_CHECKSUM_BYTE: usize = 11;
const CRC_BYTE: usize = 12;

// ── Payload ───────────────────────────────────────────────────────────────────

/// One complete, checksummed V3 frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payload([u8; PAYLOAD_LEN]);

impl Payload {
    /// Wrap raw bytes, e.g. a captured frame.  Nothing is validated; call
    /// [`decode`](Self::decode) for that.
    pub fn from_bytes(bytes: [u8; PAYLOAD_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PAYLOAD_LEN] {
        &self.0
    }

    /// Nibble `index` in transmission order.
    ///
    /// # Panics
    /// If `index >= 26`.
    pub fn nibble(&self, index: usize) -> u8 {
        nibble_at(&self.0, index)
    }

    /// Simple checksum byte as carried in the frame.
    pub fn simple_checksum(&self) -> u8 {
        self.0[SIMPLE_CHECKSUM_BYTE]
    }

    /// CRC-8 byte as carried in the frame.
    pub fn crc(&self) -> u8 {
        self.0[CRC_BYTE]
    }

    /// Validate framing and both checksums, then read the sensor fields back
    /// out of the nibbles.
    ///
    /// # Errors
    /// The first [`FrameError`] found, checked in wire order.
    pub fn decode(&self) -> Result<DecodedFrame, FrameError> {
        let b = &self.0;

        if b[..PREAMBLE_LEN].iter().any(|&x| x != 0xFF) {
            return Err(FrameError::BadPreamble);
        }
        if self.nibble(6) != SYNC_NIBBLE {
            return Err(FrameError::BadSync {
                found: self.nibble(6),
            });
        }

        // The odd-count tail of the sum reads the high nibble of byte 11,
        // which was still zero when the sender computed it.
        let mut unsealed = *b;
        unsealed[SIMPLE_CHECKSUM_BYTE] = 0;
        unsealed[CRC_BYTE] = 0;

        let expected = simple_checksum(&unsealed, CHECKSUM_NIBBLES);
        if expected != self.simple_checksum() {
            return Err(FrameError::SimpleChecksumMismatch {
                expected,
                found: self.simple_checksum(),
            });
        }
        let expected = crc8(&unsealed, CHECKSUM_NIBBLES);
        if expected != self.crc() {
            return Err(FrameError::CrcMismatch {
                expected,
                found: self.crc(),
            });
        }

        let sensor_type = (7..=10).fold(0_u16, |acc, i| acc << 4 | u16::from(self.nibble(i)));

        let identity = SensorIdentity {
            sensor_type,
            channel: self.nibble(11),
            rolling_code: b[6],
            battery: BatteryStatus::from_nibble(self.nibble(14)),
        };

        let t10 = u32::from(self.nibble(15))
            + u32::from(self.nibble(16)) * 10
            + u32::from(self.nibble(17)) * 100;
        let negative = b[9] & SIGN_NEGATIVE != 0;
        let magnitude = t10 as f32 / 10.0;

        let reading = SensorReading {
            temperature_c: if negative { -magnitude } else { magnitude },
            humidity_pct: self.nibble(19) + self.nibble(20) * 10,
        };

        Ok(DecodedFrame { identity, reading })
    }
}

impl fmt::Display for Payload {
    /// Space-separated upper-case hex, e.g. `FF FF FF AF 82 …`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

impl FromStr for Payload {
    type Err = FrameError;

    /// Parse hex with or without whitespace between bytes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        if digits.len() % 2 != 0 {
            return Err(FrameError::BadHex(digits));
        }

        let bytes = digits
            .as_bytes()
            .chunks(2)
            .map(|pair| {
                let bad = || FrameError::BadHex(String::from_utf8_lossy(pair).into_owned());
                // from_str_radix alone would take a sign, e.g. "+F"
                if !pair.iter().all(u8::is_ascii_hexdigit) {
                    return Err(bad());
                }
                std::str::from_utf8(pair)
                    .ok()
                    .and_then(|h| u8::from_str_radix(h, 16).ok())
                    .ok_or_else(bad)
            })
            .collect::<Result<Vec<u8>, _>>()?;

        let found = bytes.len();
        let array: [u8; PAYLOAD_LEN] = bytes.try_into().map_err(|_| FrameError::BadLength {
            expected: PAYLOAD_LEN,
            found,
        })?;
        Ok(Self(array))
    }
}

/// Fields recovered from a valid frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedFrame {
    pub identity: SensorIdentity,
    pub reading: SensorReading,
}

// ── PayloadBuilder ────────────────────────────────────────────────────────────

/// Builds V3 frames from the current identity and reading.
pub struct PayloadBuilder;

impl PayloadBuilder {
    /// Assemble and checksum one frame.
    ///
    /// Never fails.  Out-of-domain readings are not rejected: each digit is
    /// taken modulo 10, so 100 % humidity goes out as `00` and 123.4 °C as
    /// `23.4`.
    pub fn build(identity: &SensorIdentity, reading: &SensorReading) -> Payload {
        let mut b = [0_u8; PAYLOAD_LEN];

        // Preamble and sync
        b[..PREAMBLE_LEN].fill(0xFF);
        b[3] = SYNC_NIBBLE << 4;

        // Sensor type, most significant nibble first
        let ty = identity.sensor_type;
        b[3] |= ((ty >> 12) & 0x0F) as u8;
        b[4] = ((ty >> 4) & 0xFF) as u8;
        b[5] = ((ty & 0x0F) as u8) << 4;

        b[5] |= identity.encoded_channel();
        b[6] = identity.rolling_code;
        b[7] = identity.battery.to_nibble() << 4;

        // Temperature: tenths, units, tens, then sign
        let t10 = reading.temperature_tenths().unsigned_abs();
        b[7] |= (t10 % 10) as u8;
        b[8] = (((t10 / 10) % 10) as u8) << 4 | ((t10 / 100) % 10) as u8;
        if reading.temperature_c < 0.0 {
            b[9] = SIGN_NEGATIVE;
        }

        // Humidity: units share byte 9 with the sign; byte 10 low is reserved
        let h = reading.humidity_pct;
        b[9] |= h % 10;
        b[10] = ((h / 10) % 10) << 4;

        b[SIMPLE_CHECKSUM_BYTE] = simple_checksum(&b, CHECKSUM_NIBBLES);
        b[CRC_BYTE] = crc8(&b, CHECKSUM_NIBBLES);

        let payload = Payload(b);
        debug!(
            channel = identity.encoded_channel(),
            rolling_code = identity.rolling_code,
            temperature_c = reading.temperature_c,
            humidity_pct = reading.humidity_pct,
            payload = %payload,
            "built frame"
        );
        payload
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
