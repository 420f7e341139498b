/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Error types for pulse configuration and line output.

use embedded_hal::digital::ErrorKind;
use thiserror::Error;

/// Rejected [`PulseTiming`](super::PulseTiming) parameters.
///
/// Raised once at startup; a modulator never exists with unusable timing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimingError {
    #[error("unit pulse length must be non-zero")]
    ZeroUnit,

    #[error("unit pulse length {unit_us}µs exceeds {max_us}µs")]
    UnitTooLong { unit_us: u32, max_us: u32 },

    #[error("tuning factor {value} outside accepted range [{min}, {max}]")]
    TuningOutOfRange { value: f32, min: f32, max: f32 },

    /// The shortening constant would eat the whole tuned HIGH pulse.
    #[error("pulse shorten {shorten_us}µs leaves no HIGH time (tuned pulse {tuned_us}µs)")]
    ShortenTooLarge { shorten_us: u32, tuned_us: u32 },
}

/// Failure while driving the RF line.
///
/// The link is one-way: nothing downstream can confirm a frame, so the caller
/// has no retry to make.  This only surfaces a GPIO write the HAL refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransmitError {
    #[error("RF line write failed: {0:?}")]
    Line(ErrorKind),
}
