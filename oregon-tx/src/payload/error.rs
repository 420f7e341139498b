/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Errors raised when inspecting an existing 13-byte frame.
//!
//! Building a frame never fails; these only come out of
//! [`Payload::decode()`](super::Payload::decode) and the hex parser used by
//! the `inspect` command.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    /// Hex input did not contain exactly 13 bytes.
    #[error("frame must be {expected} bytes, got {found}")]
    BadLength { expected: usize, found: usize },

    /// Hex input contained a token that is not a byte.
    #[error("invalid hex byte '{0}'")]
    BadHex(String),

    /// Bytes 0–2 are not all ones.
    #[error("preamble is not FF FF FF")]
    BadPreamble,

    /// High nibble of byte 3 is not `0xA`.
    #[error("sync nibble is {found:X}, expected A")]
    BadSync { found: u8 },

    #[error("simple checksum mismatch: computed {expected:02X}, frame carries {found:02X}")]
    SimpleChecksumMismatch { expected: u8, found: u8 },

    #[error("CRC-8 mismatch: computed {expected:02X}, frame carries {found:02X}")]
    CrcMismatch { expected: u8, found: u8 },
}
