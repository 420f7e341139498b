/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! oregon-tx – Oregon Scientific v3 (THGR810) sensor emulator
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── sensor.rs       – identity and reading value types
//! ├── payload/        – 13-byte frame builder, checksum + CRC-8, inspection
//! ├── modulator/      – Manchester bit timing onto an OutputPin
//! ├── scheduler/      – 1 s tick, interval cadence, reading policies
//! ├── hal/            – Clock trait, std clock, logging line, test mocks
//! └── config/         – YAML transmitter configuration
//! ```

pub mod config;
pub mod hal;
pub mod modulator;
pub mod payload;
pub mod scheduler;
pub mod sensor;
