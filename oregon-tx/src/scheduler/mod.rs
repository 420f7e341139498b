//! Cooperative transmission loop.
//!
//! [`TransmissionScheduler`] is polled from a single thread.  It keeps a
//! seconds counter off the millisecond clock and sends one frame whenever the
//! counter lands on a multiple of the interval:
//!
//! ```text
//! poll ──► ≥1000 ms since last tick? ──► elapsed_s += 1, pending = true
//!      ──► pending && elapsed_s % interval == 0
//!              ──► build ──► transmit (blocks ~100 ms) ──► report ──► policy.advance
//! ```
//!
//! `pending` starts `true`, so the first poll at `elapsed_s == 0` transmits
//! immediately.
//!
//! # Design decisions
//!
//! | Topic | Choice |
//! |---|---|
//! | Threads | None.  All state lives in this struct and is touched by one caller |
//! | Time | Wrapping `u32` milliseconds; comparisons via [`elapsed`] |
//! | Second tick | Advances by exactly 1000 ms, not to "now", so a late poll does not stretch the interval |
//! | Test sweep / diagnostics | Constructor arguments, not build features |
//! | Cancellation | None.  A started frame always completes |

pub mod policy;

pub use policy::{HoldReading, ReadingPolicy, SweepReading};

use std::num::NonZeroU32;

use embedded_hal::digital::OutputPin;
use tracing::{debug, info};

use crate::hal::{elapsed, Clock};
use crate::modulator::{Modulator, TransmitError};
use crate::payload::{Payload, PayloadBuilder};
use crate::sensor::{SensorIdentity, SensorReading};

// ── Constants ─────────────────────────────────────────────────────────────────

/// Default seconds between frames.
pub const DEFAULT_INTERVAL_S: u32 = 53;

const TICK_MS: u32 = 1_000;

/// Idle sleep between polls in [`TransmissionScheduler::run`].
const POLL_IDLE_US: u32 = 1_000;

// ── TransmissionScheduler ─────────────────────────────────────────────────────

pub struct TransmissionScheduler<P, C> {
    modulator: Modulator<P, C>,
    identity: SensorIdentity,
    reading: SensorReading,
    policy: Box<dyn ReadingPolicy>,
    interval_s: NonZeroU32,
    /// Frame reports at INFO when set, DEBUG otherwise.
    diagnostics: bool,

    elapsed_s: u32,
    pending: bool,
    last_tick_ms: u32,
    last_tx_ms: Option<u32>,
    frames_sent: u64,
}

impl<P, C> TransmissionScheduler<P, C>
where
    P: OutputPin,
    C: Clock,
{
    /// The seconds counter starts at zero from the clock's current time.
    pub fn new(
        modulator: Modulator<P, C>,
        identity: SensorIdentity,
        reading: SensorReading,
        policy: Box<dyn ReadingPolicy>,
        interval_s: NonZeroU32,
        diagnostics: bool,
    ) -> Self {
        let last_tick_ms = modulator.clock().now_ms();

        info!(
            sensor_type = %format!("{:04X}", identity.sensor_type),
            channel = identity.encoded_channel(),
            rolling_code = %format!("{:02X}", identity.rolling_code),
            battery = ?identity.battery,
            interval_s = interval_s.get(),
            policy = policy.name(),
            "scheduler ready"
        );

        Self {
            modulator,
            identity,
            reading,
            policy,
            interval_s,
            diagnostics,
            elapsed_s: 0,
            pending: true,
            last_tick_ms,
            last_tx_ms: None,
            frames_sent: 0,
        }
    }

    /// One pass of the loop.  Returns the frame if one was sent.
    ///
    /// # Errors
    /// [`TransmitError`] from the modulator.  The slot is consumed and the
    /// reading is not advanced.
    pub fn poll(&mut self) -> Result<Option<Payload>, TransmitError> {
        let now = self.modulator.clock().now_ms();

        if elapsed(now, self.last_tick_ms) >= TICK_MS {
            self.last_tick_ms = self.last_tick_ms.wrapping_add(TICK_MS);
            self.elapsed_s = self.elapsed_s.wrapping_add(1);
            self.pending = true;
        }

        if !self.pending || self.elapsed_s % self.interval_s.get() != 0 {
            return Ok(None);
        }
        self.pending = false;

        let payload = PayloadBuilder::build(&self.identity, &self.reading);
        self.modulator.transmit(&payload)?;

        self.report(&payload, now);
        self.last_tx_ms = Some(now);
        self.frames_sent += 1;
        self.policy.advance(&mut self.reading);

        Ok(Some(payload))
    }

    /// Poll forever, or until `max_frames` frames have gone out.
    ///
    /// # Errors
    /// The first [`TransmitError`].
    pub fn run(&mut self, max_frames: Option<u64>) -> Result<(), TransmitError> {
        loop {
            if self.poll()?.is_some() && max_frames.is_some_and(|max| self.frames_sent >= max) {
                info!(frames = self.frames_sent, "frame limit reached");
                return Ok(());
            }
            self.modulator.clock_mut().delay_us(POLL_IDLE_US);
        }
    }

    fn report(&self, payload: &Payload, now: u32) {
        let since_last_ms = self.last_tx_ms.map(|last| elapsed(now, last));
        if self.diagnostics {
            info!(
                frame = self.frames_sent + 1,
                payload = %payload,
                since_last_ms = ?since_last_ms,
                temperature_c = self.reading.temperature_c,
                humidity_pct = self.reading.humidity_pct,
                "transmitted"
            );
        } else {
            debug!(
                frame = self.frames_sent + 1,
                payload = %payload,
                since_last_ms = ?since_last_ms,
                temperature_c = self.reading.temperature_c,
                humidity_pct = self.reading.humidity_pct,
                "transmitted"
            );
        }
    }

    pub fn identity(&self) -> &SensorIdentity {
        &self.identity
    }

    /// Reading the next frame will carry.
    pub fn reading(&self) -> &SensorReading {
        &self.reading
    }

    pub fn elapsed_s(&self) -> u32 {
        self.elapsed_s
    }

    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }

    /// Millisecond timestamp of the most recent frame.
    pub fn last_transmission_ms(&self) -> Option<u32> {
        self.last_tx_ms
    }

    pub fn modulator(&self) -> &Modulator<P, C> {
        &self.modulator
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
