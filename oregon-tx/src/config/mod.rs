//! Transmitter configuration loading.
//!
//! Everything here is fixed at startup; nothing is re-read while running.
//!
//! The expected YAML structure is (every key optional):
//! ```yaml
//! sensor:
//!   channel: 1
//!   rolling_code: 90      # omit for a random code per session
//!   battery_low: false
//! schedule:
//!   interval_s: 53
//!   test_mode: true
//!   diagnostics: true
//! timing:
//!   unit_us: 488
//!   tuning_factor: 1.1
//!   shorten_us: 8
//! reading:
//!   temperature_c: 19.0
//!   humidity_pct: 30
//! ```

use std::num::NonZeroU32;
use std::path::Path;

use anyhow::{bail, Context, Result};
use rand::Rng;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::modulator::{
    PulseTiming, DEFAULT_SHORTEN_US, DEFAULT_TUNING_FACTOR, DEFAULT_UNIT_US,
};
use crate::scheduler::{HoldReading, ReadingPolicy, SweepReading, DEFAULT_INTERVAL_S};
use crate::sensor::{
    random_rolling_code, BatteryStatus, SensorIdentity, SensorReading, MAX_CHANNEL,
    ROLLING_CODE_MAX, ROLLING_CODE_MIN, SENSOR_TYPE_THGR810,
};

// ── Private YAML deserialization types ────────────────────────────────────────

/// Top-level wrapper that maps directly onto the YAML file layout.
///
/// Kept private – callers work with [`TransmitterConfig`].
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    sensor: SensorSection,
    schedule: ScheduleSection,
    timing: TimingSection,
    reading: ReadingSection,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SensorSection {
    channel: u8,
    rolling_code: Option<u8>,
    battery_low: bool,
}

impl Default for SensorSection {
    fn default() -> Self {
        Self {
            channel: 1,
            rolling_code: None,
            battery_low: false,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ScheduleSection {
    interval_s: u32,
    test_mode: bool,
    diagnostics: bool,
}

impl Default for ScheduleSection {
    fn default() -> Self {
        Self {
            interval_s: DEFAULT_INTERVAL_S,
            test_mode: true,
            diagnostics: true,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct TimingSection {
    unit_us: u32,
    tuning_factor: f32,
    shorten_us: u32,
}

impl Default for TimingSection {
    fn default() -> Self {
        Self {
            unit_us: DEFAULT_UNIT_US,
            tuning_factor: DEFAULT_TUNING_FACTOR,
            shorten_us: DEFAULT_SHORTEN_US,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ReadingSection {
    temperature_c: f32,
    humidity_pct: u8,
}

impl Default for ReadingSection {
    fn default() -> Self {
        let r = SensorReading::default();
        Self {
            temperature_c: r.temperature_c,
            humidity_pct: r.humidity_pct,
        }
    }
}

// ── Public configuration ──────────────────────────────────────────────────────

/// Startup configuration of the emulated sensor and its transmitter.
///
/// Built from [`Default`], a YAML file, or both plus CLI overrides, then
/// checked once with [`validate`](Self::validate).
#[derive(Debug, Clone, PartialEq)]
pub struct TransmitterConfig {
    pub channel: u8,
    /// `None` draws a fresh code in `[1, 254]` for every session.
    pub rolling_code: Option<u8>,
    pub battery_low: bool,

    pub interval_s: u32,
    /// Sweep the reading after every frame instead of holding it.
    pub test_mode: bool,
    /// Log every frame at INFO.
    pub diagnostics: bool,

    pub unit_us: u32,
    pub tuning_factor: f32,
    pub shorten_us: u32,

    pub temperature_c: f32,
    pub humidity_pct: u8,
}

impl From<ConfigFile> for TransmitterConfig {
    fn from(file: ConfigFile) -> Self {
        Self {
            channel: file.sensor.channel,
            rolling_code: file.sensor.rolling_code,
            battery_low: file.sensor.battery_low,
            interval_s: file.schedule.interval_s,
            test_mode: file.schedule.test_mode,
            diagnostics: file.schedule.diagnostics,
            unit_us: file.timing.unit_us,
            tuning_factor: file.timing.tuning_factor,
            shorten_us: file.timing.shorten_us,
            temperature_c: file.reading.temperature_c,
            humidity_pct: file.reading.humidity_pct,
        }
    }
}

impl Default for TransmitterConfig {
    fn default() -> Self {
        ConfigFile::default().into()
    }
}

impl TransmitterConfig {
    /// Parses `path`.  Keys missing from the file keep their defaults.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, the YAML is structurally
    /// invalid or has unknown keys, or [`validate`](Self::validate) fails.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading transmitter configuration from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open configuration file: {}", path.display()))?;

        let file: ConfigFile = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML file: {}", path.display()))?;

        let config = Self::from(file);
        config
            .validate()
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;

        debug!(?config, "configuration loaded");
        Ok(config)
    }

    /// Reject values the transmitter cannot work with.  Values the wire
    /// format merely truncates or wraps are accepted with a warning.
    ///
    /// # Errors
    /// Channel 0, interval 0, or unusable pulse timing.
    pub fn validate(&self) -> Result<()> {
        if self.channel == 0 {
            bail!("channel must be at least 1");
        }
        if self.channel > MAX_CHANNEL {
            warn!(
                channel = self.channel,
                "channel above {MAX_CHANNEL} will be sent as {MAX_CHANNEL}"
            );
        }
        if self.interval_s == 0 {
            bail!("interval_s must be at least 1");
        }
        if let Some(code) = self.rolling_code {
            if !(ROLLING_CODE_MIN..=ROLLING_CODE_MAX).contains(&code) {
                warn!(
                    rolling_code = code,
                    "rolling code outside {ROLLING_CODE_MIN}..={ROLLING_CODE_MAX}"
                );
            }
        }
        if self.humidity_pct > 100 || self.temperature_c.abs() >= 100.0 {
            warn!(
                temperature_c = self.temperature_c,
                humidity_pct = self.humidity_pct,
                "initial reading outside sensor range, digits will wrap"
            );
        }
        self.pulse_timing()?;
        Ok(())
    }

    /// # Errors
    /// See [`PulseTiming::new`].
    pub fn pulse_timing(&self) -> Result<PulseTiming> {
        PulseTiming::new(self.unit_us, self.tuning_factor, self.shorten_us)
            .context("invalid pulse timing")
    }

    /// # Errors
    /// If `interval_s` is zero.
    pub fn interval(&self) -> Result<NonZeroU32> {
        NonZeroU32::new(self.interval_s).context("interval_s must be at least 1")
    }

    /// Session identity.  Draws the rolling code from `rng` when none is
    /// configured; call once per power-on.
    pub fn identity<R: Rng + ?Sized>(&self, rng: &mut R) -> SensorIdentity {
        SensorIdentity {
            sensor_type: SENSOR_TYPE_THGR810,
            channel: self.channel,
            rolling_code: self
                .rolling_code
                .unwrap_or_else(|| random_rolling_code(rng)),
            battery: if self.battery_low {
                BatteryStatus::Low
            } else {
                BatteryStatus::Ok
            },
        }
    }

    pub fn initial_reading(&self) -> SensorReading {
        SensorReading::new(self.temperature_c, self.humidity_pct)
    }

    pub fn reading_policy(&self) -> Box<dyn ReadingPolicy> {
        if self.test_mode {
            Box::new(SweepReading)
        } else {
            Box::new(HoldReading)
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
