/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{error, info, warn};

use oregon_tx::config::TransmitterConfig;
use oregon_tx::hal::{StdClock, TraceLine};
use oregon_tx::modulator::Modulator;
use oregon_tx::payload::{Payload, PayloadBuilder};
use oregon_tx::scheduler::TransmissionScheduler;
use oregon_tx::sensor::{
    random_rolling_code, BatteryStatus, SensorIdentity, SensorReading, SENSOR_TYPE_THGR810,
};

// ── CLI argument definition ───────────────────────────────────────────────────

/// Oregon Scientific v3 temperature/humidity sensor emulator.
///
/// Example:
///   oregon-tx run --config tx.yaml --frames 3
///   oregon-tx frame --temperature -1.5 --humidity 20 --rolling-code 0x00
///   oregon-tx inspect "FF FF FF AF 82 41 00 05 10 80 20 E2 73"
#[derive(Debug, Parser)]
#[command(
    name = "oregon-tx",
    about = "Oregon Scientific v3 sensor emulator",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Transmit frames on the configured interval.
    Run(RunArgs),
    /// Print one built frame as hex.
    Frame(FrameArgs),
    /// Decode and validate a 13-byte hex frame.
    Inspect {
        /// Frame bytes in hex, spaces optional.
        #[arg(required = true, num_args = 1..)]
        hex: Vec<String>,
    },
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Path to the YAML transmitter configuration file.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Sensor channel (overrides the file).
    #[arg(long)]
    channel: Option<u8>,

    /// Seconds between frames (overrides the file).
    #[arg(short = 'i', long = "interval")]
    interval: Option<u32>,

    /// Fixed rolling code, decimal or 0x-prefixed hex.
    #[arg(short = 'r', long = "rolling-code", value_parser = parse_byte)]
    rolling_code: Option<u8>,

    /// Report a low battery.
    #[arg(long, default_value_t = false)]
    battery_low: bool,

    /// Hold the reading instead of sweeping it.
    #[arg(long, default_value_t = false)]
    no_test_mode: bool,

    /// Stop after this many frames.
    #[arg(short = 'n', long = "frames")]
    frames: Option<u64>,
}

#[derive(Debug, Args)]
struct FrameArgs {
    /// Temperature in °C.
    #[arg(short = 't', long, allow_hyphen_values = true)]
    temperature: f32,

    /// Relative humidity in %.
    #[arg(short = 'H', long)]
    humidity: u8,

    #[arg(long, default_value_t = 1)]
    channel: u8,

    /// Rolling code, decimal or 0x-prefixed hex; random when omitted.
    #[arg(short = 'r', long = "rolling-code", value_parser = parse_byte)]
    rolling_code: Option<u8>,

    #[arg(long, default_value_t = false)]
    battery_low: bool,
}

fn parse_byte(s: &str) -> Result<u8, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse::<u8>(),
    };
    parsed.map_err(|e| format!("'{s}' is not a byte value: {e}"))
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=trace shows
    // every line edge).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Run(args) => run(args),
        Command::Frame(args) => frame(args),
        Command::Inspect { hex } => inspect(&hex.join(" ")),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        process::exit(1);
    }
}

// ── Subcommands ───────────────────────────────────────────────────────────────

fn run(args: RunArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => TransmitterConfig::load_from_file(path)?,
        None => {
            warn!("No configuration file provided, using default transmitter settings");
            TransmitterConfig::default()
        }
    };

    if let Some(channel) = args.channel {
        config.channel = channel;
    }
    if let Some(interval) = args.interval {
        config.interval_s = interval;
    }
    if args.rolling_code.is_some() {
        config.rolling_code = args.rolling_code;
    }
    config.battery_low |= args.battery_low;
    config.test_mode &= !args.no_test_mode;
    config.validate().context("invalid command-line override")?;

    info!(
        channel = config.channel,
        interval_s = config.interval_s,
        test_mode = config.test_mode,
        frames = ?args.frames,
        "Oregon-TX starting up..."
    );

    let modulator = Modulator::new(TraceLine::new(), StdClock::new(), config.pulse_timing()?);
    let mut scheduler = TransmissionScheduler::new(
        modulator,
        config.identity(&mut rand::thread_rng()),
        config.initial_reading(),
        config.reading_policy(),
        config.interval()?,
        config.diagnostics,
    );

    scheduler.run(args.frames).context("transmission failed")?;

    let line = scheduler.modulator().line();
    info!(
        frames = scheduler.frames_sent(),
        rising_edges = line.rising_edges(),
        "Oregon-TX finished"
    );
    Ok(())
}

fn frame(args: FrameArgs) -> Result<()> {
    let identity = SensorIdentity {
        sensor_type: SENSOR_TYPE_THGR810,
        channel: args.channel,
        rolling_code: args
            .rolling_code
            .unwrap_or_else(|| random_rolling_code(&mut rand::thread_rng())),
        battery: if args.battery_low {
            BatteryStatus::Low
        } else {
            BatteryStatus::Ok
        },
    };
    let reading = SensorReading::new(args.temperature, args.humidity);

    println!("{}", PayloadBuilder::build(&identity, &reading));
    Ok(())
}

fn inspect(hex: &str) -> Result<()> {
    let payload: Payload = hex.parse().context("cannot parse frame")?;
    let decoded = payload
        .decode()
        .with_context(|| format!("frame {payload} failed validation"))?;

    let id = decoded.identity;
    let r = decoded.reading;
    println!("sensor type   {:04X}", id.sensor_type);
    println!("channel       {}", id.channel);
    println!("rolling code  {:02X}", id.rolling_code);
    println!("battery       {:?}", id.battery);
    println!("temperature   {:.1} °C", r.temperature_c);
    println!("humidity      {} %", r.humidity_pct);
    println!("checksum      {:02X}", payload.simple_checksum());
    println!("crc           {:02X}", payload.crc());
    Ok(())
}
