//! Read a radar byte stream and print target snapshots.
//!
//! Usage:
//!   stty -F /dev/ttyUSB0 256000 raw
//!   mmtrail --input /dev/ttyUSB0 --format json
//!
//! Reads stdin when `--input` is omitted, so captures can be replayed with
//! `mmtrail < capture.bin`. Set `RUST_LOG=debug` to see resync activity.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use log::info;

use mmtrail::snapshot::TargetView;
use mmtrail::source::{ChannelSource, spawn_reader};
use mmtrail::{Monitor, MonitorConfig, Snapshot, SourceError};

/// Pause between cooperative cycles.
const YIELD: Duration = Duration::from_millis(5);

/// Reader thread chunk size.
const READ_CHUNK: usize = 256;

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
    Csv,
}

#[derive(Parser)]
#[command(
    name = "mmtrail",
    version,
    about = "Decode a 3-target mmWave radar stream and print target snapshots"
)]
struct Cli {
    /// Serial device node or capture file (default: stdin)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Print a snapshot every N milliseconds
    #[arg(long, default_value_t = 500)]
    every: u64,

    /// JSON config file (fields default when missing)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Points kept per trail
    #[arg(long)]
    trail_capacity: Option<usize>,

    /// Trail sampling interval in milliseconds
    #[arg(long)]
    sample_interval_ms: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    let mut monitor = Monitor::new(&config).context("invalid monitor config")?;
    let mut source = open_source(&cli)?;

    let start = Instant::now();
    let every = Duration::from_millis(cli.every.max(1));
    let mut next_print = start + every;
    let mut out = io::stdout().lock();

    if cli.format == Format::Csv {
        writeln!(out, "{}", Snapshot::csv_header())?;
    }

    loop {
        let now = Instant::now();
        match monitor.service(&mut source, now) {
            Ok(_) => {}
            Err(SourceError::Disconnected) => break,
            Err(e) => return Err(e).context("reading radar stream"),
        }

        if now >= next_print {
            emit(&mut out, cli.format, &monitor.snapshot(now), now - start)?;
            next_print = now + every;
        }
        thread::sleep(YIELD);
    }

    let now = Instant::now();
    emit(&mut out, cli.format, &monitor.snapshot(now), now - start)?;
    out.flush()?;

    let c = monitor.counters();
    eprintln!(
        "{} frames seen, {} accepted, {} decode errors, {} bytes discarded",
        c.frames_seen, c.frames_accepted, c.decode_errors, c.bytes_discarded
    );
    Ok(())
}

/// Defaults, then the config file, then individual flags.
fn load_config(cli: &Cli) -> anyhow::Result<MonitorConfig> {
    let mut config = match &cli.config {
        Some(path) => MonitorConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => MonitorConfig::default(),
    };
    if let Some(cap) = cli.trail_capacity {
        config.trail_capacity = cap;
    }
    if let Some(ms) = cli.sample_interval_ms {
        config.sample_interval = Duration::from_millis(ms);
    }
    config.validate()?;
    Ok(config)
}

fn open_source(cli: &Cli) -> anyhow::Result<ChannelSource> {
    let (source, _reader) = match &cli.input {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("opening {}", path.display()))?;
            info!("reading radar stream from {}", path.display());
            spawn_reader(file, READ_CHUNK)?
        }
        None => {
            info!("reading radar stream from stdin");
            spawn_reader(io::stdin(), READ_CHUNK)?
        }
    };
    // The reader thread is detached; it ends with its input.
    Ok(source)
}

fn emit(out: &mut impl Write, format: Format, snap: &Snapshot, elapsed: Duration) -> anyhow::Result<()> {
    match format {
        Format::Json => writeln!(out, "{}", snap.to_json()?)?,
        Format::Csv => writeln!(out, "{}", snap.csv_line(elapsed))?,
        Format::Text => {
            write!(out, "{:>8.1}s", elapsed.as_secs_f64())?;
            for t in &snap.targets {
                write!(out, "  {}", describe(t))?;
            }
            let c = &snap.counters;
            writeln!(
                out,
                "  | ok {}/{} err {}",
                c.frames_accepted, c.frames_seen, c.decode_errors
            )?;
        }
    }
    Ok(())
}

fn describe(t: &TargetView) -> String {
    if !t.present {
        return format!("[{}] --", t.slot);
    }
    let age = t
        .age_ms
        .map(|ms| format!("{ms}ms"))
        .unwrap_or_else(|| "-".into());
    format!(
        "[{}] x={:+}mm y={}mm v={:+}cm/s r={:.0}mm {:+.0}deg age={}{}",
        t.slot,
        t.x,
        t.y,
        t.v,
        t.distance_mm,
        t.angle_deg,
        age,
        if t.stale { " stale" } else { "" }
    )
}
