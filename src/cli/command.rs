use std::path::PathBuf;

use clap::{Args, Parser as ClapParser, Subcommand, ValueEnum};
use wavstream::process::tone::MAX_AMPLITUDE;
use wavstream::process::transform::Side;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\ngit:       ",
    env!("VERGEN_GIT_DESCRIBE"),
    "\nbuilt:     ",
    env!("BUILD_TIMESTAMP"),
    "\nwavstream: ",
    env!("WAVSTREAM_VERSION"),
);

#[derive(Debug, ClapParser)]
#[command(
    name         = env!("CARGO_PKG_NAME"),
    version      = env!("CARGO_PKG_VERSION"),
    long_version = LONG_VERSION,
    about        = "Inspect, rewrite and synthesize PCM WAV streams in a single pass",
    long_about   = None,
)]
pub struct Cli {
    /// Set the log level
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub loglevel: LogLevel,

    /// Treat warnings as fatal errors (fail on first warning).
    #[arg(long, global = true)]
    pub strict: bool,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Show a progress bar while streaming the input.
    #[arg(long, global = true)]
    pub progress: bool,

    /// Choose an operation to perform.
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Validate a WAV stream and print its header fields.
    Info(InfoArgs),

    /// Change the playback rate by rescaling the declared sample rate.
    Rate(RateArgs),

    /// Keep only the left or right channel of a stereo stream.
    Channel(ChannelArgs),

    /// Scale every sample by a constant factor.
    Volume(VolumeArgs),

    /// Synthesize a phase-modulated 16-bit mono tone.
    Generate(GenerateArgs),
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// Input WAV stream (use "-" for stdin).
    #[arg(short, long, value_name = "INPUT", default_value = "-")]
    pub input: PathBuf,
}

#[derive(Debug, Args)]
pub struct OutputArgs {
    /// Output WAV stream (use "-" for stdout).
    #[arg(short, long, value_name = "OUTPUT", default_value = "-")]
    pub output: PathBuf,
}

#[derive(Debug, Args)]
pub struct InfoArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Report format.
    #[arg(long, value_enum, default_value_t = InfoFormat::Text)]
    pub format: InfoFormat,
}

#[derive(Debug, Args)]
pub struct RateArgs {
    /// Playback speed multiplier (> 0).
    #[arg(value_name = "FACTOR", allow_negative_numbers = true)]
    pub factor: f64,

    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args)]
pub struct ChannelArgs {
    /// Channel to keep.
    #[arg(value_name = "SIDE", value_enum)]
    pub side: ChannelSide,

    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args)]
pub struct VolumeArgs {
    /// Loudness multiplier (>= 0).
    #[arg(value_name = "FACTOR", allow_negative_numbers = true)]
    pub factor: f64,

    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Duration in seconds.
    #[arg(value_name = "DURATION", default_value_t = 2, allow_negative_numbers = true)]
    pub duration: i64,

    /// Sample rate in Hz.
    #[arg(value_name = "SAMPLE_RATE", default_value_t = 44100, allow_negative_numbers = true)]
    pub sample_rate: i64,

    /// Modulator frequency in Hz.
    #[arg(value_name = "FM", default_value_t = 100.0, allow_negative_numbers = true)]
    pub fm: f64,

    /// Carrier frequency in Hz.
    #[arg(value_name = "FC", default_value_t = 1000.0, allow_negative_numbers = true)]
    pub fc: f64,

    /// Modulation index.
    #[arg(value_name = "MI", default_value_t = 100.0, allow_negative_numbers = true)]
    pub mi: f64,

    /// Peak amplitude (0 to 32767).
    #[arg(value_name = "AMP", default_value_t = MAX_AMPLITUDE, allow_negative_numbers = true)]
    pub amp: f64,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    /// Disable logging output.
    Off,
    /// No output except errors.
    Error,
    /// Show warnings and errors.
    Warn,
    /// Show info, warnings and errors (default).
    Info,
    /// Show debug, info, warnings and errors.
    Debug,
    /// Show all log messages including trace.
    Trace,
}

impl LogLevel {
    /// Convert LogLevel to log::LevelFilter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    /// Colorized human-readable text.
    Plain,
    /// Structured JSON per log record.
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum InfoFormat {
    /// One "label: value" line per field.
    Text,
    /// YAML document.
    Yaml,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum ChannelSide {
    Left,
    Right,
}

impl From<ChannelSide> for Side {
    fn from(side: ChannelSide) -> Self {
        match side {
            ChannelSide::Left => Side::Left,
            ChannelSide::Right => Side::Right,
        }
    }
}

/// Exit status for a command line that failed to parse. Help and version requests are not
/// failures; every usage error exits with 1 like any other argument failure.
pub fn usage_exit_code(err: &clap::Error) -> i32 {
    match err.kind() {
        clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

impl Cli {
    /// Level at which library conditions become fatal.
    pub fn fail_level(&self) -> log::Level {
        if self.strict {
            log::Level::Warn
        } else {
            log::Level::Error
        }
    }
}
