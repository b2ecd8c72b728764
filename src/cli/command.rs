use std::path::PathBuf;

use clap::{Args, Parser as ClapParser, Subcommand, ValueEnum};

#[derive(Debug, ClapParser)]
#[command(
    name         = env!("CARGO_PKG_NAME"),
    version      = env!("CARGO_PKG_VERSION"),
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_TIMESTAMP"), ")"),
    author       = env!("CARGO_PKG_AUTHORS"),
    about        = "Tools for inspecting DTS-HD lossless (XLL) headers",
    long_about   = None,
)]
pub struct Cli {
    /// Set the log level
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub loglevel: LogLevel,

    /// Fail when no XLL header could be decoded.
    #[arg(long, global = true)]
    pub strict: bool,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Choose an operation to perform.
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print XLL header information
    Info(InfoArgs),
}

#[derive(Debug, Args)]
pub struct InfoArgs {
    /// Input file holding the XLL component (use "-" for stdin).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Byte offset of the XLL component.
    #[arg(long, value_name = "BYTES", default_value_t = 0, conflicts_with = "scan")]
    pub offset: usize,

    /// Byte offset of the XLL sync word, relative to --offset.
    #[arg(long, value_name = "BYTES", default_value_t = 0, conflicts_with = "scan")]
    pub sync_offset: usize,

    /// Treat the asset as carrying no XLL sync.
    #[arg(long, conflicts_with = "scan")]
    pub no_sync: bool,

    /// Channels feed loudspeakers through mapping coefficients.
    #[arg(long)]
    pub mapping_coefficients: bool,

    /// Search the whole input for XLL sync words and decode every candidate.
    #[arg(long)]
    pub scan: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
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
pub enum OutputFormat {
    /// Aligned human-readable listing.
    Text,
    /// YAML document.
    Yaml,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_defaults() {
        let cli = Cli::try_parse_from(["xlld", "info", "in.xll"]).unwrap();

        let Commands::Info(args) = cli.command;
        assert_eq!(args.offset, 0);
        assert_eq!(args.sync_offset, 0);
        assert!(!args.no_sync);
        assert!(!args.scan);
        assert_eq!(args.format, OutputFormat::Text);
        assert!(!cli.strict);
    }

    #[test]
    fn test_scan_conflicts_with_offset() {
        assert!(Cli::try_parse_from(["xlld", "info", "--scan", "--offset", "4", "in.xll"]).is_err());
        assert!(
            Cli::try_parse_from(["xlld", "--strict", "info", "--scan", "--format", "yaml", "in.xll"])
                .is_ok()
        );
    }
}
