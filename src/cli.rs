//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// MarketBrief - concurrent market snapshot pipeline
///
/// Fetch a company's profile, logo, and adjusted-close price history in
/// parallel, then fan the snapshot out to a text brief, a SQLite table,
/// and an HTML report.
///
/// Examples:
///   marketbrief --api-key SECRET
///   marketbrief --symbol PEP --years 3 --output-dir briefs
///   marketbrief --dry-run
///   marketbrief --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Ticker symbol of the subject company
    ///
    /// Defaults to the config file value ("KO" when unset). Note the
    /// profile and logo page URLs come from configuration too; changing
    /// only the symbol points the price fetch at a different company.
    #[arg(short, long, value_name = "TICKER")]
    pub symbol: Option<String>,

    /// Time-series API key
    ///
    /// Required unless set in .marketbrief.toml. Can also be set via the
    /// ALPHAVANTAGE_API_KEY env var.
    #[arg(long, value_name = "KEY", env = "ALPHAVANTAGE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Directory where all sink outputs land
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .marketbrief.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// HTTP request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Trailing window of price history to keep, in years
    #[arg(long, value_name = "YEARS")]
    pub years: Option<u32>,

    /// Price table name (defaults to <symbol>_adj_close)
    #[arg(long, value_name = "NAME")]
    pub table_name: Option<String>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Dry run: print the planned fetch units and sinks without any network
    /// or filesystem side effects
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .marketbrief.toml configuration file
    #[arg(long)]
    pub init_config: bool,

    /// Fail with exit code 2 when any sink task fails
    ///
    /// Useful for CI. Without this flag partial sink failure still exits 0.
    #[arg(long)]
    pub fail_on_sink_error: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(ref symbol) = self.symbol {
            let well_formed = !symbol.is_empty()
                && symbol.len() <= 10
                && symbol
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
            if !well_formed {
                return Err(format!("Invalid ticker symbol: '{}'", symbol));
            }
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(years) = self.years {
            if years == 0 {
                return Err("Years must be at least 1".to_string());
            }
        }

        if let Some(ref table) = self.table_name {
            if table.is_empty() {
                return Err("Table name must not be empty".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            symbol: Some("KO".to_string()),
            api_key: Some("demo".to_string()),
            output_dir: None,
            config: None,
            timeout: None,
            years: None,
            table_name: None,
            verbose: false,
            quiet: false,
            dry_run: false,
            init_config: false,
            fail_on_sink_error: false,
        }
    }

    #[test]
    fn test_validation_accepts_defaults() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_validation_invalid_symbol() {
        let mut args = make_args();
        args.symbol = Some("not a ticker!".to_string());
        assert!(args.validate().is_err());

        args.symbol = Some("TOOLONGSYMBOL".to_string());
        assert!(args.validate().is_err());

        args.symbol = Some("BRK.B".to_string());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_zero_timeout_and_years() {
        let mut args = make_args();
        args.timeout = Some(0);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.years = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_init_config_skips_validation() {
        let mut args = make_args();
        args.init_config = true;
        args.symbol = Some("not a ticker!".to_string());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
