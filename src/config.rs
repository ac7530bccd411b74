//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.marketbrief.toml` files. Everything a fetch or sink unit needs
//! (URLs, credentials, target paths) flows through here and is bound
//! into the units explicitly; leaf logic never reads the process
//! environment on its own.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Fetch stage settings.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Sink output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Fetch stage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Ticker symbol of the subject company.
    #[serde(default = "default_symbol")]
    pub symbol: String,

    /// Investor-relations page the company description is scraped from.
    #[serde(default = "default_profile_url")]
    pub profile_url: String,

    /// Heading text marking the description section. When unset, the first
    /// section of the page is used.
    #[serde(default)]
    pub profile_section: Option<String>,

    /// Article page the logo image is located on.
    #[serde(default = "default_logo_page_url")]
    pub logo_page_url: String,

    /// Time-series API endpoint.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Time-series API key. Usually supplied via --api-key or the
    /// ALPHAVANTAGE_API_KEY environment variable instead.
    #[serde(default)]
    pub api_key: Option<String>,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Trailing window of price history to keep, in years.
    #[serde(default = "default_years")]
    pub years: u32,

    /// User-Agent header sent with page requests. Some sites refuse the
    /// default library agent.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            profile_url: default_profile_url(),
            profile_section: None,
            logo_page_url: default_logo_page_url(),
            api_url: default_api_url(),
            api_key: None,
            timeout_seconds: default_timeout(),
            years: default_years(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_symbol() -> String {
    "KO".to_string()
}

fn default_profile_url() -> String {
    "https://investors.coca-colacompany.com/about".to_string()
}

fn default_logo_page_url() -> String {
    "https://en.wikipedia.org/wiki/Coca-Cola".to_string()
}

fn default_api_url() -> String {
    "https://www.alphavantage.co/query".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_years() -> u32 {
    5
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36"
        .to_string()
}

/// Sink output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory all sink outputs land in.
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// Company description text file.
    #[serde(default = "default_description_file")]
    pub description_file: String,

    /// Downloaded logo image file.
    #[serde(default = "default_logo_file")]
    pub logo_file: String,

    /// SQLite database file the price table is written to.
    #[serde(default = "default_database_file")]
    pub database_file: String,

    /// HTML report file.
    #[serde(default = "default_report_file")]
    pub report_file: String,

    /// Price table name. Defaults to `<symbol>_adj_close`.
    #[serde(default)]
    pub table_name: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            description_file: default_description_file(),
            logo_file: default_logo_file(),
            database_file: default_database_file(),
            report_file: default_report_file(),
            table_name: None,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_description_file() -> String {
    "company_description.txt".to_string()
}

fn default_logo_file() -> String {
    "logo.jpg".to_string()
}

fn default_database_file() -> String {
    "marketbrief.db".to_string()
}

fn default_report_file() -> String {
    "report.html".to_string()
}

impl OutputConfig {
    pub fn description_path(&self) -> PathBuf {
        self.dir.join(&self.description_file)
    }

    pub fn logo_path(&self) -> PathBuf {
        self.dir.join(&self.logo_file)
    }

    pub fn database_path(&self) -> PathBuf {
        self.dir.join(&self.database_file)
    }

    pub fn report_path(&self) -> PathBuf {
        self.dir.join(&self.report_file)
    }

    /// Table name to write, derived from the symbol when not configured.
    pub fn effective_table_name(&self, symbol: &str) -> String {
        self.table_name
            .clone()
            .unwrap_or_else(|| format!("{}_adj_close", symbol.to_lowercase()))
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".marketbrief.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings; only
    /// explicitly provided values override.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref symbol) = args.symbol {
            self.fetch.symbol = symbol.to_uppercase();
        }
        if let Some(ref api_key) = args.api_key {
            self.fetch.api_key = Some(api_key.clone());
        }
        if let Some(timeout) = args.timeout {
            self.fetch.timeout_seconds = timeout;
        }
        if let Some(years) = args.years {
            self.fetch.years = years;
        }
        if let Some(ref dir) = args.output_dir {
            self.output.dir = dir.clone();
        }
        if let Some(ref table) = args.table_name {
            self.output.table_name = Some(table.clone());
        }
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.fetch.symbol, "KO");
        assert_eq!(config.fetch.years, 5);
        assert_eq!(config.output.description_file, "company_description.txt");
        assert!(config.fetch.api_key.is_none());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
verbose = true

[fetch]
symbol = "PEP"
years = 3
timeout_seconds = 10

[output]
dir = "out"
table_name = "pepsi_prices"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert!(config.general.verbose);
        assert_eq!(config.fetch.symbol, "PEP");
        assert_eq!(config.fetch.years, 3);
        assert_eq!(config.fetch.timeout_seconds, 10);
        assert_eq!(config.output.dir, PathBuf::from("out"));
        assert_eq!(config.output.effective_table_name("PEP"), "pepsi_prices");
    }

    #[test]
    fn test_effective_table_name_from_symbol() {
        let output = OutputConfig::default();
        assert_eq!(output.effective_table_name("KO"), "ko_adj_close");
    }

    #[test]
    fn test_output_paths_join_dir() {
        let mut output = OutputConfig::default();
        output.dir = PathBuf::from("briefs");
        assert_eq!(
            output.report_path(),
            PathBuf::from("briefs").join("report.html")
        );
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[fetch]"));
        assert!(toml_str.contains("[output]"));
    }
}
