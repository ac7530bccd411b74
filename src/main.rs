//! MarketBrief - concurrent market snapshot pipeline
//!
//! A CLI tool that fetches a company's profile, logo, and adjusted-close
//! price history in parallel, then fans the snapshot out to a text brief,
//! a SQLite price table, and an HTML report.
//!
//! Exit codes:
//!   0 - Run completed (individual sink failures are reported, not fatal)
//!   1 - Runtime error (missing required data, config error, etc.)
//!   2 - A sink task failed and --fail-on-sink-error was set

mod cli;
mod config;
mod fetch;
mod models;
mod pipeline;
mod sink;

use anyhow::{Context, Result};
use cli::Args;
use config::Config;
use indicatif::{ProgressBar, ProgressStyle};
use pipeline::Orchestrator;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("MarketBrief v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Run the pipeline
    match run_brief(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .marketbrief.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".marketbrief.toml");

    if path.exists() {
        eprintln!("⚠️  .marketbrief.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .marketbrief.toml")?;

    println!("✅ Created .marketbrief.toml with default settings.");
    println!("   Edit it to customize the subject, URLs, and output paths.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete snapshot pipeline. Returns exit code (0 or 2).
async fn run_brief(args: Args) -> Result<i32> {
    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let symbol = config.fetch.symbol.clone();
    println!("📈 Building market brief for {}", symbol);

    // Handle --dry-run: print the plan and exit
    if args.dry_run {
        return handle_dry_run(&config);
    }

    let api_key = config.fetch.api_key.clone().context(
        "Missing time-series API key (use --api-key, ALPHAVANTAGE_API_KEY, or [fetch] api_key)",
    )?;

    // One shared HTTP client; each fetch unit gets its own handle.
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.fetch.timeout_seconds))
        .user_agent(config.fetch.user_agent.clone())
        .build()
        .context("Failed to create HTTP client")?;

    let fetch_units = vec![
        fetch::profile::unit(client.clone(), &config.fetch),
        fetch::logo::unit(client.clone(), &config.fetch, &config.output),
        fetch::prices::unit(client, &config.fetch, api_key),
    ];

    let spinner = make_spinner(&args, &symbol);

    let output = config.output.clone();
    let table = config.output.effective_table_name(&symbol);
    let report_symbol = symbol.clone();

    let mut orchestrator = Orchestrator::new();
    let result = orchestrator
        .run(fetch_units, fetch::REQUIRED_FIELDS, |bag| {
            vec![
                sink::textfile::unit(bag, output.description_path()),
                sink::table::unit(bag, output.database_path(), table),
                sink::report::unit(bag, output.report_path(), report_symbol),
            ]
        })
        .await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let report = result.context("Pipeline aborted")?;

    println!("\n=== Sink task outcomes ===");
    for outcome in &report.outcomes {
        println!("   {}", outcome);
    }

    println!(
        "\n📊 {} sink task(s) succeeded, {} failed",
        report.succeeded(),
        report.failed()
    );
    if report.failed() > 0 {
        warn!("{} sink task(s) failed; see outcomes above", report.failed());
    }
    println!("✅ Brief complete for {}", symbol);

    if args.fail_on_sink_error && report.failed() > 0 {
        eprintln!(
            "\n⛔ {} sink task(s) failed. Failing (exit code 2).",
            report.failed()
        );
        return Ok(2);
    }

    Ok(0)
}

/// Spinner shown while the pipeline runs (suppressed by --quiet).
fn make_spinner(args: &Args, symbol: &str) -> Option<ProgressBar> {
    if args.quiet {
        return None;
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(format!("fetching data for {}...", symbol));
    pb.enable_steady_tick(Duration::from_millis(120));
    Some(pb)
}

/// Handle --dry-run: print planned units and sinks, exit.
fn handle_dry_run(config: &Config) -> Result<i32> {
    println!("\n🔍 Dry run: printing the plan (no network, no writes)...\n");

    println!("   Fetch units:");
    println!("     🌐 company-profile <- {}", config.fetch.profile_url);
    println!("     🌐 logo            <- {}", config.fetch.logo_page_url);
    println!(
        "     🌐 price-series    <- {} (symbol {}, last {} years)",
        config.fetch.api_url, config.fetch.symbol, config.fetch.years
    );

    println!("   Required fields: {}", fetch::REQUIRED_FIELDS.join(", "));

    let table = config.output.effective_table_name(&config.fetch.symbol);
    println!("   Sink tasks:");
    println!(
        "     📄 write-text    -> {}",
        config.output.description_path().display()
    );
    println!(
        "     🗄️ write-table   -> {} (table '{}')",
        config.output.database_path().display(),
        table
    );
    println!(
        "     📊 render-report -> {}",
        config.output.report_path().display()
    );

    println!("\n✅ Dry run complete. Nothing was fetched or written.");
    Ok(0)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .marketbrief.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
