//! History-Harvest main entry point
//!
//! This is the command-line interface for exporting a web activity history.

use clap::Parser;
use history_harvest::config::{read_config_with_hash, validate, Config};
use history_harvest::crawler::harvest;
use history_harvest::locale::Labels;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// History-Harvest: exports your search history to CSV
///
/// Signs in to the history service, walks the listing from the most recent
/// page back to the oldest one, and writes every search (and the results
/// visited from it) as soon as each page is read.
#[derive(Parser, Debug)]
#[command(name = "history-harvest")]
#[command(version = "1.0.0")]
#[command(about = "Exports a paginated search history to CSV", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Account login (overrides the config file)
    #[arg(long)]
    login: Option<String>,

    /// Account password (overrides the config file)
    #[arg(long, env = "HISTORY_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Export searches only, without the results visited from them
    #[arg(long)]
    no_visited: bool,

    /// CSV output file; stdout when neither this nor the config sets one
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Built-in label table ("fr" or "en")
    #[arg(long)]
    locale: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate the settings and show them without connecting
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match load_settings(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if cli.dry_run {
        print_dry_run(&config);
        return ExitCode::SUCCESS;
    }

    handle_harvest(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so the CSV can be written to stdout.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("history_harvest=info,warn"),
            1 => EnvFilter::new("history_harvest=debug,info"),
            2 => EnvFilter::new("history_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Reads the config file (if any), applies command-line overrides and
/// validates the result
fn load_settings(cli: &Cli) -> Result<Config, history_harvest::ConfigError> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = read_config_with_hash(path)?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(login) = &cli.login {
        config.credentials.login = login.clone();
    }
    if let Some(password) = &cli.password {
        config.credentials.password = password.clone();
    }
    if cli.no_visited {
        config.credentials.include_visited_results = false;
    }
    if let Some(path) = &cli.output {
        config.output.path = Some(path.clone());
    }
    if let Some(locale) = &cli.locale {
        config.site.locale = locale.clone();
    }

    validate(&config)?;
    Ok(config)
}

/// Handles the --dry-run mode: shows the effective settings
fn print_dry_run(config: &Config) {
    let labels: Labels = config.labels();

    println!("=== History-Harvest Dry Run ===\n");

    println!("Site:");
    println!("  Entry URL: {}", config.site.entry_url);
    println!("  Search prefix: {}", config.site.search_prefix);
    println!("  Content form: {}", config.site.content_form);
    println!(
        "  Login fields: {} / {} (submit: {})",
        config.site.login_field, config.site.password_field, config.site.sign_in_control
    );
    println!("  Pacing: {}ms", config.site.pacing_ms);
    println!("  User agent: {}", config.site.user_agent);

    println!("\nAccount:");
    println!("  Login: {}", config.credentials.login);
    println!(
        "  Visited results: {}",
        if config.credentials.include_visited_results {
            "included"
        } else {
            "skipped"
        }
    );

    println!("\nOutput:");
    match &config.output.path {
        Some(path) => println!("  File: {}", path.display()),
        None => println!("  File: <stdout>"),
    }
    println!("  Delimiter: '{}'", config.output.delimiter);
    println!("  Header: {}", labels.columns.join(&config.output.delimiter));

    println!("\nLabels:");
    println!("  Today / yesterday: {} / {}", labels.today, labels.yesterday);
    println!("  Previous page link: {}", labels.previous_page);
    println!("  Months: {}", labels.months.join(" "));

    println!("\n✓ Configuration is valid");
}

/// Runs the export and maps its outcome to an exit code
async fn handle_harvest(config: Config) -> ExitCode {
    tracing::info!(
        "Exporting history of {} ({})",
        config.credentials.login,
        if config.credentials.include_visited_results {
            "searches and visited results"
        } else {
            "searches only"
        }
    );

    match harvest(config).await {
        Ok(report) => {
            eprintln!("{}", report.outcome.message());
            eprintln!(
                "{} pages, {} searches, {} rows written",
                report.pages,
                report.searches.len(),
                report.rows_written
            );
            if let Some(date) = report.last_search_date() {
                eprintln!("Oldest search exported: {}", date);
            }
            if report.outcome.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            tracing::error!("Export failed: {}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
