use billroll::prelude::*;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::Level;

/// Track bill sponsorship and floor votes per legislator and publish them to a spreadsheet
#[derive(Parser, Debug)]
#[command(name = "billroll")]
#[command(about = "Track bill sponsorship and floor votes per legislator")]
#[command(version)]
struct Args {
    /// Configuration file (default: billroll.yml; secrets may come from env vars)
    #[arg(long, global = true, default_value = "billroll.yml")]
    config: PathBuf,

    /// Show debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only show warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Recompute bill labels, statuses, committees and legislator roles on each chamber's tab
    Update {
        /// Chambers to update (senate, assembly or all). Defaults to the configured chambers.
        #[arg(num_args = 0..)]
        chambers: Vec<String>,
    },

    /// Rewrite legislator names on each chamber's tab as links to their contact pages
    Names {
        /// Chambers to update (senate, assembly or all). Defaults to the configured chambers.
        #[arg(num_args = 0..)]
        chambers: Vec<String>,
    },

    /// Build a report from upstream data only and print it as JSON
    Report {
        /// Chamber to report on
        chamber: String,

        /// District codes, in row order
        #[arg(long = "district", num_args = 1.., required = true)]
        districts: Vec<String>,

        /// Bill labels, one per column. Join related labels with '+' (e.g. S100+A200)
        #[arg(long = "bill", num_args = 1.., required = true)]
        bills: Vec<String>,
    },
}

fn print_available_commands() {
    println!("Available commands:");
    println!("  update  Recompute bill columns on each chamber's tab");
    println!("  names   Rewrite legislator names as contact-page links");
    println!("  report  Print a chamber report as JSON without touching the sheet");
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        Level::DEBUG
    } else if quiet {
        Level::WARN
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: &Path) -> anyhow::Result<Config> {
    let config = if path.exists() {
        Config::from_file(path)
            .map_err(|e| anyhow::anyhow!("Failed to load {}: {}", path.display(), e))?
    } else {
        tracing::debug!(path = %path.display(), "no config file, using defaults and environment");
        Config::default()
    };
    let config = config.apply_env()?;
    config.validate()?;
    Ok(config)
}

fn select_chambers(config: &Config, requested: &[String]) -> anyhow::Result<Vec<Chamber>> {
    if requested.is_empty() {
        return Ok(config.chambers.clone());
    }
    let selected = ConfigBuilder::from_config(config.clone())
        .chambers_str(&requested.join(","))?
        .build()?;
    Ok(selected.chambers)
}

/// Run `task` for every chamber; a failing chamber does not stop the others
async fn for_each_chamber<F, Fut>(chambers: &[Chamber], task: F) -> anyhow::Result<()>
where
    F: Fn(Chamber) -> Fut,
    Fut: std::future::Future<Output = billroll::Result<()>>,
{
    let mut failures = Vec::new();
    for &chamber in chambers {
        match task(chamber).await {
            Ok(()) => tracing::info!(%chamber, "done"),
            Err(e) => {
                tracing::error!(%chamber, error = %e, "chamber aborted, nothing written for it");
                failures.push(chamber);
            }
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        let names: Vec<String> = failures.iter().map(|c| c.to_string()).collect();
        Err(anyhow::anyhow!("Failed chambers: {}", names.join(", ")))
    }
}

async fn run_update_command(config: Config, chambers: Vec<String>) -> anyhow::Result<()> {
    let chambers = select_chambers(&config, &chambers)?;
    let source = OpenLegClient::new(config.clone())?;
    let store = SheetsClient::new(config.clone())?;
    let publisher = Publisher::new(&config, &source, &store);
    let publisher = &publisher;

    for_each_chamber(&chambers, move |chamber| async move {
        publisher.update_sheet(chamber).await.map(|_| ())
    })
    .await
}

async fn run_names_command(config: Config, chambers: Vec<String>) -> anyhow::Result<()> {
    let chambers = select_chambers(&config, &chambers)?;
    let source = OpenLegClient::new(config.clone())?;
    let store = SheetsClient::new(config.clone())?;
    let publisher = Publisher::new(&config, &source, &store);
    let publisher = &publisher;

    for_each_chamber(&chambers, move |chamber| async move {
        publisher.update_names(chamber).await.map(|_| ())
    })
    .await
}

async fn run_report_command(
    config: Config,
    chamber: String,
    districts: Vec<String>,
    bills: Vec<String>,
) -> anyhow::Result<()> {
    let chamber: Chamber = chamber.parse()?;
    let districts: Vec<DistrictCode> = districts.iter().map(DistrictCode::new).collect();
    let labels: Vec<String> = bills.iter().map(|b| b.replace('+', "\n")).collect();

    let source = OpenLegClient::new(config.clone())?;
    let report = ReportBuilder::new(&source, &config)
        .build_report(chamber, &labels, &districts)
        .await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    let Some(command) = args.command else {
        print_available_commands();
        return Ok(());
    };
    let config = load_config(&args.config)?;

    match command {
        Command::Update { chambers } => run_update_command(config, chambers).await,
        Command::Names { chambers } => run_names_command(config, chambers).await,
        Command::Report {
            chamber,
            districts,
            bills,
        } => run_report_command(config, chamber, districts, bills).await,
    }
}
