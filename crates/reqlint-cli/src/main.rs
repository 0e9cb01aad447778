use anyhow::Context;
use clap::Parser;
use reqlint_core::{read_manifest, write_manifest, Config, ExportFormat, Exporter, Report};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "reqlint")]
#[command(version, about = "Parse, check and format Python requirements manifests", long_about = None)]
struct Cli {
    /// Config file (defaults to ./reqlint.toml, then the user config dir)
    #[arg(long, global = true, env = "REQLINT_CONFIG")]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Print the parsed requirements
    Parse {
        /// Manifest file
        file: PathBuf,
        /// Output format: text, json, csv or markdown
        #[arg(short, long, default_value = "text")]
        format: ExportFormat,
    },
    /// Check the manifest; exits with 1 when errors are found
    Check {
        /// Manifest file
        file: PathBuf,
    },
    /// Print the manifest in canonical form
    Fmt {
        /// Manifest file
        file: PathBuf,
        /// Rewrite the file in place
        #[arg(short, long)]
        write: bool,
    },
    /// Write a report, format picked from the output extension
    Report {
        /// Manifest file
        file: PathBuf,
        /// Output path (.txt, .json, .csv or .md)
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Parse { file, format } => {
            let report = build_report(&file, &config)?;
            print!("{}", Exporter::render(&report, format)?);
        }
        Commands::Check { file } => {
            let report = build_report(&file, &config)?;
            for issue in &report.issues {
                println!("{}: {}", file.display(), issue);
            }
            println!(
                "{}: {} errors, {} warnings",
                file.display(),
                report.error_count(),
                report.warning_count()
            );
            if !report.passed {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Fmt { file, write } => {
            let manifest = load(&file)?;
            if write {
                write_manifest(&file, &manifest)
                    .with_context(|| format!("Failed to write {}", file.display()))?;
            } else {
                print!("{}", Exporter::to_requirements(&manifest));
            }
        }
        Commands::Report { file, output } => {
            let report = build_report(&file, &config)?;
            Exporter::export_to_file(&report, &output)?;
            tracing::info!("Report written to {}", output.display());
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "reqlint=debug" } else { "reqlint=info" };

    // Logs go to stderr so stdout stays pipeable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load(file: &Path) -> anyhow::Result<reqlint_deps::Manifest> {
    read_manifest(file).with_context(|| format!("Failed to read {}", file.display()))
}

fn build_report(file: &Path, config: &Config) -> anyhow::Result<Report> {
    let manifest = load(file)?;
    Ok(Report::build(file.display().to_string(), &manifest, config))
}
