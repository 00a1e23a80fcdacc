use anyhow::{Context, Result};
use brg_catalog::{parse_hex_u32, RegAddr, RegisterCatalog};
use brg_runtime::{run_correction, CorrectionRequest};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

/// Exit status when the run completed but at least one check failed.
const EXIT_VALIDATION_FAILED: u8 = 1;
/// Exit status for run-level errors (missing input, bad config, IO).
const EXIT_ERROR: u8 = 2;

#[derive(Parser)]
#[command(name = "bootreg")]
#[command(about = "Boot register access sequence reconciler", long_about = None)]
struct Cli {
    /// Debug-level logging (RUST_LOG still wins when set)
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile static analysis and hardware captures into a corrected sequence
    Correct {
        /// Directory holding the input documents; outputs are written here
        #[arg(long)]
        results_dir: PathBuf,

        /// Corrected sequence file name (overrides config)
        #[arg(long)]
        output: Option<String>,

        /// Validation report file name (overrides config)
        #[arg(long)]
        report: Option<String>,

        /// Markdown summary file name (overrides config)
        #[arg(long)]
        summary: Option<String>,

        /// Layered config paths in merge order
        #[arg(long = "config")]
        config_paths: Vec<String>,

        /// Correction timestamp (RFC 3339); defaults to now
        #[arg(long)]
        timestamp: Option<String>,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Decode a register value into its bit fields
    Decode {
        #[arg(long)]
        address: String,
        #[arg(long)]
        value: String,
    },

    /// Field-level changes between two values of one register
    Diff {
        #[arg(long)]
        address: String,
        #[arg(long)]
        before: String,
        #[arg(long)]
        after: String,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn parse_timestamp(raw: Option<&str>) -> Result<DateTime<Utc>> {
    match raw {
        None => Ok(Utc::now()),
        Some(s) => Ok(DateTime::parse_from_rfc3339(s)
            .with_context(|| format!("invalid --timestamp (want RFC 3339): {s}"))?
            .with_timezone(&Utc)),
    }
}

fn parse_address(raw: &str) -> Result<RegAddr> {
    RegAddr::parse_key(raw).with_context(|| format!("invalid address: {raw}"))
}

fn parse_value(raw: &str) -> Result<u32> {
    parse_hex_u32(raw).with_context(|| format!("invalid register value: {raw}"))
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.cmd {
        Commands::Correct {
            results_dir,
            output,
            report,
            summary,
            config_paths,
            timestamp,
        } => {
            let path_refs: Vec<&str> = config_paths.iter().map(|s| s.as_str()).collect();
            let (mut cfg, loaded) = brg_config::load_engine_config(&path_refs)?;
            if let Some(o) = output {
                cfg.outputs.corrected_sequence = o;
            }
            if let Some(r) = report {
                cfg.outputs.validation_report = r;
            }
            if let Some(s) = summary {
                cfg.outputs.summary = s;
            }
            let correction_timestamp = parse_timestamp(timestamp.as_deref())?;
            info!(
                config_hash = %loaded.config_hash,
                results_dir = %results_dir.display(),
                "starting correction"
            );

            let run = run_correction(CorrectionRequest {
                results_dir: &results_dir,
                config: &cfg,
                config_hash: &loaded.config_hash,
                correction_timestamp,
            })?;

            println!("total_accesses={}", run.sequence.total_accesses);
            println!("corrected_sequence={}", run.paths.corrected_sequence.display());
            println!("validation_report={}", run.paths.validation_report.display());
            println!("summary={}", run.paths.summary.display());
            println!(
                "overall_confidence={:.1}",
                run.report.confidence_metrics.overall_confidence
            );
            println!("all_checks_passed={}", run.all_checks_passed());

            if run.all_checks_passed() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::from(EXIT_VALIDATION_FAILED))
            }
        }

        Commands::ConfigHash { paths } => {
            let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
            let loaded = brg_config::load_layered_yaml(&path_refs)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
            Ok(ExitCode::SUCCESS)
        }

        Commands::Decode { address, value } => {
            let catalog = RegisterCatalog::mimxrt798s();
            let decoded = catalog.decode(parse_address(&address)?, parse_value(&value)?);
            let json = serde_json::to_string_pretty(&decoded).context("serialize decode failed")?;
            println!("{json}");
            Ok(ExitCode::SUCCESS)
        }

        Commands::Diff {
            address,
            before,
            after,
        } => {
            let catalog = RegisterCatalog::mimxrt798s();
            let changes = catalog.diff(
                parse_address(&address)?,
                parse_value(&before)?,
                parse_value(&after)?,
            );
            let json = serde_json::to_string_pretty(&changes).context("serialize diff failed")?;
            println!("{json}");
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn main() -> ExitCode {
    // Dev convenience: load .env.local if present; silent otherwise.
    let _ = dotenvy::from_filename(".env.local");

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}
