//! The `relink run` command: rewrite a directory tree in place.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, ValueEnum};
use relink_core::{CancellationToken, Config, Pipeline, RunSummary};

/// Exit code reported when the run is interrupted with Ctrl-C.
const EXIT_INTERRUPTED: u8 = 130;

/// How the end-of-run summary is printed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum SummaryFormat {
    /// Summary table on stderr
    #[default]
    Text,
    /// `RunSummary` as JSON on stdout
    Json,
}

/// Arguments for the `run` command.
///
/// Every option left unset falls back to the config file.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Directory tree to rewrite (defaults to general.root_dir)
    pub root: Option<PathBuf>,

    /// File extension to select, e.g. "html" or ".html"
    #[arg(short, long)]
    pub extension: Option<String>,

    /// Literal text to replace
    #[arg(long)]
    pub from: Option<String>,

    /// Replacement text
    #[arg(long)]
    pub to: Option<String>,

    /// Workers per pipeline stage
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Jobs buffered between stages
    #[arg(short, long)]
    pub buffer_size: Option<usize>,

    /// Summary output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: SummaryFormat,
}

/// Execute the run command.
pub async fn execute(args: RunArgs, config: Config) -> anyhow::Result<ExitCode> {
    let format = args.format;
    let summary = run(args, config).await?;

    match format {
        SummaryFormat::Text => print_summary(&summary),
        SummaryFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }

    Ok(if summary.cancelled {
        ExitCode::from(EXIT_INTERRUPTED)
    } else {
        ExitCode::SUCCESS
    })
}

/// Apply overrides, then run the pipeline with Ctrl-C wired to cancellation.
async fn run(args: RunArgs, mut config: Config) -> anyhow::Result<RunSummary> {
    apply_overrides(&args, &mut config);
    let pipeline = Pipeline::new(&config)?;
    let root = resolve_root(&args, &config)?;

    let cancel = CancellationToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, stopping workers...");
                cancel.cancel();
            }
        })
    };

    let result = pipeline.run_until(&root, cancel).await;
    interrupt.abort();
    Ok(result?)
}

/// Fold command-line overrides into the loaded configuration.
fn apply_overrides(args: &RunArgs, config: &mut Config) {
    if let Some(extension) = &args.extension {
        config.rewrite.extension = extension.clone();
    }
    if let Some(from) = &args.from {
        config.rewrite.from = from.clone();
    }
    if let Some(to) = &args.to {
        config.rewrite.to = to.clone();
    }
    if let Some(workers) = args.workers {
        config.pipeline.workers = workers;
    }
    if let Some(buffer_size) = args.buffer_size {
        config.pipeline.buffer_size = buffer_size;
    }
}

/// Pick the root directory: CLI argument first, then config.
fn resolve_root(args: &RunArgs, config: &Config) -> anyhow::Result<PathBuf> {
    if let Some(root) = &args.root {
        let expanded = shellexpand::tilde(&root.to_string_lossy()).into_owned();
        return Ok(PathBuf::from(expanded));
    }
    match config.root_dir() {
        Some(root) => Ok(root),
        None => anyhow::bail!(
            "No root directory given.\n\n  Hint: pass one (`relink run ./site`) or set general.root_dir in {}",
            Config::default_path().display()
        ),
    }
}

/// Print a formatted summary table after the run.
fn print_summary(summary: &RunSummary) {
    let mb_written = summary.bytes_written as f64 / 1_000_000.0;

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Discovered:   {:>8}", summary.discovered);
    eprintln!("    Rewritten:    {:>8}", summary.succeeded);
    if summary.read_failed > 0 {
        eprintln!("    Read failed:  {:>8}", summary.read_failed);
    }
    if summary.write_failed > 0 {
        eprintln!("    Write failed: {:>8}", summary.write_failed);
    }
    if summary.skipped_dirs > 0 {
        eprintln!("    Skipped dirs: {:>8}", summary.skipped_dirs);
    }
    if summary.skipped_links > 0 {
        eprintln!("    Symlinks:     {:>8}", summary.skipped_links);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Replacements: {:>8}", summary.replacements);
    eprintln!("    Written:      {:>7.1} MB", mb_written);
    eprintln!("    Duration:     {:>7.1}s", summary.total_seconds);
    eprintln!("    Rate:         {:>7.1} files/sec", summary.files_per_second());
    if summary.cancelled {
        eprintln!("    (interrupted before completion)");
    }
    eprintln!("  ====================================");
}
