use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use gfuzz_cc::identifier::KeyVarIdentifierOptions;
use gfuzz_cc::{identify, manifest, program};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Runs the key-variable identifier (C2) over a program description and a
/// targets file, emitting the key-variable manifest consumed by the
/// instrumentation inserter.
#[derive(Debug, Parser)]
struct Cli {
    /// Pipe-delimited textual program description.
    #[clap(long)]
    program: PathBuf,

    /// Newline-delimited list of target function names.
    #[clap(long)]
    targets: PathBuf,

    /// Output manifest path.
    #[clap(long)]
    manifest: PathBuf,

    /// Optional var-id debug mapping output.
    #[clap(long)]
    var_id_map: Option<PathBuf>,

    #[clap(long, default_value_t = 1024)]
    max_key_vars: usize,

    #[clap(long, default_value_t = 100)]
    inst_ratio: u8,

    #[clap(long, default_value_t = false)]
    critical_path_only: bool,
}

fn setup_logger() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_timer(fmt::time::ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_owned())))
        .with(
            EnvFilter::builder()
                .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
                .from_env()
                .context("constructing log filter from env")?,
        )
        .try_init()
        .ok();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logger()?;

    let program_text = std::fs::read_to_string(&cli.program)
        .with_context(|| format!("reading program description {}", cli.program.display()))?;
    let model = program::parse_program_description(&program_text);

    let targets = manifest::read_targets(&cli.targets).unwrap_or_else(|e| {
        tracing::warn!(
            error = %e,
            path = %cli.targets.display(),
            "targets file missing or unreadable, producing an empty key-variable set"
        );
        Vec::new()
    });

    let options = KeyVarIdentifierOptions {
        max_key_vars: cli.max_key_vars,
        inst_ratio: cli.inst_ratio,
        critical_path_only: cli.critical_path_only,
        ..KeyVarIdentifierOptions::default()
    };

    let records = identify(&model, &targets, options);
    tracing::info!(count = records.len(), "identified key variables");

    manifest::write_manifest(&cli.manifest, &records).context("writing manifest")?;
    if let Some(path) = &cli.var_id_map {
        manifest::write_var_id_map(path, &records).context("writing var-id map")?;
    }

    Ok(())
}
