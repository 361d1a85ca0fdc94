use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use gfuzz_cc::instrument::{plan_for, ValueType};
use gfuzz_cc::types::TypeTag;
use gfuzz_cc::{manifest, program};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Runs the instrumentation decision logic (C3) over a key-variable manifest,
/// emitting the recorder + normalization plan the instrumentation inserter
/// applies at each call site, plus the optional var-id debug mapping.
#[derive(Debug, Parser)]
struct Cli {
    #[clap(long)]
    program: PathBuf,

    #[clap(long)]
    manifest: PathBuf,

    #[clap(long)]
    plan_output: PathBuf,
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

    let entries = manifest::read_manifest(&cli.manifest).context("reading manifest")?;

    let mut out = String::new();
    for (var_id, entry) in entries.iter().enumerate() {
        let is_cstring_pointer = model
            .functions
            .get(&entry.function)
            .and_then(|info| info.variables.iter().find(|v| v.name == entry.name))
            .is_some_and(|v| v.is_cstring_pointer);

        let value_type = match entry.type_tag {
            TypeTag::Pointer => ValueType::Pointer {
                pointee_is_int8: is_cstring_pointer,
            },
            TypeTag::Integer => ValueType::Integer { width: 32 },
            TypeTag::Other => ValueType::Other,
        };
        let (recorder, normalization) = plan_for(value_type);
        out.push_str(&format!(
            "{},{},{},{:?},{:?}\n",
            entry.function, entry.name, var_id, recorder, normalization
        ));
    }

    std::fs::write(&cli.plan_output, out)
        .with_context(|| format!("writing plan to {}", cli.plan_output.display()))?;
    tracing::info!(count = entries.len(), "wrote instrumentation plan");

    Ok(())
}
