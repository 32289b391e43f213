//! tobfill - fill a blank TOB declaration form with values.
//!
//! Reads a JSON values file (either raw field-name/value pairs or a
//! typed declaration) and writes the filled form.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Parser};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tobform_core::fill::{DeclarationValues, FillValues, fill_template};
use tobform_core::money::Separators;

/// Fill a blank declaration form with values from a JSON file.
#[derive(Parser, Debug)]
#[command(name = "tobfill")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Blank fillable form, as produced by tobgen
    template: PathBuf,

    /// JSON values file
    values: PathBuf,

    /// Output path (default: <template stem>-filled.pdf)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Treat the values file as raw field-name/value pairs instead of
    /// a typed declaration
    #[arg(long, action = ArgAction::SetTrue)]
    raw: bool,

    /// Currency symbol prefixed to monetary amounts
    #[arg(long, default_value = "€")]
    currency: String,

    /// Use debug logging level
    #[arg(short, long, action = ArgAction::SetTrue)]
    debug: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let default_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let blank = fs::read(&args.template)
        .with_context(|| format!("reading template {}", args.template.display()))?;
    let values_json = fs::read_to_string(&args.values)
        .with_context(|| format!("reading values {}", args.values.display()))?;

    let values: FillValues = if args.raw {
        serde_json::from_str(&values_json).context("parsing raw fill values")?
    } else {
        let declaration: DeclarationValues =
            serde_json::from_str(&values_json).context("parsing declaration values")?;
        declaration.to_fill_values(&args.currency, &Separators::default())
    };

    let filled = fill_template(&blank, &values)?;

    let out_path = args.out.clone().unwrap_or_else(|| {
        let stem = args
            .template
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "form".to_string());
        args.template.with_file_name(format!("{stem}-filled.pdf"))
    });
    fs::write(&out_path, filled).with_context(|| format!("writing {}", out_path.display()))?;
    info!(path = %out_path.display(), "filled form");
    Ok(())
}
