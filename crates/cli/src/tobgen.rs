//! tobgen - derive blank fillable TOB declaration forms from the
//! government-issued TD-OB1 templates.
//!
//! Reads `TD-OB1-<LANG>.pdf` per requested language from the assets
//! directory, rewrites the content streams, synthesizes the form
//! fields and strikethrough annotations, and writes `TOB-<LANG>.pdf`.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Parser};
use lopdf::Document;
use rayon::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tobform_core::document::{ordered_pages, page_content};
use tobform_core::parser::extract_blocks;
use tobform_core::template::{Language, blank_template, create_form, template_mods};

/// Derive blank fillable declaration forms from the official
/// templates.
#[derive(Parser, Debug)]
#[command(name = "tobgen")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Comma-separated template languages (default: all)
    #[arg(long, value_delimiter = ',')]
    lang: Vec<Language>,

    /// Directory holding the TD-OB1-<LANG>.pdf templates
    #[arg(long, default_value = "assets")]
    assets: PathBuf,

    /// Output directory for the generated forms
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// TrueType font embedded for field values
    /// (default: <assets>/PDFAHelvetica.ttf)
    #[arg(long)]
    font: Option<PathBuf>,

    /// Log the numbered text blocks of every template page, for
    /// authoring modification tables
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

    let languages = if args.lang.is_empty() {
        Language::ALL.to_vec()
    } else {
        args.lang.clone()
    };
    let font_path = args
        .font
        .clone()
        .unwrap_or_else(|| args.assets.join("PDFAHelvetica.ttf"));
    let font = fs::read(&font_path)
        .with_context(|| format!("reading fill font {}", font_path.display()))?;
    fs::create_dir_all(&args.out)
        .with_context(|| format!("creating output directory {}", args.out.display()))?;

    languages
        .par_iter()
        .try_for_each(|&lang| generate(lang, &args, &font))
}

fn generate(lang: Language, args: &Args, font: &[u8]) -> anyhow::Result<()> {
    let template_path = args.assets.join(format!("TD-OB1-{lang}.pdf"));
    let bytes = fs::read(&template_path)
        .with_context(|| format!("reading template {}", template_path.display()))?;
    let mut doc = Document::load_mem(&bytes)
        .with_context(|| format!("loading template {}", template_path.display()))?;

    if args.debug {
        identify_blocks(&doc, lang)?;
    }

    let mods = template_mods(lang);
    blank_template(&mut doc, &mods, lang)?;
    create_form(&mut doc, &mods, font)?;
    doc.compress();

    let out_path = args.out.join(format!("TOB-{lang}.pdf"));
    let mut buf = Vec::new();
    doc.save_to(&mut buf)?;
    fs::write(&out_path, buf).with_context(|| format!("writing {}", out_path.display()))?;
    info!(%lang, path = %out_path.display(), "generated blank form");
    Ok(())
}

/// Print every text block of the template with its index, the
/// numbering the modification tables refer to.
fn identify_blocks(doc: &Document, lang: Language) -> anyhow::Result<()> {
    let pages = ordered_pages(doc);
    for (page, page_id) in pages.iter().enumerate() {
        println!("----- {lang} page {}/{} -----", page + 1, pages.len());
        let content = page_content(doc, *page_id)?;
        for (i, block) in extract_blocks(&content).iter().enumerate() {
            println!("[{i}] {}", block.text());
        }
    }
    Ok(())
}
