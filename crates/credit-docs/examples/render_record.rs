//! Record Renderer
//!
//! Renders a credit offer, direct-debit mandate or guarantee letter from a
//! record JSON and an optional render configuration.
//!
//! Usage:
//!   cargo run --example render_record -- <record.json> [config.json] [output.pdf]
//!
//! Examples:
//!   cargo run --example render_record -- input/offer.json
//!   cargo run --example render_record -- input/mandate.json input/render.json output/mandate.pdf
//!
//! Set `RUST_LOG=credit_docs=debug` to see clipping and asset fallbacks.

use anyhow::Context;
use credit_docs::{DocumentRecord, DocumentRenderer, FsAssets, RenderConfig};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <record.json> [config.json] [output.pdf]", args[0]);
        std::process::exit(1);
    }

    let record_path = &args[1];
    let record_json = std::fs::read_to_string(record_path)
        .with_context(|| format!("Failed to read record '{record_path}'"))?;
    let record: DocumentRecord = serde_json::from_str(&record_json)
        .with_context(|| format!("Invalid record '{record_path}'"))?;

    let config = match args.get(2) {
        Some(path) => RenderConfig::from_file(path)
            .with_context(|| format!("Failed to load config '{path}'"))?,
        None => RenderConfig::default(),
    };

    // Default to output/<suggested file name>
    let output_path = match args.get(3) {
        Some(path) => PathBuf::from(path),
        None => Path::new("output").join(record.suggested_file_name()),
    };
    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let assets = FsAssets::new(&config.assets.base_dir);
    let pdf_bytes = DocumentRenderer::new(&config, &assets).render(&record)?;
    std::fs::write(&output_path, pdf_bytes)?;

    println!("Generated: {}", output_path.display());
    Ok(())
}
