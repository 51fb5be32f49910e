//! Check command implementation.
//!
//! Loading the reference database already rejects duplicate ids and labels;
//! with a document, every citation in it must also resolve.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use papercite::scan::{citations, scan_citations};
use tracing::info;

use super::{Reporter, StyleOptions, load_processor, load_style};

/// Arguments for the check command
#[derive(Debug)]
pub struct CheckArgs {
    /// CSL-JSON reference database
    pub references: PathBuf,
    /// Document whose citations are resolved
    pub document: Option<PathBuf>,
    pub style: StyleOptions,
}

/// Execute the check command
pub fn execute(args: CheckArgs, reporter: &mut Reporter) -> Result<()> {
    let style = load_style(&args.style)?;
    let processor = load_processor(&args.references, style)?;
    info!(references = processor.len(), "reference database is valid");

    let Some(document) = &args.document else {
        println!("{}: {} references", args.references.display(), processor.len());
        return Ok(());
    };

    let text = fs::read_to_string(document)
        .with_context(|| format!("Failed to read document {}", document.display()))?;
    let name = document.display().to_string();
    reporter.add_source(name.clone(), text.clone());

    let clusters = scan_citations(&name, &text);
    let errors = processor.unresolved(&citations(&clusters));
    for err in &errors {
        reporter.report(err);
    }

    if !errors.is_empty() {
        bail!("{} unresolved citation(s) in {}", errors.len(), name);
    }

    println!(
        "{}: {} citations, all resolved against {} references",
        name,
        clusters.len(),
        processor.len()
    );
    Ok(())
}
