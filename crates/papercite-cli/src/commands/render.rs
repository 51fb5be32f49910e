//! Render command implementation.
//!
//! Scans a Markdown document for citation clusters, replaces each with its
//! in-text marker, and appends a `# References` section.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use papercite::OutputFormat;
use papercite::scan::{citations, replace_citations, scan_citations};
use tracing::info;

use super::{Reporter, StyleOptions, load_processor, load_style, write_output};

/// Arguments for the render command
#[derive(Debug)]
pub struct RenderArgs {
    /// Markdown document
    pub document: PathBuf,
    /// CSL-JSON reference database
    pub bibliography: PathBuf,
    pub style: StyleOptions,
    pub to: OutputFormat,
    /// Output file path (stdout when absent)
    pub output: Option<PathBuf>,
}

/// Execute the render command
pub fn execute(args: RenderArgs, reporter: &mut Reporter) -> Result<()> {
    let style = load_style(&args.style)?;
    let processor = load_processor(&args.bibliography, style)?;

    let text = fs::read_to_string(&args.document)
        .with_context(|| format!("Failed to read document {}", args.document.display()))?;
    let name = args.document.display().to_string();
    reporter.add_source(name.clone(), text.clone());

    let clusters = scan_citations(&name, &text);
    let rendered = processor.process(&citations(&clusters))?;

    let mut out = replace_citations(&text, &clusters, &rendered.in_text);
    if !rendered.bibliography.is_empty() {
        if !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("\n# References\n\n");
        out.push_str(&rendered.bibliography.render(args.to));
    }

    info!(
        citations = clusters.len(),
        references = rendered.bibliography.len(),
        "rendered {}",
        name
    );

    write_output(args.output.as_deref(), out.trim_end())
}
