//! Bibliography command implementation.

use std::path::PathBuf;

use anyhow::Result;
use papercite::OutputFormat;

use super::{StyleOptions, load_processor, load_style, write_output};

/// Arguments for the bibliography command
#[derive(Debug)]
pub struct BibliographyArgs {
    /// CSL-JSON reference database
    pub references: PathBuf,
    pub style: StyleOptions,
    pub to: OutputFormat,
    /// Reference ids to include; empty means every reference
    pub ids: Vec<String>,
}

/// Execute the bibliography command
pub fn execute(args: BibliographyArgs) -> Result<()> {
    let style = load_style(&args.style)?;
    let processor = load_processor(&args.references, style)?;

    let bibliography = if args.ids.is_empty() {
        processor.bibliography_all()
    } else {
        processor.bibliography(args.ids.iter().map(String::as_str))?
    };

    write_output(None, &bibliography.render(args.to))
}
