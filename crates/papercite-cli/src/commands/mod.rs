//! Command implementations for the papercite CLI
//!
//! Each command module handles the CLI interface and delegates to the
//! `papercite` crate for the actual formatting.

pub mod bibliography;
pub mod check;
pub mod render;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use papercite::style::Layout;
use papercite::{Processor, StyleConfig, StyleFormat, load_references};
use papercite_error_reporting::SourceContext;
use tracing::debug;

/// Where the style comes from, plus command-line overrides.
#[derive(Debug, Default)]
pub struct StyleOptions {
    pub path: Option<PathBuf>,
    pub layout: Option<Layout>,
}

/// Load the style file (or the default style) and apply overrides.
pub fn load_style(options: &StyleOptions) -> Result<StyleConfig> {
    let mut style = match &options.path {
        None => StyleConfig::default(),
        Some(path) => {
            let format = StyleFormat::from_path(path).with_context(|| {
                format!(
                    "Cannot tell the format of style file {} (expected .toml, .yaml, .yml or .json)",
                    path.display()
                )
            })?;
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read style file {}", path.display()))?;
            debug!(path = %path.display(), ?format, "loaded style file");
            StyleConfig::parse(&content, format)?
        }
    };

    if let Some(layout) = options.layout {
        style.bibliography.layout = layout;
    }
    Ok(style)
}

/// Read a CSL-JSON reference database and build a processor over it.
pub fn load_processor(references: &Path, style: StyleConfig) -> Result<Processor> {
    let json = fs::read_to_string(references)
        .with_context(|| format!("Failed to read references from {}", references.display()))?;
    let refs = load_references(&json)?;
    Ok(Processor::new(style, refs)?)
}

/// Write `content` to `output`, or to stdout when no file is given.
///
/// Either way the output ends with a single newline.
pub fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => fs::write(path, format!("{}\n", content))
            .with_context(|| format!("Failed to write output to {}", path.display())),
        None => {
            println!("{}", content);
            Ok(())
        }
    }
}

/// Prints diagnostics to stderr, with source excerpts for documents the
/// commands have registered.
pub struct Reporter {
    json: bool,
    sources: SourceContext,
}

impl Reporter {
    pub fn new(json: bool) -> Self {
        Self {
            json,
            sources: SourceContext::new(),
        }
    }

    /// Register a document so diagnostics pointing into it show an excerpt.
    pub fn add_source(&mut self, name: impl Into<String>, content: impl Into<String>) {
        self.sources.add_file(name, content);
    }

    /// Report a library error as a diagnostic.
    pub fn report(&self, err: &papercite::Error) {
        let diagnostic = err.to_diagnostic();
        if self.json {
            eprintln!("{}", diagnostic.to_json());
        } else {
            eprintln!("{}", diagnostic.to_text(Some(&self.sources)));
        }
    }

    /// Report the error a command failed with.
    pub fn report_error(&self, err: &anyhow::Error) {
        if let Some(err) = err.downcast_ref::<papercite::Error>() {
            self.report(err);
        } else if self.json {
            eprintln!(
                "{}",
                serde_json::json!({ "kind": "error", "title": format!("{:#}", err) })
            );
        } else {
            eprintln!("Error: {:#}", err);
        }
    }
}
