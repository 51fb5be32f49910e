//! Label-style citation formatting for standards proposals.
//!
//! This crate takes:
//! - Bibliographic [`Reference`]s in CSL-JSON format
//! - [`Citation`]s, either built directly or scanned from Markdown with
//!   [`scan::scan_citations`]
//! - A [`StyleConfig`]
//!
//! And produces in-text markers such as `[P1928R3:3.2]` plus a bibliography
//! sorted by citation label:
//!
//! ```text
//! [P1928R3] Matthias Kretz. 2023-02-03. std::simd - merge data-parallel types from the Parallelism TS 2.
//!     https://wg21.link/p1928r3
//! ```
//!
//! # Architecture
//!
//! ```text
//! References + Citations + StyleConfig
//!              │
//!              ▼
//!        Processor (types)  ── resolve, sort, collapse
//!              │
//!              ▼
//!        eval  ── Output AST with semantic tags
//!              │
//!              ▼
//!        output / layout  ── plain text or HTML
//! ```
//!
//! # Example
//!
//! ```
//! use papercite::{Citation, CitationItem, Processor, StyleConfig, load_references};
//!
//! let refs = load_references(r#"[
//!     {"id": "P1928R3", "citation-label": "P1928R3", "title": "std::simd",
//!      "URL": "https://wg21.link/p1928r3"}
//! ]"#)?;
//! let processor = Processor::new(StyleConfig::default(), refs)?;
//!
//! let citation = Citation::new(vec![CitationItem::new("P1928R3").with_locator("3.2")]);
//! assert_eq!(processor.format_in_text(&[citation])?, "[P1928R3:3.2]");
//! # Ok::<(), papercite::Error>(())
//! ```

pub mod error;
pub mod layout;
pub mod output;
pub mod reference;
pub mod scan;
pub mod style;
pub mod types;

mod eval;

// Re-export main types
pub use error::{Error, Result};
pub use eval::doi_url;
pub use layout::{Bibliography, BibliographyEntry, OutputFormat};
pub use output::{Output, Tag};
pub use reference::{DateParts, DateVariable, Name, Reference, load_references};
pub use style::{StyleConfig, StyleFormat};
pub use types::{Citation, CitationItem, Processor, RenderedDocument};
