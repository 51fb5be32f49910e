//! Error reporting and diagnostic messages for papercite.
//!
//! Diagnostics follow the tidyverse message structure: a short title, a
//! problem statement, bulleted details, and optional hints.
//!
//! - [`DiagnosticMessage`]: the main message structure
//! - [`DiagnosticMessageBuilder`]: builder that encodes the message structure
//! - [`SourceSpan`] / [`SourceContext`]: byte ranges into documents, rendered
//!   with ariadne when the document text is available
//! - [`catalog`]: the `PC-*` error code catalog
//!
//! # Example
//!
//! ```
//! use papercite_error_reporting::DiagnosticMessageBuilder;
//!
//! let error = DiagnosticMessageBuilder::error("Unknown Reference")
//!     .with_code("PC-1-1")
//!     .problem("Reference `P9999R0` is not defined")
//!     .add_hint("Is the identifier spelled the same way as in the bibliography?")
//!     .build();
//!
//! assert!(error.to_text(None).contains("P9999R0"));
//! ```

pub mod builder;
pub mod catalog;
pub mod diagnostic;
pub mod source;

pub use builder::DiagnosticMessageBuilder;
pub use catalog::{ERROR_CATALOG, ErrorCodeInfo, get_error_info, get_subsystem};
pub use diagnostic::{DetailItem, DetailKind, DiagnosticKind, DiagnosticMessage, MessageContent};
pub use source::{SourceContext, SourceFile, SourceSpan};
