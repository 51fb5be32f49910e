//! Error types for citation formatting.

use papercite_error_reporting::{DiagnosticMessage, DiagnosticMessageBuilder, SourceSpan};
use thiserror::Error;

/// Result type alias for papercite operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading references and styles or formatting
/// citations.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// A citation points to an identifier absent from the reference set.
    #[error("Reference '{id}' not found")]
    UnknownReference {
        id: String,
        location: Option<SourceSpan>,
    },

    /// Two references share a citation label.
    #[error("Citation label '{label}' is used by both '{first}' and '{second}'")]
    DuplicateLabel {
        label: String,
        first: String,
        second: String,
    },

    /// Two references share an identifier.
    #[error("Reference identifier '{id}' is defined more than once")]
    DuplicateId { id: String },

    /// The reference database could not be parsed.
    #[error("Invalid reference data: {message}")]
    InvalidReferenceData { message: String },

    /// The style configuration has an unusable value.
    #[error("Invalid style option '{field}': {message}")]
    InvalidStyle { field: String, message: String },

    /// The style file could not be deserialized.
    #[error("Failed to parse {format} style: {message}")]
    StyleParse { format: String, message: String },
}

impl Error {
    /// Convert this error to a DiagnosticMessage.
    ///
    /// Citation errors use PC-1-* codes, style errors PC-2-*.
    pub fn to_diagnostic(&self) -> DiagnosticMessage {
        match self {
            Error::UnknownReference { id, location } => {
                let mut builder = DiagnosticMessageBuilder::error("Unknown Reference")
                    .with_code("PC-1-1")
                    .problem(format!("Reference `{}` is not defined", id))
                    .add_hint("Is the identifier spelled as in the reference database?");

                if let Some(loc) = location {
                    builder = builder.with_location(loc.clone());
                }

                builder.build()
            }

            Error::DuplicateLabel {
                label,
                first,
                second,
            } => DiagnosticMessageBuilder::error("Duplicate Citation Label")
                .with_code("PC-1-2")
                .problem(format!(
                    "Citation label `{}` must identify exactly one reference",
                    label
                ))
                .add_detail(format!("`{}` uses the label", first))
                .add_detail(format!("`{}` uses it again", second))
                .add_hint("Give each reference a distinct `citation-label`?")
                .build(),

            Error::DuplicateId { id } => DiagnosticMessageBuilder::error("Duplicate Reference Identifier")
                .with_code("PC-1-3")
                .problem(format!("Identifier `{}` is defined more than once", id))
                .build(),

            Error::InvalidReferenceData { message } => {
                DiagnosticMessageBuilder::error("Invalid Reference Data")
                    .with_code("PC-1-4")
                    .problem("The reference database must be a CSL-JSON array of records with non-empty ids")
                    .add_detail(message.clone())
                    .build()
            }

            Error::InvalidStyle { field, message } => DiagnosticMessageBuilder::error("Invalid Style")
                .with_code("PC-2-1")
                .problem(format!("Style option `{}` has an unusable value", field))
                .add_detail(message.clone())
                .build(),

            Error::StyleParse { format, message } => {
                DiagnosticMessageBuilder::error("Style Parse Error")
                    .with_code("PC-2-2")
                    .problem(format!("The style file is not valid {}", format))
                    .add_detail(message.clone())
                    .build()
            }
        }
    }

    /// The source location this error points at, if known.
    pub fn location(&self) -> Option<&SourceSpan> {
        match self {
            Error::UnknownReference { location, .. } => location.as_ref(),
            _ => None,
        }
    }
}
