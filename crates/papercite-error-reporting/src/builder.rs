//! Builder API for diagnostic messages.
//!
//! The builder encodes the tidyverse four-part error structure directly in
//! the API: title, problem, details, hints.

use crate::diagnostic::{DetailItem, DetailKind, DiagnosticKind, DiagnosticMessage, MessageContent};
use crate::source::SourceSpan;

/// Builder for creating diagnostic messages following tidyverse guidelines.
///
/// # Example
///
/// ```
/// use papercite_error_reporting::DiagnosticMessageBuilder;
///
/// let error = DiagnosticMessageBuilder::error("Duplicate Citation Label")
///     .with_code("PC-1-2")
///     .problem("Citation label `P1928R3` is used by more than one reference")
///     .add_detail("First used by `kretz-simd-r3`")
///     .add_detail("Used again by `simd-r3`")
///     .add_hint("Give each reference a distinct `citation-label`?")
///     .build();
///
/// assert_eq!(error.code, Some("PC-1-2".to_string()));
/// assert_eq!(error.details.len(), 2);
/// assert_eq!(error.hints.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct DiagnosticMessageBuilder {
    kind: DiagnosticKind,
    title: String,
    code: Option<String>,
    problem: Option<MessageContent>,
    details: Vec<DetailItem>,
    hints: Vec<MessageContent>,
    location: Option<SourceSpan>,
}

impl DiagnosticMessageBuilder {
    /// Create a new builder with the specified kind and title.
    pub fn new(kind: DiagnosticKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            code: None,
            problem: None,
            details: Vec::new(),
            hints: Vec::new(),
            location: None,
        }
    }

    /// Create an error diagnostic builder.
    pub fn error(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Error, title)
    }

    /// Create a warning diagnostic builder.
    pub fn warning(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Warning, title)
    }

    /// Create an info diagnostic builder.
    pub fn info(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Info, title)
    }

    /// Set the error code (`PC-<subsystem>-<number>`).
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Set the problem statement.
    ///
    /// The problem statement should use "must" for requirements or "can't"
    /// for impossibilities.
    pub fn problem(mut self, stmt: impl Into<MessageContent>) -> Self {
        self.problem = Some(stmt.into());
        self
    }

    /// Add an error detail (displayed with error/cross bullet).
    pub fn add_detail(mut self, detail: impl Into<MessageContent>) -> Self {
        self.details.push(DetailItem {
            kind: DetailKind::Error,
            content: detail.into(),
        });
        self
    }

    /// Add an info detail (displayed with info bullet).
    pub fn add_info(mut self, info: impl Into<MessageContent>) -> Self {
        self.details.push(DetailItem {
            kind: DetailKind::Info,
            content: info.into(),
        });
        self
    }

    /// Add a note detail (displayed with plain bullet).
    pub fn add_note(mut self, note: impl Into<MessageContent>) -> Self {
        self.details.push(DetailItem {
            kind: DetailKind::Note,
            content: note.into(),
        });
        self
    }

    /// Add a hint for fixing the error. Hints that suggest an action end
    /// with a question mark.
    pub fn add_hint(mut self, hint: impl Into<MessageContent>) -> Self {
        self.hints.push(hint.into());
        self
    }

    /// Attach a source location.
    pub fn with_location(mut self, location: SourceSpan) -> Self {
        self.location = Some(location);
        self
    }

    /// Build the diagnostic message.
    pub fn build(self) -> DiagnosticMessage {
        DiagnosticMessage {
            code: self.code,
            title: self.title,
            kind: self.kind,
            problem: self.problem,
            details: self.details,
            hints: self.hints,
            location: self.location,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_kinds() {
        assert_eq!(
            DiagnosticMessageBuilder::error("e").build().kind,
            DiagnosticKind::Error
        );
        assert_eq!(
            DiagnosticMessageBuilder::warning("w").build().kind,
            DiagnosticKind::Warning
        );
        assert_eq!(
            DiagnosticMessageBuilder::info("i").build().kind,
            DiagnosticKind::Info
        );
    }

    #[test]
    fn test_builder_problem() {
        let msg = DiagnosticMessageBuilder::error("Test")
            .problem("Something went wrong")
            .build();
        assert_eq!(msg.problem.unwrap().as_str(), "Something went wrong");
    }

    #[test]
    fn test_builder_details() {
        let msg = DiagnosticMessageBuilder::error("Test")
            .add_detail("Detail 1")
            .add_info("Info 1")
            .add_note("Note 1")
            .build();

        assert_eq!(msg.details.len(), 3);
        assert_eq!(msg.details[0].kind, DetailKind::Error);
        assert_eq!(msg.details[1].kind, DetailKind::Info);
        assert_eq!(msg.details[2].kind, DetailKind::Note);
    }

    #[test]
    fn test_builder_location() {
        let msg = DiagnosticMessageBuilder::error("Test")
            .with_location(SourceSpan::new("a.md", 1..3))
            .build();
        assert_eq!(msg.location, Some(SourceSpan::new("a.md", 1..3)));
    }
}
