//! Core diagnostic message types.
//!
//! This module defines the structures for representing diagnostic messages
//! (errors, warnings, info) following tidyverse-style guidelines.

use crate::source::{SourceContext, SourceSpan};
use serde::{Deserialize, Serialize};

/// The kind of diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// An error that prevents completion
    Error,
    /// A warning that doesn't prevent completion but indicates a problem
    Warning,
    /// Informational message
    Info,
}

/// How detail items should be presented (tidyverse x/i bullet style).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetailKind {
    /// Error detail (✖ bullet in tidyverse style)
    Error,
    /// Info detail (i bullet in tidyverse style)
    Info,
    /// Note detail (plain bullet)
    Note,
}

impl DetailKind {
    fn bullet(self) -> &'static str {
        match self {
            DetailKind::Error => "✖",
            DetailKind::Info => "ℹ",
            DetailKind::Note => "•",
        }
    }

    fn as_json_str(self) -> &'static str {
        match self {
            DetailKind::Error => "error",
            DetailKind::Info => "info",
            DetailKind::Note => "note",
        }
    }
}

/// The content of a message or detail item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageContent {
    /// Plain text content
    Plain(String),
    /// Markdown content (backticks mark identifiers)
    Markdown(String),
}

impl MessageContent {
    /// Get the raw string content for display
    pub fn as_str(&self) -> &str {
        match self {
            MessageContent::Plain(s) => s,
            MessageContent::Markdown(s) => s,
        }
    }

    /// Convert to JSON value with type information
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::json;
        match self {
            MessageContent::Plain(s) => json!({
                "type": "plain",
                "content": s
            }),
            MessageContent::Markdown(s) => json!({
                "type": "markdown",
                "content": s
            }),
        }
    }
}

impl From<String> for MessageContent {
    fn from(s: String) -> Self {
        MessageContent::Markdown(s)
    }
}

impl From<&str> for MessageContent {
    fn from(s: &str) -> Self {
        MessageContent::Markdown(s.to_string())
    }
}

/// A detail item in a diagnostic message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailItem {
    /// The kind of detail (error, info, note)
    pub kind: DetailKind,
    /// The content of the detail
    pub content: MessageContent,
}

/// A diagnostic message following tidyverse-style structure.
///
/// Structure:
/// 1. **Code**: Optional error code (e.g., "PC-1-1") for searchability
/// 2. **Title**: Brief error message
/// 3. **Kind**: Error, Warning, Info
/// 4. **Problem**: What went wrong (the "must" or "can't" statement)
/// 5. **Details**: Specific information (bulleted)
/// 6. **Hints**: Optional guidance for fixing (ends with ?)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticMessage {
    /// Optional error code (e.g., "PC-1-1")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Brief title for the error
    pub title: String,

    /// The kind of diagnostic (Error, Warning, Info)
    pub kind: DiagnosticKind,

    /// The problem statement (the "what" - using "must" or "can't")
    pub problem: Option<MessageContent>,

    /// Specific error details
    pub details: Vec<DetailItem>,

    /// Optional hints for fixing (ends with ?)
    pub hints: Vec<MessageContent>,

    /// Where in a source document the issue occurred.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceSpan>,
}

impl DiagnosticMessage {
    /// Create a new diagnostic message with just a title and kind.
    ///
    /// Prefer [`DiagnosticMessageBuilder`](crate::DiagnosticMessageBuilder)
    /// for anything with a problem statement or details.
    pub fn new(kind: DiagnosticKind, title: impl Into<String>) -> Self {
        Self {
            code: None,
            title: title.into(),
            kind,
            problem: None,
            details: Vec::new(),
            hints: Vec::new(),
            location: None,
        }
    }

    /// Create an error diagnostic.
    pub fn error(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Error, title)
    }

    /// Create a warning diagnostic.
    pub fn warning(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Warning, title)
    }

    /// Set the error code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Is this an error (as opposed to a warning or info)?
    pub fn is_error(&self) -> bool {
        self.kind == DiagnosticKind::Error
    }

    /// Render this diagnostic message as text following tidyverse style.
    ///
    /// Format:
    /// ```text
    /// Error [PC-1-1]: title
    /// Problem statement here
    /// ✖ Error detail
    /// ℹ Info detail
    /// ? Hint
    /// ```
    ///
    /// When the message has a location and `ctx` holds the file it points
    /// into, the title and problem are shown as an ariadne source excerpt
    /// instead.
    ///
    /// # Example
    ///
    /// ```
    /// use papercite_error_reporting::DiagnosticMessageBuilder;
    ///
    /// let msg = DiagnosticMessageBuilder::error("Invalid input")
    ///     .problem("Values must be numeric")
    ///     .add_detail("Found text in column 3")
    ///     .add_hint("Convert to numbers first?")
    ///     .build();
    /// let text = msg.to_text(None);
    /// assert!(text.contains("Error: Invalid input"));
    /// assert!(text.contains("Values must be numeric"));
    /// ```
    pub fn to_text(&self, ctx: Option<&SourceContext>) -> String {
        let mut lines: Vec<String> = Vec::new();

        let excerpt = match (&self.location, ctx) {
            (Some(location), Some(ctx)) => self.render_ariadne_source_context(location, ctx),
            _ => None,
        };

        match excerpt {
            Some(excerpt) => lines.push(excerpt.trim_end().to_string()),
            None => {
                let kind_str = match self.kind {
                    DiagnosticKind::Error => "Error",
                    DiagnosticKind::Warning => "Warning",
                    DiagnosticKind::Info => "Info",
                };
                match &self.code {
                    Some(code) => lines.push(format!("{} [{}]: {}", kind_str, code, self.title)),
                    None => lines.push(format!("{}: {}", kind_str, self.title)),
                }
                if let Some(location) = &self.location {
                    lines.push(format!(
                        "at {} (bytes {}..{})",
                        location.file, location.start, location.end
                    ));
                }
                if let Some(problem) = &self.problem {
                    lines.push(problem.as_str().to_string());
                }
            }
        }

        for detail in &self.details {
            lines.push(format!("{} {}", detail.kind.bullet(), detail.content.as_str()));
        }

        for hint in &self.hints {
            lines.push(format!("? {}", hint.as_str()));
        }

        lines.join("\n")
    }

    /// Render this diagnostic message as a JSON value.
    ///
    /// # Example
    ///
    /// ```
    /// use papercite_error_reporting::DiagnosticMessage;
    ///
    /// let msg = DiagnosticMessage::error("Something went wrong");
    /// let json = msg.to_json();
    /// assert_eq!(json["kind"], "error");
    /// assert_eq!(json["title"], "Something went wrong");
    /// ```
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::json;

        let kind_str = match self.kind {
            DiagnosticKind::Error => "error",
            DiagnosticKind::Warning => "warning",
            DiagnosticKind::Info => "info",
        };

        let mut obj = json!({
            "kind": kind_str,
            "title": self.title,
        });

        if let Some(code) = &self.code {
            obj["code"] = json!(code);
        }

        if let Some(problem) = &self.problem {
            obj["problem"] = problem.to_json();
        }

        if !self.details.is_empty() {
            let details: Vec<_> = self
                .details
                .iter()
                .map(|d| {
                    json!({
                        "kind": d.kind.as_json_str(),
                        "content": d.content.to_json()
                    })
                })
                .collect();
            obj["details"] = json!(details);
        }

        if !self.hints.is_empty() {
            let hints: Vec<_> = self.hints.iter().map(|h| h.to_json()).collect();
            obj["hints"] = json!(hints);
        }

        if let Some(location) = &self.location {
            obj["location"] = json!(location);
        }

        obj
    }

    /// Render the source excerpt with ariadne.
    ///
    /// Returns `None` when the location's file is not registered in `ctx`.
    fn render_ariadne_source_context(
        &self,
        location: &SourceSpan,
        ctx: &SourceContext,
    ) -> Option<String> {
        use ariadne::{Color, Config, Label, Report, ReportKind, Source};

        let file = ctx.get_file(&location.file)?;
        let len = file.content.len();
        let span = location.start.min(len)..location.end.min(len);

        let (report_kind, color) = match self.kind {
            DiagnosticKind::Error => (ReportKind::Error, Color::Red),
            DiagnosticKind::Warning => (ReportKind::Warning, Color::Yellow),
            DiagnosticKind::Info => (ReportKind::Advice, Color::Cyan),
        };

        let mut report = Report::build(report_kind, file.name.clone(), span.start)
            .with_config(Config::default().with_color(false));

        report = match &self.code {
            Some(code) => report.with_message(format!("[{}] {}", code, self.title)),
            None => report.with_message(&self.title),
        };

        let label_message = match &self.problem {
            Some(problem) => problem.as_str(),
            None => &self.title,
        };
        report = report.with_label(
            Label::new((file.name.clone(), span))
                .with_message(label_message)
                .with_color(color),
        );

        let mut output = Vec::new();
        report
            .finish()
            .write((file.name.clone(), Source::from(file.content.as_str())), &mut output)
            .ok()?;

        String::from_utf8(output).ok()
    }
}
