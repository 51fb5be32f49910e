//! Output building for formatted citations.
//!
//! Formatting produces an [`Output`] tree rather than strings. Tags keep the
//! semantic role of each piece (label, names, date, title, locator) so the
//! same tree renders to plain text and HTML, and so tests can inspect what a
//! piece of output is rather than how it looks.

use serde::{Deserialize, Serialize};

/// Font style for a formatted span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

/// Display mode of a formatted span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    /// Starts on its own line.
    Block,
    /// The first field of a column-aligned entry.
    LeftMargin,
    /// The rest of a column-aligned entry.
    RightInline,
}

impl Display {
    fn css_class(self) -> &'static str {
        match self {
            Display::Block => "csl-block",
            Display::LeftMargin => "csl-left-margin",
            Display::RightInline => "csl-right-inline",
        }
    }
}

/// Formatting attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Formatting {
    pub font_style: FontStyle,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub display: Option<Display>,
}

impl Formatting {
    pub fn display(display: Display) -> Self {
        Self {
            display: Some(display),
            ..Default::default()
        }
    }

    pub fn italic() -> Self {
        Self {
            font_style: FontStyle::Italic,
            ..Default::default()
        }
    }

    pub fn affixes(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let suffix = suffix.into();
        Self {
            prefix: (!prefix.is_empty()).then_some(prefix),
            suffix: (!suffix.is_empty()).then_some(suffix),
            ..Default::default()
        }
    }
}

/// Semantic tags for output nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    /// A citation label (in-text marker entry or bibliography first field).
    Label(String),
    /// An author list.
    Names,
    /// A formatted date.
    Date,
    /// A title.
    Title,
    /// A DOI or URL locator.
    Locator,
    /// An in-text locator such as a page or section.
    CiteLocator,
}

/// Intermediate output representation with semantic tagging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// A formatted group of children.
    Formatted {
        formatting: Formatting,
        children: Vec<Output>,
    },
    /// A hyperlink wrapping children.
    Linked { url: String, children: Vec<Output> },
    /// Literal text content.
    Literal(String),
    /// Semantically tagged content.
    Tagged { tag: Tag, child: Box<Output> },
    /// Empty output.
    Null,
}

impl Output {
    /// Create a literal text node.
    pub fn literal(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.is_empty() {
            Output::Null
        } else {
            Output::Literal(s)
        }
    }

    /// Create a formatted node with children.
    pub fn formatted(formatting: Formatting, children: Vec<Output>) -> Self {
        let children: Vec<_> = children.into_iter().filter(|c| !c.is_null()).collect();
        if children.is_empty() {
            Output::Null
        } else {
            Output::Formatted {
                formatting,
                children,
            }
        }
    }

    /// Create a tagged node.
    pub fn tagged(tag: Tag, child: Output) -> Self {
        if child.is_null() {
            Output::Null
        } else {
            Output::Tagged {
                tag,
                child: Box::new(child),
            }
        }
    }

    /// Create a linked node.
    pub fn linked(url: impl Into<String>, children: Vec<Output>) -> Self {
        let children: Vec<_> = children.into_iter().filter(|c| !c.is_null()).collect();
        if children.is_empty() {
            Output::Null
        } else {
            Output::Linked {
                url: url.into(),
                children,
            }
        }
    }

    /// Create a sequence of outputs (flattened into Formatted with no formatting).
    pub fn sequence(children: Vec<Output>) -> Self {
        let mut children: Vec<_> = children.into_iter().filter(|c| !c.is_null()).collect();
        match children.len() {
            0 => Output::Null,
            1 => children.remove(0),
            _ => Output::Formatted {
                formatting: Formatting::default(),
                children,
            },
        }
    }

    /// Check if this output is null/empty.
    pub fn is_null(&self) -> bool {
        match self {
            Output::Null => true,
            Output::Literal(s) => s.is_empty(),
            Output::Formatted { children, .. } | Output::Linked { children, .. } => {
                children.iter().all(|c| c.is_null())
            }
            Output::Tagged { child, .. } => child.is_null(),
        }
    }

    /// Is the outermost formatting of this output a block-level span?
    pub fn is_block(&self) -> bool {
        match self {
            Output::Formatted { formatting, .. } => formatting.display == Some(Display::Block),
            Output::Tagged { child, .. } => child.is_block(),
            _ => false,
        }
    }

    /// Find the first node carrying `tag` and render it as plain text.
    pub fn find_tagged(&self, tag: &Tag) -> Option<String> {
        match self {
            Output::Null | Output::Literal(_) => None,
            Output::Formatted { children, .. } | Output::Linked { children, .. } => {
                children.iter().find_map(|c| c.find_tagged(tag))
            }
            Output::Tagged { tag: t, child } if t == tag => Some(child.render()),
            Output::Tagged { child, .. } => child.find_tagged(tag),
        }
    }

    /// Render to plain text. Block spans start on their own line.
    pub fn render(&self) -> String {
        self.render_lines().join("\n")
    }

    /// Render to plain text, one string per output line.
    pub fn render_lines(&self) -> Vec<String> {
        let mut renderer = TextRenderer::default();
        renderer.render(self);
        renderer.finish()
    }

    /// Render to an HTML fragment.
    pub fn render_html(&self) -> String {
        let mut out = String::new();
        render_html_into(self, &mut out);
        out
    }
}

/// Plain-text renderer that tracks line breaks around block spans.
#[derive(Default)]
struct TextRenderer {
    lines: Vec<String>,
    current: String,
    break_pending: bool,
}

impl TextRenderer {
    fn push_str(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        if self.break_pending {
            self.break_pending = false;
            if !self.current.trim().is_empty() {
                self.lines.push(std::mem::take(&mut self.current));
            } else {
                self.current.clear();
            }
        }
        self.current.push_str(s);
    }

    fn render(&mut self, output: &Output) {
        match output {
            Output::Null => {}
            Output::Literal(s) => self.push_str(s),
            Output::Formatted {
                formatting,
                children,
            } => {
                let block = formatting.display == Some(Display::Block);
                if block {
                    self.break_pending = true;
                }
                if let Some(prefix) = &formatting.prefix {
                    self.push_str(prefix);
                }
                let italic = formatting.font_style == FontStyle::Italic;
                if italic {
                    self.push_str("*");
                }
                for child in children {
                    self.render(child);
                }
                if italic {
                    self.push_str("*");
                }
                if let Some(suffix) = &formatting.suffix {
                    self.push_str(suffix);
                }
                if block {
                    self.break_pending = true;
                }
            }
            // Links render their text only.
            Output::Linked { children, .. } => {
                for child in children {
                    self.render(child);
                }
            }
            Output::Tagged { child, .. } => self.render(child),
        }
    }

    fn finish(mut self) -> Vec<String> {
        if !self.current.trim().is_empty() || self.lines.is_empty() {
            self.lines.push(self.current);
        }
        self.lines
            .into_iter()
            .map(|line| line.trim_end().to_string())
            .collect()
    }
}

fn render_html_into(output: &Output, out: &mut String) {
    match output {
        Output::Null => {}
        Output::Literal(s) => out.push_str(&escape_html(s)),
        Output::Formatted {
            formatting,
            children,
        } => {
            if let Some(display) = formatting.display {
                out.push_str(&format!("<div class=\"{}\">", display.css_class()));
            }
            if let Some(prefix) = &formatting.prefix {
                out.push_str(&escape_html(prefix));
            }
            let italic = formatting.font_style == FontStyle::Italic;
            if italic {
                out.push_str("<i>");
            }
            for child in children {
                render_html_into(child, out);
            }
            if italic {
                out.push_str("</i>");
            }
            if let Some(suffix) = &formatting.suffix {
                out.push_str(&escape_html(suffix));
            }
            if formatting.display.is_some() {
                out.push_str("</div>");
            }
        }
        Output::Linked { url, children } => {
            out.push_str(&format!("<a href=\"{}\">", escape_html(url)));
            for child in children {
                render_html_into(child, out);
            }
            out.push_str("</a>");
        }
        Output::Tagged { child, .. } => render_html_into(child, out),
    }
}

/// Escape text for inclusion in HTML content or a double-quoted attribute.
pub fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Join multiple outputs with a delimiter.
pub fn join_outputs(outputs: Vec<Output>, delimiter: &str) -> Output {
    let mut non_null: Vec<_> = outputs.into_iter().filter(|o| !o.is_null()).collect();

    match non_null.len() {
        0 => return Output::Null,
        1 => return non_null.remove(0),
        _ => {}
    }

    // Interleave with delimiters
    let mut children = Vec::new();
    for (i, output) in non_null.into_iter().enumerate() {
        if i > 0 && !delimiter.is_empty() {
            children.push(Output::Literal(delimiter.to_string()));
        }
        children.push(output);
    }

    Output::Formatted {
        formatting: Formatting::default(),
        children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_literal_empty_is_null() {
        let output = Output::literal("");
        assert!(output.is_null());
        assert_eq!(output.render(), "");
    }

    #[test]
    fn test_output_formatted_with_italic() {
        let output = Output::formatted(Formatting::italic(), vec![Output::literal("Title")]);
        assert_eq!(output.render(), "*Title*");
        assert_eq!(output.render_html(), "<i>Title</i>");
    }

    #[test]
    fn test_output_formatted_with_affixes() {
        let output = Output::formatted(
            Formatting::affixes("[", "]"),
            vec![Output::literal("P1928R3")],
        );
        assert_eq!(output.render(), "[P1928R3]");
    }

    #[test]
    fn test_output_formatted_all_null_is_null() {
        let output = Output::formatted(Formatting::default(), vec![Output::Null, Output::Null]);
        assert!(output.is_null());
    }

    #[test]
    fn test_output_sequence_single_unwraps() {
        let output = Output::sequence(vec![Output::literal("Only")]);
        assert!(matches!(output, Output::Literal(_)));
    }

    #[test]
    fn test_join_outputs_skips_null() {
        let outputs = vec![Output::literal("A"), Output::Null, Output::literal("C")];
        assert_eq!(join_outputs(outputs, ", ").render(), "A, C");
    }

    #[test]
    fn test_block_starts_new_line() {
        let url = "https://wg21.link/p1928r3";
        let output = Output::sequence(vec![
            Output::literal("Title."),
            Output::literal(" "),
            Output::formatted(
                Formatting::display(Display::Block),
                vec![Output::linked(url, vec![Output::literal(url)])],
            ),
        ]);
        assert_eq!(output.render_lines(), vec!["Title.", url]);
    }

    #[test]
    fn test_lone_block_is_single_line() {
        let output = Output::formatted(
            Formatting::display(Display::Block),
            vec![Output::literal("https://example.org")],
        );
        assert!(output.is_block());
        assert_eq!(output.render(), "https://example.org");
    }

    #[test]
    fn test_html_rendering() {
        let url = "https://example.org/?a=1&b=2";
        let output = Output::sequence(vec![
            Output::literal("<T>"),
            Output::formatted(
                Formatting::display(Display::Block),
                vec![Output::linked(url, vec![Output::literal(url)])],
            ),
        ]);
        assert_eq!(
            output.render_html(),
            "&lt;T&gt;<div class=\"csl-block\"><a href=\"https://example.org/?a=1&amp;b=2\">https://example.org/?a=1&amp;b=2</a></div>"
        );
    }

    #[test]
    fn test_find_tagged() {
        let output = Output::sequence(vec![
            Output::tagged(Tag::Label("P1928R3".to_string()), Output::literal("[P1928R3]")),
            Output::literal(" "),
            Output::tagged(Tag::Title, Output::literal("std::simd")),
        ]);
        assert_eq!(output.find_tagged(&Tag::Title).as_deref(), Some("std::simd"));
        assert_eq!(output.find_tagged(&Tag::Date), None);
    }
}
