//! Bibliography layout.
//!
//! Entries are evaluated to an [`Output`] label field and body; this module
//! arranges them into a text block or an HTML fragment according to the
//! configured [`Layout`].

use crate::output::{Display, Formatting, Output, escape_html};
use crate::style::{BibliographyOptions, Layout};
use once_cell::sync::Lazy;
use regex::Regex;

/// Target format for rendered output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Html,
}

/// One formatted bibliography entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibliographyEntry {
    /// Identifier of the reference.
    pub id: String,
    /// Effective citation label.
    pub label: String,
    /// The bracketed label field.
    pub label_output: Output,
    /// Everything after the label field.
    pub body: Output,
}

impl BibliographyEntry {
    /// Width in characters of the rendered label field.
    pub fn label_width(&self) -> usize {
        self.label_output.render().chars().count()
    }

    /// The whole entry as an Output tree for `layout`.
    pub fn to_output(&self, layout: Layout) -> Output {
        match layout {
            Layout::HangingIndent => Output::sequence(vec![
                self.label_output.clone(),
                Output::literal(" "),
                self.body.clone(),
            ]),
            Layout::ColumnAligned => Output::sequence(vec![
                Output::formatted(
                    Formatting::display(Display::LeftMargin),
                    vec![self.label_output.clone()],
                ),
                Output::formatted(
                    Formatting::display(Display::RightInline),
                    vec![self.body.clone()],
                ),
            ]),
        }
    }

    /// Lay the entry out as plain text.
    ///
    /// `label_width` is the column width reserved for labels under
    /// [`Layout::ColumnAligned`]; it is ignored for hanging indentation.
    pub fn render_text(&self, options: &BibliographyOptions, label_width: usize) -> String {
        let label = self.label_output.render();
        let (first_prefix, indent) = match options.layout {
            Layout::HangingIndent => (format!("{} ", label), " ".repeat(options.hanging_indent)),
            Layout::ColumnAligned => {
                let pad = (label_width + 1).saturating_sub(label.chars().count());
                (
                    format!("{}{}", label, " ".repeat(pad)),
                    " ".repeat(label_width + 1),
                )
            }
        };

        let mut lines = Vec::new();
        for (i, body_line) in self.body.render_lines().iter().enumerate() {
            let prefix = if i == 0 { first_prefix.as_str() } else { indent.as_str() };
            lines.extend(wrap_line(body_line, prefix, &indent, options.line_width));
        }
        lines.join("\n")
    }
}

/// A word and the whitespace before it.
static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\s*)(\S+)").unwrap());

/// Greedily wrap `text` after `first_prefix`, indenting continuation lines.
///
/// Words wider than the line are kept whole. Spacing between words on the
/// same line is kept as written; a break replaces it.
fn wrap_line(text: &str, first_prefix: &str, indent: &str, width: Option<usize>) -> Vec<String> {
    let Some(width) = width else {
        return vec![format!("{}{}", first_prefix, text).trim_end().to_string()];
    };

    let mut lines = Vec::new();
    let mut current = first_prefix.to_string();
    let mut current_len = current.chars().count();

    for (i, caps) in WORD.captures_iter(text).enumerate() {
        let gap = &caps[1];
        let word = &caps[2];
        let word_len = word.chars().count();
        let needed = gap.chars().count() + word_len;

        if i > 0 && current_len + needed > width {
            lines.push(current.trim_end().to_string());
            current = format!("{}{}", indent, word);
            current_len = indent.chars().count() + word_len;
        } else {
            current.push_str(gap);
            current.push_str(word);
            current_len += needed;
        }
    }

    lines.push(current.trim_end().to_string());
    lines
}

/// A sorted, formatted bibliography.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bibliography {
    entries: Vec<BibliographyEntry>,
    options: BibliographyOptions,
}

impl Bibliography {
    pub fn new(entries: Vec<BibliographyEntry>, options: BibliographyOptions) -> Self {
        Self { entries, options }
    }

    pub fn entries(&self) -> &[BibliographyEntry] {
        &self.entries
    }

    /// Identifiers in bibliography order.
    pub fn ids(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn render(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Text => self.render_text(),
            OutputFormat::Html => self.render_html(),
        }
    }

    /// Entries separated by newlines; an empty bibliography is empty text.
    pub fn render_text(&self) -> String {
        let label_width = self
            .entries
            .iter()
            .map(BibliographyEntry::label_width)
            .max()
            .unwrap_or(0);

        self.entries
            .iter()
            .map(|e| e.render_text(&self.options, label_width))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn render_html(&self) -> String {
        if self.entries.is_empty() {
            return String::new();
        }

        let class = match self.options.layout {
            Layout::HangingIndent => "csl-bib-body hanging-indent",
            Layout::ColumnAligned => "csl-bib-body",
        };

        let mut html = format!("<div class=\"{}\">\n", class);
        for entry in &self.entries {
            html.push_str(&format!(
                "  <div class=\"csl-entry\" id=\"ref-{}\">{}</div>\n",
                escape_html(&entry.id),
                entry.to_output(self.options.layout).render_html()
            ));
        }
        html.push_str("</div>");
        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_line_keeps_long_words() {
        let lines = wrap_line("a https://example.org/very/long b", "[X] ", "  ", Some(10));
        assert_eq!(lines, vec!["[X] a", "  https://example.org/very/long", "  b"]);
    }

    #[test]
    fn test_wrap_line_without_width() {
        assert_eq!(wrap_line("Title.", "[X] ", "    ", None), vec!["[X] Title."]);
    }

    #[test]
    fn test_wrap_line_fills_greedily() {
        let lines = wrap_line("one two three four", "", "  ", Some(9));
        assert_eq!(lines, vec!["one two", "  three", "  four"]);
    }

    #[test]
    fn test_wrap_line_keeps_inner_spacing() {
        let lines = wrap_line("x  <  y", "[A] ", "    ", Some(40));
        assert_eq!(lines, vec!["[A] x  <  y"]);

        let lines = wrap_line("aa   bb", "", "  ", Some(4));
        assert_eq!(lines, vec!["aa", "  bb"]);
    }
}
