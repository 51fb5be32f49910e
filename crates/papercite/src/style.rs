//! Style configuration.
//!
//! A [`StyleConfig`] holds the formatting rules for in-text markers and the
//! bibliography. It is loaded once, validated, and read-only afterwards.
//! The defaults describe the label style used by standards proposals:
//! `[P1928R3:3.2]` markers, a bibliography sorted by citation label, DOI
//! preferred over a bare URL, and hanging indentation.
//!
//! Styles deserialize from TOML, YAML or JSON with kebab-case keys; every
//! field is optional:
//!
//! ```toml
//! [citation]
//! locator-delimiter = ":"
//! collapse = "citation-label"
//!
//! [bibliography]
//! sort = "citation-label"
//! layout = "hanging-indent"
//! locator-preference = ["doi", "url"]
//! ```

use crate::error::{Error, Result};
use crate::output::FontStyle;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete style configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct StyleConfig {
    pub citation: CitationOptions,
    pub bibliography: BibliographyOptions,
}

/// Options for in-text citation markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct CitationOptions {
    /// Text opening a marker.
    pub prefix: String,
    /// Text closing a marker.
    pub suffix: String,
    /// Delimiter between entries inside one marker.
    pub delimiter: String,
    /// Delimiter between a label and its locator.
    pub locator_delimiter: String,
    /// Delimiter between the locators of a collapsed entry.
    pub collapse_delimiter: String,
    /// Which cites are merged into one entry.
    pub collapse: Collapse,
    /// Sort entries inside a marker by the bibliography sort key.
    pub sort: bool,
}

impl Default for CitationOptions {
    fn default() -> Self {
        Self {
            prefix: "[".to_string(),
            suffix: "]".to_string(),
            delimiter: ", ".to_string(),
            locator_delimiter: ":".to_string(),
            collapse_delimiter: ",".to_string(),
            collapse: Collapse::CitationLabel,
            sort: true,
        }
    }
}

/// Collapsing key for in-text entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Collapse {
    /// Every cite is its own entry.
    None,
    /// Cites sharing a citation label merge into one entry.
    CitationLabel,
}

/// Options for the bibliography.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct BibliographyOptions {
    pub sort: SortKey,
    pub date_granularity: DateGranularity,
    /// Locator kinds to try, in order. An empty list never renders a locator.
    pub locator_preference: Vec<LocatorKind>,
    pub names: NameOptions,
    pub title_font_style: FontStyle,
    pub layout: Layout,
    /// Indent of continuation lines under [`Layout::HangingIndent`].
    pub hanging_indent: usize,
    /// Wrap plain-text output at this many columns.
    pub line_width: Option<usize>,
}

impl Default for BibliographyOptions {
    fn default() -> Self {
        Self {
            sort: SortKey::CitationLabel,
            date_granularity: DateGranularity::Day,
            locator_preference: vec![LocatorKind::Doi, LocatorKind::Url],
            names: NameOptions::default(),
            title_font_style: FontStyle::Normal,
            layout: Layout::HangingIndent,
            hanging_indent: 4,
            line_width: None,
        }
    }
}

/// Bibliography (and in-text) sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Lexicographic by citation label.
    CitationLabel,
    /// First author, then issued date, then citation label.
    AuthorDate,
}

/// Finest date component rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateGranularity {
    Year,
    Month,
    Day,
}

/// A locator field a bibliography entry can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LocatorKind {
    Doi,
    Url,
}

/// Bibliography layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    /// Continuation lines indent relative to the first line.
    HangingIndent,
    /// The label field forms a column; the rest of the entry aligns after it.
    ColumnAligned,
}

/// How author lists render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct NameOptions {
    pub order: NameOrder,
    pub delimiter: String,
    /// Word placed before the last of several names (e.g. "and").
    pub and: Option<String>,
}

impl Default for NameOptions {
    fn default() -> Self {
        Self {
            order: NameOrder::GivenFirst,
            delimiter: ", ".to_string(),
            and: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NameOrder {
    /// "Matthias Kretz"
    GivenFirst,
    /// "Kretz, Matthias"
    FamilyFirst,
}

/// Serialization format of a style file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleFormat {
    Toml,
    Yaml,
    Json,
}

impl StyleFormat {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "toml" => Some(StyleFormat::Toml),
            "yaml" | "yml" => Some(StyleFormat::Yaml),
            "json" => Some(StyleFormat::Json),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            StyleFormat::Toml => "TOML",
            StyleFormat::Yaml => "YAML",
            StyleFormat::Json => "JSON",
        }
    }
}

impl StyleConfig {
    /// Parse and validate a style.
    ///
    /// # Errors
    ///
    /// [`Error::StyleParse`] if the content does not deserialize,
    /// [`Error::InvalidStyle`] if it fails [`StyleConfig::validate`].
    pub fn parse(content: &str, format: StyleFormat) -> Result<Self> {
        let parse_error = |message: String| Error::StyleParse {
            format: format.name().to_string(),
            message,
        };

        let style: StyleConfig = match format {
            StyleFormat::Toml => toml::from_str(content).map_err(|e| parse_error(e.to_string()))?,
            StyleFormat::Yaml => {
                // An empty YAML document is an empty mapping, not an error.
                if content.trim().is_empty() {
                    StyleConfig::default()
                } else {
                    serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string()))?
                }
            }
            StyleFormat::Json => {
                serde_json::from_str(content).map_err(|e| parse_error(e.to_string()))?
            }
        };

        style.validate()?;
        Ok(style)
    }

    /// Check option combinations that would make output ambiguous.
    pub fn validate(&self) -> Result<()> {
        if self.citation.locator_delimiter.is_empty() {
            return Err(Error::InvalidStyle {
                field: "citation.locator-delimiter".to_string(),
                message: "must not be empty; labels and locators would run together".to_string(),
            });
        }

        if let Some(width) = self.bibliography.line_width {
            if width <= self.bibliography.hanging_indent {
                return Err(Error::InvalidStyle {
                    field: "bibliography.line-width".to_string(),
                    message: format!(
                        "{} leaves no room after a hanging indent of {}",
                        width, self.bibliography.hanging_indent
                    ),
                });
            }
        }

        let prefs = &self.bibliography.locator_preference;
        for (i, kind) in prefs.iter().enumerate() {
            if prefs[..i].contains(kind) {
                return Err(Error::InvalidStyle {
                    field: "bibliography.locator-preference".to_string(),
                    message: format!("{:?} is listed more than once", kind),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let style = StyleConfig::default();
        assert_eq!(style.citation.prefix, "[");
        assert_eq!(style.citation.locator_delimiter, ":");
        assert_ne!(style.citation.collapse_delimiter, style.citation.delimiter);
        assert_eq!(style.citation.collapse, Collapse::CitationLabel);
        assert_eq!(style.bibliography.sort, SortKey::CitationLabel);
        assert_eq!(
            style.bibliography.locator_preference,
            vec![LocatorKind::Doi, LocatorKind::Url]
        );
        assert_eq!(style.bibliography.layout, Layout::HangingIndent);
        assert!(style.validate().is_ok());
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            [citation]
            collapse = "none"

            [bibliography]
            sort = "author-date"
            layout = "column-aligned"
            date-granularity = "year"
            locator-preference = ["url"]
            names = { order = "family-first", and = "and" }
        "#;
        let style = StyleConfig::parse(toml, StyleFormat::Toml).unwrap();
        assert_eq!(style.citation.collapse, Collapse::None);
        assert_eq!(style.citation.prefix, "[");
        assert_eq!(style.bibliography.sort, SortKey::AuthorDate);
        assert_eq!(style.bibliography.layout, Layout::ColumnAligned);
        assert_eq!(style.bibliography.date_granularity, DateGranularity::Year);
        assert_eq!(style.bibliography.locator_preference, vec![LocatorKind::Url]);
        assert_eq!(style.bibliography.names.order, NameOrder::FamilyFirst);
        assert_eq!(style.bibliography.names.and.as_deref(), Some("and"));
        assert_eq!(style.bibliography.names.delimiter, ", ");
    }

    #[test]
    fn test_parse_yaml_and_json() {
        let yaml = "bibliography:\n  hanging-indent: 2\n  line-width: 72\n";
        let style = StyleConfig::parse(yaml, StyleFormat::Yaml).unwrap();
        assert_eq!(style.bibliography.hanging_indent, 2);
        assert_eq!(style.bibliography.line_width, Some(72));

        let json = r#"{"citation": {"prefix": "(", "suffix": ")"}}"#;
        let style = StyleConfig::parse(json, StyleFormat::Json).unwrap();
        assert_eq!(style.citation.prefix, "(");
        assert_eq!(style.citation.suffix, ")");
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let style = StyleConfig::parse("", StyleFormat::Yaml).unwrap();
        assert_eq!(style, StyleConfig::default());
    }

    #[test]
    fn test_unknown_key_is_parse_error() {
        let err = StyleConfig::parse("[citation]\nbrackets = true\n", StyleFormat::Toml).unwrap_err();
        assert!(matches!(err, Error::StyleParse { ref format, .. } if format == "TOML"));
    }

    #[test]
    fn test_validate_rejects_empty_locator_delimiter() {
        let mut style = StyleConfig::default();
        style.citation.locator_delimiter.clear();
        let err = style.validate().unwrap_err();
        assert!(matches!(err, Error::InvalidStyle { ref field, .. } if field == "citation.locator-delimiter"));
    }

    #[test]
    fn test_validate_rejects_narrow_line_width() {
        let mut style = StyleConfig::default();
        style.bibliography.line_width = Some(4);
        assert!(style.validate().is_err());
        style.bibliography.line_width = Some(5);
        assert!(style.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_repeated_locator_kind() {
        let mut style = StyleConfig::default();
        style.bibliography.locator_preference = vec![LocatorKind::Url, LocatorKind::Url];
        assert!(style.validate().is_err());
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(StyleFormat::from_path(Path::new("s.toml")), Some(StyleFormat::Toml));
        assert_eq!(StyleFormat::from_path(Path::new("s.YML")), Some(StyleFormat::Yaml));
        assert_eq!(StyleFormat::from_path(Path::new("s.json")), Some(StyleFormat::Json));
        assert_eq!(StyleFormat::from_path(Path::new("s.csl")), None);
    }
}
