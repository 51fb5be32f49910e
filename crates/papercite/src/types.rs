//! Core types for citation processing.

use crate::error::{Error, Result};
use crate::eval;
use crate::layout::{Bibliography, BibliographyEntry};
use crate::output::Output;
use crate::reference::Reference;
use crate::style::{Collapse, SortKey, StyleConfig};
use hashlink::LinkedHashMap;
use papercite_error_reporting::SourceSpan;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace, warn};

/// A computed sort key value.
#[derive(Debug, Clone)]
pub struct SortKeyValue {
    /// The computed string value for sorting.
    pub value: String,
}

/// Compare two sets of sort keys.
///
/// Empty values sort after non-empty values.
pub fn compare_sort_keys(a: &[SortKeyValue], b: &[SortKeyValue]) -> Ordering {
    for (ka, kb) in a.iter().zip(b.iter()) {
        let va = normalize_for_sort(&ka.value);
        let vb = normalize_for_sort(&kb.value);

        let cmp = match (va.is_empty(), vb.is_empty()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => va.cmp(&vb),
        };

        if cmp != Ordering::Equal {
            return cmp;
        }
    }
    a.len().cmp(&b.len())
}

/// Check if a character is a word separator for sort key normalization.
fn is_sort_word_separator(c: char) -> bool {
    c.is_whitespace()
        || c == '\'' // ASCII single quote
        || c == '\u{2019}' // RIGHT SINGLE QUOTATION MARK
        || c == '\u{2018}' // LEFT SINGLE QUOTATION MARK
        || c == '\u{201C}' // LEFT DOUBLE QUOTATION MARK
        || c == '\u{201D}' // RIGHT DOUBLE QUOTATION MARK
        || c == '"'
        || c == ','
        || c == '['
        || c == ']'
}

/// Normalize a string for sort comparison: split on word separators,
/// case-fold, and join with single spaces.
fn normalize_for_sort(s: &str) -> String {
    s.split(is_sort_word_separator)
        .filter(|word| !word.is_empty())
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Convert a date (year, month, day) to a sortable string.
///
/// - Positive years: P{9-digit-year}{2-digit-month}{2-digit-day}
/// - Negative (BC) years: N{999999999+year}{2-digit-month}{2-digit-day}
///
/// Negative years sort before positive, and within each category dates sort
/// chronologically. Missing month/day sort as 00.
fn date_to_sort_string(year: i32, month: i32, day: i32) -> String {
    let (prefix, sort_year) = if year < 0 {
        ('N', 999_999_999 + i64::from(year))
    } else {
        ('P', i64::from(year))
    };
    format!(
        "{}{:09}{:02}{:02}",
        prefix,
        sort_year,
        month.max(0),
        day.max(0)
    )
}

/// A citation site: one occurrence in a document, pointing at one or more
/// references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Optional citation ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Citation items (references being cited).
    #[serde(rename = "citationItems")]
    pub items: Vec<CitationItem>,
}

impl Citation {
    pub fn new(items: Vec<CitationItem>) -> Self {
        Self { id: None, items }
    }

    /// A citation of a single reference with no locator.
    pub fn of(id: impl Into<String>) -> Self {
        Self::new(vec![CitationItem::new(id)])
    }
}

/// A single item within a citation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationItem {
    /// Reference ID.
    pub id: String,

    /// Locator value (e.g., "3.2", "42-45").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locator: Option<String>,

    /// Locator type (e.g., "page", "section").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Prefix text (e.g., "see").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    /// Suffix text (e.g., "for details").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,

    /// Where this item was found in a document.
    #[serde(skip)]
    pub location: Option<SourceSpan>,
}

impl CitationItem {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_locator(mut self, locator: impl Into<String>) -> Self {
        self.locator = Some(locator.into());
        self
    }
}

/// In-text markers and bibliography for one document.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    /// One marker per citation site, in document order.
    pub in_text: Vec<String>,
    /// The distinct cited references, sorted and formatted.
    pub bibliography: Bibliography,
}

/// Citation processor that applies a [`StyleConfig`] to a reference set.
///
/// The reference set and style are fixed at construction; every operation
/// takes `&self`.
#[derive(Debug, Clone)]
pub struct Processor {
    style: StyleConfig,

    /// References by ID (preserves insertion order).
    references: LinkedHashMap<String, Reference>,
}

impl Processor {
    /// Create a processor for a reference set.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidStyle`] if the style fails validation
    /// - [`Error::InvalidReferenceData`] if a reference has a blank identifier
    /// - [`Error::DuplicateId`] if two references share an identifier
    /// - [`Error::DuplicateLabel`] if two references share an effective
    ///   citation label
    pub fn new(style: StyleConfig, references: impl IntoIterator<Item = Reference>) -> Result<Self> {
        style.validate()?;
        let citation = &style.citation;
        if citation.collapse != Collapse::None && citation.collapse_delimiter == citation.delimiter {
            warn!(
                delimiter = %citation.delimiter,
                "collapse delimiter equals the entry delimiter; collapsed locators read like separate entries"
            );
        }

        let mut by_id = LinkedHashMap::new();
        let mut labels: HashMap<String, String> = HashMap::new();

        for reference in references {
            // The id is the label of last resort; a blank one renders nothing.
            if reference.id.trim().is_empty() {
                return Err(Error::InvalidReferenceData {
                    message: format!(
                        "reference #{} has an empty id",
                        by_id.len() + 1
                    ),
                });
            }
            if by_id.contains_key(&reference.id) {
                return Err(Error::DuplicateId { id: reference.id });
            }

            let label = reference.effective_label().to_string();
            if reference.citation_label.is_none() {
                warn!(id = %reference.id, "reference has no citation-label; citing it by id");
            }
            if let Some(first) = labels.get(&label) {
                return Err(Error::DuplicateLabel {
                    label,
                    first: first.clone(),
                    second: reference.id,
                });
            }

            labels.insert(label, reference.id.clone());
            by_id.insert(reference.id.clone(), reference);
        }

        debug!(references = by_id.len(), "loaded reference set");

        Ok(Self {
            style,
            references: by_id,
        })
    }

    /// The style this processor formats with.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    /// All references in load order.
    pub fn references(&self) -> impl Iterator<Item = &Reference> {
        self.references.values()
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    /// Get a reference by ID.
    pub fn get_reference(&self, id: &str) -> Option<&Reference> {
        self.references.get(id)
    }

    /// Look a reference up by identifier.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownReference`] if no reference has this identifier.
    pub fn resolve(&self, id: &str) -> Result<&Reference> {
        self.references.get(id).ok_or_else(|| Error::UnknownReference {
            id: id.to_string(),
            location: None,
        })
    }

    /// Resolve a citation item, attaching its source location to the error.
    pub fn resolve_item(&self, item: &CitationItem) -> Result<&Reference> {
        trace!(id = %item.id, "resolving citation item");
        self.references
            .get(&item.id)
            .ok_or_else(|| Error::UnknownReference {
                id: item.id.clone(),
                location: item.location.clone(),
            })
    }

    /// Every unresolvable item across `citations`, in document order.
    pub fn unresolved(&self, citations: &[Citation]) -> Vec<Error> {
        citations
            .iter()
            .flat_map(|c| c.items.iter())
            .filter_map(|item| self.resolve_item(item).err())
            .collect()
    }

    /// Format a run of adjacent citations as one in-text marker.
    ///
    /// An empty run formats to the empty string.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownReference`] if any item does not resolve.
    pub fn format_in_text(&self, citations: &[Citation]) -> Result<String> {
        Ok(self.format_in_text_to_output(citations)?.render())
    }

    /// Format a run of adjacent citations, returning the Output AST.
    pub fn format_in_text_to_output(&self, citations: &[Citation]) -> Result<Output> {
        eval::evaluate_citations(self, citations)
    }

    /// Format the issued date of a reference at the configured granularity.
    pub fn format_date(&self, reference: &Reference) -> String {
        eval::evaluate_date(reference, self.style.bibliography.date_granularity)
    }

    /// The DOI or URL segment of a bibliography entry, or [`Output::Null`].
    pub fn format_locator_or_fallback(&self, reference: &Reference) -> Output {
        eval::evaluate_locator(reference, &self.style.bibliography.locator_preference)
    }

    /// Format a bibliography entry as plain text.
    pub fn format_bibliography_entry(&self, reference: &Reference) -> String {
        let entry = self.bibliography_entry(reference);
        let label_width = entry.label_width();
        entry.render_text(&self.style.bibliography, label_width)
    }

    /// Format a bibliography entry, returning the Output AST.
    pub fn format_bibliography_entry_to_output(&self, reference: &Reference) -> Output {
        self.bibliography_entry(reference)
            .to_output(self.style.bibliography.layout)
    }

    pub(crate) fn bibliography_entry(&self, reference: &Reference) -> BibliographyEntry {
        eval::evaluate_bibliography_entry(self, reference)
    }

    /// Format every citation site and build the bibliography of the cited
    /// references.
    ///
    /// # Errors
    ///
    /// Fails on the first item that does not resolve; no partial output is
    /// returned.
    pub fn process(&self, citations: &[Citation]) -> Result<RenderedDocument> {
        let in_text = citations
            .iter()
            .map(|citation| self.format_in_text(std::slice::from_ref(citation)))
            .collect::<Result<Vec<_>>>()?;

        let cited = citations
            .iter()
            .flat_map(|c| c.items.iter())
            .map(|item| item.id.as_str());
        let bibliography = self.bibliography(cited)?;

        debug!(
            sites = in_text.len(),
            entries = bibliography.len(),
            "processed citations"
        );

        Ok(RenderedDocument {
            in_text,
            bibliography,
        })
    }

    /// Build the sorted bibliography of the given references. Repeated ids
    /// appear once.
    pub fn bibliography<'a>(&self, ids: impl IntoIterator<Item = &'a str>) -> Result<Bibliography> {
        let mut seen = HashSet::new();
        let mut cited = Vec::new();
        for id in ids {
            if seen.insert(id) {
                cited.push(self.resolve(id)?);
            }
        }
        Ok(self.build_bibliography(cited))
    }

    /// Build the sorted bibliography of every loaded reference.
    pub fn bibliography_all(&self) -> Bibliography {
        self.build_bibliography(self.references.values().collect())
    }

    fn build_bibliography(&self, references: Vec<&Reference>) -> Bibliography {
        let entries: Vec<BibliographyEntry> = self
            .sort_bibliography(references)
            .into_iter()
            .map(|r| self.bibliography_entry(r))
            .collect();
        Bibliography::new(entries, self.style.bibliography.clone())
    }

    /// Sort references by the configured bibliography sort key.
    pub fn sort_bibliography<'a>(&self, mut references: Vec<&'a Reference>) -> Vec<&'a Reference> {
        references.sort_by(|a, b| self.compare_references(a, b));
        debug!(count = references.len(), sort = ?self.style.bibliography.sort, "sorted bibliography");
        references
    }

    /// Order two references by the configured sort key.
    pub fn compare_references(&self, a: &Reference, b: &Reference) -> Ordering {
        match self.style.bibliography.sort {
            SortKey::CitationLabel => a.effective_label().cmp(b.effective_label()),
            SortKey::AuthorDate => compare_sort_keys(
                &self.author_date_sort_keys(a),
                &self.author_date_sort_keys(b),
            )
            .then_with(|| a.effective_label().cmp(b.effective_label())),
        }
    }

    /// Sort key values for the author-date ordering: author names, then
    /// issued date.
    pub fn author_date_sort_keys(&self, reference: &Reference) -> Vec<SortKeyValue> {
        let names = reference
            .authors()
            .iter()
            .map(|n| n.sort_name())
            .collect::<Vec<_>>()
            .join(", ");

        let date = reference
            .issued_parts()
            .and_then(|p| {
                p.year
                    .map(|y| date_to_sort_string(y, p.month.unwrap_or(0), p.day.unwrap_or(0)))
            })
            .unwrap_or_default();

        vec![SortKeyValue { value: names }, SortKeyValue { value: date }]
    }
}
