//! Citation evaluation.
//!
//! Turns resolved references into [`Output`] trees: in-text markers for runs
//! of citations, and the fields of a bibliography entry. Rendering to text or
//! HTML happens later, in [`crate::output`] and [`crate::layout`].

use crate::layout::BibliographyEntry;
use crate::output::{Display, Formatting, Output, Tag, join_outputs};
use crate::reference::{DateParts, Name, Reference};
use crate::style::{CitationOptions, Collapse, DateGranularity, LocatorKind, NameOptions, NameOrder};
use crate::types::{Citation, CitationItem, Processor};
use crate::Result;
use tracing::debug;

/// One resolved citation item.
struct Cite<'a> {
    reference: &'a Reference,
    item: &'a CitationItem,
}

/// Evaluate a run of adjacent citations into a single marker.
pub fn evaluate_citations(processor: &Processor, citations: &[Citation]) -> Result<Output> {
    let options = &processor.style().citation;

    // Resolve everything up front so a bad id never yields partial output.
    let mut cites = Vec::new();
    for item in citations.iter().flat_map(|c| c.items.iter()) {
        let reference = processor.resolve_item(item)?;
        cites.push(Cite { reference, item });
    }

    if cites.is_empty() {
        return Ok(Output::Null);
    }

    if options.sort {
        // Stable, so equal keys keep document order.
        cites.sort_by(|a, b| processor.compare_references(a.reference, b.reference));
    }

    let groups = group_cites(cites, options.collapse);
    debug!(groups = groups.len(), "evaluated in-text citation");

    let entries = groups
        .iter()
        .map(|group| evaluate_cite_group(group, options))
        .collect();

    Ok(Output::formatted(
        Formatting::affixes(&options.prefix, &options.suffix),
        vec![join_outputs(entries, &options.delimiter)],
    ))
}

/// Merge adjacent cites that share the collapsing key.
fn group_cites(cites: Vec<Cite<'_>>, collapse: Collapse) -> Vec<Vec<Cite<'_>>> {
    let mut groups: Vec<Vec<Cite<'_>>> = Vec::new();
    for cite in cites {
        match groups.last_mut() {
            Some(group)
                if collapse == Collapse::CitationLabel
                    && group[0].reference.effective_label() == cite.reference.effective_label() =>
            {
                group.push(cite);
            }
            _ => groups.push(vec![cite]),
        }
    }
    groups
}

/// Render `prefix label:loc1, loc2 suffix` for one (possibly collapsed) entry.
fn evaluate_cite_group(group: &[Cite<'_>], options: &CitationOptions) -> Output {
    let Some(first) = group.first() else {
        return Output::Null;
    };
    let label = first.reference.effective_label();

    let mut locators: Vec<&str> = Vec::new();
    for cite in group {
        if let Some(locator) = non_blank(cite.item.locator.as_deref()) {
            if !locators.contains(&locator) {
                locators.push(locator);
            }
        }
    }

    let label_output = Output::tagged(Tag::Label(label.to_string()), Output::literal(label));
    let locator_output = Output::tagged(
        Tag::CiteLocator,
        Output::literal(locators.join(&options.collapse_delimiter)),
    );
    let core = if locator_output.is_null() {
        label_output
    } else {
        Output::sequence(vec![
            label_output,
            Output::literal(&options.locator_delimiter),
            locator_output,
        ])
    };

    let prefix = group
        .iter()
        .find_map(|c| non_blank(c.item.prefix.as_deref()))
        .map(|p| format!("{} ", p))
        .unwrap_or_default();
    let suffix = group
        .iter()
        .rev()
        .find_map(|c| non_blank(c.item.suffix.as_deref()))
        .map(|s| format!(" {}", s))
        .unwrap_or_default();

    Output::formatted(Formatting::affixes(prefix, suffix), vec![core])
}

/// Build the label field and body of a bibliography entry.
pub fn evaluate_bibliography_entry(processor: &Processor, reference: &Reference) -> BibliographyEntry {
    let style = processor.style();
    let options = &style.bibliography;
    let label = reference.effective_label();

    let label_output = Output::tagged(
        Tag::Label(label.to_string()),
        Output::formatted(
            Formatting::affixes(&style.citation.prefix, &style.citation.suffix),
            vec![Output::literal(label)],
        ),
    );

    let names = format_names(reference.authors(), &options.names);
    let date = processor.format_date(reference);
    let title = reference.title.as_deref().map(str::trim).unwrap_or_default();

    let title_formatting = Formatting {
        font_style: options.title_font_style,
        ..Default::default()
    };

    let fields = join_outputs(
        vec![
            terminated(Output::tagged(Tag::Names, Output::literal(&names)), &names),
            terminated(Output::tagged(Tag::Date, Output::literal(&date)), &date),
            terminated(
                Output::tagged(
                    Tag::Title,
                    Output::formatted(title_formatting, vec![Output::literal(title)]),
                ),
                title,
            ),
        ],
        " ",
    );

    let locator = processor.format_locator_or_fallback(reference);
    let body = if locator.is_block() {
        // Block spans break the line themselves.
        Output::sequence(vec![fields, locator])
    } else {
        join_outputs(vec![fields, locator], " ")
    };

    BibliographyEntry {
        id: reference.id.clone(),
        label: label.to_string(),
        label_output,
        body,
    }
}

/// Close a field with a period unless its text already ends a sentence.
fn terminated(output: Output, text: &str) -> Output {
    if output.is_null() {
        return Output::Null;
    }
    match text.trim_end().chars().last() {
        Some('.' | '?' | '!') => output,
        _ => Output::sequence(vec![output, Output::literal(".")]),
    }
}

/// Format an issued date, capped at `granularity`.
///
/// `2023`, `2023-05`, `2023-05-22`; a literal date verbatim; no date at all
/// gives an empty string.
pub fn evaluate_date(reference: &Reference, granularity: DateGranularity) -> String {
    let Some(issued) = &reference.issued else {
        return String::new();
    };

    match issued.parts() {
        Some(DateParts {
            year: Some(year),
            month,
            day,
        }) => {
            let mut out = year.to_string();
            if granularity >= DateGranularity::Month {
                if let Some(month) = month {
                    out.push_str(&format!("-{:02}", month));
                    if granularity >= DateGranularity::Day {
                        if let Some(day) = day {
                            out.push_str(&format!("-{:02}", day));
                        }
                    }
                }
            }
            out
        }
        _ => issued.literal().map(str::to_string).unwrap_or_default(),
    }
}

/// The first available locator in preference order.
pub fn evaluate_locator(reference: &Reference, preference: &[LocatorKind]) -> Output {
    for kind in preference {
        match kind {
            LocatorKind::Doi => {
                if let Some(doi) = reference.doi() {
                    let url = doi_url(doi);
                    return Output::tagged(
                        Tag::Locator,
                        Output::sequence(vec![
                            Output::literal("DOI:"),
                            Output::linked(url.clone(), vec![Output::literal(url)]),
                        ]),
                    );
                }
            }
            LocatorKind::Url => {
                if let Some(url) = reference.url() {
                    return Output::tagged(
                        Tag::Locator,
                        Output::formatted(
                            Formatting::display(Display::Block),
                            vec![Output::linked(url, vec![Output::literal(url)])],
                        ),
                    );
                }
            }
        }
    }
    Output::Null
}

/// Resolver URL for a DOI, accepting bare DOIs, `doi:` prefixes and
/// existing resolver URLs.
pub fn doi_url(doi: &str) -> String {
    const PREFIXES: [&str; 5] = [
        "https://doi.org/",
        "http://doi.org/",
        "https://dx.doi.org/",
        "http://dx.doi.org/",
        "doi:",
    ];

    let doi = doi.trim();
    let lower = doi.to_ascii_lowercase();
    let bare = PREFIXES
        .iter()
        .find(|prefix| lower.starts_with(*prefix))
        .map_or(doi, |prefix| doi[prefix.len()..].trim_start());

    format!("https://doi.org/{}", bare)
}

/// Join author names with the configured delimiter and "and" word.
fn format_names(names: &[Name], options: &NameOptions) -> String {
    let formatted: Vec<String> = names
        .iter()
        .map(|name| match options.order {
            NameOrder::GivenFirst => name.given_first(),
            NameOrder::FamilyFirst => name.display_name(),
        })
        .filter(|name| !name.trim().is_empty())
        .collect();

    let and_word = non_blank(options.and.as_deref());

    match (formatted.split_last(), and_word) {
        (None, _) => String::new(),
        (Some((last, [])), _) => last.clone(),
        (Some((last, [only])), Some(and)) => format!("{} {} {}", only, and, last),
        (Some((last, init)), Some(and)) => format!(
            "{}{}{} {}",
            init.join(&options.delimiter),
            options.delimiter,
            and,
            last
        ),
        (Some(_), None) => formatted.join(&options.delimiter),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(given: &str, family: &str) -> Name {
        Name {
            given: Some(given.to_string()),
            family: Some(family.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_doi_url_normalization() {
        assert_eq!(doi_url("10.1/x"), "https://doi.org/10.1/x");
        assert_eq!(doi_url("doi:10.1/x"), "https://doi.org/10.1/x");
        assert_eq!(doi_url("DOI: 10.1/x"), "https://doi.org/10.1/x");
        assert_eq!(doi_url("https://dx.doi.org/10.1/x"), "https://doi.org/10.1/x");
        assert_eq!(doi_url(" https://doi.org/10.1/x "), "https://doi.org/10.1/x");
    }

    #[test]
    fn test_format_names_without_and() {
        let options = NameOptions::default();
        let names = [name("Matthias", "Kretz"), name("Jens", "Maurer")];
        assert_eq!(format_names(&names, &options), "Matthias Kretz, Jens Maurer");
    }

    #[test]
    fn test_format_names_with_and() {
        let options = NameOptions {
            and: Some("and".to_string()),
            ..Default::default()
        };
        let two = [name("A", "One"), name("B", "Two")];
        assert_eq!(format_names(&two, &options), "A One and B Two");

        let three = [name("A", "One"), name("B", "Two"), name("C", "Three")];
        assert_eq!(format_names(&three, &options), "A One, B Two, and C Three");
    }

    #[test]
    fn test_format_names_family_first() {
        let options = NameOptions {
            order: NameOrder::FamilyFirst,
            delimiter: "; ".to_string(),
            and: None,
        };
        let names = [name("Matthias", "Kretz"), name("Jens", "Maurer")];
        assert_eq!(format_names(&names, &options), "Kretz, Matthias; Maurer, Jens");
    }

    #[test]
    fn test_terminated() {
        assert_eq!(terminated(Output::literal("Title"), "Title").render(), "Title.");
        assert_eq!(terminated(Output::literal("Why?"), "Why?").render(), "Why?");
        assert_eq!(terminated(Output::literal("Jr."), "Jr.").render(), "Jr.");
        assert!(terminated(Output::Null, "").is_null());
    }

    #[test]
    fn test_date_granularity_caps_precision() {
        let reference: Reference = serde_json::from_str(
            r#"{"id": "a", "issued": {"date-parts": [[2023, 5, 22]]}}"#,
        )
        .unwrap();
        assert_eq!(evaluate_date(&reference, DateGranularity::Day), "2023-05-22");
        assert_eq!(evaluate_date(&reference, DateGranularity::Month), "2023-05");
        assert_eq!(evaluate_date(&reference, DateGranularity::Year), "2023");
    }

    #[test]
    fn test_literal_date_is_verbatim() {
        let reference: Reference =
            serde_json::from_str(r#"{"id": "a", "issued": {"literal": "Kona 2023"}}"#).unwrap();
        assert_eq!(evaluate_date(&reference, DateGranularity::Day), "Kona 2023");
    }

    #[test]
    fn test_empty_preference_has_no_locator() {
        let reference: Reference =
            serde_json::from_str(r#"{"id": "a", "URL": "https://example.org"}"#).unwrap();
        assert!(evaluate_locator(&reference, &[]).is_null());
    }
}
