//! Citation scanning for Markdown documents.
//!
//! Finds Pandoc-style citation clusters such as `[@P1928R3]` or
//! `[see @P1928R3, 3.2; @P0214R9]` and records where each item sits in the
//! source, so unknown references can be reported against the document.

use crate::types::{Citation, CitationItem};
use once_cell::sync::Lazy;
use papercite_error_reporting::SourceSpan;
use regex::Regex;
use std::ops::Range;
use tracing::debug;

/// A bracketed run of text containing at least one `@`.
static CLUSTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\[\]]*@[^\[\]]*)\]").unwrap());

/// Single-line inline code spans.
static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`[^`\n]+`").unwrap());

/// Punctuation allowed inside a citation key when followed by a key character.
const KEY_PUNCTUATION: &str = ":.#$%&-+?<>~/";

/// One citation site found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationCluster {
    pub citation: Citation,
    /// Byte range of the whole bracketed cluster.
    pub span: Range<usize>,
}

/// Find every citation cluster in `text`, in document order.
///
/// `file` names the document in the recorded spans.
pub fn scan_citations(file: &str, text: &str) -> Vec<CitationCluster> {
    let code = code_ranges(text);
    let mut clusters = Vec::new();

    for m in CLUSTER.find_iter(text) {
        let start = m.start();
        if code.iter().any(|r| r.contains(&start)) {
            continue;
        }
        // Escaped bracket, or a link whose text happens to contain '@'.
        if text[..start].ends_with('\\') || text[m.end()..].starts_with('(') {
            continue;
        }

        let inner_start = start + 1;
        let inner = &text[inner_start..m.end() - 1];
        if let Some(items) = parse_cluster(file, inner, inner_start) {
            clusters.push(CitationCluster {
                citation: Citation::new(items),
                span: m.range(),
            });
        }
    }

    debug!(file, clusters = clusters.len(), "scanned citations");
    clusters
}

/// The citations of `clusters`, in order.
pub fn citations(clusters: &[CitationCluster]) -> Vec<Citation> {
    clusters.iter().map(|c| c.citation.clone()).collect()
}

/// Replace each cluster in `text` with the marker at the same position.
///
/// Clusters without a marker are left as written.
pub fn replace_citations(text: &str, clusters: &[CitationCluster], markers: &[String]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for (cluster, marker) in clusters.iter().zip(markers) {
        if cluster.span.start < last || cluster.span.end > text.len() {
            continue;
        }
        out.push_str(&text[last..cluster.span.start]);
        out.push_str(marker);
        last = cluster.span.end;
    }

    out.push_str(&text[last..]);
    out
}

/// Parse the `;`-separated parts of a cluster. Every part must cite a key.
fn parse_cluster(file: &str, inner: &str, offset: usize) -> Option<Vec<CitationItem>> {
    let mut items = Vec::new();
    let mut part_offset = offset;
    for part in inner.split(';') {
        items.push(parse_item(file, part, part_offset)?);
        part_offset += part.len() + 1;
    }
    Some(items)
}

fn parse_item(file: &str, part: &str, offset: usize) -> Option<CitationItem> {
    let at = find_marker(part)?;
    let key_start = at + 1;
    let key_end = key_start + key_length(&part[key_start..]);
    if key_end == key_start {
        return None;
    }

    // `-@key` suppresses the author in Pandoc; labels have no author part.
    let prefix = part[..at].trim();
    let prefix = prefix.strip_suffix('-').unwrap_or(prefix).trim();

    let rest = part[key_end..].trim();
    let (locator, suffix) = match rest.strip_prefix(',') {
        Some(locator) => (non_empty(locator.trim()), None),
        None => (None, non_empty(rest)),
    };

    Some(CitationItem {
        id: part[key_start..key_end].to_string(),
        locator,
        label: None,
        prefix: non_empty(prefix),
        suffix,
        location: Some(SourceSpan::new(file, offset + at..offset + key_end)),
    })
}

/// Byte offset of the first `@` that starts a citation: at the start of the
/// part, after whitespace, or after a `-` that itself follows whitespace.
fn find_marker(part: &str) -> Option<usize> {
    let mut prev: Option<char> = None;
    let mut before_prev: Option<char> = None;

    for (i, c) in part.char_indices() {
        if c == '@' {
            let starts_cite = match prev {
                None => true,
                Some(p) if p.is_whitespace() => true,
                Some('-') => before_prev.is_none_or(char::is_whitespace),
                _ => false,
            };
            if starts_cite {
                return Some(i);
            }
        }
        before_prev = prev;
        prev = Some(c);
    }
    None
}

/// Length in bytes of the citation key at the start of `s`.
fn key_length(s: &str) -> usize {
    let is_key_char = |c: char| c.is_alphanumeric() || c == '_';

    let mut end = 0;
    let mut chars = s.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if is_key_char(c) {
            end = i + c.len_utf8();
        } else if end > 0
            && KEY_PUNCTUATION.contains(c)
            && chars.peek().is_some_and(|&(_, next)| is_key_char(next))
        {
            continue;
        } else {
            break;
        }
    }
    end
}

/// Byte ranges of fenced code blocks and inline code spans.
fn code_ranges(text: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut fence: Option<(usize, &str)> = None;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let trimmed = line.trim_start();
        let marker = ["```", "~~~"].into_iter().find(|m| trimmed.starts_with(*m));

        match (fence, marker) {
            (None, Some(open)) => fence = Some((offset, open)),
            (Some((start, open)), Some(close)) if open == close => {
                ranges.push(start..offset + line.len());
                fence = None;
            }
            (None, None) => {
                ranges.extend(
                    INLINE_CODE
                        .find_iter(line)
                        .map(|m| offset + m.start()..offset + m.end()),
                );
            }
            _ => {}
        }

        offset += line.len();
    }

    // An unclosed fence runs to the end of the document.
    if let Some((start, _)) = fence {
        ranges.push(start..text.len());
    }
    ranges
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}
