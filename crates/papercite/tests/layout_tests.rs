//! Snapshot tests for rendered bibliographies.

use papercite::style::Layout;
use papercite::{OutputFormat, Processor, StyleConfig, load_references};

fn processor_with(style: StyleConfig) -> Processor {
    let refs = load_references(include_str!("fixtures/references.json")).unwrap();
    Processor::new(style, refs).unwrap()
}

fn column_aligned() -> StyleConfig {
    let mut style = StyleConfig::default();
    style.bibliography.layout = Layout::ColumnAligned;
    style
}

#[test]
fn hanging_indent_text() {
    let bib = processor_with(StyleConfig::default()).bibliography_all();
    insta::assert_snapshot!("hanging_indent_text", bib.render(OutputFormat::Text));
}

#[test]
fn hanging_indent_html() {
    let bib = processor_with(StyleConfig::default()).bibliography_all();
    insta::assert_snapshot!("hanging_indent_html", bib.render(OutputFormat::Html));
}

#[test]
fn column_aligned_text() {
    let bib = processor_with(column_aligned()).bibliography_all();
    insta::assert_snapshot!("column_aligned_text", bib.render(OutputFormat::Text));
}

#[test]
fn column_aligned_html() {
    let p = processor_with(column_aligned());
    let bib = p.bibliography(["N4808", "P1928R3"]).unwrap();
    insta::assert_snapshot!("column_aligned_html", bib.render(OutputFormat::Html));
}

#[test]
fn wrapped_hanging_indent() {
    let mut style = StyleConfig::default();
    style.bibliography.line_width = Some(60);
    let p = processor_with(style);
    let bib = p.bibliography(["P0214R9"]).unwrap();
    assert_eq!(
        bib.render_text(),
        "[P0214R9] Matthias Kretz. 2018-03-16. Data-Parallel Vector\n    Types & Operations.\n    https://wg21.link/p0214r9"
    );
}

#[test]
fn wrapping_keeps_spacing_within_fields() {
    let refs = load_references(r#"[{"id": "A", "title": "x  <  y"}]"#).unwrap();
    let mut style = StyleConfig::default();
    let unwrapped = Processor::new(style.clone(), refs.clone()).unwrap().bibliography_all();
    style.bibliography.line_width = Some(60);
    let wrapped = Processor::new(style, refs).unwrap().bibliography_all();

    assert_eq!(unwrapped.render_text(), "[A] x  <  y.");
    assert_eq!(wrapped.render_text(), unwrapped.render_text());
}

#[test]
fn custom_hanging_indent_width() {
    let mut style = StyleConfig::default();
    style.bibliography.hanging_indent = 2;
    let p = processor_with(style);
    let bib = p.bibliography(["P1928R3"]).unwrap();
    assert_eq!(
        bib.render_text().lines().nth(1),
        Some("  https://wg21.link/p1928r3")
    );
}

#[test]
fn italic_titles() {
    let mut style = StyleConfig::default();
    style.bibliography.title_font_style = papercite::output::FontStyle::Italic;
    let p = processor_with(style);
    let bib = p.bibliography(["N4808"]).unwrap();
    assert_eq!(
        bib.render_html(),
        "<div class=\"csl-bib-body hanging-indent\">\n  <div class=\"csl-entry\" id=\"ref-N4808\">[N4808] Jared Hoberock. 2019. <i>Working Draft, C++ Extensions for Parallelism Version 2</i>.</div>\n</div>"
    );
}

#[test]
fn empty_bibliography_renders_nothing() {
    let p = processor_with(StyleConfig::default());
    let bib = p.bibliography(std::iter::empty()).unwrap();
    assert!(bib.is_empty());
    assert_eq!(bib.render(OutputFormat::Text), "");
    assert_eq!(bib.render(OutputFormat::Html), "");
}
