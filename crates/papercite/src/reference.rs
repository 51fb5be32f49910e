//! Reference types for CSL-JSON bibliographic data.
//!
//! This module defines types for parsing and representing bibliographic
//! references in CSL-JSON format, restricted to the fields a label-style
//! bibliography renders. Everything else lands in [`Reference::other`].

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// A bibliographic reference in CSL-JSON format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Reference {
    /// Unique identifier for this reference.
    /// CSL-JSON allows both string and integer IDs, so we accept both.
    #[serde(deserialize_with = "deserialize_string_or_int")]
    pub id: String,

    /// Reference type (e.g., "report", "webpage", "article-journal").
    #[serde(rename = "type", default)]
    pub ref_type: String,

    /// Short human-readable tag used as the in-text marker and sort key.
    #[serde(rename = "citation-label", skip_serializing_if = "Option::is_none")]
    pub citation_label: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "container-title", skip_serializing_if = "Option::is_none")]
    pub container_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(rename = "DOI", skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(rename = "URL", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Vec<Name>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued: Option<DateVariable>,

    // Other fields captured in a map for extensibility
    #[serde(flatten)]
    pub other: HashMap<String, serde_json::Value>,
}

/// Deserialize a value that can be either a string or an integer into a String.
/// CSL-JSON allows reference IDs to be either strings or integers.
fn deserialize_string_or_int<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let value: serde_json::Value = Deserialize::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        _ => Err(Error::custom("expected string or number for id")),
    }
}

impl Reference {
    /// The label this reference is cited and sorted by.
    ///
    /// Falls back to the identifier when no `citation-label` is set (or it is
    /// blank).
    pub fn effective_label(&self) -> &str {
        match self.citation_label.as_deref().map(str::trim) {
            Some(label) if !label.is_empty() => label,
            _ => &self.id,
        }
    }

    /// Authors in order, or an empty slice.
    pub fn authors(&self) -> &[Name] {
        self.author.as_deref().unwrap_or(&[])
    }

    /// Parsed parts of the issued date, if any.
    pub fn issued_parts(&self) -> Option<DateParts> {
        self.issued.as_ref().and_then(DateVariable::parts)
    }

    /// A non-blank DOI, if any.
    pub fn doi(&self) -> Option<&str> {
        non_blank(self.doi.as_deref())
    }

    /// A non-blank URL, if any.
    pub fn url(&self) -> Option<&str> {
        non_blank(self.url.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Parse a CSL-JSON array of references.
///
/// # Errors
///
/// Returns [`Error::InvalidReferenceData`] if the input is not a JSON array
/// of CSL-JSON records.
pub fn load_references(json: &str) -> Result<Vec<Reference>> {
    serde_json::from_str(json).map_err(|e| Error::InvalidReferenceData {
        message: e.to_string(),
    })
}

/// A name in CSL-JSON format.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
pub struct Name {
    /// Family name (surname).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,

    /// Given name (first name).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given: Option<String>,

    /// Dropping particle (e.g., "de" in "Ludwig de Beethoven").
    #[serde(rename = "dropping-particle", skip_serializing_if = "Option::is_none")]
    pub dropping_particle: Option<String>,

    /// Non-dropping particle (e.g., "van" in "Vincent van Gogh").
    #[serde(rename = "non-dropping-particle", skip_serializing_if = "Option::is_none")]
    pub non_dropping_particle: Option<String>,

    /// Suffix (e.g., "Jr.", "III").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,

    /// Literal name (for institutional names or when family/given doesn't apply).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub literal: Option<String>,
}

impl Name {
    /// Check if this is a literal (institutional) name.
    pub fn is_literal(&self) -> bool {
        self.literal.is_some()
    }

    /// The name in "family, given" format.
    pub fn display_name(&self) -> String {
        if let Some(ref lit) = self.literal {
            return lit.clone();
        }

        let mut parts = Vec::new();

        if let Some(ref ndp) = self.non_dropping_particle {
            parts.push(ndp.clone());
        }

        if let Some(ref family) = self.family {
            parts.push(family.clone());
        }

        if let Some(ref suffix) = self.suffix {
            parts.push(suffix.clone());
        }

        let family_part = parts.join(" ");

        let given_part = [self.given.as_deref(), self.dropping_particle.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");

        match (family_part.is_empty(), given_part.is_empty()) {
            (_, true) => family_part,
            (true, false) => given_part,
            (false, false) => format!("{}, {}", family_part, given_part),
        }
    }

    /// The name in reading order ("Ludwig van Beethoven").
    pub fn given_first(&self) -> String {
        if let Some(ref lit) = self.literal {
            return lit.clone();
        }

        [
            self.given.as_deref(),
            self.dropping_particle.as_deref(),
            self.non_dropping_particle.as_deref(),
            self.family.as_deref(),
            self.suffix.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }

    /// The key this name sorts under: family name (without particles) first,
    /// then given name.
    pub fn sort_name(&self) -> String {
        if let Some(ref lit) = self.literal {
            return lit.clone();
        }

        [self.family.as_deref(), self.given.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A date variable in CSL-JSON format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DateVariable {
    /// Date parts: [[year, month, day], [end_year, end_month, end_day]] for ranges.
    /// Values can be integers or strings (CSL-JSON allows both).
    #[serde(
        rename = "date-parts",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_date_parts",
        default
    )]
    pub date_parts: Option<Vec<Vec<i32>>>,

    /// Literal date string (when structured date is not available).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub literal: Option<String>,

    /// Raw date string in `YYYY[-MM[-DD]]` form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

/// Custom deserializer for date-parts that accepts both strings and integers.
fn deserialize_date_parts<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Vec<Vec<i32>>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let parts: Option<Vec<Vec<DatePartValue>>> = Option::deserialize(deserializer)?;
    Ok(parts.map(|outer| {
        outer
            .into_iter()
            .map(|inner| inner.into_iter().map(|v| v.0).collect())
            .collect()
    }))
}

/// A date part value that can be either a string or integer.
struct DatePartValue(i32);

impl<'de> Deserialize<'de> for DatePartValue {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct DatePartValueVisitor;

        impl<'de> Visitor<'de> for DatePartValueVisitor {
            type Value = DatePartValue;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("an integer or string representing a date part")
            }

            fn visit_i64<E>(self, v: i64) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                i32::try_from(v)
                    .map(DatePartValue)
                    .map_err(|_| de::Error::custom(format!("date part out of range: {}", v)))
            }

            fn visit_u64<E>(self, v: u64) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                i32::try_from(v)
                    .map(DatePartValue)
                    .map_err(|_| de::Error::custom(format!("date part out of range: {}", v)))
            }

            fn visit_str<E>(self, v: &str) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                v.trim()
                    .parse::<i32>()
                    .map(DatePartValue)
                    .map_err(|_| de::Error::custom(format!("invalid date part: {}", v)))
            }
        }

        deserializer.deserialize_any(DatePartValueVisitor)
    }
}

impl DateVariable {
    /// Get the (start) date parts if available.
    ///
    /// Structured `date-parts` win over `raw`. Months outside 1-12 and days
    /// outside 1-31 are treated as absent, and a day without a month is
    /// dropped.
    pub fn parts(&self) -> Option<DateParts> {
        let first = self
            .date_parts
            .as_ref()
            .and_then(|parts| parts.first())
            .filter(|p| !p.is_empty())
            .map(|p| (p.first().copied(), p.get(1).copied(), p.get(2).copied()))
            .or_else(|| self.raw.as_deref().and_then(parse_raw_date));

        let (year, month, day) = first?;
        let month = month.filter(|m| (1..=12).contains(m));
        let day = day.filter(|d| month.is_some() && (1..=31).contains(d));
        Some(DateParts { year, month, day })
    }

    /// A non-blank literal date, if any.
    pub fn literal(&self) -> Option<&str> {
        non_blank(self.literal.as_deref())
    }
}

/// Parse a raw `YYYY`, `YYYY-MM` or `YYYY-MM-DD` date.
fn parse_raw_date(raw: &str) -> Option<(Option<i32>, Option<i32>, Option<i32>)> {
    let mut fields = raw.trim().splitn(3, '-');
    let year = fields.next()?.parse::<i32>().ok()?;
    let month = fields.next().and_then(|m| m.parse::<i32>().ok());
    let day = fields.next().and_then(|d| d.parse::<i32>().ok());
    Some((Some(year), month, day))
}

/// Parsed date parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateParts {
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub day: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_reference() {
        let json = r#"{
            "id": "P1928R3",
            "type": "report",
            "citation-label": "P1928R3",
            "title": "std::simd - merge data-parallel types from the Parallelism TS 2",
            "author": [{"family": "Kretz", "given": "Matthias"}],
            "issued": {"date-parts": [[2023, 2, 3]]},
            "URL": "https://wg21.link/p1928r3"
        }"#;

        let reference: Reference = serde_json::from_str(json).unwrap();
        assert_eq!(reference.id, "P1928R3");
        assert_eq!(reference.ref_type, "report");
        assert_eq!(reference.effective_label(), "P1928R3");
        assert_eq!(reference.url(), Some("https://wg21.link/p1928r3"));
        assert_eq!(reference.doi(), None);

        let parts = reference.issued_parts().unwrap();
        assert_eq!(parts.year, Some(2023));
        assert_eq!(parts.month, Some(2));
        assert_eq!(parts.day, Some(3));
    }

    #[test]
    fn test_integer_id_and_string_date_parts() {
        let json = r#"{"id": 42, "issued": {"date-parts": [["2020", "6"]]}}"#;
        let reference: Reference = serde_json::from_str(json).unwrap();
        assert_eq!(reference.id, "42");
        let parts = reference.issued_parts().unwrap();
        assert_eq!(parts.year, Some(2020));
        assert_eq!(parts.month, Some(6));
        assert_eq!(parts.day, None);
    }

    #[test]
    fn test_label_falls_back_to_id() {
        let reference = Reference {
            id: "smith2020".to_string(),
            citation_label: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(reference.effective_label(), "smith2020");
    }

    #[test]
    fn test_unknown_fields_are_kept() {
        let json = r#"{"id": "a", "accessed": {"date-parts": [[2024, 1, 1]]}}"#;
        let reference: Reference = serde_json::from_str(json).unwrap();
        assert!(reference.other.contains_key("accessed"));
    }

    #[test]
    fn test_raw_date() {
        let date = DateVariable {
            raw: Some("2023-05-22".to_string()),
            ..Default::default()
        };
        assert_eq!(
            date.parts(),
            Some(DateParts {
                year: Some(2023),
                month: Some(5),
                day: Some(22)
            })
        );
    }

    #[test]
    fn test_out_of_range_month_is_dropped() {
        let date = DateVariable {
            date_parts: Some(vec![vec![2021, 0, 14]]),
            ..Default::default()
        };
        let parts = date.parts().unwrap();
        assert_eq!(parts.year, Some(2021));
        assert_eq!(parts.month, None);
        assert_eq!(parts.day, None);
    }

    #[test]
    fn test_load_references_rejects_non_array() {
        let err = load_references(r#"{"id": "a"}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidReferenceData { .. }));
    }

    #[test]
    fn test_name_forms() {
        let name = Name {
            family: Some("Beethoven".to_string()),
            given: Some("Ludwig".to_string()),
            non_dropping_particle: Some("van".to_string()),
            ..Default::default()
        };
        assert_eq!(name.display_name(), "van Beethoven, Ludwig");
        assert_eq!(name.given_first(), "Ludwig van Beethoven");
        assert_eq!(name.sort_name(), "Beethoven Ludwig");

        let org = Name {
            literal: Some("ISO/IEC JTC1/SC22/WG21".to_string()),
            ..Default::default()
        };
        assert!(org.is_literal());
        assert_eq!(org.given_first(), "ISO/IEC JTC1/SC22/WG21");
    }
}
