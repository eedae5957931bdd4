//! Normalization of raw study/series attribute dictionaries.
//!
//! Raw observations arrive as loosely-typed DICOM-named attribute maps. This
//! module turns them into [`NormalizedTerm`]s: level-specific text
//! extraction, PHI rejection, backslash-joined modality, and canonicalized
//! dates. Everything here is pure; dropped values leave no trace beyond the
//! caller's tallies.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::phi::is_phi;
use crate::term::{Level, NormalizedTerm};

/// A raw modality attribute: a single code or a multi-valued sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Modality {
    Single(String),
    Multi(Vec<String>),
}

/// One raw attribute dictionary handed over by an ingestion source.
///
/// Unknown fields are ignored; absent fields degrade to dropped
/// observations rather than errors.
#[derive(Debug, Clone, Deserialize)]
pub struct RawObservation {
    pub level: Level,
    #[serde(rename = "StudyDescription", default)]
    pub study_description: Option<String>,
    #[serde(rename = "SeriesDescription", default)]
    pub series_description: Option<String>,
    #[serde(rename = "BodyPartExamined", default)]
    pub body_part_examined: Option<String>,
    #[serde(rename = "ProtocolName", default)]
    pub protocol_name: Option<String>,
    #[serde(rename = "Modality", alias = "ModalitiesInStudy", default)]
    pub modality: Option<Modality>,
    #[serde(rename = "StudyDate", alias = "SeriesDate", default)]
    pub date: Option<String>,
}

impl RawObservation {
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self {
            level,
            study_description: None,
            series_description: None,
            body_part_examined: None,
            protocol_name: None,
            modality: None,
            date: None,
        }
    }
}

/// Normalize one raw observation into zero or more terms.
///
/// Study-level observations contribute their `StudyDescription`;
/// series-level observations contribute `SeriesDescription`,
/// `BodyPartExamined` and `ProtocolName`, each as its own term. Values that
/// are empty after trimming or that trip the PHI filter are dropped.
#[must_use]
pub fn normalize(raw: &RawObservation) -> Vec<NormalizedTerm> {
    let modality = raw.modality.as_ref().and_then(normalize_modality);
    let date = raw.date.as_deref().and_then(normalize_date);

    let fields: &[&Option<String>] = match raw.level {
        Level::Study => &[&raw.study_description],
        Level::Series => &[
            &raw.series_description,
            &raw.body_part_examined,
            &raw.protocol_name,
        ],
    };

    let mut terms = Vec::new();
    for field in fields {
        let Some(text) = field.as_deref().and_then(normalize_text) else {
            continue;
        };
        terms.push(NormalizedTerm {
            text,
            level: raw.level,
            modality: modality.clone(),
            date: date.clone(),
        });
    }
    terms
}

/// Trim a raw text value and reject empty or PHI-bearing values.
#[must_use]
pub fn normalize_text(value: &str) -> Option<String> {
    let text = value.trim();
    if text.is_empty() || is_phi(text) {
        return None;
    }
    Some(text.to_string())
}

/// Join multi-valued modalities with the DICOM `\` separator.
///
/// Empty components are dropped; a fully empty value is canonical `None`,
/// never an empty string.
#[must_use]
pub fn normalize_modality(value: &Modality) -> Option<String> {
    match value {
        Modality::Single(text) => {
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        }
        Modality::Multi(values) => {
            let parts: Vec<&str> = values
                .iter()
                .map(|item| item.trim())
                .filter(|item| !item.is_empty())
                .collect();
            (!parts.is_empty()).then(|| parts.join("\\"))
        }
    }
}

/// Canonicalize a raw date value.
///
/// A valid 8-digit calendar date is kept as-is; anything else is reduced to
/// its digits, or `None` when no digits remain.
#[must_use]
pub fn normalize_date(value: &str) -> Option<String> {
    let text = value.trim();
    if is_canonical_date(text) {
        return Some(text.to_string());
    }
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    (!digits.is_empty()).then_some(digits)
}

/// True for a `YYYYMMDD` string naming a real calendar date.
///
/// Canonical dates order lexicographically, which is what the store's
/// later-date-wins merge relies on.
#[must_use]
pub fn is_canonical_date(value: &str) -> bool {
    value.len() == 8
        && value.chars().all(|ch| ch.is_ascii_digit())
        && NaiveDate::parse_from_str(value, "%Y%m%d").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_study_description_extracted() {
        let mut raw = RawObservation::new(Level::Study);
        raw.study_description = Some("MR BRAIN W/WO".to_string());
        let terms = normalize(&raw);
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].text, "MR BRAIN W/WO");
        assert_eq!(terms[0].level, Level::Study);
        assert_eq!(terms[0].modality, None);
    }

    #[test]
    fn test_series_yields_one_term_per_attribute() {
        let mut raw = RawObservation::new(Level::Series);
        raw.series_description = Some("AX T2".to_string());
        raw.body_part_examined = Some("BRAIN".to_string());
        raw.protocol_name = Some("T2 PROPELLER".to_string());
        let terms = normalize(&raw);
        let texts: Vec<&str> = terms.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, ["AX T2", "BRAIN", "T2 PROPELLER"]);
    }

    #[test]
    fn test_phi_text_dropped() {
        let mut raw = RawObservation::new(Level::Study);
        raw.study_description = Some("John^Doe".to_string());
        assert!(normalize(&raw).is_empty());

        raw.study_description = Some("ACC 1234567".to_string());
        assert!(normalize(&raw).is_empty());
    }

    #[test]
    fn test_empty_or_missing_text_dropped() {
        let mut raw = RawObservation::new(Level::Study);
        assert!(normalize(&raw).is_empty());
        raw.study_description = Some("   ".to_string());
        assert!(normalize(&raw).is_empty());
    }

    #[test]
    fn test_multi_valued_modality_joined_with_backslash() {
        let value = Modality::Multi(vec!["CT".to_string(), "CT".to_string()]);
        assert_eq!(normalize_modality(&value).as_deref(), Some("CT\\CT"));
    }

    #[test]
    fn test_empty_modality_is_none() {
        assert_eq!(normalize_modality(&Modality::Single("  ".to_string())), None);
        assert_eq!(normalize_modality(&Modality::Multi(vec![])), None);
        assert_eq!(
            normalize_modality(&Modality::Multi(vec!["".to_string()])),
            None
        );
    }

    #[test]
    fn test_canonical_date_kept() {
        assert_eq!(normalize_date("20240131").as_deref(), Some("20240131"));
        assert!(is_canonical_date("20240131"));
    }

    #[test]
    fn test_invalid_calendar_date_sanitized() {
        // 8 digits but not a real date: reduced to its digit remainder.
        assert!(!is_canonical_date("20241340"));
        assert_eq!(normalize_date("2024-01-31").as_deref(), Some("20240131"));
        assert_eq!(normalize_date("Jan 2024").as_deref(), Some("2024"));
        assert_eq!(normalize_date("unknown"), None);
        assert_eq!(normalize_date(""), None);
    }

    #[test]
    fn test_raw_observation_from_json() {
        let raw: RawObservation = serde_json::from_str(
            r#"{
                "level": "study",
                "StudyDescription": "CT CHEST",
                "ModalitiesInStudy": ["CT", "CT"],
                "StudyDate": "20240102",
                "UnknownTag": 7
            }"#,
        )
        .unwrap();
        let terms = normalize(&raw);
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].modality.as_deref(), Some("CT\\CT"));
        assert_eq!(terms[0].date.as_deref(), Some("20240102"));
    }
}
