//! Course catalog records and their normalization into embeddable text.
//!
//! Each course row is turned into exactly one [`EnrichedRecord`] whose text
//! combines title, description, resolved language names and audience.

mod loader;

pub use loader::{load_courses, load_languages, parse_courses, parse_languages};

use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Name substituted for language codes that cannot be resolved.
pub const UNKNOWN_LANGUAGE: &str = "Unknown";

/// A single entry of a course's released-languages field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageCode {
    /// A numeric code, which may or may not exist in the lookup table.
    Code(i64),
    /// A field entry that is not an integer (kept verbatim for diagnostics).
    Invalid(String),
}

impl LanguageCode {
    /// Parse a comma-separated language field, preserving field order.
    pub fn parse_list(field: &str) -> Vec<LanguageCode> {
        field
            .split(',')
            .map(|raw| {
                let trimmed = raw.trim();
                trimmed
                    .parse::<i64>()
                    .map(LanguageCode::Code)
                    .unwrap_or_else(|_| LanguageCode::Invalid(trimmed.to_string()))
            })
            .collect()
    }
}

/// One course of the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseRecord {
    pub title: String,
    pub description: String,
    pub languages: Vec<LanguageCode>,
    pub audience: String,
}

/// Mapping from language code to display name.
#[derive(Debug, Clone, Default)]
pub struct LanguageTable {
    names: HashMap<i64, String>,
}

impl LanguageTable {
    pub fn new(names: HashMap<i64, String>) -> Self {
        Self { names }
    }

    /// Resolve a code, falling back to [`UNKNOWN_LANGUAGE`].
    pub fn resolve(&self, code: &LanguageCode) -> &str {
        match code {
            LanguageCode::Code(c) => self.names.get(c).map(String::as_str).unwrap_or(UNKNOWN_LANGUAGE),
            LanguageCode::Invalid(_) => UNKNOWN_LANGUAGE,
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<(i64, String)> for LanguageTable {
    fn from_iter<I: IntoIterator<Item = (i64, String)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Synthesized text for one course, ready for chunking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichedRecord {
    /// Position of the source course in the catalog.
    pub course_index: usize,
    /// Course title, kept for display.
    pub title: String,
    /// Text built from the fixed template.
    pub text: String,
}

/// Render the comma-joined language names for a course.
pub fn resolve_languages(codes: &[LanguageCode], table: &LanguageTable) -> String {
    codes
        .iter()
        .map(|code| table.resolve(code))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Turn course rows into enriched text records, one per course, in input order.
pub fn normalize(courses: &[CourseRecord], languages: &LanguageTable) -> Vec<EnrichedRecord> {
    let mut unresolved = 0usize;

    let records: Vec<EnrichedRecord> = courses
        .iter()
        .enumerate()
        .map(|(course_index, course)| {
            unresolved += course
                .languages
                .iter()
                .filter(|code| languages.resolve(code) == UNKNOWN_LANGUAGE)
                .count();

            let text = format!(
                "Course Title: {}. About Course: {}. Languages: {}. Audience: {}.",
                course.title,
                course.description,
                resolve_languages(&course.languages, languages),
                course.audience
            );

            EnrichedRecord {
                course_index,
                title: course.title.clone(),
                text,
            }
        })
        .collect();

    if unresolved > 0 {
        warn!("{} language codes could not be resolved and were recorded as {}", unresolved, UNKNOWN_LANGUAGE);
    }
    debug!("Normalized {} course records", records.len());

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> LanguageTable {
        [(6, "Hindi"), (7, "Kannada"), (11, "English")]
            .into_iter()
            .map(|(c, n)| (c, n.to_string()))
            .collect()
    }

    fn course(languages: &str) -> CourseRecord {
        CourseRecord {
            title: "Dairy Farming".to_string(),
            description: "Start a profitable dairy farm".to_string(),
            languages: LanguageCode::parse_list(languages),
            audience: "Aspiring farmers".to_string(),
        }
    }

    #[test]
    fn test_parse_list_trims_and_keeps_order() {
        let codes = LanguageCode::parse_list(" 7,6 , 11");
        assert_eq!(
            codes,
            vec![LanguageCode::Code(7), LanguageCode::Code(6), LanguageCode::Code(11)]
        );
    }

    #[test]
    fn test_resolved_names_in_field_order() {
        let records = normalize(&[course("11, 6,7")], &table());
        assert_eq!(
            records[0].text,
            "Course Title: Dairy Farming. About Course: Start a profitable dairy farm. \
             Languages: English, Hindi, Kannada. Audience: Aspiring farmers."
        );
    }

    #[test]
    fn test_unknown_codes_do_not_fail_the_record() {
        let records = normalize(&[course("6, 99, tamil,")], &table());
        assert_eq!(records.len(), 1);
        assert!(records[0].text.contains("Languages: Hindi, Unknown, Unknown, Unknown."));
    }

    #[test]
    fn test_one_record_per_course_in_order() {
        let mut second = course("7");
        second.title = "Poultry".to_string();
        let records = normalize(&[course("6"), second], &table());

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].course_index, 0);
        assert_eq!(records[1].course_index, 1);
        assert_eq!(records[1].title, "Poultry");
    }
}
