//! CSV loading for the course catalog and the language lookup table.

use super::{CourseRecord, LanguageCode, LanguageTable};
use crate::error::{RagError, Result};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

const COURSE_COLUMNS: [&str; 4] = [
    "Course Title",
    "About Course",
    "Course Released Languages",
    "Who This Course Is For",
];

const LANGUAGE_COLUMNS: [&str; 2] = ["Code", "Language"];

#[derive(Debug, Deserialize)]
struct CourseRow {
    #[serde(rename = "Course Title")]
    title: String,
    #[serde(rename = "About Course")]
    about: String,
    #[serde(rename = "Course Released Languages")]
    languages: String,
    #[serde(rename = "Who This Course Is For")]
    audience: String,
}

impl From<CourseRow> for CourseRecord {
    fn from(row: CourseRow) -> Self {
        Self {
            title: row.title,
            description: row.about,
            languages: LanguageCode::parse_list(&row.languages),
            audience: row.audience,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LanguageRow {
    #[serde(rename = "Code")]
    code: i64,
    #[serde(rename = "Language")]
    language: String,
}

/// Load the course catalog from a CSV file.
pub fn load_courses(path: &Path) -> Result<Vec<CourseRecord>> {
    let file = open(path)?;
    let courses = parse_courses(file, &path.display().to_string())?;
    info!("Loaded {} courses from {}", courses.len(), path.display());
    Ok(courses)
}

/// Load the language lookup table from a CSV file.
pub fn load_languages(path: &Path) -> Result<LanguageTable> {
    let file = open(path)?;
    let table = parse_languages(file, &path.display().to_string())?;
    if table.is_empty() {
        warn!("Language table {} has no rows; every course will list Unknown", path.display());
    } else {
        info!("Loaded {} languages from {}", table.len(), path.display());
    }
    Ok(table)
}

/// Parse course rows from any CSV source. `source` names the input in errors.
pub fn parse_courses<R: Read>(input: R, source: &str) -> Result<Vec<CourseRecord>> {
    // Course text is kept as written; only header names are trimmed.
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(input);
    require_columns(&mut reader, &COURSE_COLUMNS, source)?;

    reader
        .deserialize::<CourseRow>()
        .enumerate()
        .map(|(i, row)| {
            row.map(CourseRecord::from)
                .map_err(|e| RagError::DataLoad(format!("{}: row {}: {}", source, i + 1, e)))
        })
        .collect()
}

/// Parse the language table from any CSV source. `source` names the input in errors.
pub fn parse_languages<R: Read>(input: R, source: &str) -> Result<LanguageTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(input);
    require_columns(&mut reader, &LANGUAGE_COLUMNS, source)?;

    reader
        .deserialize::<LanguageRow>()
        .enumerate()
        .map(|(i, row)| {
            row.map(|r| (r.code, r.language))
                .map_err(|e| RagError::DataLoad(format!("{}: row {}: {}", source, i + 1, e)))
        })
        .collect::<Result<LanguageTable>>()
}

fn open(path: &Path) -> Result<std::fs::File> {
    std::fs::File::open(path)
        .map_err(|e| RagError::DataLoad(format!("cannot open {}: {}", path.display(), e)))
}

fn require_columns<R: Read>(
    reader: &mut csv::Reader<R>,
    columns: &[&str],
    source: &str,
) -> Result<()> {
    let headers = reader
        .headers()
        .map_err(|e| RagError::DataLoad(format!("{}: unreadable header: {}", source, e)))?;

    let missing: Vec<&str> = columns
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(RagError::DataLoad(format!(
            "{}: missing required column(s): {}",
            source,
            missing.join(", ")
        )))
    }
}
