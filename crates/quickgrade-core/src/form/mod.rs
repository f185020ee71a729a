mod cleanup;

pub use cleanup::{clean_display_name, find_email};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Name attribute prefix of a quick-grading grade input
pub const GRADE_FIELD_PREFIX: &str = "quickgrade_";
/// Name attribute prefix of a quick-grading feedback textarea
pub const FEEDBACK_FIELD_PREFIX: &str = "quickgrade_comments_";

/// One quick-grading field on the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormEntry {
    pub identifier: String,
    /// Lowercased
    pub email: Option<String>,
    pub name: Option<String>,
    pub current_grade: String,
}

impl FormEntry {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            email: None,
            name: None,
            current_grade: String::new(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into().trim().to_lowercase()).filter(|e| !e.is_empty());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into().trim().to_string()).filter(|n| !n.is_empty());
        self
    }

    pub fn with_grade(mut self, grade: impl Into<String>) -> Self {
        self.current_grade = grade.into();
        self
    }

    /// Whether the field already holds a non-blank grade
    pub fn has_grade(&self) -> bool {
        !self.current_grade.trim().is_empty()
    }
}

/// Raw field data collected by the page script
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawField {
    pub id: String,
    pub value: String,
    /// Whether the input sits inside a table row
    pub in_row: bool,
    /// Text of each email cell candidate, highest priority first; empty where none was found
    pub email_cells: Vec<String>,
    /// Text of each name cell candidate, highest priority first
    pub name_cells: Vec<String>,
    /// Text of every cell in the input's row
    pub cells: Vec<String>,
}

/// How the entries of a scrape were obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExtractionMethod {
    /// Email and name read from their dedicated cells
    RowCells,
    /// No email cells; emails found by pattern anywhere in each row
    RowPattern,
    /// Inputs outside table rows; only identifiers and values are known
    Placeholder,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMethod::RowCells => "row cells",
            ExtractionMethod::RowPattern => "email pattern",
            ExtractionMethod::Placeholder => "identifiers only",
        }
    }
}

/// The form state captured once at the start of a run, in page order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scrape {
    entries: Vec<FormEntry>,
    method: ExtractionMethod,
}

impl Scrape {
    /// Build a scrape, keeping the first entry for any repeated identifier
    pub fn new(entries: Vec<FormEntry>, method: ExtractionMethod) -> Self {
        let mut seen = HashSet::new();
        let entries = entries
            .into_iter()
            .filter(|entry| {
                let fresh = seen.insert(entry.identifier.clone());
                if !fresh {
                    tracing::warn!("Duplicate grade field for identifier {}", entry.identifier);
                }
                fresh
            })
            .collect();

        Self { entries, method }
    }

    /// Interpret the page script's raw field records.
    ///
    /// Email candidates are tried in priority order and only one holding an
    /// address counts; the name is the first non-empty candidate.
    pub fn from_raw(fields: Vec<RawField>) -> Self {
        let rows: Vec<&RawField> = fields.iter().filter(|f| f.in_row).collect();

        if rows.is_empty() {
            if !fields.is_empty() {
                tracing::warn!("Grade fields are not inside table rows, using identifiers only");
            }
            let entries = fields
                .iter()
                .map(|f| {
                    FormEntry::new(&f.id)
                        .with_name(format!("Student_{}", f.id))
                        .with_grade(&f.value)
                })
                .collect();
            return Self::new(entries, ExtractionMethod::Placeholder);
        }

        let mut entries: Vec<FormEntry> = rows
            .iter()
            .map(|f| {
                let mut entry = FormEntry::new(&f.id).with_grade(&f.value);
                if let Some(email) = f.email_cells.iter().find_map(|cell| find_email(cell)) {
                    entry.email = Some(email);
                }
                if let Some(name) = f.name_cells.iter().find(|cell| !cell.trim().is_empty()) {
                    entry = entry.with_name(clean_display_name(name));
                }
                entry
            })
            .collect();

        if entries.iter().any(|e| e.email.is_some()) {
            return Self::new(entries, ExtractionMethod::RowCells);
        }

        tracing::info!("No email cells found, scanning rows for email addresses");
        for (entry, field) in entries.iter_mut().zip(rows.iter()) {
            if let Some(email) = field.cells.iter().find_map(|cell| find_email(cell)) {
                tracing::debug!("Found email for {}: {}", entry.identifier, email);
                entry.email = Some(email);
            }
        }

        Self::new(entries, ExtractionMethod::RowPattern)
    }

    pub fn entries(&self) -> &[FormEntry] {
        &self.entries
    }

    pub fn get(&self, identifier: &str) -> Option<&FormEntry> {
        self.entries.iter().find(|e| e.identifier == identifier)
    }

    /// Whether any entry exposes an email; a scrape without one is email-blind
    pub fn has_emails(&self) -> bool {
        self.entries.iter().any(|e| e.email.is_some())
    }

    pub fn method(&self) -> ExtractionMethod {
        self.method
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
