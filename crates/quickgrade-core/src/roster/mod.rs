mod columns;
mod loader;

pub use columns::{
    ColumnRoles, NameSource, Requirement, Role, UnresolvedColumns, resolve_columns,
};
pub use loader::{RosterLoader, Schema};

use serde::Serialize;

/// One student row from the operator's spreadsheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterRow {
    /// Lowercased and trimmed
    pub email: Option<String>,
    pub name: Option<String>,
    pub grade: String,
    pub feedback: Option<String>,
}

impl RosterRow {
    pub fn new(grade: impl Into<String>) -> Self {
        Self {
            email: None,
            name: None,
            grade: grade.into(),
            feedback: None,
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

    pub fn with_feedback(mut self, feedback: impl Into<String>) -> Self {
        self.feedback = Some(feedback.into()).filter(|f| !f.trim().is_empty());
        self
    }

    /// "Name (email)" for reports
    pub fn label(&self) -> String {
        format!(
            "{} ({})",
            self.name.as_deref().unwrap_or("<no name>"),
            self.email.as_deref().unwrap_or("no email")
        )
    }
}

/// Header row plus data rows, empty cells as `None`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl Table {
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    pub fn has_columns(&self, headers: &[&str]) -> bool {
        headers.iter().all(|h| self.column_index(h).is_some())
    }
}

/// A loaded roster with the schema and columns it was read with
#[derive(Debug, Clone)]
pub struct Roster {
    pub schema: Schema,
    pub roles: ColumnRoles,
    pub rows: Vec<RosterRow>,
}

impl Roster {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
