use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A known student name and the form identifier it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackEntry {
    pub name: String,
    pub id: String,
}

impl FallbackEntry {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}

/// Ordered name → identifier pairs consulted when the page exposes no emails
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FallbackTable {
    entries: Vec<FallbackEntry>,
}

impl FallbackTable {
    pub fn new(entries: Vec<FallbackEntry>) -> Result<Self> {
        for (idx, entry) in entries.iter().enumerate() {
            if entry.name.trim().is_empty() || entry.id.trim().is_empty() {
                return Err(Error::InvalidFallback(format!(
                    "entry {} needs a non-empty name and id",
                    idx
                )));
            }
        }
        Ok(Self { entries })
    }

    /// Parse a JSON array of `{"name": ..., "id": ...}` objects
    pub fn from_json_str(content: &str) -> Result<Self> {
        let entries: Vec<FallbackEntry> = serde_json::from_str(content)?;
        Self::new(entries)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        tracing::debug!("Reading fallback table from: {}", path.display());

        let content = std::fs::read_to_string(path)?;
        let table = Self::from_json_str(&content)?;

        tracing::info!("Loaded {} fallback mappings", table.len());
        Ok(table)
    }

    /// Entries whose name contains `name` or is contained by it, case-insensitively, in table order
    pub fn candidates<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a FallbackEntry> + 'a {
        let name = name.trim().to_lowercase();
        self.entries.iter().filter(move |entry| {
            let known = entry.name.to_lowercase();
            !name.is_empty() && (known.contains(&name) || name.contains(&known))
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
