//! Joins roster rows to scraped form entries.
//!
//! Each row is matched by email first, then by name containment. When the
//! page exposes no emails at all, only the operator's fallback table is used.
//! A row matching more than one entry is reported as ambiguous and never
//! resolved automatically.

mod fallback;

pub use fallback::{FallbackEntry, FallbackTable};

use crate::form::{FormEntry, Scrape};
use crate::roster::RosterRow;
use serde::Serialize;

/// How a roster row was linked to a form entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MatchKind {
    Email,
    Name,
    Fallback,
}

impl MatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchKind::Email => "email",
            MatchKind::Name => "name",
            MatchKind::Fallback => "fallback table",
        }
    }
}

/// A row linked to exactly one form entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchedGrade {
    pub row: RosterRow,
    pub entry: FormEntry,
    pub kind: MatchKind,
}

impl MatchedGrade {
    pub fn identifier(&self) -> &str {
        &self.entry.identifier
    }
}

/// Outcome for one roster row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MatchResult {
    Matched(MatchedGrade),
    Ambiguous {
        row: RosterRow,
        candidates: Vec<FormEntry>,
    },
    Unmatched(RosterRow),
}

impl MatchResult {
    pub fn row(&self) -> &RosterRow {
        match self {
            MatchResult::Matched(m) => &m.row,
            MatchResult::Ambiguous { row, .. } => row,
            MatchResult::Unmatched(row) => row,
        }
    }
}

/// Results of matching a whole roster
#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    /// One result per roster row, in roster order
    pub results: Vec<MatchResult>,
    /// Matched rows keyed by identifier; a later row replaces an earlier one
    pub matched: Vec<MatchedGrade>,
    /// Whether the fallback table was used because the page had no emails
    pub email_blind: bool,
}

impl MatchOutcome {
    pub fn unmatched(&self) -> impl Iterator<Item = &RosterRow> {
        self.results.iter().filter_map(|r| match r {
            MatchResult::Unmatched(row) => Some(row),
            _ => None,
        })
    }

    pub fn ambiguous(&self) -> impl Iterator<Item = (&RosterRow, &[FormEntry])> {
        self.results.iter().filter_map(|r| match r {
            MatchResult::Ambiguous { row, candidates } => Some((row, candidates.as_slice())),
            _ => None,
        })
    }

    pub fn count_by_kind(&self, kind: MatchKind) -> usize {
        self.matched.iter().filter(|m| m.kind == kind).count()
    }
}

pub struct Matcher<'a> {
    scrape: &'a Scrape,
    fallback: &'a FallbackTable,
}

impl<'a> Matcher<'a> {
    pub fn new(scrape: &'a Scrape, fallback: &'a FallbackTable) -> Self {
        Self { scrape, fallback }
    }

    /// Match every row against the scrape
    pub fn match_all(&self, rows: &[RosterRow]) -> MatchOutcome {
        let email_blind = !self.scrape.has_emails();
        if email_blind {
            tracing::info!(
                "No emails on the page, matching through {} fallback mappings",
                self.fallback.len()
            );
        }

        let mut outcome = MatchOutcome {
            email_blind,
            ..Default::default()
        };

        for row in rows {
            let result = self.match_row(row);

            match &result {
                MatchResult::Matched(m) => {
                    tracing::debug!(
                        "Matched {} -> {} by {}",
                        row.label(),
                        m.identifier(),
                        m.kind.as_str()
                    );
                    match outcome
                        .matched
                        .iter_mut()
                        .find(|prev| prev.identifier() == m.identifier())
                    {
                        Some(prev) => {
                            tracing::warn!(
                                "{} and {} both match field {}, keeping the later row",
                                prev.row.label(),
                                row.label(),
                                m.identifier()
                            );
                            *prev = m.clone();
                        }
                        None => outcome.matched.push(m.clone()),
                    }
                }
                MatchResult::Ambiguous { candidates, .. } => {
                    tracing::debug!("{} matches {} fields", row.label(), candidates.len());
                }
                MatchResult::Unmatched(_) => {
                    tracing::debug!("No match for {}", row.label());
                }
            }

            outcome.results.push(result);
        }

        outcome
    }

    /// Match a single row
    pub fn match_row(&self, row: &RosterRow) -> MatchResult {
        if !self.scrape.has_emails() {
            return match self.fallback_match(row) {
                Some(entry) => Self::classify(row, vec![entry], MatchKind::Fallback),
                None => MatchResult::Unmatched(row.clone()),
            };
        }

        if let Some(entry) = self.email_match(row) {
            return Self::classify(row, vec![entry], MatchKind::Email);
        }

        Self::classify(row, self.name_matches(row), MatchKind::Name)
    }

    fn classify(row: &RosterRow, mut candidates: Vec<&FormEntry>, kind: MatchKind) -> MatchResult {
        match candidates.len() {
            0 => MatchResult::Unmatched(row.clone()),
            1 => MatchResult::Matched(MatchedGrade {
                row: row.clone(),
                entry: candidates.remove(0).clone(),
                kind,
            }),
            _ => MatchResult::Ambiguous {
                row: row.clone(),
                candidates: candidates.into_iter().cloned().collect(),
            },
        }
    }

    /// Emails are assumed unique; the first entry in page order wins
    fn email_match(&self, row: &RosterRow) -> Option<&'a FormEntry> {
        let email = row.email.as_deref()?;
        self.scrape
            .entries()
            .iter()
            .find(|e| e.email.as_deref().is_some_and(|m| m.eq_ignore_ascii_case(email)))
    }

    fn name_matches(&self, row: &RosterRow) -> Vec<&'a FormEntry> {
        let Some(name) = row.name.as_deref().map(str::to_lowercase) else {
            return Vec::new();
        };

        self.scrape
            .entries()
            .iter()
            .filter(|e| {
                e.name.as_deref().is_some_and(|n| {
                    let n = n.to_lowercase();
                    n.contains(&name) || name.contains(&n)
                })
            })
            .collect()
    }

    /// First table entry matching the row name whose identifier is on the page
    fn fallback_match(&self, row: &RosterRow) -> Option<&'a FormEntry> {
        let name = row.name.as_deref()?;
        self.fallback
            .candidates(name)
            .find_map(|known| self.scrape.get(&known.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::ExtractionMethod;

    fn scrape(entries: Vec<FormEntry>) -> Scrape {
        Scrape::new(entries, ExtractionMethod::RowCells)
    }

    fn run(rows: &[RosterRow], scrape: &Scrape, table: &FallbackTable) -> MatchOutcome {
        Matcher::new(scrape, table).match_all(rows)
    }

    #[test]
    fn test_unique_email_matches_by_email() {
        let scrape = scrape(vec![
            FormEntry::new("17").with_email("a@x.com").with_name("Alice"),
            FormEntry::new("18").with_email("b@x.com").with_name("Alice B"),
        ]);
        let row = RosterRow::new("85").with_email("A@X.com").with_name("Alice");

        let outcome = run(&[row], &scrape, &FallbackTable::default());

        assert_eq!(outcome.matched.len(), 1);
        assert_eq!(outcome.matched[0].identifier(), "17");
        assert_eq!(outcome.matched[0].kind, MatchKind::Email);
        assert!(!outcome.email_blind);
    }

    #[test]
    fn test_name_used_when_email_misses() {
        let scrape = scrape(vec![
            FormEntry::new("17").with_email("a@x.com").with_name("Alice Smith"),
            FormEntry::new("18").with_email("b@x.com").with_name("Bob Jones"),
        ]);
        let row = RosterRow::new("70").with_email("bob@other.org").with_name("bob jones");

        let outcome = run(&[row], &scrape, &FallbackTable::default());

        assert_eq!(outcome.matched[0].identifier(), "18");
        assert_eq!(outcome.matched[0].kind, MatchKind::Name);
    }

    #[test]
    fn test_name_containment_either_direction() {
        let scrape = scrape(vec![
            FormEntry::new("17").with_email("a@x.com").with_name("Alice"),
        ]);
        let longer = RosterRow::new("1").with_name("Alice Smith");
        let shorter = RosterRow::new("2").with_name("lic");

        let outcome = run(&[longer, shorter], &scrape, &FallbackTable::default());

        assert_eq!(outcome.count_by_kind(MatchKind::Name), 1);
        assert!(
            outcome
                .results
                .iter()
                .all(|r| matches!(r, MatchResult::Matched(_)))
        );
    }

    #[test]
    fn test_multiple_name_candidates_are_ambiguous() {
        let scrape = scrape(vec![
            FormEntry::new("17").with_email("a@x.com").with_name("John Smith"),
            FormEntry::new("18").with_email("b@x.com").with_name("John Smith"),
        ]);
        let row = RosterRow::new("90").with_name("John Smith");

        let outcome = run(&[row], &scrape, &FallbackTable::default());

        assert!(outcome.matched.is_empty());
        let ambiguous: Vec<_> = outcome.ambiguous().collect();
        assert_eq!(ambiguous.len(), 1);
        let ids: Vec<&str> = ambiguous[0].1.iter().map(|e| e.identifier.as_str()).collect();
        assert_eq!(ids, vec!["17", "18"]);
    }

    #[test]
    fn test_email_blind_uses_only_fallback_table() {
        let scrape = scrape(vec![
            FormEntry::new("4407").with_name("Student_4407"),
            FormEntry::new("5254").with_name("Alice Smith"),
        ]);
        let table = FallbackTable::new(vec![
            FallbackEntry::new("Bob Jones", "4407"),
            FallbackEntry::new("Carol White", "9999"),
        ])
        .unwrap();

        let rows = vec![
            RosterRow::new("80").with_name("bob jones"),
            RosterRow::new("75").with_name("Alice Smith"),
            RosterRow::new("60").with_name("Carol White"),
            RosterRow::new("50").with_email("bob@x.com"),
        ];

        let outcome = run(&rows, &scrape, &table);

        assert!(outcome.email_blind);
        assert_eq!(outcome.matched.len(), 1);
        assert_eq!(outcome.matched[0].identifier(), "4407");
        assert_eq!(outcome.matched[0].kind, MatchKind::Fallback);
        // Alice's name is on the page but not in the table
        assert_eq!(outcome.unmatched().count(), 3);
    }

    #[test]
    fn test_fallback_skips_identifiers_missing_from_page() {
        let scrape = scrape(vec![FormEntry::new("18")]);
        let table = FallbackTable::new(vec![
            FallbackEntry::new("Bob Jones", "17"),
            FallbackEntry::new("Bob Jones", "18"),
        ])
        .unwrap();

        let outcome = run(&[RosterRow::new("1").with_name("Bob Jones")], &scrape, &table);

        assert_eq!(outcome.matched[0].identifier(), "18");
    }

    #[test]
    fn test_row_without_identity_is_unmatched() {
        let scrape = scrape(vec![FormEntry::new("17").with_email("a@x.com").with_name("Alice")]);

        let outcome = run(&[RosterRow::new("85")], &scrape, &FallbackTable::default());

        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.unmatched().count(), 1);
    }

    #[test]
    fn test_every_row_yields_one_result() {
        let scrape = scrape(vec![
            FormEntry::new("17").with_email("a@x.com").with_name("Alice"),
            FormEntry::new("18").with_email("b@x.com").with_name("Alicia"),
        ]);
        let rows = vec![
            RosterRow::new("1").with_email("a@x.com"),
            RosterRow::new("2").with_name("Ali"),
            RosterRow::new("3").with_name("Zed"),
        ];

        let outcome = run(&rows, &scrape, &FallbackTable::default());

        assert_eq!(outcome.results.len(), rows.len());
        for (result, row) in outcome.results.iter().zip(&rows) {
            assert_eq!(result.row(), row);
        }
    }

    #[test]
    fn test_later_row_replaces_earlier_for_same_field() {
        let scrape = scrape(vec![FormEntry::new("17").with_email("a@x.com").with_name("Alice")]);
        let rows = vec![
            RosterRow::new("60").with_email("a@x.com"),
            RosterRow::new("90").with_email("a@x.com"),
        ];

        let outcome = run(&rows, &scrape, &FallbackTable::default());

        assert_eq!(outcome.matched.len(), 1);
        assert_eq!(outcome.matched[0].row.grade, "90");
    }
}
