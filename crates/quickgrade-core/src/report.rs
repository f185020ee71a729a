use crate::matcher::{MatchKind, MatchOutcome, MatchedGrade};
use serde::Serialize;

/// Headline numbers of a matching run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatchSummary {
    pub roster_rows: usize,
    pub matched: usize,
    pub by_email: usize,
    pub by_name: usize,
    pub by_fallback: usize,
    pub unmatched: usize,
    pub ambiguous: usize,
    /// Matched fields that already hold a grade
    pub existing_grades: usize,
}

impl MatchSummary {
    pub fn from_outcome(outcome: &MatchOutcome) -> Self {
        Self {
            roster_rows: outcome.results.len(),
            matched: outcome.matched.len(),
            by_email: outcome.count_by_kind(MatchKind::Email),
            by_name: outcome.count_by_kind(MatchKind::Name),
            by_fallback: outcome.count_by_kind(MatchKind::Fallback),
            unmatched: outcome.unmatched().count(),
            ambiguous: outcome.ambiguous().count(),
            existing_grades: outcome.matched.iter().filter(|m| m.entry.has_grade()).count(),
        }
    }
}

/// Split matched grades into (empty fields, fields with an existing grade)
pub fn partition_by_existing(matched: &[MatchedGrade]) -> (Vec<&MatchedGrade>, Vec<&MatchedGrade>) {
    matched.iter().partition(|m| !m.entry.has_grade())
}

/// Whether writing this grade changes what the field shows
pub fn grade_changes(grade: &MatchedGrade) -> bool {
    grade.entry.current_grade.trim() != grade.row.grade.trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{ExtractionMethod, FormEntry, Scrape};
    use crate::matcher::{FallbackTable, Matcher};
    use crate::roster::RosterRow;

    #[test]
    fn test_summary_counts() {
        let scrape = Scrape::new(
            vec![
                FormEntry::new("17").with_email("a@x.com").with_name("Alice"),
                FormEntry::new("18").with_email("b@x.com").with_name("Bob").with_grade("70"),
                FormEntry::new("19").with_email("c@x.com").with_name("John Smith"),
                FormEntry::new("20").with_email("d@x.com").with_name("John Smithers"),
            ],
            ExtractionMethod::RowCells,
        );
        let rows = vec![
            RosterRow::new("85").with_email("a@x.com"),
            RosterRow::new("90").with_name("Bob"),
            RosterRow::new("60").with_name("John Smith"),
            RosterRow::new("50").with_email("zed@x.com"),
        ];

        let outcome = Matcher::new(&scrape, &FallbackTable::default()).match_all(&rows);
        let summary = MatchSummary::from_outcome(&outcome);

        assert_eq!(summary.roster_rows, 4);
        assert_eq!(summary.matched, 2);
        assert_eq!(summary.by_email, 1);
        assert_eq!(summary.by_name, 1);
        assert_eq!(summary.ambiguous, 1);
        assert_eq!(summary.unmatched, 1);
        assert_eq!(summary.existing_grades, 1);

        let (empty, filled) = partition_by_existing(&outcome.matched);
        assert_eq!(empty.len(), 1);
        assert_eq!(filled.len(), 1);
        assert!(grade_changes(filled[0]));
    }
}
