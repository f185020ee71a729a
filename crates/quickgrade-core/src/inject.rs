//! Planning and tallying grade writes.
//!
//! The plan is decided here from the scraped state and the chosen policy; the
//! browser only applies it and reports which fields it found.

use crate::matcher::MatchedGrade;
use crate::policy::Policy;
use serde::{Deserialize, Serialize};

/// What happens to one grade field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldAction {
    /// Field was empty and gets the new grade
    FillNew,
    /// Field held a grade that gets replaced
    Overwrite,
    /// Field keeps its grade
    Skip,
}

/// One planned write, serialized for the page script
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldWrite {
    pub id: String,
    pub action: FieldAction,
    pub grade: String,
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectionPlan {
    pub policy: Policy,
    pub writes: Vec<FieldWrite>,
}

impl InjectionPlan {
    /// Decide the action for every matched field
    pub fn build(matched: &[MatchedGrade], policy: Policy) -> Self {
        let writes = matched
            .iter()
            .map(|m| {
                let action = match (policy, m.entry.has_grade()) {
                    (_, false) => FieldAction::FillNew,
                    (Policy::FillEmptyOnly, true) => FieldAction::Skip,
                    (Policy::OverwriteAll, true) => FieldAction::Overwrite,
                };
                FieldWrite {
                    id: m.identifier().to_string(),
                    action,
                    grade: m.row.grade.clone(),
                    feedback: m.row.feedback.clone(),
                }
            })
            .collect();

        Self { policy, writes }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.writes)
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}

/// What the page script found for one planned write
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldReport {
    pub id: String,
    /// The grade input exists on the page
    pub found: bool,
    #[serde(default)]
    pub feedback_written: bool,
}

/// Counts after the write pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InjectionOutcome {
    pub filled_new: usize,
    pub overwritten: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl InjectionOutcome {
    /// Count each planned write once; writes whose input was not found are errors
    pub fn tally(plan: &InjectionPlan, reports: &[FieldReport]) -> Self {
        let mut outcome = Self::default();

        for write in &plan.writes {
            let found = reports.iter().any(|r| r.id == write.id && r.found);
            if !found {
                tracing::warn!("Grade field for {} not found on the page", write.id);
                outcome.errors += 1;
                continue;
            }
            match write.action {
                FieldAction::FillNew => outcome.filled_new += 1,
                FieldAction::Overwrite => outcome.overwritten += 1,
                FieldAction::Skip => outcome.skipped += 1,
            }
        }

        outcome
    }

    pub fn total(&self) -> usize {
        self.filled_new + self.overwritten + self.skipped + self.errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FormEntry;
    use crate::matcher::MatchKind;
    use crate::roster::RosterRow;
    use std::collections::HashMap;

    fn matched(id: &str, current: &str, grade: &str) -> MatchedGrade {
        MatchedGrade {
            row: RosterRow::new(grade).with_email("a@x.com"),
            entry: FormEntry::new(id).with_email("a@x.com").with_grade(current),
            kind: MatchKind::Email,
        }
    }

    /// Stand-in for the page: grade inputs keyed by identifier
    fn apply(plan: &InjectionPlan, form: &mut HashMap<String, String>) -> Vec<FieldReport> {
        plan.writes
            .iter()
            .map(|w| {
                let found = match form.get_mut(&w.id) {
                    Some(value) => {
                        if w.action != FieldAction::Skip {
                            *value = w.grade.clone();
                        }
                        true
                    }
                    None => false,
                };
                FieldReport {
                    id: w.id.clone(),
                    found,
                    feedback_written: false,
                }
            })
            .collect()
    }

    fn form(fields: &[(&str, &str)]) -> HashMap<String, String> {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_empty_field_filled_under_either_policy() {
        for policy in [Policy::FillEmptyOnly, Policy::OverwriteAll] {
            let plan = InjectionPlan::build(&[matched("17", "", "85")], policy);
            let mut page = form(&[("17", "")]);

            let outcome = InjectionOutcome::tally(&plan, &apply(&plan, &mut page));

            assert_eq!(outcome.filled_new, 1);
            assert_eq!(page["17"], "85");
        }
    }

    #[test]
    fn test_fill_empty_only_skips_existing() {
        let plan = InjectionPlan::build(&[matched("17", "70", "85")], Policy::FillEmptyOnly);
        let mut page = form(&[("17", "70")]);

        let outcome = InjectionOutcome::tally(&plan, &apply(&plan, &mut page));

        assert_eq!(outcome.skipped, 1);
        assert_eq!(page["17"], "70");
    }

    #[test]
    fn test_overwrite_all_replaces_existing() {
        let plan = InjectionPlan::build(&[matched("17", "70", "85")], Policy::OverwriteAll);
        let mut page = form(&[("17", "70")]);

        let outcome = InjectionOutcome::tally(&plan, &apply(&plan, &mut page));

        assert_eq!(outcome.overwritten, 1);
        assert_eq!(page["17"], "85");
    }

    #[test]
    fn test_whitespace_grade_counts_as_empty() {
        let plan = InjectionPlan::build(&[matched("17", "  ", "85")], Policy::FillEmptyOnly);

        assert_eq!(plan.writes[0].action, FieldAction::FillNew);
    }

    #[test]
    fn test_counts_sum_to_planned_writes() {
        let grades = vec![
            matched("1", "", "80"),
            matched("2", "50", "81"),
            matched("3", "", "82"),
            matched("4", "60", "83"),
        ];
        let mut page = form(&[("1", ""), ("2", "50"), ("4", "60")]);

        for policy in [Policy::FillEmptyOnly, Policy::OverwriteAll] {
            let plan = InjectionPlan::build(&grades, policy);
            let outcome = InjectionOutcome::tally(&plan, &apply(&plan, &mut page.clone()));

            assert_eq!(outcome.total(), grades.len());
            assert_eq!(outcome.errors, 1);
        }

        let plan = InjectionPlan::build(&grades, Policy::OverwriteAll);
        apply(&plan, &mut page);
        assert_eq!(page["2"], "81");
        assert_eq!(page["4"], "83");
    }

    #[test]
    fn test_plan_serializes_for_page_script() {
        let mut grade = matched("17", "", "85");
        grade.row.feedback = Some("Good".to_string());

        let json = InjectionPlan::build(&[grade], Policy::FillEmptyOnly)
            .to_json()
            .unwrap();

        assert_eq!(
            json,
            r#"[{"id":"17","action":"fillNew","grade":"85","feedback":"Good"}]"#
        );
    }

    #[test]
    fn test_field_report_deserializes() {
        let reports: Vec<FieldReport> =
            serde_json::from_str(r#"[{"id":"17","found":true,"feedbackWritten":true},{"id":"18","found":false}]"#)
                .unwrap();

        assert!(reports[0].feedback_written);
        assert!(!reports[1].found);
    }
}
