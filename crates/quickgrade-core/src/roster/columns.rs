use std::fmt;

/// The part a column plays in a roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Email,
    Name,
    Grade,
    Feedback,
}

impl Role {
    /// Classify a header by substring, in priority order email > name > grade > feedback.
    ///
    /// A header is given at most one role, so "Email address" never doubles as a name column.
    pub fn classify(header: &str) -> Option<Role> {
        let lower = header.to_lowercase();
        if lower.contains("email") {
            Some(Role::Email)
        } else if lower.contains("name") {
            Some(Role::Name)
        } else if lower.contains("grade") || lower.contains("score") {
            Some(Role::Grade)
        } else if lower.contains("feedback") || lower.contains("comment") {
            Some(Role::Feedback)
        } else {
            None
        }
    }
}

/// Where a row's display name comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameSource {
    Column(String),
    /// Gradebook exports split the name; rows get "First Last"
    FirstLast { first: String, last: String },
}

impl fmt::Display for NameSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameSource::Column(column) => write!(f, "{}", column),
            NameSource::FirstLast { first, last } => write!(f, "{} + {}", first, last),
        }
    }
}

/// Columns resolved for each role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRoles {
    pub email: Option<String>,
    pub name: Option<NameSource>,
    pub grade: String,
    pub feedback: Option<String>,
}

/// A required role that no header satisfied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Grade,
    EmailOrName,
}

impl Requirement {
    pub fn hint(&self) -> &'static str {
        match self {
            Requirement::Grade => "need a column with 'Grade' or 'Score'",
            Requirement::EmailOrName => "need either an 'Email' or a 'Name' column",
        }
    }
}

/// Diagnostic returned when the headers cannot identify a roster
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub struct UnresolvedColumns {
    pub missing: Vec<Requirement>,
    pub headers: Vec<String>,
}

impl fmt::Display for UnresolvedColumns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hints: Vec<&str> = self.missing.iter().map(Requirement::hint).collect();
        write!(
            f,
            "Missing required columns: {} (found: {})",
            hints.join("; "),
            if self.headers.is_empty() {
                "no headers".to_string()
            } else {
                self.headers.join(", ")
            }
        )
    }
}

/// Resolve column roles from a header row.
///
/// For the name role a header containing "student name" wins over any other
/// name-like header; every other role takes the first header classified for it.
pub fn resolve_columns(headers: &[String]) -> Result<ColumnRoles, UnresolvedColumns> {
    let classified: Vec<(&String, Option<Role>)> =
        headers.iter().map(|h| (h, Role::classify(h))).collect();

    let first_with = |role: Role| {
        classified
            .iter()
            .find(|(_, r)| *r == Some(role))
            .map(|(h, _)| (*h).clone())
    };

    let email = first_with(Role::Email);
    let name = classified
        .iter()
        .find(|(h, r)| *r == Some(Role::Name) && h.to_lowercase().contains("student name"))
        .map(|(h, _)| (*h).clone())
        .or_else(|| first_with(Role::Name));
    let grade = first_with(Role::Grade);
    let feedback = first_with(Role::Feedback);

    let mut missing = Vec::new();
    if grade.is_none() {
        missing.push(Requirement::Grade);
    }
    if email.is_none() && name.is_none() {
        missing.push(Requirement::EmailOrName);
    }

    match grade {
        Some(grade) if missing.is_empty() => {
            tracing::debug!(
                "Resolved columns: email={:?} name={:?} grade={} feedback={:?}",
                email,
                name,
                grade,
                feedback
            );
            Ok(ColumnRoles {
                email,
                name: name.map(NameSource::Column),
                grade,
                feedback,
            })
        }
        _ => Err(UnresolvedColumns {
            missing,
            headers: headers.to_vec(),
        }),
    }
}
