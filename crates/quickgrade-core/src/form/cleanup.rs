use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref BOILERPLATE_PATTERN: Regex = Regex::new(r"(Select|Picture of)\s*").unwrap();
    static ref INITIALS_PATTERN: Regex = Regex::new(r"^[A-Z]{2}").unwrap();
    static ref EMAIL_PATTERN: Regex =
        Regex::new(r"(?i)[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}").unwrap();
}

/// Clean the text of a name cell into a display name.
///
/// Strips "Select"/"Picture of" boilerplate, a leading two-capital initials
/// avatar token, and anything from "@" on. All-caps names ("JOHN") lose
/// their first two letters too; this is an approximation.
pub fn clean_display_name(raw: &str) -> String {
    let text = raw.trim();
    let text = BOILERPLATE_PATTERN.replace_all(text, "");
    let text = INITIALS_PATTERN.replace(&text, "");

    let text = match text.split_once('@') {
        Some((before, _)) => before,
        None => text.as_ref(),
    };

    text.trim().to_string()
}

/// First email-shaped substring in `text`, lowercased
pub fn find_email(text: &str) -> Option<String> {
    EMAIL_PATTERN
        .find(text)
        .map(|m| m.as_str().to_lowercase())
}
