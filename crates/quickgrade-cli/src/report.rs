//! Terminal rendering of roster, match and injection results.

use console::style;
use quickgrade_core::form::Scrape;
use quickgrade_core::inject::InjectionOutcome;
use quickgrade_core::matcher::MatchOutcome;
use quickgrade_core::report::{MatchSummary, grade_changes, partition_by_existing};
use quickgrade_core::roster::Roster;

const RULE: &str = "======================================================================";

pub fn print_banner(title: &str) {
    println!("\n{}", style(RULE).cyan());
    println!("{}", style(title).bold().cyan());
    println!("{}", style(RULE).cyan());
}

pub fn print_roster(roster: &Roster) {
    println!(
        "✓ Loaded {} students ({})",
        style(roster.len()).bold(),
        roster.schema.as_str()
    );
    println!("  Grade column: {}", roster.roles.grade);
    if let Some(email) = &roster.roles.email {
        println!("  Email column: {}", email);
    }
    if let Some(name) = &roster.roles.name {
        println!("  Name column:  {}", name);
    }
    if let Some(feedback) = &roster.roles.feedback {
        println!("  Feedback column: {}", feedback);
    }
}

pub fn print_scrape(scrape: &Scrape) {
    println!(
        "✓ Found {} students on the grading page (via {})",
        style(scrape.len()).bold(),
        scrape.method().as_str()
    );
    if !scrape.has_emails() && !scrape.is_empty() {
        println!(
            "{}",
            style("⚠️  Could not read emails from the page; only the fallback table can match rows.")
                .yellow()
        );
    }
}

/// Statistics, grade lists, then unmatched and ambiguous rows
pub fn print_analysis(outcome: &MatchOutcome) {
    let summary = MatchSummary::from_outcome(outcome);

    print_banner("📊 GRADE ANALYSIS");

    println!("\n{}", style("Matching:").bold());
    println!("  Roster rows:        {}", summary.roster_rows);
    println!("  Matched:            {}", style(summary.matched).green());
    println!("    by email:         {}", summary.by_email);
    println!("    by name:          {}", summary.by_name);
    println!("    by fallback:      {}", summary.by_fallback);
    println!("  Unmatched:          {}", style(summary.unmatched).red());
    println!("  Ambiguous:          {}", style(summary.ambiguous).yellow());

    let (empty, filled) = partition_by_existing(&outcome.matched);

    if !empty.is_empty() {
        println!(
            "\n{}",
            style(format!("📝 Students WITHOUT grades ({}):", empty.len())).green().bold()
        );
        for m in &empty {
            println!("  • {} → {}", m.row.label(), style(&m.row.grade).green());
        }
    }

    if !filled.is_empty() {
        println!(
            "\n{}",
            style(format!("⚠️  Students WITH existing grades ({}):", filled.len()))
                .yellow()
                .bold()
        );
        for m in &filled {
            let marker = if grade_changes(m) {
                style("(will change)").red().to_string()
            } else {
                style("(same)").dim().to_string()
            };
            println!(
                "  • {}: current {} → new {} {}",
                m.row.label(),
                style(&m.entry.current_grade).yellow(),
                style(&m.row.grade).green(),
                marker
            );
        }
    }

    let unmatched: Vec<_> = outcome.unmatched().collect();
    if !unmatched.is_empty() {
        println!(
            "\n{}",
            style(format!("❌ Not found on the page ({}):", unmatched.len())).red().bold()
        );
        for row in unmatched {
            println!("  • {} → {}", row.label(), row.grade);
        }
    }

    let ambiguous: Vec<_> = outcome.ambiguous().collect();
    if !ambiguous.is_empty() {
        println!(
            "\n{}",
            style(format!("❓ Multiple matches, skipped ({}):", ambiguous.len()))
                .yellow()
                .bold()
        );
        for (row, candidates) in ambiguous {
            println!("  • {}", row.label());
            for candidate in candidates {
                println!(
                    "      - {} ({})",
                    candidate.name.as_deref().unwrap_or(&candidate.identifier),
                    candidate.email.as_deref().unwrap_or("no email")
                );
            }
        }
    }
}

pub fn print_injection(outcome: &InjectionOutcome) {
    print_banner("✅ INJECTION COMPLETE!");

    if outcome.filled_new > 0 {
        println!("  {}", style(format!("✓ New grades filled: {}", outcome.filled_new)).green());
    }
    if outcome.overwritten > 0 {
        println!("  {}", style(format!("✓ Grades overwritten: {}", outcome.overwritten)).yellow());
    }
    if outcome.skipped > 0 {
        println!("  {}", style(format!("○ Grades skipped: {}", outcome.skipped)).cyan());
    }
    if outcome.errors > 0 {
        println!("  {}", style(format!("✗ Errors: {}", outcome.errors)).red());
    }

    println!("\n{}", style("📌 COLOR GUIDE:").bold());
    println!("  {} = New grades added", style("Green fields").green());
    println!("  {} = Existing grades overwritten", style("Orange fields").yellow());
    println!("  {} = Skipped (already had grades)", style("Yellow fields").cyan());

    print_banner("📌 NEXT STEPS:");
    println!("1. Review the colored grade fields");
    println!("2. Click the highlighted 'Save all quick grading changes' button");
    println!("3. Wait for the gradebook to confirm the save");
}

pub fn print_timeout_tips() {
    println!("\n{}", style("❌ Timeout: Could not find the grading table").red().bold());
    println!("   Make sure:");
    println!("   - You're logged in");
    println!("   - Quick grading is enabled");
    println!("   - You're on the correct page");
}
