//! Choosing how existing grades are treated.
//!
//! The operator picks one of three options. Overwriting asks for a typed
//! "yes" whenever at least one matched field already holds a grade; declining
//! goes back to the menu.

use crate::prompt::Prompter;
use serde::Serialize;
use std::io;

/// How the injector treats fields that already hold a grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Policy {
    FillEmptyOnly,
    OverwriteAll,
}

impl Policy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Policy::FillEmptyOnly => "fill empty only",
            Policy::OverwriteAll => "overwrite all",
        }
    }
}

/// Final answer of the selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Proceed(Policy),
    Cancel,
}

/// A menu entry as typed by the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    FillEmpty,
    Overwrite,
    Cancel,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(MenuChoice::FillEmpty),
            "2" => Some(MenuChoice::Overwrite),
            "3" => Some(MenuChoice::Cancel),
            _ => None,
        }
    }
}

/// What the selector does after a menu choice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Done(Decision),
    ConfirmOverwrite,
}

/// Decide the next step for a menu choice given how many fields already hold grades
pub fn decide(choice: MenuChoice, existing_grades: usize) -> Step {
    match choice {
        MenuChoice::FillEmpty => Step::Done(Decision::Proceed(Policy::FillEmptyOnly)),
        MenuChoice::Overwrite if existing_grades > 0 => Step::ConfirmOverwrite,
        MenuChoice::Overwrite => Step::Done(Decision::Proceed(Policy::OverwriteAll)),
        MenuChoice::Cancel => Step::Done(Decision::Cancel),
    }
}

/// Only a typed "yes" confirms an overwrite
pub fn is_confirmed(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("yes")
}

pub struct PolicySelector {
    existing_grades: usize,
}

impl PolicySelector {
    pub fn new(existing_grades: usize) -> Self {
        Self { existing_grades }
    }

    /// Run the menu until the operator settles on a decision
    pub fn select<P: Prompter + ?Sized>(&self, prompter: &mut P) -> io::Result<Decision> {
        prompter.say("Options:");
        prompter.say("  1. Fill ONLY empty grades (skip existing)");
        prompter.say("  2. OVERWRITE all grades (including existing)");
        prompter.say("  3. CANCEL operation");

        loop {
            let answer = prompter.ask("Enter your choice (1/2/3): ")?;
            let Some(choice) = MenuChoice::parse(&answer) else {
                prompter.say("Invalid choice. Please enter 1, 2, or 3.");
                continue;
            };

            match decide(choice, self.existing_grades) {
                Step::Done(decision) => return Ok(decision),
                Step::ConfirmOverwrite => {
                    let confirm = prompter.ask(&format!(
                        "Are you sure you want to OVERWRITE {} existing grades? (yes/no): ",
                        self.existing_grades
                    ))?;
                    if is_confirmed(&confirm) {
                        return Ok(Decision::Proceed(Policy::OverwriteAll));
                    }
                    prompter.say("Overwrite cancelled.");
                }
            }
        }
    }
}
