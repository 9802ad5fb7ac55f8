//! Natural-language edit instruction interpreter.
//!
//! Turns a freeform instruction such as `replace 'Draft' with 'Final'` into a
//! [`ParsedEdit`]. Keyword detection is case-insensitive while captured spans
//! keep the casing of the original instruction.
//!
//! Rules are tried in a fixed priority order and the first successful match
//! wins:
//!
//! 1. `replace '<A>' with '<B>'`
//! 2. `change '<A>' to '<B>'`, then `change (the )?title to '<X>'`
//! 3. `update (the )?date to '<X>'`
//! 4. anything else is [`ParsedEdit::Unrecognized`]
//!
//! A rule whose keywords are present but whose pattern does not match falls
//! through to the next rule. Interpretation never fails.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

/// Literal searched for by the best-effort title change.
pub const TITLE_PLACEHOLDER: &str = "Title";

/// Kind of a parsed edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EditKind {
    Replace,
    Change,
    UpdateDate,
    Unrecognized,
}

impl EditKind {
    /// Stable name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EditKind::Replace => "replace",
            EditKind::Change => "change",
            EditKind::UpdateDate => "update-date",
            EditKind::Unrecognized => "unrecognized",
        }
    }
}

impl fmt::Display for EditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured outcome of interpreting an instruction.
///
/// `Replace` and `Change` always carry non-empty `old` and `new` texts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ParsedEdit {
    /// `replace 'A' with 'B'`
    Replace { old: String, new: String },

    /// `change A to B`. With `title_guess` set, `old` is the literal
    /// [`TITLE_PLACEHOLDER`] and a search hit is not guaranteed.
    Change {
        old: String,
        new: String,
        title_guess: bool,
    },

    /// `update the date to X`. The date currently on the page is unknown.
    UpdateDate { new: String },

    /// Nothing matched; the caller should list the page's text blocks.
    Unrecognized,
}

impl ParsedEdit {
    /// Kind of this edit.
    pub fn kind(&self) -> EditKind {
        match self {
            ParsedEdit::Replace { .. } => EditKind::Replace,
            ParsedEdit::Change { .. } => EditKind::Change,
            ParsedEdit::UpdateDate { .. } => EditKind::UpdateDate,
            ParsedEdit::Unrecognized => EditKind::Unrecognized,
        }
    }

    /// Text to search for, if known ahead of the page search.
    pub fn old_text(&self) -> Option<&str> {
        match self {
            ParsedEdit::Replace { old, .. } | ParsedEdit::Change { old, .. } => Some(old),
            _ => None,
        }
    }

    /// Replacement text, if any.
    pub fn new_text(&self) -> Option<&str> {
        match self {
            ParsedEdit::Replace { new, .. }
            | ParsedEdit::Change { new, .. }
            | ParsedEdit::UpdateDate { new } => Some(new),
            ParsedEdit::Unrecognized => None,
        }
    }

    /// Whether this is the best-effort title substitution.
    pub fn is_title_guess(&self) -> bool {
        matches!(
            self,
            ParsedEdit::Change {
                title_guess: true,
                ..
            }
        )
    }
}

/// Compiled patterns for instruction interpretation.
pub struct InstructionInterpreter {
    replace: Regex,
    change: Regex,
    change_title: Regex,
    update_date: Regex,
}

impl InstructionInterpreter {
    /// Compile the instruction patterns.
    pub fn new() -> Self {
        Self {
            replace: Regex::new(r#"(?i)replace ['"]([^'"]+)['"] with ['"]([^'"]+)['"]"#)
                .expect("replace pattern"),
            change: Regex::new(r#"(?i)change ['"]?([^'"]+?)['"]? to ['"]?([^'"]+?)['"]?$"#)
                .expect("change pattern"),
            change_title: Regex::new(r#"(?i)change (?:the )?title to ['"]([^'"]+)['"]"#)
                .expect("title pattern"),
            update_date: Regex::new(r#"(?i)update (?:the )?date to ['"]?([^'"]+?)['"]?\s*$"#)
                .expect("date pattern"),
        }
    }

    /// Interpret an instruction.
    pub fn interpret(&self, instruction: &str) -> ParsedEdit {
        let lower = instruction.to_lowercase();

        if lower.contains("replace") && lower.contains("with") {
            if let Some(edit) = self.match_replace(instruction) {
                return edit;
            }
            log::debug!("replace keywords present but pattern did not match");
        }

        if lower.contains("change") && lower.contains("to") {
            if let Some(edit) = self.match_change(instruction) {
                return edit;
            }
            log::debug!("change keywords present but pattern did not match");
        }

        if lower.contains("update") && lower.contains("date") {
            if let Some(edit) = self.match_update_date(instruction) {
                return edit;
            }
            log::debug!("update-date keywords present but pattern did not match");
        }

        ParsedEdit::Unrecognized
    }

    fn match_replace(&self, instruction: &str) -> Option<ParsedEdit> {
        let caps = self.replace.captures(instruction)?;
        Some(ParsedEdit::Replace {
            old: caps[1].to_string(),
            new: caps[2].to_string(),
        })
    }

    fn match_change(&self, instruction: &str) -> Option<ParsedEdit> {
        if let Some(caps) = self.change.captures(instruction) {
            let old = caps[1].trim();
            let new = caps[2].trim();
            if !old.is_empty() && !new.is_empty() {
                return Some(ParsedEdit::Change {
                    old: old.to_string(),
                    new: new.to_string(),
                    title_guess: false,
                });
            }
        }

        let caps = self.change_title.captures(instruction)?;
        Some(ParsedEdit::Change {
            old: TITLE_PLACEHOLDER.to_string(),
            new: caps[1].to_string(),
            title_guess: true,
        })
    }

    fn match_update_date(&self, instruction: &str) -> Option<ParsedEdit> {
        let caps = self.update_date.captures(instruction)?;
        Some(ParsedEdit::UpdateDate {
            new: caps[1].to_string(),
        })
    }
}

impl Default for InstructionInterpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// Interpret an instruction with the shared interpreter.
///
/// # Example
///
/// ```
/// use pi_skills::edit::{interpret, ParsedEdit};
///
/// let edit = interpret("Replace 'Q2' with 'Q3'");
/// assert_eq!(
///     edit,
///     ParsedEdit::Replace { old: "Q2".into(), new: "Q3".into() }
/// );
/// ```
pub fn interpret(instruction: &str) -> ParsedEdit {
    static INTERPRETER: OnceLock<InstructionInterpreter> = OnceLock::new();
    INTERPRETER
        .get_or_init(InstructionInterpreter::new)
        .interpret(instruction)
}
