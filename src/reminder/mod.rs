//! Reminder-text stripping
//!
//! Removes the parenthetical rules reminders that follow keyword abilities,
//! e.g. `Flying (This creature can't be blocked except by creatures with
//! flying or reach.)` becomes `Flying`. Stripping is allow-listed: a
//! parenthetical is only removed when a known rule explains it and that rule's
//! keyword appears in the clause directly before it. Anything else is kept
//! verbatim.

mod rules;

pub use rules::ReminderRule;

use once_cell::sync::Lazy;
use regex::Regex;

/// Text allowed between two parentheticals of one run
static RUN_GAP: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:[\s,]|and)*$").unwrap());

const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';'];

/// Punctuation that ends the clause a reminder can belong to
const CLAUSE_BREAKS: &[char] = &['.', ':', ';'];

/// A byte range `(start, end)` covering one parenthetical, parentheses included
type Span = (usize, usize);

/// Strips known reminder text from rules text
#[derive(Debug, Clone)]
pub struct ReminderStripper {
    rules: Vec<ReminderRule>,
}

impl Default for ReminderStripper {
    fn default() -> Self {
        Self::standard()
    }
}

impl ReminderStripper {
    /// Stripper with the built-in rule table
    pub fn standard() -> Self {
        Self {
            rules: rules::STANDARD_RULES.clone(),
        }
    }

    /// Stripper with a caller-supplied rule table
    pub fn with_rules(rules: Vec<ReminderRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[ReminderRule] {
        &self.rules
    }

    /// Strip reminder text from every line of `text`
    pub fn strip(&self, text: &str) -> String {
        self.strip_with_context(text, "")
    }

    /// Strip reminder text, treating `context` as text that precedes the
    /// first line
    pub fn strip_with_context(&self, text: &str, context: &str) -> String {
        text.split('\n')
            .enumerate()
            .map(|(idx, line)| {
                let ctx = if idx == 0 { context } else { "" };
                self.strip_line_to_fixpoint(line, ctx)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Whether every parenthetical body in a run is explained by a rule whose
    /// keyword occurs in `preface`
    pub fn matches_run(&self, bodies: &[&str], preface: &str) -> bool {
        !bodies.is_empty()
            && bodies
                .iter()
                .all(|body| self.rules.iter().any(|rule| rule.fires(preface, body)))
    }

    fn strip_line_to_fixpoint(&self, line: &str, context: &str) -> String {
        let mut current = line.to_string();
        loop {
            let next = self.strip_line_once(&current, context);
            if next.len() >= current.len() {
                return current;
            }
            current = next;
        }
    }

    fn strip_line_once(&self, line: &str, context: &str) -> String {
        let runs = group_runs(line, &find_parentheticals(line));
        if runs.is_empty() {
            return line.to_string();
        }

        let mut out = String::with_capacity(line.len());
        let mut preface_start = 0;
        let mut copied_to = 0;

        for run in runs {
            let run_start = run[0].0;
            let run_end = run[run.len() - 1].1;

            let (clause, whole) = last_clause(&line[preface_start..run_start]);
            let mut preface = String::new();
            if preface_start == 0 && whole {
                preface.push_str(context);
            }
            preface.push_str(clause);

            let bodies: Vec<&str> = run.iter().map(|&(s, e)| &line[s + 1..e - 1]).collect();
            if self.matches_run(&bodies, &preface) {
                let before = &line[copied_to..run_start];
                out.push_str(before.trim_end());

                let rest = &line[run_end..];
                let after_punct = rest.trim_start_matches(TRAILING_PUNCTUATION);
                copied_to = if after_punct.trim().is_empty() {
                    line.len()
                } else {
                    run_end
                };
            }
            preface_start = run_end;
        }

        out.push_str(&line[copied_to..]);
        out.trim_end().to_string()
    }
}

/// The clause ending at the end of `text`, ignoring its own closing
/// punctuation (`Scry 2. (...)`). The flag is set when the clause is still
/// open back to the start of `text`.
fn last_clause(text: &str) -> (&str, bool) {
    let trimmed = text.trim_end();
    let body = trimmed.trim_end_matches(CLAUSE_BREAKS);
    let closed = body.len() < trimmed.len();
    match body.rfind(CLAUSE_BREAKS) {
        Some(idx) => (&body[idx + 1..], false),
        None => (body, !closed),
    }
}

/// Top-level parentheticals of a line; stops at the first unbalanced paren
fn find_parentheticals(line: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut open_at = 0;
    for (idx, c) in line.char_indices() {
        match c {
            '(' => {
                if depth == 0 {
                    open_at = idx;
                }
                depth += 1;
            }
            ')' => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
                if depth == 0 {
                    spans.push((open_at, idx + 1));
                }
            }
            _ => {}
        }
    }
    spans
}

/// Group parentheticals separated only by whitespace, commas or "and"
fn group_runs(line: &str, spans: &[Span]) -> Vec<Vec<Span>> {
    let mut runs: Vec<Vec<Span>> = Vec::new();
    for &span in spans {
        match runs.last_mut() {
            Some(run) if RUN_GAP.is_match(&line[run[run.len() - 1].1..span.0]) => run.push(span),
            _ => runs.push(vec![span]),
        }
    }
    runs
}
