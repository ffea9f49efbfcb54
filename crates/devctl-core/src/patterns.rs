//! Dangerous shell construct detection.
//!
//! Detection is pattern-based: the input is scanned left to right for the
//! operators a shell would interpret. There is no attempt to understand
//! quoting, so `echo "a;b"` is flagged just like `echo a;b`.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// PatternCategory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternCategory {
    /// `;`, `&&`, `||`
    DangerousPattern,
    PipeOperator,
    /// `>`, `>>`, `<`
    Redirection,
    /// `$(...)` or a backtick-delimited span
    CommandSubstitution,
    PathTraversal,
    NewlineInjection,
}

impl PatternCategory {
    pub fn all() -> &'static [PatternCategory] {
        &[
            PatternCategory::DangerousPattern,
            PatternCategory::PipeOperator,
            PatternCategory::Redirection,
            PatternCategory::CommandSubstitution,
            PatternCategory::PathTraversal,
            PatternCategory::NewlineInjection,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PatternCategory::DangerousPattern => "dangerous pattern",
            PatternCategory::PipeOperator => "pipe operator",
            PatternCategory::Redirection => "redirection",
            PatternCategory::CommandSubstitution => "command substitution",
            PatternCategory::PathTraversal => "path traversal",
            PatternCategory::NewlineInjection => "newline injection",
        }
    }
}

impl std::fmt::Display for PatternCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Finding
// ---------------------------------------------------------------------------

/// One dangerous construct located in a scanned string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub category: PatternCategory,
    /// The matched text, e.g. `;` or `$(whoami)`.
    pub fragment: String,
    /// Byte offset of the match in the scanned input.
    pub offset: usize,
}

// ---------------------------------------------------------------------------
// Scanner
// ---------------------------------------------------------------------------

static CATALOG_RE: OnceLock<Regex> = OnceLock::new();

// Alternation order matters: the regex engine is leftmost-first, so the
// two-character operators must precede their one-character prefixes.
fn catalog_re() -> &'static Regex {
    CATALOG_RE.get_or_init(|| {
        Regex::new(r"\$\([^)\r\n]*\)?|`[^`\r\n]*`?|\|\||&&|>>|[;|<>]|\.\.[/\\]|\r\n|[\r\n]")
            .unwrap()
    })
}

fn classify(token: &str) -> PatternCategory {
    match token {
        ";" | "&&" | "||" => PatternCategory::DangerousPattern,
        "|" => PatternCategory::PipeOperator,
        ">" | ">>" | "<" => PatternCategory::Redirection,
        "\n" | "\r" | "\r\n" => PatternCategory::NewlineInjection,
        t if t.starts_with("..") => PatternCategory::PathTraversal,
        _ => PatternCategory::CommandSubstitution,
    }
}

/// Every dangerous construct in `input`, ordered by position.
pub fn scan(input: &str) -> Vec<Finding> {
    catalog_re()
        .find_iter(input)
        .map(|m| Finding {
            category: classify(m.as_str()),
            fragment: m.as_str().to_string(),
            offset: m.start(),
        })
        .collect()
}

/// The first dangerous construct in `input`, if any.
pub fn first_finding(input: &str) -> Option<Finding> {
    catalog_re().find(input).map(|m| Finding {
        category: classify(m.as_str()),
        fragment: m.as_str().to_string(),
        offset: m.start(),
    })
}

pub fn contains_dangerous(input: &str) -> bool {
    catalog_re().is_match(input)
}

/// How many times each category occurs in `input`.
pub fn category_counts(input: &str) -> std::collections::BTreeMap<PatternCategory, usize> {
    let mut counts = std::collections::BTreeMap::new();
    for finding in scan(input) {
        *counts.entry(finding.category).or_insert(0) += 1;
    }
    counts
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
