//! Display rendering of suggestion blocks in note bodies.
//!
//! GitLab suggestions are fenced blocks tagged `suggestion:-N+M`. Editors that
//! cannot apply them show a diff-flavoured preview instead. Rendering is a
//! display transform only; the raw body stays the system of record.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static SUGGESTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```suggestion:-\d+\+\d+\n(?:(.*?)\n)??```").expect("hardcoded suggestion regex")
});

/// Replaces every suggestion block in `body` with a rendered preview linking
/// to `note_url`. Text outside suggestion blocks is left untouched.
///
/// An empty block (a suggestion to delete lines) renders as an empty diff.
pub fn render_body(body: &str, note_url: &str) -> String {
    SUGGESTION_RE
        .replace_all(body, |caps: &Captures<'_>| {
            suggestion_template(caps.get(1).map(|m| m.as_str()), note_url)
        })
        .into_owned()
}

fn suggestion_template(replacement: Option<&str>, note_url: &str) -> String {
    let diff: String = replacement
        .map(|r| r.split('\n').map(|l| format!("+ {l}\n")).collect())
        .unwrap_or_default();
    format!("\n***\nSuggestion:\n```diff\n{diff}```\n[Apply this suggestion in GitLab]({note_url})\n***\n")
}
