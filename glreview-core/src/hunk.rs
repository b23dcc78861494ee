//! Unified-diff hunk parser.
//!
//! Turns the raw diff text of one file (as returned by the merge request diff
//! API, without `---`/`+++` file headers) into structured [`Hunk`]s whose lines
//! carry old and new line numbers.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::DiffError;
use crate::types::{Hunk, HunkLine};

static HUNK_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@@ -(\d+)(?:,\d+)? \+(\d+)(?:,\d+)? @@").expect("hardcoded hunk header regex")
});

/// Parses every hunk in `raw`.
///
/// Each line starting with `@@` opens a new hunk. Any text before the first
/// header is reported as a malformed header, since the diff API never emits it.
///
/// # Errors
///
/// Returns [`DiffError::MalformedHunkHeader`] when a header does not match
/// `@@ -old[,len] +new[,len] @@`, and [`DiffError::UnexpectedDiffLinePrefix`]
/// when a body line starts with anything but `-`, `+`, space, or `\`. A hunk
/// whose line numbers would run past `u32::MAX` is a malformed header too.
pub fn parse_hunks(raw: &str) -> Result<Vec<Hunk>, DiffError> {
    split_hunks(raw).into_iter().map(parse_hunk).collect()
}

/// Splits `raw` into per-hunk text blocks, each starting at its `@@` header.
fn split_hunks(raw: &str) -> Vec<&str> {
    let raw = raw.strip_suffix('\n').unwrap_or(raw);
    if raw.is_empty() {
        return Vec::new();
    }

    let mut starts: Vec<usize> = Vec::new();
    let mut offset = 0;
    for line in raw.split_inclusive('\n') {
        if line.starts_with("@@") {
            starts.push(offset);
        }
        offset += line.len();
    }

    // Leading junk becomes its own block so the header check rejects it.
    if starts.first() != Some(&0) {
        starts.insert(0, 0);
    }

    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(raw.len());
            &raw[start..end]
        })
        .collect()
}

fn parse_hunk(text: &str) -> Result<Hunk, DiffError> {
    let mut lines = text.lines();
    let header = lines.next().unwrap_or_default();
    let (old_start, new_start) = parse_header(header)?;
    // Line numbers past u32::MAX cannot be represented; blame the header.
    let step = |n: u32| {
        n.checked_add(1)
            .ok_or_else(|| DiffError::MalformedHunkHeader { header: header.to_owned() })
    };

    let mut old = old_start;
    let mut new = new_start;
    let mut out = Vec::new();

    for line in lines {
        let Some(prefix) = line.chars().next() else {
            continue;
        };
        match prefix {
            '-' => {
                out.push(HunkLine::Removed { old_line: old });
                old = step(old)?;
            }
            '+' => {
                out.push(HunkLine::Added { new_line: new });
                new = step(new)?;
            }
            ' ' => {
                out.push(HunkLine::Unchanged { old_line: old, new_line: new });
                old = step(old)?;
                new = step(new)?;
            }
            // "\ No newline at end of file"
            '\\' => {}
            _ => {
                return Err(DiffError::UnexpectedDiffLinePrefix {
                    line: line.to_owned(),
                    hunk: text.to_owned(),
                });
            }
        }
    }

    Ok(Hunk { old_start, new_start, lines: out })
}

/// Extracts `(old_start, new_start)` from a hunk header.
fn parse_header(header: &str) -> Result<(u32, u32), DiffError> {
    let malformed = || DiffError::MalformedHunkHeader { header: header.to_owned() };
    let caps = HUNK_HEADER_RE.captures(header).ok_or_else(malformed)?;
    let old_start = caps[1].parse().map_err(|_| malformed())?;
    let new_start = caps[2].parse().map_err(|_| malformed())?;
    Ok((old_start, new_start))
}
