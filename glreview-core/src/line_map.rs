//! Old/new line correspondence reconstructed from sparse hunks.
//!
//! A unified diff only records changed regions plus a little context. Every
//! line outside the hunks is unchanged, so the full mapping can be rebuilt by
//! filling the gaps between hunks with `Unchanged` records whose old-to-new
//! offset carries over from the neighbouring context lines.

use tracing::debug;

use crate::error::DiffError;
use crate::hunk::parse_hunks;
use crate::types::{Hunk, HunkLine, MrVersion};

/// `new_line - old_line` for an unchanged record.
fn new_line_offset(line: &HunkLine) -> Option<i64> {
    match *line {
        HunkLine::Unchanged { old_line, new_line } => Some(i64::from(new_line) - i64::from(old_line)),
        _ => None,
    }
}

/// Synthesises the unchanged lines strictly between `last` and `next`.
///
/// Both records must be `Unchanged` and share the same offset. The diff format
/// guarantees this for hunks produced with context lines; anything else would
/// mean the mapping is ambiguous, so it is rejected.
fn unchanged_lines_between(last: HunkLine, next: HunkLine) -> Result<Vec<HunkLine>, DiffError> {
    let mismatch = || DiffError::HunkBoundaryMismatch { last, next };
    let offset = new_line_offset(&last).ok_or_else(mismatch)?;
    if new_line_offset(&next) != Some(offset) {
        return Err(mismatch());
    }
    let (Some(from), Some(to)) = (last.old_line(), next.old_line()) else {
        return Err(mismatch());
    };

    Ok((from.saturating_add(1)..to)
        .map(|old_line| HunkLine::Unchanged {
            old_line,
            new_line: shifted(old_line, offset),
        })
        .collect())
}

fn shifted(old_line: u32, offset: i64) -> u32 {
    u32::try_from(i64::from(old_line) + offset).unwrap_or(0)
}

/// Concatenates `hunks` into one continuous run of lines, filling every gap
/// between consecutive hunks with unchanged records.
///
/// # Errors
///
/// Returns [`DiffError::HunkBoundaryMismatch`] when a seam between two hunks
/// is not bounded by unchanged lines with equal offsets.
pub fn connect_hunks(hunks: &[Hunk]) -> Result<Vec<HunkLine>, DiffError> {
    let mut lines: Vec<HunkLine> = Vec::new();
    for hunk in hunks {
        if let (Some(&last), Some(&next)) = (lines.last(), hunk.lines.first()) {
            lines.extend(unchanged_lines_between(last, next)?);
        }
        lines.extend_from_slice(&hunk.lines);
    }
    Ok(lines)
}

/// Prepends the untouched head of the file when the first hunk starts after
/// old line 1.
///
/// Lines above the first hunk are unchanged, so old line 1 is new line 1 and
/// the gap down to the first hunk is bridged like any other.
pub fn add_unchanged_lines_to_beginning(lines: Vec<HunkLine>) -> Result<Vec<HunkLine>, DiffError> {
    let starts_at_top = match lines.first() {
        None => return Ok(lines),
        Some(first) => first.old_line().map_or(true, |old| old <= 1),
    };
    if starts_at_top {
        return Ok(lines);
    }

    let head = Hunk {
        old_start: 1,
        new_start: 1,
        lines: vec![HunkLine::Unchanged { old_line: 1, new_line: 1 }],
    };
    let rest = Hunk { old_start: 0, new_start: 0, lines };
    connect_hunks(&[head, rest])
}

/// Extends `lines` with `target_old_line` when it lies past the last hunk.
///
/// The tail after the last hunk is unchanged, so it keeps the offset of the
/// last record. When the last record is a change rather than context, the diff
/// already reached the end of the file and nothing is added.
pub fn ensure_old_line_is_present(mut lines: Vec<HunkLine>, target_old_line: u32) -> Vec<HunkLine> {
    let Some(last) = lines.last().copied() else {
        // No hunks: the file is untouched, old and new lines coincide.
        lines.push(HunkLine::Unchanged { old_line: target_old_line, new_line: target_old_line });
        return lines;
    };
    let last_old = lines.iter().rev().find_map(HunkLine::old_line).unwrap_or(0);
    if last_old >= target_old_line {
        return lines;
    }
    if let Some(offset) = new_line_offset(&last) {
        lines.push(HunkLine::Unchanged {
            old_line: target_old_line,
            new_line: shifted(target_old_line, offset),
        });
    }
    lines
}

/// New line numbers of every added line in the file whose new path is
/// `new_path`, ascending. A file without a diff in `version` has none.
pub fn added_lines_for_file(version: &MrVersion, new_path: &str) -> Result<Vec<u32>, DiffError> {
    let Some(diff) = version.diff_for_new_path(new_path) else {
        return Ok(Vec::new());
    };
    let mut added: Vec<u32> = parse_hunks(&diff.diff)?
        .iter()
        .flat_map(|h| h.lines.iter())
        .filter_map(|line| match *line {
            HunkLine::Added { new_line } => Some(new_line),
            _ => None,
        })
        .collect();
    added.sort_unstable();
    Ok(added)
}

/// Maps an old-file line to its new-file line.
///
/// Returns `None` when the line was removed, or when it lies past the known
/// end of the file.
///
/// # Errors
///
/// Fails when `old_path` is not in `version`, or its diff cannot be parsed or
/// connected.
pub fn new_line_for_old_unchanged_line(
    version: &MrVersion,
    old_path: &str,
    old_line: u32,
) -> Result<Option<u32>, DiffError> {
    let diff = version
        .diff_for_old_path(old_path)
        .ok_or_else(|| DiffError::FileNotInVersion(old_path.to_owned()))?;
    let hunks = parse_hunks(&diff.diff)?;
    let lines = add_unchanged_lines_to_beginning(connect_hunks(&hunks)?)?;
    let lines = ensure_old_line_is_present(lines, old_line);

    let mapped = lines
        .iter()
        .find(|line| line.old_line() == Some(old_line))
        .and_then(|line| match *line {
            HunkLine::Unchanged { new_line, .. } => Some(new_line),
            _ => None,
        });
    debug!(old_path, old_line, ?mapped, "mapped old line");
    Ok(mapped)
}

/// Like [`new_line_for_old_unchanged_line`], but rejects lines beyond the real
/// length of the old file instead of extrapolating past its end.
pub fn new_line_for_old_unchanged_line_within(
    version: &MrVersion,
    old_path: &str,
    old_line: u32,
    old_line_count: u32,
) -> Result<Option<u32>, DiffError> {
    if old_line == 0 || old_line > old_line_count {
        return Ok(None);
    }
    new_line_for_old_unchanged_line(version, old_path, old_line)
}
