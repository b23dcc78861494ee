//! Translation between document lines and diff positions.

use crate::error::DiffError;
use crate::identity::{ChangeType, ReviewContext, ReviewIdentity};
use crate::line_map::new_line_for_old_unchanged_line_within;
use crate::types::{DiffPosition, Discussion, MrVersion};

/// Position payload for a new comment on `line` of the document `identity`,
/// which is `line_count` lines long.
///
/// New-side comments anchor to the new line only. Old-side comments anchor to
/// the old line, plus the new line when the line survived unchanged, which is
/// how the remote tells an unchanged line from a removed one.
///
/// # Errors
///
/// Fails when `line` is not in `1..=line_count`, the file is not in
/// `version`, or its diff cannot be mapped.
pub fn diff_position_for(
    identity: &ReviewIdentity,
    line: u32,
    line_count: u32,
    version: &MrVersion,
) -> Result<DiffPosition, DiffError> {
    if line == 0 || line > line_count {
        return Err(DiffError::LineOutOfRange { line, line_count });
    }
    let is_old = identity.commit.as_deref() == Some(version.base_commit.as_str());
    let diff = if is_old {
        version.diff_for_old_path(&identity.path)
    } else {
        version.diff_for_new_path(&identity.path)
    }
    .ok_or_else(|| DiffError::FileNotInVersion(identity.path.clone()))?;

    let (old_line, new_line) = if is_old {
        (Some(line), new_line_for_old_unchanged_line_within(version, &diff.old_path, line, line_count)?)
    } else {
        (None, Some(line))
    };

    Ok(DiffPosition {
        old_line,
        new_line,
        old_path: diff.old_path.clone(),
        new_path: diff.new_path.clone(),
        base_sha: version.base_commit.clone(),
        head_sha: version.head_commit.clone(),
        start_sha: version.start_commit.clone(),
    })
}

/// The document and line a remote discussion is shown on.
///
/// A note positioned only on an old line belongs to the old side at the base
/// commit; everything else belongs to the new side at the head commit.
/// Discussions without a diff position (merge request overview) have none.
pub fn thread_anchor(discussion: &Discussion, ctx: &ReviewContext) -> Option<(ReviewIdentity, u32)> {
    let position = discussion.position()?;
    let (path, commit, line, is_old) = match (position.old_line, position.new_line) {
        (Some(old), None) => (&position.old_path, &position.base_sha, old, true),
        (_, Some(new)) => (&position.new_path, &position.head_sha, new, false),
        (None, None) => return None,
    };

    let diff = if is_old {
        ctx.version.diff_for_old_path(path)
    } else {
        ctx.version.diff_for_new_path(path)
    };
    let change_type = diff.map(ChangeType::of).unwrap_or_default();
    let exists = match change_type {
        ChangeType::Added => !is_old,
        ChangeType::Deleted => is_old,
        _ => true,
    };

    Some((
        ReviewIdentity {
            path: path.clone(),
            exists,
            commit: Some(commit.clone()),
            repository_root: ctx.repository_root.clone(),
            project_id: ctx.project_id,
            mr_id: ctx.mr_id,
            change_type,
        },
        line,
    ))
}
