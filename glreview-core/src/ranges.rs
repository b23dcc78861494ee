//! Where a reviewer may start a new comment.

use tracing::debug;

use crate::error::DiffError;
use crate::identity::{decode, ResourceId, ReviewContext};
use crate::line_map::added_lines_for_file;

/// A 1-based, inclusive range of document lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: u32,
    pub end: u32,
}

impl LineRange {
    pub fn single(line: u32) -> Self {
        Self { start: line, end: line }
    }

    pub fn contains(&self, line: u32) -> bool {
        (self.start..=self.end).contains(&line)
    }
}

/// A document opened in the editor: its resource id and current text.
#[derive(Debug, Clone)]
pub struct ReviewDocument {
    pub id: ResourceId,
    pub text: String,
}

impl ReviewDocument {
    pub fn new(id: ResourceId, text: impl Into<String>) -> Self {
        Self { id, text: text.into() }
    }

    /// Number of lines the editor shows, counting a trailing empty line.
    pub fn line_count(&self) -> u32 {
        u32::try_from(self.text.split('\n').count()).unwrap_or(u32::MAX)
    }

    fn last_line_is_blank(&self) -> bool {
        self.text.rsplit('\n').next().is_some_and(|l| l.trim().is_empty())
    }
}

/// Commentable line ranges of `document` within the merge request of `ctx`.
///
/// Documents that are not review resources of this merge request get no
/// ranges. On the old side the whole file is commentable except a blank final
/// line; on the new side only added lines are, since unchanged lines are
/// commented on through the old side.
///
/// # Errors
///
/// Fails only when the file's diff cannot be parsed.
pub fn ranges_for(document: &ReviewDocument, ctx: &ReviewContext) -> Result<Vec<LineRange>, DiffError> {
    if !document.id.is_review() {
        return Ok(Vec::new());
    }
    let identity = match decode(&document.id) {
        Ok(identity) => identity,
        Err(e) => {
            debug!(id = %document.id, error = %e, "ignoring undecodable review document");
            return Ok(Vec::new());
        }
    };
    if !ctx.owns(&identity) {
        return Ok(Vec::new());
    }

    if ctx.is_old_side(&identity) {
        let mut last = document.line_count();
        if document.last_line_is_blank() {
            last -= 1;
        }
        if last == 0 {
            return Ok(Vec::new());
        }
        return Ok(vec![LineRange { start: 1, end: last }]);
    }

    Ok(added_lines_for_file(&ctx.version, &identity.path)?
        .into_iter()
        .map(LineRange::single)
        .collect())
}
