//! Reviews of local files, without a merge request server.
//!
//! Two files on disk stand in for the old and new side of a one-file merge
//! request: `similar` produces the unified diff the remote API would return,
//! and [`OfflineApi`] answers every remote call with an error.

use similar::TextDiff;

use glreview_core::error::ApiError;
use glreview_core::identity::ReviewContext;
use glreview_core::remote::MrApi;
use glreview_core::types::{DiffPosition, Discussion, FileDiff, MrRef, MrVersion, Note};

use crate::config::Config;

pub const LOCAL_BASE: &str = "local-old";
pub const LOCAL_HEAD: &str = "local-new";

/// Hunk text for `old` -> `new`, without `---`/`+++` headers.
pub fn unified_hunks(old: &str, new: &str, context_lines: usize) -> String {
    TextDiff::from_lines(old, new)
        .unified_diff()
        .context_radius(context_lines)
        .to_string()
}

/// A one-file review context comparing `old` with `new`.
pub fn local_context(path: &str, old: &str, new: &str, config: &Config) -> ReviewContext {
    let diff = FileDiff {
        old_path: path.to_owned(),
        new_path: path.to_owned(),
        diff: unified_hunks(old, new, config.context_lines),
        new_file: old.is_empty() && !new.is_empty(),
        deleted_file: new.is_empty() && !old.is_empty(),
        renamed_file: false,
    };
    ReviewContext {
        repository_root: ".".to_owned(),
        project_id: config.project_id,
        mr_id: config.mr_id,
        version: MrVersion {
            base_commit: LOCAL_BASE.to_owned(),
            head_commit: LOCAL_HEAD.to_owned(),
            start_commit: LOCAL_BASE.to_owned(),
            diffs: vec![diff],
        },
    }
}

/// Remote that is never reachable.
pub struct OfflineApi;

fn offline<T>() -> Result<T, ApiError> {
    Err(ApiError::Network("no merge request server configured".to_owned()))
}

impl MrApi for OfflineApi {
    async fn fetch_mr_version(&self, _mr: MrRef) -> Result<MrVersion, ApiError> {
        offline()
    }

    async fn fetch_discussions(&self, _mr: MrRef) -> Result<Vec<Discussion>, ApiError> {
        offline()
    }

    async fn note_body(&self, _note_id: &str) -> Result<String, ApiError> {
        offline()
    }

    async fn create_note(&self, _reply_id: &str, _body: &str) -> Result<Note, ApiError> {
        offline()
    }

    async fn update_note_body(&self, _note_id: &str, _body: &str) -> Result<(), ApiError> {
        offline()
    }

    async fn delete_note(&self, _note_id: &str) -> Result<(), ApiError> {
        offline()
    }

    async fn set_resolved(&self, _reply_id: &str, _resolved: bool) -> Result<(), ApiError> {
        offline()
    }

    async fn create_diff_note(
        &self,
        _mr: MrRef,
        _body: &str,
        _position: &DiffPosition,
    ) -> Result<Discussion, ApiError> {
        offline()
    }

    async fn file_content(&self, _project_id: u64, commit: &str, path: &str) -> Result<String, ApiError> {
        Err(ApiError::NotFound(format!("{commit}:{path} is not in the local repository")))
    }
}
