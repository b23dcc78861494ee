//! The remote merge request API, seen from the review engine.
//!
//! The HTTP/GraphQL client lives outside this crate; it implements [`MrApi`].
//! Every method may fail or be delayed, and the engine only applies local state
//! changes after a call has succeeded.

use crate::error::ApiError;
use crate::types::{Discussion, DiffPosition, MrRef, MrVersion, Note};

#[allow(async_fn_in_trait)]
pub trait MrApi {
    /// Latest version (diff refs and file diffs) of a merge request.
    async fn fetch_mr_version(&self, mr: MrRef) -> Result<MrVersion, ApiError>;

    async fn fetch_discussions(&self, mr: MrRef) -> Result<Vec<Discussion>, ApiError>;

    /// Current body of a note on the remote.
    async fn note_body(&self, note_id: &str) -> Result<String, ApiError>;

    /// Adds a reply to the discussion identified by `reply_id`.
    async fn create_note(&self, reply_id: &str, body: &str) -> Result<Note, ApiError>;

    async fn update_note_body(&self, note_id: &str, body: &str) -> Result<(), ApiError>;

    async fn delete_note(&self, note_id: &str) -> Result<(), ApiError>;

    async fn set_resolved(&self, reply_id: &str, resolved: bool) -> Result<(), ApiError>;

    /// Starts a new discussion anchored to `position`.
    async fn create_diff_note(
        &self,
        mr: MrRef,
        body: &str,
        position: &DiffPosition,
    ) -> Result<Discussion, ApiError>;

    /// Raw file content at `commit`, used when the local repository lacks it.
    async fn file_content(&self, project_id: u64, commit: &str, path: &str) -> Result<String, ApiError>;
}
