//! File content behind review resource ids.
//!
//! Content comes from the local repository's object store when it has the
//! commit, and from the remote otherwise. Results are kept in an explicit
//! [`ContentCache`] owned by the caller.

use std::collections::HashMap;
use std::path::Path;

use git2::Repository;
use tracing::debug;

use crate::error::ContentError;
use crate::identity::{decode, ResourceId, ReviewIdentity};
use crate::remote::MrApi;

/// File texts keyed by resource id.
#[derive(Debug, Default)]
pub struct ContentCache {
    entries: HashMap<ResourceId, String>,
}

impl ContentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &ResourceId) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    pub fn insert(&mut self, id: ResourceId, text: String) {
        self.entries.insert(id, text);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops everything, e.g. when the review session loads a new version.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Resolves resource ids to file text.
pub struct ContentProvider<'a, A> {
    api: &'a A,
    cache: &'a mut ContentCache,
}

impl<'a, A: MrApi> ContentProvider<'a, A> {
    pub fn new(api: &'a A, cache: &'a mut ContentCache) -> Self {
        Self { api, cache }
    }

    /// Text of the file version `id` names.
    ///
    /// The missing side of an added or deleted file is empty.
    ///
    /// # Errors
    ///
    /// Fails when `id` is not a review id, or neither the local repository
    /// nor the remote can supply the file.
    pub async fn provide(&mut self, id: &ResourceId) -> Result<String, ContentError> {
        let identity = decode(id)?;
        let Some(commit) = identity.commit.as_deref().filter(|_| identity.exists) else {
            return Ok(String::new());
        };
        if let Some(text) = self.cache.get(id) {
            debug!(%id, "content cache hit");
            return Ok(text.to_owned());
        }

        let text = match read_local_blob(&identity, commit) {
            Ok(text) => text,
            Err(e) => {
                debug!(path = %identity.path, commit, error = %e, "local blob unavailable, fetching from remote");
                self.api.file_content(identity.project_id, commit, &identity.path).await?
            }
        };
        self.cache.insert(id.clone(), text.clone());
        Ok(text)
    }
}

/// Reads `identity.path` at `commit` from the repository at `repository_root`.
fn read_local_blob(identity: &ReviewIdentity, commit: &str) -> Result<String, git2::Error> {
    let repo = Repository::open(&identity.repository_root)?;
    let tree = repo.revparse_single(commit)?.peel_to_commit()?.tree()?;
    let entry = tree.get_path(Path::new(identity.path.trim_start_matches('/')))?;
    let blob = entry.to_object(&repo)?.peel_to_blob()?;
    String::from_utf8(blob.content().to_vec())
        .map_err(|_| git2::Error::from_str("blob is not valid UTF-8"))
}
