//! Review resource identities.
//!
//! Every file version shown during a review is addressed by a [`ResourceId`]
//! of the form `gl-review:<path>?<query>`, where the query is a JSON object
//! with the non-path fields of a [`ReviewIdentity`]. The id is used both as a
//! cache key and to match displayed documents to comment threads, so the
//! encoding is canonical: equal identities always produce identical strings.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::IdentityError;
use crate::types::{FileDiff, MrVersion};

pub const REVIEW_SCHEME: &str = "gl-review";

/// How a file changed within the merge request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Added,
    Deleted,
    Renamed,
    #[default]
    Modified,
}

impl ChangeType {
    pub fn of(diff: &FileDiff) -> Self {
        if diff.new_file {
            ChangeType::Added
        } else if diff.deleted_file {
            ChangeType::Deleted
        } else if diff.renamed_file {
            ChangeType::Renamed
        } else {
            ChangeType::Modified
        }
    }
}

/// Everything needed to locate one side of one file in a merge request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReviewIdentity {
    pub path: String,
    pub exists: bool,
    pub commit: Option<String>,
    pub repository_root: String,
    pub project_id: u64,
    pub mr_id: u64,
    pub change_type: ChangeType,
}

impl ReviewIdentity {
    /// True for the missing side of an added or deleted file.
    pub fn is_empty_file(&self) -> bool {
        !self.exists || self.commit.is_none()
    }

    pub fn encode(&self) -> ResourceId {
        encode(self)
    }
}

/// Query part of a resource id.
///
/// Fields are declared in alphabetical order of their serialized names;
/// serde emits them in declaration order, which makes the JSON canonical.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ReviewQuery {
    change_type: ChangeType,
    commit: Option<String>,
    exists: bool,
    mr_id: u64,
    project_id: u64,
    repository_root: String,
}

/// An encoded [`ReviewIdentity`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(String);

impl ResourceId {
    /// Wraps an id received from elsewhere (an editor document, a cache key).
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_review(&self) -> bool {
        self.0
            .strip_prefix(REVIEW_SCHEME)
            .is_some_and(|rest| rest.starts_with(':'))
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn encode(identity: &ReviewIdentity) -> ResourceId {
    let query = ReviewQuery {
        change_type: identity.change_type,
        commit: identity.commit.clone(),
        exists: identity.exists,
        mr_id: identity.mr_id,
        project_id: identity.project_id,
        repository_root: identity.repository_root.clone(),
    };
    // Serializing a struct of strings, integers and bools cannot fail.
    let query = serde_json::to_string(&query).unwrap_or_default();
    ResourceId(format!("{REVIEW_SCHEME}:{}?{query}", escape_path(&identity.path)))
}

/// # Errors
///
/// Fails when `id` is not a `gl-review:` resource, has no query, or the query
/// is not a complete review query.
pub fn decode(id: &ResourceId) -> Result<ReviewIdentity, IdentityError> {
    let rest = id
        .0
        .strip_prefix(REVIEW_SCHEME)
        .and_then(|r| r.strip_prefix(':'))
        .ok_or_else(|| IdentityError::WrongScheme(id.0.clone()))?;
    let (path, query) = rest
        .split_once('?')
        .ok_or_else(|| IdentityError::MissingQuery(id.0.clone()))?;
    let query: ReviewQuery = serde_json::from_str(query)?;

    Ok(ReviewIdentity {
        path: unescape_path(path),
        exists: query.exists,
        commit: query.commit,
        repository_root: query.repository_root,
        project_id: query.project_id,
        mr_id: query.mr_id,
        change_type: query.change_type,
    })
}

pub fn is_empty_file_identity(id: &ResourceId) -> Result<bool, IdentityError> {
    Ok(decode(id)?.is_empty_file())
}

// `?` separates the path from the query, `%` introduces an escape.
fn escape_path(path: &str) -> String {
    path.replace('%', "%25").replace('?', "%3F")
}

fn unescape_path(path: &str) -> String {
    path.replace("%3F", "?").replace("%25", "%")
}

/// Merge request a set of review identities belongs to.
#[derive(Debug, Clone)]
pub struct ReviewContext {
    pub repository_root: String,
    pub project_id: u64,
    pub mr_id: u64,
    pub version: MrVersion,
}

impl ReviewContext {
    /// Whether `identity` addresses a file of this merge request.
    pub fn owns(&self, identity: &ReviewIdentity) -> bool {
        identity.project_id == self.project_id && identity.mr_id == self.mr_id && !identity.path.is_empty()
    }

    /// Whether `identity` is the old (base) side of a diff.
    pub fn is_old_side(&self, identity: &ReviewIdentity) -> bool {
        identity.commit.as_deref() == Some(self.version.base_commit.as_str())
    }
}

/// Builds the `(old, new)` identities shown when a reviewer opens `diff`.
pub fn review_identities(diff: &FileDiff, ctx: &ReviewContext) -> (ReviewIdentity, ReviewIdentity) {
    let change_type = ChangeType::of(diff);
    let side = |path: &str, commit: &str, exists: bool| ReviewIdentity {
        path: path.to_owned(),
        exists,
        commit: Some(commit.to_owned()),
        repository_root: ctx.repository_root.clone(),
        project_id: ctx.project_id,
        mr_id: ctx.mr_id,
        change_type,
    };
    (
        side(&diff.old_path, &ctx.version.base_commit, !diff.new_file),
        side(&diff.new_path, &ctx.version.head_commit, !diff.deleted_file),
    )
}
