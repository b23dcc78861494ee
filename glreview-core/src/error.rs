use thiserror::Error;

use crate::types::HunkLine;

/// Failures while parsing a diff or mapping lines across it.
///
/// All of these are fatal for the affected file: callers show a "diff
/// unavailable" fallback instead of guessing positions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiffError {
    #[error("malformed hunk header: {header:?}")]
    MalformedHunkHeader { header: String },

    #[error("unexpected diff line prefix in line {line:?} of hunk:\n{hunk}")]
    UnexpectedDiffLinePrefix { line: String, hunk: String },

    /// Two hunks meet without an unchanged line at the seam, or the unchanged
    /// lines on either side disagree on the old-to-new offset.
    #[error("hunks cannot be connected between {last:?} and {next:?}")]
    HunkBoundaryMismatch { last: HunkLine, next: HunkLine },

    #[error("file {0:?} is not part of this merge request version")]
    FileNotInVersion(String),

    #[error("line {line} is outside a document of {line_count} lines")]
    LineOutOfRange { line: u32, line_count: u32 },
}

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("not a review resource: {0}")]
    WrongScheme(String),

    #[error("review resource has no query: {0}")]
    MissingQuery(String),

    #[error("invalid review query: {0}")]
    Query(#[from] serde_json::Error),
}

/// Errors reported by the remote merge request API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("request failed with status {status}: {message}")]
    Http { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("not found: {0}")]
    NotFound(String),
}

#[derive(Error, Debug)]
pub enum ThreadError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The note changed on the remote since this client last read it.
    #[error("note {note_id} was changed by someone else since you last viewed it")]
    StaleEdit { note_id: String },

    #[error("discussion {0} has no notes")]
    EmptyDiscussion(String),

    #[error("no comment with note id {0} in this thread")]
    CommentNotFound(String),

    #[error("comment {0} is not being edited")]
    NotEditing(String),

    #[error("thread has been disposed")]
    Disposed,

    #[error("thread only holds a failed comment; retry or cancel it first")]
    FailedThread,

    #[error("thread was not created by a failed submission")]
    NotFailed,

    #[error("replies are not allowed on this thread")]
    ReplyNotAllowed,

    #[error("this thread cannot be resolved by the current user")]
    ResolveNotAllowed,
}

#[derive(Error, Debug)]
pub enum ContentError {
    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Api(#[from] ApiError),
}
