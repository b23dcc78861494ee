use serde::{Deserialize, Serialize};

/// One line of a parsed hunk, tagged by how it changed.
///
/// Line numbers are 1-based. The variant decides which numbers exist: a
/// removed line has no new-side number and an added line has no old-side one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HunkLine {
    Removed { old_line: u32 },
    Added { new_line: u32 },
    Unchanged { old_line: u32, new_line: u32 },
}

impl HunkLine {
    /// Line number in the old file, if this line exists there.
    pub fn old_line(&self) -> Option<u32> {
        match *self {
            HunkLine::Removed { old_line } | HunkLine::Unchanged { old_line, .. } => Some(old_line),
            HunkLine::Added { .. } => None,
        }
    }

    /// Line number in the new file, if this line exists there.
    pub fn new_line(&self) -> Option<u32> {
        match *self {
            HunkLine::Added { new_line } | HunkLine::Unchanged { new_line, .. } => Some(new_line),
            HunkLine::Removed { .. } => None,
        }
    }
}

/// One `@@ -old_start,len +new_start,len @@` block of a unified diff.
///
/// Header lengths are not kept; they are implied by `lines`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    pub old_start: u32,
    pub new_start: u32,
    pub lines: Vec<HunkLine>,
}

/// The diff of a single file inside a merge request version.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDiff {
    pub old_path: String,
    pub new_path: String,
    pub diff: String,         // raw hunks, no `---`/`+++` file header
    #[serde(default)]
    pub new_file: bool,
    #[serde(default)]
    pub deleted_file: bool,
    #[serde(default)]
    pub renamed_file: bool,
}

/// Immutable snapshot of one revision of a merge request.
///
/// A review session replaces its version wholesale on refresh; nothing mutates
/// a loaded `MrVersion`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MrVersion {
    pub base_commit: String,
    pub head_commit: String,
    pub start_commit: String,
    pub diffs: Vec<FileDiff>,
}

impl MrVersion {
    /// The file diff whose new-side path is `new_path`.
    pub fn diff_for_new_path(&self, new_path: &str) -> Option<&FileDiff> {
        self.diffs.iter().find(|d| d.new_path == new_path)
    }

    /// The file diff whose old-side path is `old_path`.
    pub fn diff_for_old_path(&self, old_path: &str) -> Option<&FileDiff> {
        self.diffs.iter().find(|d| d.old_path == old_path)
    }
}

/// Addresses one merge request on the remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MrRef {
    pub project_id: u64,
    pub mr_id: u64,       // project-scoped iid
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub username: String,
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// What the current user may do with a note.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotePermissions {
    pub resolve_note: bool,
    pub admin_note: bool,
    pub create_note: bool,
}

/// Anchors a note to one coordinate of a diff.
///
/// Notes returned by the remote carry exactly one of `old_line` / `new_line`.
/// Positions sent when creating a note on an unchanged line carry both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffPosition {
    #[serde(default)]
    pub old_line: Option<u32>,
    #[serde(default)]
    pub new_line: Option<u32>,
    pub old_path: String,
    pub new_path: String,
    pub base_sha: String,
    pub head_sha: String,
    pub start_sha: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub author: Author,
    pub body: String,         // raw markdown, the system of record
    #[serde(default)]
    pub position: Option<DiffPosition>,
    pub permissions: NotePermissions,
    pub web_url: String,
}

/// A remote discussion: an ordered, non-empty list of notes.
///
/// The first note's author and permissions govern the whole thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discussion {
    pub reply_id: String,
    pub resolved: bool,
    pub resolvable: bool,
    pub notes: Vec<Note>,
}

impl Discussion {
    /// The diff position of the first note, if this is a diff discussion.
    pub fn position(&self) -> Option<&DiffPosition> {
        self.notes.first().and_then(|n| n.position.as_ref())
    }
}
