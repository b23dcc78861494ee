//! In-memory stand-in for the remote merge request API.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use glreview_core::error::ApiError;
use glreview_core::remote::MrApi;
use glreview_core::types::{
    Author, DiffPosition, Discussion, FileDiff, MrRef, MrVersion, Note, NotePermissions,
};

pub const BASE: &str = "base000";
pub const HEAD: &str = "head111";
pub const START: &str = "start222";

/// Fake remote. Operations named in `failing` return a network error.
#[derive(Default)]
pub struct FakeApi {
    pub version: MrVersion,
    pub discussions: Vec<Discussion>,
    pub bodies: RefCell<HashMap<String, String>>,
    pub files: HashMap<(String, String), String>,
    pub failing: RefCell<HashSet<&'static str>>,
    pub calls: RefCell<Vec<String>>,
    next_id: Cell<u32>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_discussions(discussions: Vec<Discussion>) -> Self {
        let api = Self { discussions, ..Self::default() };
        for d in &api.discussions {
            for n in &d.notes {
                api.bodies.borrow_mut().insert(n.id.clone(), n.body.clone());
            }
        }
        api
    }

    pub fn fail(&self, op: &'static str) {
        self.failing.borrow_mut().insert(op);
    }

    pub fn recover(&self, op: &'static str) {
        self.failing.borrow_mut().remove(op);
    }

    /// Simulates another client editing a note.
    pub fn edit_remotely(&self, note_id: &str, body: &str) {
        self.bodies.borrow_mut().insert(note_id.to_owned(), body.to_owned());
    }

    pub fn count(&self, op: &str) -> usize {
        self.calls.borrow().iter().filter(|c| c.as_str() == op).count()
    }

    fn enter(&self, op: &'static str) -> Result<(), ApiError> {
        self.calls.borrow_mut().push(op.to_owned());
        if self.failing.borrow().contains(op) {
            return Err(ApiError::Network(format!("{op} unreachable")));
        }
        Ok(())
    }

    fn fresh_id(&self, prefix: &str) -> String {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        format!("{prefix}{id}")
    }
}

impl MrApi for FakeApi {
    async fn fetch_mr_version(&self, _mr: MrRef) -> Result<MrVersion, ApiError> {
        self.enter("fetch_mr_version")?;
        Ok(self.version.clone())
    }

    async fn fetch_discussions(&self, _mr: MrRef) -> Result<Vec<Discussion>, ApiError> {
        self.enter("fetch_discussions")?;
        Ok(self.discussions.clone())
    }

    async fn note_body(&self, note_id: &str) -> Result<String, ApiError> {
        self.enter("note_body")?;
        self.bodies
            .borrow()
            .get(note_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(note_id.to_owned()))
    }

    async fn create_note(&self, _reply_id: &str, body: &str) -> Result<Note, ApiError> {
        self.enter("create_note")?;
        let id = self.fresh_id("reply-");
        self.bodies.borrow_mut().insert(id.clone(), body.to_owned());
        Ok(note(&id, body))
    }

    async fn update_note_body(&self, note_id: &str, body: &str) -> Result<(), ApiError> {
        self.enter("update_note_body")?;
        self.bodies.borrow_mut().insert(note_id.to_owned(), body.to_owned());
        Ok(())
    }

    async fn delete_note(&self, note_id: &str) -> Result<(), ApiError> {
        self.enter("delete_note")?;
        self.bodies.borrow_mut().remove(note_id);
        Ok(())
    }

    async fn set_resolved(&self, _reply_id: &str, _resolved: bool) -> Result<(), ApiError> {
        self.enter("set_resolved")
    }

    async fn create_diff_note(
        &self,
        _mr: MrRef,
        body: &str,
        position: &DiffPosition,
    ) -> Result<Discussion, ApiError> {
        self.enter("create_diff_note")?;
        let id = self.fresh_id("note-");
        let mut first = note(&id, body);
        first.position = Some(position.clone());
        Ok(Discussion {
            reply_id: self.fresh_id("discussion-"),
            resolved: false,
            resolvable: true,
            notes: vec![first],
        })
    }

    async fn file_content(&self, _project_id: u64, commit: &str, path: &str) -> Result<String, ApiError> {
        self.enter("file_content")?;
        self.files
            .get(&(commit.to_owned(), path.to_owned()))
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("{commit}:{path}")))
    }
}

pub fn all_permissions() -> NotePermissions {
    NotePermissions { resolve_note: true, admin_note: true, create_note: true }
}

pub fn note(id: &str, body: &str) -> Note {
    Note {
        id: id.to_owned(),
        author: Author { username: "reviewer".into(), name: "Reviewer".into(), avatar_url: None },
        body: body.to_owned(),
        position: None,
        permissions: all_permissions(),
        web_url: format!("https://gitlab.example.com/notes/{id}"),
    }
}

pub fn discussion(reply_id: &str, notes: Vec<Note>) -> Discussion {
    Discussion { reply_id: reply_id.to_owned(), resolved: false, resolvable: true, notes }
}

pub fn mr() -> MrRef {
    MrRef { project_id: 42, mr_id: 7 }
}

pub fn version(diffs: Vec<FileDiff>) -> MrVersion {
    MrVersion {
        base_commit: BASE.into(),
        head_commit: HEAD.into(),
        start_commit: START.into(),
        diffs,
    }
}

pub fn file_diff(path: &str, diff: &str) -> FileDiff {
    FileDiff {
        old_path: path.to_owned(),
        new_path: path.to_owned(),
        diff: diff.to_owned(),
        ..FileDiff::default()
    }
}

/// Removes old lines 2-3, adds new line 5, with an unchanged gap in between.
///
/// old: 1 2 3 4 5 6 7 8     new: 1 2 3 4 5 6 7
///      a b c d e f g h          a d e f X g h
pub const TWO_HUNK_DIFF: &str = "\
@@ -1,4 +1,2 @@
 a
-b
-c
 d
@@ -6,3 +4,4 @@
 f
+X
 g
 h
";
