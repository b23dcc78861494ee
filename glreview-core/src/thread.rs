//! Local comment threads backed by remote discussions.
//!
//! A [`Thread`] wraps one [`Discussion`] and exposes the actions a reviewer can
//! take on it. Every action that touches the remote waits for the call to
//! settle and only then changes local state; on failure the thread is left
//! exactly as it was and the error is returned.

use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{ApiError, ThreadError};
use crate::remote::MrApi;
use crate::suggestion::render_body;
use crate::types::{DiffPosition, Discussion, MrRef, Note};

/// Whether a comment shows its rendered body or its editable source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentMode {
    Preview,
    Editing,
}

/// One note as shown in the editor.
#[derive(Debug, Clone)]
pub struct Comment {
    note: Note,           // last body this client observed on the remote
    body: String,         // rendered in Preview, edit buffer in Editing
    mode: CommentMode,
}

impl Comment {
    fn from_note(note: Note) -> Self {
        let body = render_body(&note.body, &note.web_url);
        Self { note, body, mode: CommentMode::Preview }
    }

    pub fn id(&self) -> &str {
        &self.note.id
    }

    pub fn note(&self) -> &Note {
        &self.note
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn mode(&self) -> CommentMode {
        self.mode
    }

    /// Replaces the displayed text, typically with what the user typed.
    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
    }

    /// Shows the raw markup of the note instead of its rendering.
    pub fn set_original_body(&mut self) {
        self.body = self.note.body.clone();
    }

    fn render(&mut self) {
        self.body = render_body(&self.note.body, &self.note.web_url);
    }
}

/// Text of a first comment whose submission failed. Exists only locally.
#[derive(Debug, Clone)]
pub struct FailedComment {
    pub id: Uuid,
    pub body: String,
}

/// One row of a thread's comment list.
#[derive(Debug, Clone, Copy)]
pub enum CommentEntry<'a> {
    Posted(&'a Comment),
    Failed(&'a FailedComment),
}

/// Where a thread that does not exist on the remote yet should be created.
#[derive(Debug, Clone)]
pub struct NewThread {
    pub mr: MrRef,
    pub position: DiffPosition,
}

/// Outcome of submitting a new thread.
///
/// A failed submission still yields a thread: it holds the typed text as a
/// [`FailedComment`] so the user can retry or cancel instead of losing it.
#[derive(Debug)]
pub enum Submission {
    Created(Thread),
    Failed { thread: Thread, error: ApiError },
}

#[derive(Debug)]
enum ThreadState {
    Live(LiveThread),
    Failed { draft: NewThread, comment: FailedComment },
    Disposed,
}

#[derive(Debug)]
struct LiveThread {
    reply_id: String,
    resolvable: bool,
    resolved: bool,
    notes: Arc<Vec<Note>>,
    comments: Vec<Comment>,
    can_reply: bool,
    can_resolve: bool,    // first note grants resolve on a resolvable discussion
}

impl LiveThread {
    fn context_value(&self) -> Option<&'static str> {
        match (self.can_resolve, self.resolved) {
            (false, _) => None,
            (true, true) => Some("resolved"),
            (true, false) => Some("unresolved"),
        }
    }

    fn position_of(&self, note_id: &str) -> Result<usize, ThreadError> {
        self.comments
            .iter()
            .position(|c| c.id() == note_id)
            .ok_or_else(|| ThreadError::CommentNotFound(note_id.to_owned()))
    }
}

#[derive(Debug)]
pub struct Thread {
    state: ThreadState,
}

impl Thread {
    /// Builds a thread showing every note of `discussion` in preview mode.
    ///
    /// # Errors
    ///
    /// Returns [`ThreadError::EmptyDiscussion`] when the discussion has no notes.
    pub fn new(discussion: Discussion) -> Result<Self, ThreadError> {
        Ok(Self { state: ThreadState::Live(live_from(discussion)?) })
    }

    /// Creates a new remote discussion at `draft.position` with `body` as its
    /// first note.
    pub async fn submit<A: MrApi>(api: &A, draft: NewThread, body: &str) -> Submission {
        match create_live(api, &draft, body).await {
            Ok(live) => Submission::Created(Self { state: ThreadState::Live(live) }),
            Err(error) => {
                warn!(%error, "creating thread failed, keeping comment as failed");
                let comment = FailedComment { id: Uuid::new_v4(), body: body.to_owned() };
                Submission::Failed {
                    thread: Self { state: ThreadState::Failed { draft, comment } },
                    error,
                }
            }
        }
    }

    /// Posted comments in display order. Empty for failed and disposed
    /// threads; a failed thread's comment is listed by [`Thread::entries`].
    pub fn comments(&self) -> &[Comment] {
        match &self.state {
            ThreadState::Live(live) => &live.comments,
            _ => &[],
        }
    }

    /// The comment list as shown: every posted comment of a live thread, or
    /// exactly the one failed comment of a failed thread.
    pub fn entries(&self) -> Vec<CommentEntry<'_>> {
        match &self.state {
            ThreadState::Live(live) => live.comments.iter().map(CommentEntry::Posted).collect(),
            ThreadState::Failed { comment, .. } => vec![CommentEntry::Failed(comment)],
            ThreadState::Disposed => Vec::new(),
        }
    }

    pub fn comment(&self, note_id: &str) -> Option<&Comment> {
        self.comments().iter().find(|c| c.id() == note_id)
    }

    pub fn comment_mut(&mut self, note_id: &str) -> Option<&mut Comment> {
        match &mut self.state {
            ThreadState::Live(live) => live.comments.iter_mut().find(|c| c.id() == note_id),
            _ => None,
        }
    }

    /// Snapshot of the discussion's notes.
    ///
    /// Replies never mutate a published snapshot; they publish a new one, so a
    /// holder can diff an old snapshot against a new one.
    pub fn notes(&self) -> Arc<Vec<Note>> {
        match &self.state {
            ThreadState::Live(live) => Arc::clone(&live.notes),
            _ => Arc::new(Vec::new()),
        }
    }

    pub fn reply_id(&self) -> Option<&str> {
        match &self.state {
            ThreadState::Live(live) => Some(&live.reply_id),
            _ => None,
        }
    }

    pub fn failed_comment(&self) -> Option<&FailedComment> {
        match &self.state {
            ThreadState::Failed { comment, .. } => Some(comment),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(&self.state, ThreadState::Live(live) if live.resolvable && live.resolved)
    }

    pub fn can_reply(&self) -> bool {
        matches!(&self.state, ThreadState::Live(live) if live.can_reply)
    }

    /// `"resolved"` / `"unresolved"` when the resolve action applies, else `None`.
    pub fn context_value(&self) -> Option<&'static str> {
        match &self.state {
            ThreadState::Live(live) => live.context_value(),
            _ => None,
        }
    }

    pub fn is_disposed(&self) -> bool {
        matches!(self.state, ThreadState::Disposed)
    }

    /// Disposes the thread. Returns `false` if it was already disposed.
    pub fn dispose(&mut self) -> bool {
        if self.is_disposed() {
            return false;
        }
        debug!(reply_id = ?self.reply_id(), "disposing thread");
        self.state = ThreadState::Disposed;
        true
    }

    fn live(&self) -> Result<&LiveThread, ThreadError> {
        match &self.state {
            ThreadState::Live(live) => Ok(live),
            ThreadState::Failed { .. } => Err(ThreadError::FailedThread),
            ThreadState::Disposed => Err(ThreadError::Disposed),
        }
    }

    fn live_mut(&mut self) -> Result<&mut LiveThread, ThreadError> {
        match &mut self.state {
            ThreadState::Live(live) => Ok(live),
            ThreadState::Failed { .. } => Err(ThreadError::FailedThread),
            ThreadState::Disposed => Err(ThreadError::Disposed),
        }
    }

    /// Flips the resolution on the remote, then locally.
    ///
    /// Threads without the resolve action fail with
    /// [`ThreadError::ResolveNotAllowed`] before any remote call.
    pub async fn toggle_resolved<A: MrApi>(&mut self, api: &A) -> Result<(), ThreadError> {
        let live = self.live_mut()?;
        if !live.can_resolve {
            return Err(ThreadError::ResolveNotAllowed);
        }
        let target = !live.resolved;
        if let Err(e) = api.set_resolved(&live.reply_id, target).await {
            warn!(reply_id = %live.reply_id, error = %e, "setting resolution failed");
            return Err(e.into());
        }
        live.resolved = target;
        Ok(())
    }

    /// Deletes a note on the remote and drops its comment. Deleting the last
    /// comment disposes the thread.
    pub async fn delete_comment<A: MrApi>(&mut self, api: &A, note_id: &str) -> Result<(), ThreadError> {
        let live = self.live_mut()?;
        let index = live.position_of(note_id)?;
        if let Err(e) = api.delete_note(note_id).await {
            warn!(note_id, error = %e, "deleting note failed");
            return Err(e.into());
        }
        live.comments.remove(index);
        live.notes = Arc::new(live.notes.iter().filter(|n| n.id != note_id).cloned().collect());
        if live.comments.is_empty() {
            self.dispose();
        }
        Ok(())
    }

    /// Switches a comment to editing, showing its raw markup.
    pub fn start_edit(&mut self, note_id: &str) -> Result<(), ThreadError> {
        let live = self.live_mut()?;
        let index = live.position_of(note_id)?;
        let comment = &mut live.comments[index];
        comment.mode = CommentMode::Editing;
        comment.set_original_body();
        Ok(())
    }

    /// Leaves editing, discarding the edit buffer.
    pub fn cancel_edit(&mut self, note_id: &str) -> Result<(), ThreadError> {
        let live = self.live_mut()?;
        let index = live.position_of(note_id)?;
        let comment = &mut live.comments[index];
        comment.mode = CommentMode::Preview;
        comment.render();
        Ok(())
    }

    /// Saves the edit buffer of a comment.
    ///
    /// The note is only updated if its remote body still equals the body this
    /// client read before editing. Otherwise [`ThreadError::StaleEdit`] is
    /// returned and the comment stays in editing mode with the typed text.
    pub async fn submit_edit<A: MrApi>(&mut self, api: &A, note_id: &str) -> Result<(), ThreadError> {
        let live = self.live_mut()?;
        let index = live.position_of(note_id)?;
        if live.comments[index].mode != CommentMode::Editing {
            return Err(ThreadError::NotEditing(note_id.to_owned()));
        }

        let latest = api.note_body(note_id).await?;
        let comment = &live.comments[index];
        if latest != comment.note.body {
            warn!(note_id, "note changed on the remote since it was read");
            return Err(ThreadError::StaleEdit { note_id: note_id.to_owned() });
        }

        let new_body = comment.body.clone();
        if let Err(e) = api.update_note_body(note_id, &new_body).await {
            warn!(note_id, error = %e, "updating note failed");
            return Err(e.into());
        }

        live.notes = Arc::new(
            live.notes
                .iter()
                .map(|n| {
                    let mut n = n.clone();
                    if n.id == note_id {
                        n.body = new_body.clone();
                    }
                    n
                })
                .collect(),
        );
        let comment = &mut live.comments[index];
        comment.note.body = new_body;
        comment.render();
        comment.mode = CommentMode::Preview;
        Ok(())
    }

    /// Posts a reply and appends it to the thread.
    pub async fn reply<A: MrApi>(&mut self, api: &A, text: &str) -> Result<(), ThreadError> {
        let live = self.live_mut()?;
        if !live.can_reply {
            return Err(ThreadError::ReplyNotAllowed);
        }
        let note = match api.create_note(&live.reply_id, text).await {
            Ok(note) => note,
            Err(e) => {
                warn!(reply_id = %live.reply_id, error = %e, "posting reply failed");
                return Err(e.into());
            }
        };

        let mut notes = Vec::with_capacity(live.notes.len() + 1);
        notes.extend(live.notes.iter().cloned());
        notes.push(note.clone());
        live.notes = Arc::new(notes);
        live.comments.push(Comment::from_note(note));
        Ok(())
    }

    /// Resubmits a failed first comment as a brand-new thread.
    ///
    /// On success the thread becomes a normal thread; on failure it keeps the
    /// failed comment.
    pub async fn retry<A: MrApi>(&mut self, api: &A) -> Result<(), ThreadError> {
        let ThreadState::Failed { draft, comment } = &self.state else {
            self.live()?;
            return Err(ThreadError::NotFailed);
        };
        let live = create_live(api, draft, &comment.body).await?;
        self.state = ThreadState::Live(live);
        Ok(())
    }

    /// Gives up on a failed first comment and disposes the thread.
    pub fn cancel(&mut self) -> Result<(), ThreadError> {
        match self.state {
            ThreadState::Failed { .. } => {
                self.dispose();
                Ok(())
            }
            ThreadState::Disposed => Err(ThreadError::Disposed),
            ThreadState::Live(_) => Err(ThreadError::NotFailed),
        }
    }
}

async fn create_live<A: MrApi>(api: &A, draft: &NewThread, body: &str) -> Result<LiveThread, ApiError> {
    let discussion = api.create_diff_note(draft.mr, body, &draft.position).await?;
    // The remote never returns an empty discussion for a note it just created.
    live_from(discussion).map_err(|e| ApiError::Network(e.to_string()))
}

fn live_from(discussion: Discussion) -> Result<LiveThread, ThreadError> {
    let Some(first) = discussion.notes.first() else {
        return Err(ThreadError::EmptyDiscussion(discussion.reply_id));
    };
    let can_reply = first.permissions.create_note;
    let can_resolve = discussion.resolvable && first.permissions.resolve_note;
    let comments = discussion.notes.iter().cloned().map(Comment::from_note).collect();

    Ok(LiveThread {
        reply_id: discussion.reply_id,
        resolvable: discussion.resolvable,
        resolved: discussion.resolved,
        notes: Arc::new(discussion.notes),
        comments,
        can_reply,
        can_resolve,
    })
}
