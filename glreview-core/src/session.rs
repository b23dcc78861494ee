//! One review of one merge request version.

use tracing::{info, warn};

use crate::error::{ApiError, DiffError, ThreadError};
use crate::identity::{encode, review_identities, ResourceId, ReviewContext, ReviewIdentity};
use crate::position::{diff_position_for, thread_anchor};
use crate::ranges::{ranges_for, LineRange, ReviewDocument};
use crate::remote::MrApi;
use crate::thread::{NewThread, Submission, Thread};
use crate::types::{Discussion, FileDiff, MrRef};

/// A thread attached to a line of a review document.
#[derive(Debug)]
pub struct AnchoredThread {
    pub resource: ResourceId,
    pub line: u32,
    pub thread: Thread,
}

/// Review state rebuilt from the remote each time a version is loaded.
#[derive(Debug)]
pub struct ReviewSession {
    mr: MrRef,
    ctx: ReviewContext,
    threads: Vec<AnchoredThread>,
    overview: Vec<Discussion>,   // discussions without a diff position
}

impl ReviewSession {
    /// Fetches the latest version and discussions of `mr`.
    ///
    /// # Errors
    ///
    /// Fails when either fetch fails, or a discussion has no notes.
    pub async fn load<A: MrApi>(api: &A, mr: MrRef, repository_root: &str) -> Result<Self, ThreadError> {
        let version = api.fetch_mr_version(mr).await?;
        let discussions = api.fetch_discussions(mr).await?;
        let ctx = ReviewContext {
            repository_root: repository_root.to_owned(),
            project_id: mr.project_id,
            mr_id: mr.mr_id,
            version,
        };

        let mut threads = Vec::new();
        let mut overview = Vec::new();
        for discussion in discussions {
            match thread_anchor(&discussion, &ctx) {
                Some((identity, line)) => threads.push(AnchoredThread {
                    resource: encode(&identity),
                    line,
                    thread: Thread::new(discussion)?,
                }),
                None => overview.push(discussion),
            }
        }
        info!(
            project_id = mr.project_id,
            mr_id = mr.mr_id,
            files = ctx.version.diffs.len(),
            threads = threads.len(),
            "loaded review session"
        );
        Ok(Self { mr, ctx, threads, overview })
    }

    /// Replaces version and threads with a fresh load. On failure the current
    /// state is kept.
    pub async fn refresh<A: MrApi>(&mut self, api: &A) -> Result<(), ThreadError> {
        let fresh = Self::load(api, self.mr, &self.ctx.repository_root).await?;
        *self = fresh;
        Ok(())
    }

    pub fn context(&self) -> &ReviewContext {
        &self.ctx
    }

    pub fn overview_discussions(&self) -> &[Discussion] {
        &self.overview
    }

    pub fn threads(&self) -> &[AnchoredThread] {
        &self.threads
    }

    /// Threads shown on the document `resource`, in load order.
    pub fn threads_for<'s>(&'s self, resource: &'s ResourceId) -> impl Iterator<Item = &'s AnchoredThread> + 's {
        self.threads.iter().filter(move |t| &t.resource == resource)
    }

    pub fn threads_mut(&mut self) -> &mut [AnchoredThread] {
        &mut self.threads
    }

    pub fn thread_mut(&mut self, reply_id: &str) -> Option<&mut Thread> {
        self.threads
            .iter_mut()
            .map(|t| &mut t.thread)
            .find(|t| t.reply_id() == Some(reply_id))
    }

    /// The (old, new) review ids of a changed file.
    pub fn resources_for(&self, diff: &FileDiff) -> (ResourceId, ResourceId) {
        let (old, new) = review_identities(diff, &self.ctx);
        (encode(&old), encode(&new))
    }

    pub fn commenting_ranges(&self, document: &ReviewDocument) -> Result<Vec<LineRange>, DiffError> {
        ranges_for(document, &self.ctx)
    }

    /// Starts a thread on `line` of the document `identity`, which is
    /// `line_count` lines long.
    ///
    /// The thread is kept even when the remote call fails, holding the text
    /// as a failed comment. Returns the remote error in that case, `None` when
    /// the thread was created.
    pub async fn start_thread<A: MrApi>(
        &mut self,
        api: &A,
        identity: &ReviewIdentity,
        line: u32,
        line_count: u32,
        body: &str,
    ) -> Result<Option<ApiError>, DiffError> {
        let position = diff_position_for(identity, line, line_count, &self.ctx.version)?;
        let draft = NewThread { mr: self.mr, position };
        let (thread, error) = match Thread::submit(api, draft, body).await {
            Submission::Created(thread) => (thread, None),
            Submission::Failed { thread, error } => {
                warn!(path = %identity.path, line, %error, "new thread kept as failed comment");
                (thread, Some(error))
            }
        };
        self.threads.push(AnchoredThread { resource: encode(identity), line, thread });
        Ok(error)
    }

    /// Drops threads that were disposed (last comment deleted, failed comment
    /// cancelled). Returns how many were dropped.
    pub fn prune_disposed(&mut self) -> usize {
        let before = self.threads.len();
        self.threads.retain(|t| !t.thread.is_disposed());
        before - self.threads.len()
    }
}
