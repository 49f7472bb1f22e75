use std::sync::Arc;

use futures::channel::mpsc;
use parking_lot::Mutex;

use crate::{
    api::{Comment, CommentEdit, CommentId, NewComment, ThreadId, VoteStatus},
    CommentService, Error, ThreadStore,
};

/// Keeps a local copy of one thread in sync with the comment service.
///
/// Every mutating operation first waits for the service to confirm, and only
/// then applies the confirmed values to the local tree, in one synchronous
/// step. A failed request never touches the tree. Operations take `&self`, so
/// several may be in flight at once; their results are applied in the order
/// the responses arrive. Two in-flight operations on the same comment are
/// last-response-wins.
pub struct SyncEngine<S> {
    service: S,
    thread_id: ThreadId,
    // never held across an await point
    store: Mutex<ThreadStore>,
    load_error: Mutex<Option<String>>,
}

impl<S: CommentService> SyncEngine<S> {
    pub fn new(service: S, thread_id: ThreadId) -> SyncEngine<S> {
        SyncEngine {
            service,
            store: Mutex::new(ThreadStore::new(thread_id.clone())),
            thread_id,
            load_error: Mutex::new(None),
        }
    }

    /// Creates the engine and performs the initial load. A failed load is not
    /// fatal: the engine is returned with `load_error` set, so the view can
    /// offer to retry with `load_thread`.
    pub async fn open(service: S, thread_id: ThreadId) -> SyncEngine<S> {
        let engine = SyncEngine::new(service, thread_id);
        // failures are recorded in load_error
        let _ = engine.load_thread().await;
        engine
    }

    pub fn thread_id(&self) -> &ThreadId {
        &self.thread_id
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn comments(&self) -> Arc<Vec<Comment>> {
        self.store.lock().comments()
    }

    pub fn find(&self, id: &CommentId) -> Option<Comment> {
        self.store.lock().find(id).cloned()
    }

    /// Message of the last failed load, cleared by the next successful one
    pub fn load_error(&self) -> Option<String> {
        self.load_error.lock().clone()
    }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<Arc<Vec<Comment>>> {
        self.store.lock().subscribe()
    }

    /// Replaces the whole local tree with the service's current view. On
    /// failure the last known tree is kept.
    pub async fn load_thread(&self) -> Result<(), Error> {
        match self.service.fetch_thread(&self.thread_id).await {
            Ok(comments) => {
                tracing::debug!(thread = %self.thread_id, roots = comments.len(), "thread loaded");
                self.store.lock().replace(comments);
                *self.load_error.lock() = None;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(thread = %self.thread_id, %err, "failed loading thread");
                *self.load_error.lock() = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Posts a comment. Root comments go first in the thread; replies are
    /// appended under their root, even when replying to a reply.
    pub async fn add_comment(
        &self,
        content: impl Into<String>,
        parent_id: Option<CommentId>,
    ) -> Result<Comment, Error> {
        let new = NewComment {
            content: content.into(),
            parent_id,
        };
        let comment = self.service.create_comment(&self.thread_id, new).await?;
        tracing::debug!(thread = %self.thread_id, id = %comment.id, ?parent_id, "comment added");
        let mut store = self.store.lock();
        match parent_id {
            None => store.prepend_root(comment.clone()),
            Some(parent) => {
                if !store.append_reply(&parent, comment.clone()) {
                    tracing::warn!(
                        thread = %self.thread_id,
                        %parent,
                        "parent of new reply is not in the local thread, reload to see it"
                    );
                }
            }
        }
        Ok(comment)
    }

    pub async fn edit_comment(
        &self,
        id: CommentId,
        content: impl Into<String>,
    ) -> Result<Comment, Error> {
        let edit = CommentEdit {
            content: content.into(),
        };
        let updated = self.service.update_comment(id, edit).await?;
        tracing::debug!(thread = %self.thread_id, %id, "comment edited");
        self.apply(&id, |c| {
            c.content = updated.content.clone();
            c.updated_at = updated.updated_at;
        });
        Ok(updated)
    }

    /// Deletes a comment. It stays in the thread as a tombstone, replies
    /// included.
    pub async fn delete_comment(&self, id: CommentId) -> Result<(), Error> {
        self.service.delete_comment(id).await?;
        tracing::debug!(thread = %self.thread_id, %id, "comment deleted");
        self.apply(&id, |c| c.tombstone());
        Ok(())
    }

    /// Toggles the viewer's upvote. The count and flag both come from the
    /// service's answer, never from a local guess.
    pub async fn toggle_upvote(&self, id: CommentId) -> Result<VoteStatus, Error> {
        let vote = self.service.toggle_upvote(id).await?;
        tracing::debug!(thread = %self.thread_id, %id, ?vote, "upvote toggled");
        self.apply(&id, |c| c.apply_vote(vote));
        Ok(vote)
    }

    fn apply<F: FnOnce(&mut Comment)>(&self, id: &CommentId, f: F) {
        if !self.store.lock().transform(id, f) {
            tracing::warn!(
                thread = %self.thread_id,
                %id,
                "confirmed comment is not in the local thread"
            );
        }
    }
}
