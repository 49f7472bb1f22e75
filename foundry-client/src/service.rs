use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    api::{Comment, CommentEdit, CommentId, NewComment, ThreadId, VoteStatus},
    Error,
};

/// Remote source of truth for comment threads.
///
/// Every method is one round trip. Implementations report any non-success
/// answer as an error; the engine never looks further than "did it succeed".
#[async_trait]
pub trait CommentService: Send + Sync {
    /// Returns the root comments of the thread, most recent first, each with
    /// its replies
    async fn fetch_thread(&self, thread: &ThreadId) -> Result<Vec<Comment>, Error>;

    async fn create_comment(&self, thread: &ThreadId, c: NewComment) -> Result<Comment, Error>;

    async fn update_comment(&self, id: CommentId, edit: CommentEdit) -> Result<Comment, Error>;

    async fn delete_comment(&self, id: CommentId) -> Result<(), Error>;

    async fn toggle_upvote(&self, id: CommentId) -> Result<VoteStatus, Error>;
}

#[async_trait]
impl<S: CommentService + ?Sized> CommentService for Arc<S> {
    async fn fetch_thread(&self, thread: &ThreadId) -> Result<Vec<Comment>, Error> {
        (**self).fetch_thread(thread).await
    }

    async fn create_comment(&self, thread: &ThreadId, c: NewComment) -> Result<Comment, Error> {
        (**self).create_comment(thread, c).await
    }

    async fn update_comment(&self, id: CommentId, edit: CommentEdit) -> Result<Comment, Error> {
        (**self).update_comment(id, edit).await
    }

    async fn delete_comment(&self, id: CommentId) -> Result<(), Error> {
        (**self).delete_comment(id).await
    }

    async fn toggle_upvote(&self, id: CommentId) -> Result<VoteStatus, Error> {
        (**self).toggle_upvote(id).await
    }
}

#[async_trait]
impl<'a, S: CommentService + ?Sized> CommentService for &'a S {
    async fn fetch_thread(&self, thread: &ThreadId) -> Result<Vec<Comment>, Error> {
        (**self).fetch_thread(thread).await
    }

    async fn create_comment(&self, thread: &ThreadId, c: NewComment) -> Result<Comment, Error> {
        (**self).create_comment(thread, c).await
    }

    async fn update_comment(&self, id: CommentId, edit: CommentEdit) -> Result<Comment, Error> {
        (**self).update_comment(id, edit).await
    }

    async fn delete_comment(&self, id: CommentId) -> Result<(), Error> {
        (**self).delete_comment(id).await
    }

    async fn toggle_upvote(&self, id: CommentId) -> Result<VoteStatus, Error> {
        (**self).toggle_upvote(id).await
    }
}
