use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use async_trait::async_trait;
use chrono::Utc;
use foundry_client::{
    api::{
        self, Comment, CommentEdit, CommentId, Error, NewComment, ThreadId, Uuid, ViewerId,
        VoteStatus,
    },
    CommentService,
};
use tokio::sync::Mutex;

/// In-memory comment service.
///
/// Threads are stored in the shape clients render them: roots most recent
/// first, and every reply appended under its root.
#[derive(Debug, Default)]
pub struct MockServer {
    threads: HashMap<ThreadId, Vec<Comment>>,
    // stored comments always have has_upvoted = false, it is filled in per viewer
    votes: HashMap<CommentId, HashSet<ViewerId>>,
    comment_threads: HashMap<CommentId, ThreadId>,
    fail_next: Option<Error>,
}

fn find_mut<'a>(comments: &'a mut [Comment], id: &CommentId) -> Option<&'a mut Comment> {
    for c in comments.iter_mut() {
        if c.id == *id {
            return Some(c);
        }
        if let Some(res) = find_mut(&mut c.replies, id) {
            return Some(res);
        }
    }
    None
}

impl MockServer {
    pub fn new() -> MockServer {
        MockServer::default()
    }

    pub fn shared(self) -> Arc<Mutex<MockServer>> {
        Arc::new(Mutex::new(self))
    }

    /// Makes the next request fail with `err`, without any other effect
    pub fn fail_next(&mut self, err: Error) {
        self.fail_next = Some(err);
    }

    /// Return the current number of comments, tombstones included
    pub fn test_num_comments(&self) -> usize {
        self.comment_threads.len()
    }

    fn check_failure(&mut self) -> Result<(), Error> {
        match self.fail_next.take() {
            Some(err) => {
                tracing::debug!(%err, "failing request on purpose");
                Err(err)
            }
            None => Ok(()),
        }
    }

    fn for_viewer(&self, viewer: ViewerId, mut c: Comment) -> Comment {
        c.has_upvoted = self
            .votes
            .get(&c.id)
            .map(|v| v.contains(&viewer))
            .unwrap_or(false);
        c.replies = c
            .replies
            .into_iter()
            .map(|r| self.for_viewer(viewer, r))
            .collect();
        c
    }

    fn comment_mut(&mut self, id: &CommentId) -> Result<&mut Comment, Error> {
        let thread = self
            .comment_threads
            .get(id)
            .ok_or(Error::CommentNotFound(*id))?;
        self.threads
            .get_mut(thread)
            .and_then(|roots| find_mut(roots, id))
            .ok_or(Error::CommentNotFound(*id))
    }

    pub fn fetch_thread(
        &mut self,
        viewer: ViewerId,
        thread: &ThreadId,
    ) -> Result<Vec<Comment>, Error> {
        self.check_failure()?;
        thread.validate()?;
        Ok(self
            .threads
            .get(thread)
            .map(|roots| {
                roots
                    .iter()
                    .map(|c| self.for_viewer(viewer, c.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    pub fn create_comment(
        &mut self,
        viewer: ViewerId,
        thread: &ThreadId,
        new: NewComment,
    ) -> Result<Comment, Error> {
        self.check_failure()?;
        thread.validate()?;
        api::validate_content(&new.content)?;

        let root = match new.parent_id {
            None => None,
            Some(parent) => Some(
                self.threads
                    .get(thread)
                    .and_then(|roots| {
                        roots.iter().position(|r| {
                            r.id == parent || r.replies.iter().any(|c| c.id == parent)
                        })
                    })
                    .ok_or(Error::CommentNotFound(parent))?,
            ),
        };

        let now = Utc::now();
        let comment = Comment {
            id: CommentId(Uuid::new_v4()),
            content: new.content,
            parent_id: new.parent_id,
            replies: Vec::new(),
            upvotes: 0,
            has_upvoted: false,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };
        let roots = self.threads.entry(thread.clone()).or_insert_with(Vec::new);
        match root {
            None => roots.insert(0, comment.clone()),
            Some(r) => roots[r].replies.push(comment.clone()),
        }
        self.comment_threads.insert(comment.id, thread.clone());
        tracing::debug!(?viewer, %thread, id = %comment.id, "created comment");
        Ok(comment)
    }

    pub fn update_comment(
        &mut self,
        viewer: ViewerId,
        id: CommentId,
        edit: CommentEdit,
    ) -> Result<Comment, Error> {
        self.check_failure()?;
        api::validate_content(&edit.content)?;
        let c = self.comment_mut(&id)?;
        if c.is_deleted {
            return Err(Error::CommentDeleted(id));
        }
        c.content = edit.content;
        c.updated_at = Utc::now();
        let c = c.clone();
        Ok(self.for_viewer(viewer, c))
    }

    pub fn delete_comment(&mut self, id: CommentId) -> Result<(), Error> {
        self.check_failure()?;
        self.comment_mut(&id)?.tombstone();
        Ok(())
    }

    pub fn toggle_upvote(&mut self, viewer: ViewerId, id: CommentId) -> Result<VoteStatus, Error> {
        self.check_failure()?;
        // make sure the comment exists before recording anything
        self.comment_mut(&id)?;
        let voters = self.votes.entry(id).or_insert_with(HashSet::new);
        let has_upvoted = match voters.remove(&viewer) {
            true => false,
            false => voters.insert(viewer),
        };
        let upvotes = u32::try_from(voters.len()).unwrap_or(u32::MAX);
        self.comment_mut(&id)?.upvotes = upvotes;
        Ok(VoteStatus {
            has_upvoted,
            upvotes,
        })
    }
}

/// A viewer's connection to a shared MockServer
#[derive(Clone, Debug)]
pub struct MockService {
    server: Arc<Mutex<MockServer>>,
    viewer: ViewerId,
}

impl MockService {
    pub fn new(server: Arc<Mutex<MockServer>>, viewer: ViewerId) -> MockService {
        MockService { server, viewer }
    }

    pub fn viewer(&self) -> ViewerId {
        self.viewer
    }

    pub fn server(&self) -> &Arc<Mutex<MockServer>> {
        &self.server
    }
}

#[async_trait]
impl CommentService for MockService {
    async fn fetch_thread(&self, thread: &ThreadId) -> Result<Vec<Comment>, foundry_client::Error> {
        Ok(self.server.lock().await.fetch_thread(self.viewer, thread)?)
    }

    async fn create_comment(
        &self,
        thread: &ThreadId,
        c: NewComment,
    ) -> Result<Comment, foundry_client::Error> {
        Ok(self
            .server
            .lock()
            .await
            .create_comment(self.viewer, thread, c)?)
    }

    async fn update_comment(
        &self,
        id: CommentId,
        edit: CommentEdit,
    ) -> Result<Comment, foundry_client::Error> {
        Ok(self
            .server
            .lock()
            .await
            .update_comment(self.viewer, id, edit)?)
    }

    async fn delete_comment(&self, id: CommentId) -> Result<(), foundry_client::Error> {
        Ok(self.server.lock().await.delete_comment(id)?)
    }

    async fn toggle_upvote(&self, id: CommentId) -> Result<VoteStatus, foundry_client::Error> {
        Ok(self.server.lock().await.toggle_upvote(self.viewer, id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewer() -> ViewerId {
        ViewerId(Uuid::new_v4())
    }

    fn thread() -> ThreadId {
        ThreadId::new("fellowship-3")
    }

    fn post(s: &mut MockServer, v: ViewerId, text: &str, parent: Option<CommentId>) -> Comment {
        s.create_comment(
            v,
            &thread(),
            NewComment {
                content: String::from(text),
                parent_id: parent,
            },
        )
        .expect("creating comment")
    }

    #[test]
    fn threads_are_most_recent_first_and_folded() {
        let mut s = MockServer::new();
        let v = viewer();
        let first = post(&mut s, v, "first", None);
        let second = post(&mut s, v, "second", None);
        let reply = post(&mut s, v, "reply", Some(first.id));
        let nested = post(&mut s, v, "reply to reply", Some(reply.id));

        let roots = s.fetch_thread(v, &thread()).expect("fetching thread");
        assert_eq!(
            roots.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![second.id, first.id]
        );
        assert_eq!(roots[1].replies, vec![reply, nested.clone()]);
        assert_eq!(nested.parent_id, Some(roots[1].replies[0].id));
        assert_eq!(s.test_num_comments(), 4);

        assert_eq!(
            s.fetch_thread(v, &ThreadId::new("nobody-here")),
            Ok(Vec::new())
        );
    }

    #[test]
    fn votes_are_per_viewer() {
        let mut s = MockServer::new();
        let (alice, bob) = (viewer(), viewer());
        let c = post(&mut s, alice, "Great idea", None);

        let on = VoteStatus {
            has_upvoted: true,
            upvotes: 1,
        };
        assert_eq!(s.toggle_upvote(alice, c.id), Ok(on));
        let both = VoteStatus {
            has_upvoted: true,
            upvotes: 2,
        };
        assert_eq!(s.toggle_upvote(bob, c.id), Ok(both));

        let as_alice = s.fetch_thread(alice, &thread()).expect("fetching thread");
        assert!(as_alice[0].has_upvoted);
        assert_eq!(as_alice[0].upvotes, 2);

        let off = VoteStatus {
            has_upvoted: false,
            upvotes: 1,
        };
        assert_eq!(s.toggle_upvote(alice, c.id), Ok(off));
        let as_alice = s.fetch_thread(alice, &thread()).expect("fetching thread");
        assert!(!as_alice[0].has_upvoted);
        let as_bob = s.fetch_thread(bob, &thread()).expect("fetching thread");
        assert!(as_bob[0].has_upvoted);
        assert_eq!(as_bob[0].upvotes, 1);
    }

    #[test]
    fn rejections() {
        let mut s = MockServer::new();
        let v = viewer();
        let c = post(&mut s, v, "Great idea", None);
        let bad = CommentId(Uuid::new_v4());

        let empty = NewComment {
            content: String::from("   "),
            parent_id: None,
        };
        assert_eq!(s.create_comment(v, &thread(), empty), Err(Error::EmptyContent));
        let orphan = NewComment {
            content: String::from("hi"),
            parent_id: Some(bad),
        };
        assert_eq!(
            s.create_comment(v, &thread(), orphan),
            Err(Error::CommentNotFound(bad))
        );
        let elsewhere = NewComment {
            content: String::from("hi"),
            parent_id: Some(c.id),
        };
        assert_eq!(
            s.create_comment(v, &ThreadId::new("other"), elsewhere),
            Err(Error::CommentNotFound(c.id))
        );
        assert_eq!(
            s.fetch_thread(v, &ThreadId::new("a/b")),
            Err(Error::InvalidThreadId(String::from("a/b")))
        );
        assert_eq!(s.delete_comment(bad), Err(Error::CommentNotFound(bad)));
        assert_eq!(s.toggle_upvote(v, bad), Err(Error::CommentNotFound(bad)));

        s.delete_comment(c.id).expect("deleting comment");
        let edit = CommentEdit {
            content: String::from("too late"),
        };
        assert_eq!(
            s.update_comment(v, c.id, edit),
            Err(Error::CommentDeleted(c.id))
        );
        assert_eq!(s.test_num_comments(), 1);
    }

    #[test]
    fn delete_tombstones_in_place() {
        let mut s = MockServer::new();
        let v = viewer();
        let root = post(&mut s, v, "root", None);
        let reply = post(&mut s, v, "reply", Some(root.id));

        s.delete_comment(root.id).expect("deleting comment");
        s.delete_comment(root.id).expect("deleting comment twice");
        let roots = s.fetch_thread(v, &thread()).expect("fetching thread");
        assert!(roots[0].is_deleted);
        assert_eq!(roots[0].content, api::DELETED_CONTENT);
        assert_eq!(roots[0].updated_at, root.updated_at);
        assert_eq!(roots[0].replies, vec![reply]);
    }

    #[test]
    fn injected_failures_have_no_effect() {
        let mut s = MockServer::new();
        let v = viewer();
        s.fail_next(Error::Unknown(String::from("boom")));
        let new = NewComment {
            content: String::from("hi"),
            parent_id: None,
        };
        assert_eq!(
            s.create_comment(v, &thread(), new),
            Err(Error::Unknown(String::from("boom")))
        );
        assert_eq!(s.test_num_comments(), 0);
        assert_eq!(s.fetch_thread(v, &thread()), Ok(Vec::new()));
    }
}
