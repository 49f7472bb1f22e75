use std::sync::Arc;

use futures::channel::mpsc;

use crate::api::{Comment, CommentId, ThreadId};

/// Position of a comment in a thread, as indices starting from the root list.
///
/// Only three depths are locatable: roots, their replies, and replies stored
/// under a reply. Anything deeper is invisible to lookups.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Position {
    Root(usize),
    Reply(usize, usize),
    Nested(usize, usize, usize),
}

impl Position {
    fn root(&self) -> usize {
        match *self {
            Position::Root(r) | Position::Reply(r, _) | Position::Nested(r, _, _) => r,
        }
    }
}

/// Finds the first comment with this id: all roots are searched first, then
/// all first-level replies, then the replies stored under those.
fn locate(roots: &[Comment], id: &CommentId) -> Option<Position> {
    if let Some(r) = roots.iter().position(|c| c.id == *id) {
        return Some(Position::Root(r));
    }
    for (r, root) in roots.iter().enumerate() {
        if let Some(i) = root.replies.iter().position(|c| c.id == *id) {
            return Some(Position::Reply(r, i));
        }
    }
    for (r, root) in roots.iter().enumerate() {
        for (i, reply) in root.replies.iter().enumerate() {
            if let Some(j) = reply.replies.iter().position(|c| c.id == *id) {
                return Some(Position::Nested(r, i, j));
            }
        }
    }
    None
}

fn node(roots: &[Comment], pos: Position) -> &Comment {
    match pos {
        Position::Root(r) => &roots[r],
        Position::Reply(r, i) => &roots[r].replies[i],
        Position::Nested(r, i, j) => &roots[r].replies[i].replies[j],
    }
}

fn node_mut(roots: &mut [Comment], pos: Position) -> &mut Comment {
    match pos {
        Position::Root(r) => &mut roots[r],
        Position::Reply(r, i) => &mut roots[r].replies[i],
        Position::Nested(r, i, j) => &mut roots[r].replies[i].replies[j],
    }
}

/// Returns a copy of `roots` where the comment with this id is replaced by
/// `f(comment)`, or None if no such comment is locatable.
pub fn transformed<F>(roots: &[Comment], id: &CommentId, f: F) -> Option<Vec<Comment>>
where
    F: FnOnce(&Comment) -> Comment,
{
    let pos = locate(roots, id)?;
    let new = f(node(roots, pos));
    let mut res = roots.to_vec();
    *node_mut(&mut res, pos) = new;
    Some(res)
}

/// Renderable state of one discussion thread.
///
/// Roots are ordered most recent first, and each root holds its replies in
/// creation order. The tree is shared as an immutable snapshot: mutations
/// copy on write, so snapshots handed out earlier never change.
#[derive(Debug)]
pub struct ThreadStore {
    thread_id: ThreadId,
    comments: Arc<Vec<Comment>>,
    subscribers: Vec<mpsc::UnboundedSender<Arc<Vec<Comment>>>>,
}

impl ThreadStore {
    pub fn new(thread_id: ThreadId) -> ThreadStore {
        ThreadStore {
            thread_id,
            comments: Arc::new(Vec::new()),
            subscribers: Vec::new(),
        }
    }

    pub fn thread_id(&self) -> &ThreadId {
        &self.thread_id
    }

    pub fn comments(&self) -> Arc<Vec<Comment>> {
        self.comments.clone()
    }

    pub fn find(&self, id: &CommentId) -> Option<&Comment> {
        locate(&self.comments, id).map(|pos| node(&self.comments, pos))
    }

    /// Number of comments in the thread, tombstones included
    pub fn len(&self) -> usize {
        fn count(comments: &[Comment]) -> usize {
            comments.iter().map(|c| 1 + count(&c.replies)).sum()
        }
        count(&self.comments)
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    /// Receives a snapshot of the tree after every change
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<Arc<Vec<Comment>>> {
        let (sender, receiver) = mpsc::unbounded();
        self.subscribers.push(sender);
        receiver
    }

    fn publish(&mut self) {
        let snapshot = self.comments.clone();
        self.subscribers
            .retain(|s| s.unbounded_send(snapshot.clone()).is_ok());
    }

    pub fn replace(&mut self, comments: Vec<Comment>) {
        self.comments = Arc::new(comments);
        self.publish();
    }

    /// Applies `f` to the first comment with this id. Returns false, leaving the
    /// tree untouched, if there is no such comment.
    pub fn transform<F>(&mut self, id: &CommentId, f: F) -> bool
    where
        F: FnOnce(&mut Comment),
    {
        let pos = match locate(&self.comments, id) {
            Some(pos) => pos,
            None => return false,
        };
        f(node_mut(Arc::make_mut(&mut self.comments).as_mut_slice(), pos));
        self.publish();
        true
    }

    pub fn prepend_root(&mut self, comment: Comment) {
        Arc::make_mut(&mut self.comments).insert(0, comment);
        self.publish();
    }

    /// Appends a reply under its root. A reply to a first-level reply lands in
    /// the root's list too, so threads never grow a third level. Returns false
    /// if the parent is neither a root nor a first-level reply.
    pub fn append_reply(&mut self, parent_id: &CommentId, comment: Comment) -> bool {
        let root = match locate(&self.comments, parent_id) {
            Some(pos @ (Position::Root(_) | Position::Reply(_, _))) => pos.root(),
            Some(Position::Nested(..)) | None => return false,
        };
        Arc::make_mut(&mut self.comments)[root].replies.push(comment);
        self.publish();
        true
    }
}
