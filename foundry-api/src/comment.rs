use crate::{Time, Uuid, STUB_UUID};

/// Content shown in place of a deleted comment's text
pub const DELETED_CONTENT: &str = "[deleted]";

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct CommentId(pub Uuid);

impl CommentId {
    pub fn stub() -> CommentId {
        CommentId(STUB_UUID)
    }
}

impl std::fmt::Display for CommentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,

    /// Replaced with DELETED_CONTENT once the comment is deleted
    pub content: String,

    /// Comment this one replies to, None for root comments
    pub parent_id: Option<CommentId>,

    /// Replies in creation order. Only root comments carry replies in practice:
    /// replies to replies are folded into their root's list.
    #[serde(default)]
    pub replies: Vec<Comment>,

    pub upvotes: u32,

    /// Whether the viewer the comment was fetched for has upvoted it
    pub has_upvoted: bool,

    pub is_deleted: bool,

    pub created_at: Time,
    pub updated_at: Time,
}

impl Comment {
    /// Marks this comment as deleted, keeping its replies in place
    pub fn tombstone(&mut self) {
        self.is_deleted = true;
        self.content = String::from(DELETED_CONTENT);
    }

    pub fn apply_vote(&mut self, vote: VoteStatus) {
        self.has_upvoted = vote.has_upvoted;
        self.upvotes = vote.upvotes;
    }

    pub fn vote_status(&self) -> VoteStatus {
        VoteStatus {
            has_upvoted: self.has_upvoted,
            upvotes: self.upvotes,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub content: String,
    pub parent_id: Option<CommentId>,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CommentEdit {
    pub content: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteStatus {
    pub has_upvoted: bool,
    pub upvotes: u32,
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn comment(content: &str) -> Comment {
        let now = Utc::now();
        Comment {
            id: CommentId(Uuid::new_v4()),
            content: String::from(content),
            parent_id: None,
            replies: Vec::new(),
            upvotes: 3,
            has_upvoted: true,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn tombstone_keeps_replies_and_votes() {
        let mut c = comment("Great idea");
        let mut reply = comment("Agreed");
        reply.parent_id = Some(c.id);
        c.replies.push(reply.clone());

        let before = c.clone();
        c.tombstone();
        assert!(c.is_deleted);
        assert_eq!(c.content, DELETED_CONTENT);
        assert_eq!(c.replies, vec![reply]);
        assert_eq!(c.vote_status(), before.vote_status());
        assert_eq!(c.updated_at, before.updated_at);
    }

    #[test]
    fn wire_format_is_camel_case() {
        let mut c = comment("Great idea");
        c.parent_id = Some(CommentId::stub());
        let json = serde_json::to_value(&c).expect("serializing comment");
        assert_eq!(json["hasUpvoted"], true);
        assert_eq!(json["isDeleted"], false);
        assert_eq!(json["parentId"], "ffffffff-ffff-ffff-ffff-ffffffffffff");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());

        let vote: VoteStatus = serde_json::from_str(r#"{"hasUpvoted":true,"upvotes":4}"#)
            .expect("parsing vote status");
        assert_eq!(
            vote,
            VoteStatus {
                has_upvoted: true,
                upvotes: 4,
            }
        );
    }

    #[test]
    fn missing_replies_default_to_empty() {
        let c = comment("Great idea");
        let mut json = serde_json::to_value(&c).expect("serializing comment");
        json.as_object_mut()
            .expect("comment is an object")
            .remove("replies");
        let parsed: Comment = serde_json::from_value(json).expect("parsing comment");
        assert_eq!(parsed, c);
    }
}
