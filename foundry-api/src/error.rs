use std::str::FromStr;

use anyhow::{anyhow, Context};
use serde_json::json;
use uuid::Uuid;

use crate::CommentId;

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Comment content must not be empty")]
    EmptyContent,

    #[error("Null byte in string is not allowed {0:?}")]
    NullByteInString(String),

    #[error("Invalid thread id {0:?}")]
    InvalidThreadId(String),

    #[error("Comment not found {0}")]
    CommentNotFound(CommentId),

    #[error("Comment was deleted {0}")]
    CommentDeleted(CommentId),
}

impl Error {
    pub fn status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            Error::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::PermissionDenied => StatusCode::FORBIDDEN,
            Error::EmptyContent => StatusCode::BAD_REQUEST,
            Error::NullByteInString(_) => StatusCode::BAD_REQUEST,
            Error::InvalidThreadId(_) => StatusCode::BAD_REQUEST,
            Error::CommentNotFound(_) => StatusCode::NOT_FOUND,
            Error::CommentDeleted(_) => StatusCode::CONFLICT,
        }
    }

    pub fn contents(&self) -> Vec<u8> {
        serde_json::to_vec(&match self {
            Error::Unknown(msg) => json!({
                "message": msg,
                "type": "unknown",
            }),
            Error::PermissionDenied => json!({
                "message": "permission denied",
                "type": "permission-denied",
            }),
            Error::EmptyContent => json!({
                "message": "comment content must not be empty",
                "type": "empty-content",
            }),
            Error::NullByteInString(s) => json!({
                "message": "there was a null byte in argument string",
                "type": "null-byte",
                "string": s,
            }),
            Error::InvalidThreadId(t) => json!({
                "message": "thread id contains invalid characters",
                "type": "invalid-thread-id",
                "thread": t,
            }),
            Error::CommentNotFound(c) => json!({
                "message": "comment not found",
                "type": "comment-not-found",
                "comment": c.0,
            }),
            Error::CommentDeleted(c) => json!({
                "message": "comment was deleted",
                "type": "comment-deleted",
                "comment": c.0,
            }),
        })
        .expect("serializing error contents")
    }

    pub fn parse(body: &[u8]) -> anyhow::Result<Error> {
        let data: serde_json::Value =
            serde_json::from_slice(body).context("parsing error contents")?;
        let comment_id = || {
            data.get("comment")
                .and_then(|c| c.as_str())
                .and_then(|c| Uuid::from_str(c).ok())
                .map(CommentId)
                .ok_or_else(|| anyhow!("error is about a comment but has no proper comment id"))
        };
        Ok(
            match data
                .get("type")
                .and_then(|t| t.as_str())
                .ok_or_else(|| anyhow!("error type is not a string"))?
            {
                "unknown" => Error::Unknown(String::from(
                    data.get("message")
                        .and_then(|msg| msg.as_str())
                        .unwrap_or(""),
                )),
                "permission-denied" => Error::PermissionDenied,
                "empty-content" => Error::EmptyContent,
                "null-byte" => Error::NullByteInString(String::from(
                    data.get("string").and_then(|s| s.as_str()).ok_or_else(|| {
                        anyhow!("error is a null-byte-in-string without a string")
                    })?,
                )),
                "invalid-thread-id" => Error::InvalidThreadId(String::from(
                    data.get("thread")
                        .and_then(|t| t.as_str())
                        .ok_or_else(|| anyhow!("error is an invalid thread id without a thread"))?,
                )),
                "comment-not-found" => Error::CommentNotFound(comment_id()?),
                "comment-deleted" => Error::CommentDeleted(comment_id()?),
                _ => return Err(anyhow!("error contents has unknown type")),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_go_through_json() {
        let errors = [
            Error::Unknown(String::from("database on fire")),
            Error::PermissionDenied,
            Error::EmptyContent,
            Error::NullByteInString(String::from("a\0b")),
            Error::InvalidThreadId(String::from("a/b")),
            Error::CommentNotFound(CommentId(Uuid::new_v4())),
            Error::CommentDeleted(CommentId(Uuid::new_v4())),
        ];
        for e in errors {
            assert_eq!(Error::parse(&e.contents()).expect("parsing error"), e);
        }
    }

    #[test]
    fn status_codes() {
        assert_eq!(Error::EmptyContent.status_code(), http::StatusCode::BAD_REQUEST);
        assert_eq!(
            Error::CommentNotFound(CommentId::stub()).status_code(),
            http::StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::CommentDeleted(CommentId::stub()).status_code(),
            http::StatusCode::CONFLICT
        );
    }

    #[test]
    fn malformed_bodies_are_rejected() {
        assert!(Error::parse(b"not json").is_err());
        assert!(Error::parse(br#"{"type": "no-such-error"}"#).is_err());
        assert!(Error::parse(br#"{"type": "comment-deleted", "comment": "nope"}"#).is_err());
        assert_eq!(
            Error::parse(br#"{"type": "unknown"}"#).expect("parsing bare unknown error"),
            Error::Unknown(String::new())
        );
    }
}
