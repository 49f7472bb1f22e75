use chrono::Utc;

pub use uuid::{uuid, Uuid};
pub type Time = chrono::DateTime<Utc>;

mod comment;
pub use comment::{Comment, CommentEdit, CommentId, NewComment, VoteStatus, DELETED_CONTENT};

mod error;
pub use error::Error;

mod thread;
pub use thread::ThreadId;

mod viewer;
pub use viewer::ViewerId;

pub const STUB_UUID: Uuid = uuid!("ffffffff-ffff-ffff-ffff-ffffffffffff");

pub fn validate_string(s: &str) -> Result<(), Error> {
    match s.contains('\0') {
        true => Err(Error::NullByteInString(String::from(s))),
        false => Ok(()),
    }
}

/// Checks user-submitted comment text. The Comment Service calls this, clients
/// are expected to let the service reject bad input.
pub fn validate_content(s: &str) -> Result<(), Error> {
    if s.trim().is_empty() {
        return Err(Error::EmptyContent);
    }
    validate_string(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_validation() {
        assert_eq!(validate_content("Great idea"), Ok(()));
        assert_eq!(validate_content(""), Err(Error::EmptyContent));
        assert_eq!(validate_content(" \n\t "), Err(Error::EmptyContent));
        assert_eq!(
            validate_content("foo\0bar"),
            Err(Error::NullByteInString(String::from("foo\0bar")))
        );
    }
}
