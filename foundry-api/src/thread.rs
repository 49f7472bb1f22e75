use crate::Error;

const MAX_THREAD_ID_LEN: usize = 128;

/// Discussion subject a thread is attached to, eg. a problem's slug
#[derive(
    Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct ThreadId(pub String);

impl ThreadId {
    pub fn new(id: impl Into<String>) -> ThreadId {
        ThreadId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    // Thread ids end up in URL paths, so keep them to unreserved characters
    pub fn validate(&self) -> Result<(), Error> {
        let valid = !self.0.is_empty()
            && self.0.len() <= MAX_THREAD_ID_LEN
            && self
                .0
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.');
        match valid {
            true => Ok(()),
            false => Err(Error::InvalidThreadId(self.0.clone())),
        }
    }
}

impl std::fmt::Display for ThreadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
