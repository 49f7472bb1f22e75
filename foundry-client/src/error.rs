use crate::api::Error as ApiError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The comment service answered, and refused the request
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("failed reaching the comment service: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected answer from the comment service: {0:#}")]
    Protocol(anyhow::Error),
}

impl Error {
    /// Whether the service itself rejected the request. Retrying a rejected
    /// request as-is will usually fail the same way.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Error::Api(_))
    }

    pub fn api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(e) => Some(e),
            _ => None,
        }
    }
}
