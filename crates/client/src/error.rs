use thiserror::Error;

/// Everything a client call can fail with.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A protected call was attempted with an empty session. No request is
    /// sent.
    #[error("not logged in")]
    NotLoggedIn,

    /// The server answered with an error body; `message` carries its
    /// user-facing text verbatim.
    #[error("{message}")]
    Api {
        status: reqwest::StatusCode,
        message: String,
    },

    /// Connection failure, or a response body that did not decode.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    /// The HTTP status of a server-side rejection, if that is what this is.
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
