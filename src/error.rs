use azure_core::error::ErrorKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("long-running operation ended in state {0}")]
    Operation(String),

    #[error("malformed resource id {id:?}: {reason}")]
    ResourceId { id: String, reason: &'static str },

    #[error("invalid URL {0:?}")]
    Url(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("no Y/N answer after {0} attempts")]
    PromptExhausted(usize),

    #[error("input closed before an answer was given")]
    PromptClosed,

    #[error("interrupted")]
    Interrupted,

    #[error(transparent)]
    Azure(#[from] azure_core::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the HTTP status of a failed request, if the error came from one.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Error::Azure(err) => err.http_status().map(u16::from),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.http_status() == Some(404)
    }

    /// The ARM error code of a failed request, e.g. `ResourceGroupNotFound`.
    pub fn error_code(&self) -> Option<&str> {
        match self {
            Error::Azure(err) => match err.kind() {
                ErrorKind::HttpResponse { error_code, .. } => error_code.as_deref(),
                _ => None,
            },
            _ => None,
        }
    }
}
