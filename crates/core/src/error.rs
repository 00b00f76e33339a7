use thiserror::Error;

/// Top-level error type used across the entire application.
#[derive(Debug, Error)]
pub enum DashError {
    #[error("config error: {0}")]
    Config(String),

    #[error("HTTP {status} from {url}: {body}")]
    Http {
        url:    String,
        status: u16,
        body:   String,
    },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("decode error: {0}")]
    Decode(String),

    /// The backend answered with a non-success `status` field.
    #[error("backend rejected request: {0}")]
    Rejected(String),

    #[error("composition error: {0}")]
    Composition(String),

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

pub type Result<T, E = DashError> = std::result::Result<T, E>;
