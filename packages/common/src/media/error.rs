use thiserror::Error;

/// Errors raised by a media relay backend.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("media IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("media host request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The media host answered, but rejected the operation.
    #[error("media host rejected the request ({status}): {message}")]
    Remote { status: u16, message: String },

    #[error("object storage error: {0}")]
    Storage(String),

    #[error("invalid storage id: {0}")]
    InvalidStorageId(String),

    #[error("invalid media configuration: {0}")]
    Config(String),
}
