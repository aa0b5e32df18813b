use thiserror::Error;

/// Crate-wide result alias.
pub type DukaResult<T> = Result<T, DukaError>;

/// Errors surfaced by the log store and the record codec.
///
/// Absence of a key is not an error: lookups return `Ok(None)`.
#[derive(Error, Debug)]
pub enum DukaError {
    /// The underlying stream rejected a write. Not retried internally.
    #[error("log write failed: {0}")]
    WriteFailure(#[source] std::io::Error),
    /// Seek or read on the underlying stream failed.
    #[error("log read failed: {0}")]
    ReadFailure(#[source] std::io::Error),
    /// Stream contents violate the codec's structural guarantee.
    #[error("malformed record: {0}")]
    MalformedRecord(String),
    /// Record serialization failed.
    #[error(transparent)]
    EncodeFailure(#[from] bincode::error::EncodeError),
}

impl From<bincode::error::DecodeError> for DukaError {
    fn from(e: bincode::error::DecodeError) -> Self {
        DukaError::MalformedRecord(e.to_string())
    }
}

impl From<snap::Error> for DukaError {
    fn from(e: snap::Error) -> Self {
        DukaError::MalformedRecord(e.to_string())
    }
}
