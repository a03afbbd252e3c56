use thiserror::Error;

/// Canonical result for bufio.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Invalid numeric argument or out-of-range request.
    #[error("invalid argument: {0}")]
    Argument(String),

    /// A value could not be converted to the type an operation expects.
    #[error("type mismatch: {0}")]
    Type(String),

    /// Operation not allowed in the current stream state (closed stream,
    /// unget before the first byte, short write).
    #[error("I/O error: {0}")]
    Io(String),

    #[error("end of file reached")]
    EndOfStream,

    #[error("Invalid configuration: {0}")]
    Config(String),

    // Failures reported by the operating system for descriptor-backed sources.
    #[error("system error: {0}")]
    Sys(#[from] std::io::Error),
}

impl Error {
    pub fn closed_stream() -> Self {
        Error::Io("closed stream".to_string())
    }

    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Error::EndOfStream)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<Error> for std::io::Error {
    fn from(e: Error) -> Self {
        use std::io::ErrorKind;
        match e {
            Error::Sys(inner) => inner,
            Error::EndOfStream => std::io::Error::new(ErrorKind::UnexpectedEof, e),
            Error::Argument(_) | Error::Type(_) | Error::Config(_) => {
                std::io::Error::new(ErrorKind::InvalidInput, e)
            }
            Error::Io(_) => std::io::Error::new(ErrorKind::Other, e),
        }
    }
}
