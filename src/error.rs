use std::string::FromUtf8Error;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Fewer bytes than the index promised were available at `offset`
    #[error("read {read} bytes at offset {offset}, expected {expected}")]
    ShortRead {
        offset: u64,
        expected: usize,
        read: usize,
    },
    /// On reqest for a non existing line
    #[error("Line {line} is out of bounds [0,{}]", .lines - 1)]
    OutOfBounds { line: i64, lines: i64 },
    #[error("line is not valid utf-8")]
    UTF8Error,
    #[error("unknown event \"{0}\"")]
    UnknownEventType(String),
    #[error("malformed field {index}: {raw:?}")]
    MalformedField { index: usize, raw: String },
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    /// A line server answered with an error status
    #[error("server responded {status}: {message}")]
    Remote { status: u16, message: String },
}

impl Error {
    /// Returns `true` for errors which indicate that the history file itself can't be trusted
    /// anymore. Everything else only affects the request that caused it.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Io(_) | Error::ShortRead { .. })
    }

    /// Returns `true` if the line itself was read fine but doesn't hold a valid event
    pub fn is_unparsable(&self) -> bool {
        match self {
            Error::UTF8Error | Error::UnknownEventType(_) | Error::MalformedField { .. } => true,
            Error::Remote { status, .. } => *status == 422,
            _ => false,
        }
    }

    pub(crate) fn malformed(index: usize, raw: &str) -> Self {
        Error::MalformedField {
            index,
            raw: raw.to_owned(),
        }
    }
}

impl From<FromUtf8Error> for Error {
    fn from(_: FromUtf8Error) -> Self {
        Self::UTF8Error
    }
}
