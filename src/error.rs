//! Error management module

use std::fmt;
use std::io;

/// An error produced while binding a source to a [`crate::Reader`] or
/// reading from it.
///
/// Carries the detail behind an [`ErrorCode`]; most callers only need the
/// code, but the detail is kept around for diagnostics.
#[derive(Debug)]
pub enum Error {
    /// Binding a source failed (e.g. the underlying file could not be opened).
    OpenFailed(io::Error),
    /// A `refill` call on the bound source returned a failure.
    ReadFailed(io::Error),
    /// A tag, comment, CDATA section, PI or DTD was not terminated before EOF.
    UnclosedTag,
    /// An end-tag was seen at document level, or EOF was reached with open
    /// elements remaining.
    UnmatchedEndTag,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::OpenFailed(e) => write!(f, "failed to bind byte source: {}", e),
            Error::ReadFailed(e) => write!(f, "read from byte source failed: {}", e),
            Error::UnclosedTag => write!(f, "unclosed tag: reached end of input before '>'"),
            Error::UnmatchedEndTag => write!(
                f,
                "unmatched end-tag: an end-tag was seen at document level, \
                 or input ended with elements still open"
            ),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::OpenFailed(e) | Error::ReadFailed(e) => Some(e),
            Error::UnclosedTag | Error::UnmatchedEndTag => None,
        }
    }
}

impl From<io::Error> for Error {
    /// Wraps a foreign I/O error as [`Error::ReadFailed`], for callers
    /// building a [`Error`] from their own `ByteSource` implementation
    /// rather than getting one back from [`crate::Reader`] directly.
    fn from(e: io::Error) -> Error {
        Error::ReadFailed(e)
    }
}

/// The sticky error code returned by [`crate::Reader::error_code`].
///
/// Unlike [`Error`], this carries no payload, so it is cheap to store
/// alongside the parser's `End` state and to compare against.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorCode {
    /// No error.
    Ok,
    /// Binding a source that could not be initialized.
    OpenFailed,
    /// The source returned a failure during `refill`.
    ReadFailed,
    /// A tag was not terminated before EOF.
    UnclosedTag,
    /// An end-tag at depth 0, or open elements remaining at EOF.
    UnmatchedEndTag,
}

impl ErrorCode {
    /// Returns `true` unless this is [`ErrorCode::Ok`].
    #[inline]
    pub fn is_err(self) -> bool {
        !matches!(self, ErrorCode::Ok)
    }
}

impl From<&Error> for ErrorCode {
    fn from(e: &Error) -> ErrorCode {
        match e {
            Error::OpenFailed(_) => ErrorCode::OpenFailed,
            Error::ReadFailed(_) => ErrorCode::ReadFailed,
            Error::UnclosedTag => ErrorCode::UnclosedTag,
            Error::UnmatchedEndTag => ErrorCode::UnmatchedEndTag,
        }
    }
}

/// A specialized `Result` type where the error is hard-wired to [`Error`].
pub type Result<T> = ::std::result::Result<T, Error>;
