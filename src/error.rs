//! High-level error type
//!
//! Most functions of the crate return one of two error kinds: an
//! [`InvalidArgument`] when a value handed in by the caller is not
//! acceptable, or a [`ParseError`] when data received from the wire is
//! malformed. The [`Error`] type combines the two for entry points that can
//! fail either way.

use crate::base::wire::ParseError;
use std::borrow::Cow;
use std::error;
use std::fmt;

//------------ Error ---------------------------------------------------------

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// A value handed in by the caller is not acceptable.
    InvalidArgument(InvalidArgument),

    /// The received data violates the DNS message format.
    Malformed(ParseError),
}

impl Error {
    /// Returns whether this is a malformed message error.
    pub fn is_malformed(&self) -> bool {
        matches!(*self, Error::Malformed(_))
    }
}

impl From<InvalidArgument> for Error {
    fn from(err: InvalidArgument) -> Self {
        Error::InvalidArgument(err)
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::Malformed(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::InvalidArgument(ref err) => err.fmt(f),
            Error::Malformed(ref err) => {
                write!(f, "malformed message: {}", err)
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::InvalidArgument(ref err) => Some(err),
            Error::Malformed(ref err) => Some(err),
        }
    }
}

//------------ InvalidArgument -----------------------------------------------

/// A value handed in by the caller was not acceptable.
///
/// The error names the offending argument and describes what was expected.
/// The operation that returned it did not change any state.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InvalidArgument {
    name: &'static str,
    detail: Cow<'static, str>,
}

impl InvalidArgument {
    pub(crate) fn new(
        name: &'static str,
        detail: impl Into<Cow<'static, str>>,
    ) -> Self {
        InvalidArgument {
            name,
            detail: detail.into(),
        }
    }

    /// Returns the name of the offending argument.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns a description of the problem.
    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl fmt::Display for InvalidArgument {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.detail)
    }
}

impl error::Error for InvalidArgument {}

//============ Tests =========================================================
