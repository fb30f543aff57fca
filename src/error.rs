//! Configuration errors

use std::{
    error::Error as StdError,
    fmt::{Display, Formatter}
};

/// Describes errors that may occur while a CORS policy is configured
///
/// Every variant is a startup-time error, request handling itself never fails.
#[derive(Debug)]
pub enum Error {
    /// An `allowed_methods` entry contains a comma, e.g. `"GET,POST"` instead of `"GET" "POST"`
    MalformedMethod(String),

    /// A computed header value is not a legal HTTP header value
    InvalidHeaderValue {
        /// Name of the header the value was computed for
        header: &'static str,
        /// The offending value
        value: String,
    },

    /// The `cors` directive could not be parsed
    Syntax {
        /// 1-based line number in the directive input
        line: usize,
        /// What went wrong
        message: String,
    },

    /// The JSON configuration could not be parsed
    Json(serde_json::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::MalformedMethod(method) => write!(
                f,
                "CORS error: allowed methods formatted incorrectly: `{method}`, \
                methods should be listed separately, e.g. `GET POST` instead of `GET,POST`"
            ),
            Error::InvalidHeaderValue { header, value } => write!(
                f,
                "CORS error: `{value}` is not a valid value for the `{header}` header"
            ),
            Error::Syntax { line, message } => write!(f, "CORS error: line {line}: {message}"),
            Error::Json(err) => write!(f, "CORS error: invalid JSON configuration: {err}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    #[inline]
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl Error {
    /// Creates a directive syntax error for the given line
    #[inline]
    pub(crate) fn syntax(line: usize, message: impl Into<String>) -> Self {
        Self::Syntax { line, message: message.into() }
    }
}
