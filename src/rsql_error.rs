use crate::protocol::parts::{ServerError, Severity};
use thiserror::Error;

/// A list specifying categories of [`RsqlError`](crate::RsqlError).
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RsqlError {
    /// Erroneous connection parameters, e.g. from a malformed connection string.
    #[error("Erroneous connection parameters")]
    ConnParams {
        /// The causing Error.
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// Database server responded with an error;
    /// the contained `ServerError` describes the concrete reason.
    #[error("Database server responded with an error")]
    DbError {
        /// The causing Error.
        #[from]
        source: ServerError,
    },

    /// Malformed or unexpected bytes were received: a bad prefix byte, an
    /// unknown response tag or datatype code, or an array-length mismatch.
    /// Always fatal to the batch in progress.
    #[error("Protocol error: {}", _0)]
    Protocol(String),

    /// A decoded integer or decimal exceeds the requested target width or
    /// precision.
    #[error("Value out of range: {}", _0)]
    ValueRange(String),

    /// Error occured in communication with the database.
    #[error(transparent)]
    Io {
        /// The causing Error.
        #[from]
        source: std::io::Error,
    },

    /// Error occured in thread synchronization.
    #[error("Error occured in thread synchronization")]
    Poison,

    /// Error caused by wrong usage.
    #[error("Wrong usage: {}", _0)]
    Usage(&'static str),

    /// Error caused by wrong usage.
    #[error("Wrong usage: {}", _0)]
    UsageDetailed(String),
}

/// Abbreviation of `Result<T, RsqlError>`.
pub type RsqlResult<T> = std::result::Result<T, RsqlError>;

impl RsqlError {
    /// Returns the contained `ServerError`, if any.
    ///
    /// This method helps in case you need programmatic access to e.g. the
    /// error state or the statement position.
    pub fn server_error(&self) -> Option<&ServerError> {
        match self {
            Self::DbError {
                source: server_error,
            } => Some(server_error),
            _ => None,
        }
    }

    /// Returns true if the error implies that the session is unusable and the
    /// connection must be re-established by the caller.
    ///
    /// This is the case for io errors and for server errors with fatal
    /// severity (server state 127).
    pub fn is_session_aborting(&self) -> bool {
        match self {
            Self::Io { .. } => true,
            Self::DbError { source } => source.severity() == Severity::Fatal,
            _ => false,
        }
    }

    pub(crate) fn conn_params(error: Box<dyn std::error::Error + Send + Sync + 'static>) -> Self {
        Self::ConnParams { source: error }
    }
}

impl<G> From<std::sync::PoisonError<G>> for RsqlError {
    fn from(_error: std::sync::PoisonError<G>) -> Self {
        Self::Poison
    }
}
