use crate::{RsqlError, RsqlResult};

/// Tags of the individual responses within a batch reply.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum ReplyType {
    // Authentication was rejected.
    LoginFailed = 0,
    // Authentication succeeded, the session is established.
    LoginSuccess = 1,
    // Column names of a new rowset; followed by the field descriptors.
    RecordLayout = 3,
    // One row of field values.
    RecordData = 4,
    // End of the current rowset; carries the row count for verification.
    RecordFinished = 5,
    // A statement completed; carries the number of affected records.
    ExecutionFinished = 7,
    // Server-side PRINT output, sent as a single-column row.
    Print = 10,
    // An informational message string.
    Message = 11,
    // A structured server error or warning.
    Error = 12,
    // End of the whole batch; carries the return code.
    BatchEnd = 14,
}

impl ReplyType {
    pub(crate) fn try_new(id: u64) -> RsqlResult<Self> {
        match id {
            0 => Ok(Self::LoginFailed),
            1 => Ok(Self::LoginSuccess),
            3 => Ok(Self::RecordLayout),
            4 => Ok(Self::RecordData),
            5 => Ok(Self::RecordFinished),
            7 => Ok(Self::ExecutionFinished),
            10 => Ok(Self::Print),
            11 => Ok(Self::Message),
            12 => Ok(Self::Error),
            14 => Ok(Self::BatchEnd),
            _ => Err(RsqlError::Protocol(format!("unknown response type {id}"))),
        }
    }
}
