use crate::{protocol::msgp::BufferIn, RsqlError, RsqlResult};

/// An error or warning reported by the database server.
///
/// Returned within [`RsqlError::DbError`](crate::RsqlError::DbError).
#[derive(Serialize)]
pub struct ServerError {
    src_file: String,
    src_line_no: i64,
    src_funcname: String,
    src_backtrace: String,
    category: String,
    label: String,
    severity_text: String,
    state: i64,
    text: String,
    line_no: i64,
    line_pos: i64,
    server: String,
}

/// Severity of a [`ServerError`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum Severity {
    /// The server flagged a condition but completed the batch.
    Warning,
    /// A statement failed; the session remains usable.
    Error,
    /// The session was aborted by the server.
    Fatal,
}

impl Severity {
    pub(crate) fn to_u8(self) -> u8 {
        match self {
            Severity::Warning => 1,
            Severity::Error => 16,
            Severity::Fatal => 20,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
            Severity::Fatal => write!(f, "fatal error"),
        }
    }
}

const SESSION_ABORT_STATE: i64 = 127;

impl ServerError {
    /// Name of the source file on the server where the error originated.
    pub fn src_file(&self) -> &str {
        &self.src_file
    }
    /// Line in the server source file where the error originated.
    pub fn src_line_no(&self) -> i64 {
        self.src_line_no
    }
    /// Name of the server function where the error originated.
    pub fn src_funcname(&self) -> &str {
        &self.src_funcname
    }
    /// Server-side backtrace, if the server sent one.
    pub fn src_backtrace(&self) -> &str {
        &self.src_backtrace
    }
    /// Category of the error.
    pub fn category(&self) -> &str {
        &self.category
    }
    /// Short symbolic label of the error.
    pub fn label(&self) -> &str {
        &self.label
    }
    /// Severity string as sent by the server.
    pub fn severity_text(&self) -> &str {
        &self.severity_text
    }
    /// Error state; 127 means the session was aborted.
    pub fn state(&self) -> i64 {
        self.state
    }
    /// Human-readable error text.
    pub fn text(&self) -> &str {
        &self.text
    }
    /// Line of the failing statement in the batch.
    pub fn line_no(&self) -> i64 {
        self.line_no
    }
    /// Position within the failing line.
    pub fn line_pos(&self) -> i64 {
        self.line_pos
    }
    /// Address of the server that reported the error.
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Severity derived from state and severity string.
    pub fn severity(&self) -> Severity {
        if self.state == SESSION_ABORT_STATE {
            Severity::Fatal
        } else if self.severity_text.ends_with("WARNING") {
            Severity::Warning
        } else {
            Severity::Error
        }
    }

    pub(crate) fn parse<R: std::io::Read>(
        buffin: &mut BufferIn<R>,
        server: &str,
    ) -> RsqlResult<Self> {
        let mut server_error = Self {
            src_file: String::new(),
            src_line_no: 0,
            src_funcname: String::new(),
            src_backtrace: String::new(),
            category: String::new(),
            label: String::new(),
            severity_text: String::new(),
            state: 0,
            text: String::new(),
            line_no: 0,
            line_pos: 0,
            server: server.to_string(),
        };

        let field_count = buffin.read_map_header()?;
        for _ in 0..field_count {
            let key = buffin.read_string()?;
            match key.as_str() {
                "src_file" => server_error.src_file = buffin.read_string()?,
                "src_line_no" => server_error.src_line_no = buffin.read_i64()?,
                "src_funcname" => server_error.src_funcname = buffin.read_string()?,
                "src_backtrace" => server_error.src_backtrace = buffin.read_string()?,
                "category" => server_error.category = buffin.read_string()?,
                "message" => server_error.label = buffin.read_string()?,
                "severity" => server_error.severity_text = buffin.read_string()?,
                "state" => server_error.state = buffin.read_i64()?,
                "text" => server_error.text = buffin.read_string()?,
                "line_no" => server_error.line_no = buffin.read_i64()?,
                "line_pos" => server_error.line_pos = buffin.read_i64()?,
                _ => {
                    return Err(RsqlError::Protocol(format!(
                        "unknown error attribute \"{key}\" has been received"
                    )))
                }
            }
        }

        debug!("parsed ServerError: {server_error}");
        Ok(server_error)
    }
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}:{} {} (state={})",
            self.line_no, self.line_pos, self.text, self.state
        )
    }
}

impl std::fmt::Debug for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

impl std::error::Error for ServerError {}
