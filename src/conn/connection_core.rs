use crate::{
    conn::{AmWriteCore, ConnectParams, WriteCore},
    protocol::batch::{BatchState, StepMode},
    protocol::msgp::{BufferIn, SimpleValue},
    protocol::{ReplyType, RequestType},
    RsqlError, RsqlResult,
};
use std::net::TcpStream;
use std::sync::{Arc, Mutex};

/// The living part of a connection: the authenticated TCP stream with its
/// read and write buffers.
///
/// The read half is owned exclusively; the write half is shared with the
/// keep-alive thread and any cancel handles.
#[derive(Debug)]
pub(crate) struct ConnectionCore {
    params: ConnectParams,
    buffin: BufferIn<TcpStream>,
    am_write: AmWriteCore,
    broken: bool,
}

impl ConnectionCore {
    pub(crate) fn try_new(params: ConnectParams) -> RsqlResult<Self> {
        if params.login().is_empty() {
            return Err(RsqlError::Usage("a login name is required"));
        }
        if params.password().unsecure().is_empty() {
            return Err(RsqlError::Usage("a password is required"));
        }

        debug!("connecting to {}", params.server_name());
        let stream = TcpStream::connect((params.host(), params.port()))?;
        stream.set_nodelay(true)?;
        let write_stream = stream.try_clone()?;

        let buffin = BufferIn::new(stream);
        let am_write = Arc::new(Mutex::new(WriteCore::new(write_stream)));

        let mut core = Self {
            params,
            buffin,
            am_write,
            broken: false,
        };
        core.authenticate()?;
        super::write_core::spawn_keepalive(Arc::downgrade(&core.am_write));
        Ok(core)
    }

    fn authenticate(&mut self) -> RsqlResult<()> {
        {
            let mut write_core = self.am_write.lock()?;
            write_core.buffout.reset();
            write_core.buffout.append_u64(RequestType::Authenticate as u64);
            write_core.buffout.append_map_str_simple(&[
                (
                    "login_name",
                    SimpleValue::Str(self.params.login().to_string()),
                ),
                (
                    "password",
                    SimpleValue::Str(self.params.password().unsecure().to_string()),
                ),
                // database may be an empty string
                (
                    "database",
                    SimpleValue::Str(self.params.database().to_string()),
                ),
            ]);
            write_core.send_with_timeout(self.params.connect_timeout())?;
        }

        match ReplyType::try_new(self.buffin.read_u64()?)? {
            ReplyType::LoginSuccess => {
                debug!("session established for {}", self.params.login());
                Ok(())
            }
            ReplyType::LoginFailed => Err(RsqlError::Usage("login failed")),
            reply_type => Err(RsqlError::Protocol(format!(
                "unexpected response {reply_type:?} to authentication"
            ))),
        }
    }

    /// Sends a batch of SQL statements to the server.
    pub(crate) fn send_batch(&mut self, sql: &str) -> RsqlResult<()> {
        if self.broken {
            return Err(RsqlError::Usage(
                "the connection is broken and must be re-established",
            ));
        }
        let mut write_core = self.am_write.lock()?;
        write_core.buffout.reset();
        write_core.buffout.append_u64(RequestType::Batch as u64);
        write_core.buffout.append_string(sql);
        write_core.send()
    }

    /// Processes responses of the current batch, marking the connection as
    /// broken when the session is aborted.
    pub(crate) fn step(&mut self, state: &mut BatchState, mode: StepMode) -> RsqlResult<bool> {
        match state.step(&mut self.buffin, mode) {
            Err(e) => {
                if e.is_session_aborting() {
                    self.broken = true;
                }
                Err(e)
            }
            ok => ok,
        }
    }

    pub(crate) fn am_write(&self) -> &AmWriteCore {
        &self.am_write
    }

    pub(crate) fn server_name(&self) -> String {
        self.params.server_name()
    }

    pub(crate) fn is_broken(&self) -> bool {
        self.broken
    }
}
