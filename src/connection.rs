use crate::{
    conn::{ConnectionCore, IntoConnectParams, WriteCore},
    protocol::batch::{BatchState, StepMode},
    protocol::parts::RsqlValue,
    protocol::RequestType,
    Cursor, RsqlResult,
};
use std::sync::{Mutex, Weak};

/// An authenticated session with an RSQL server.
///
/// All methods that talk to the server take `&mut self`: a connection
/// processes one batch at a time. Dropping the connection closes the
/// session.
#[derive(Debug)]
pub struct Connection {
    core: ConnectionCore,
}

impl Connection {
    /// Connects to the server and authenticates.
    ///
    /// `p` is either a [`ConnectParams`](crate::ConnectParams) instance or
    /// a connection string:
    ///
    /// ```rust,no_run
    /// use rsqldrv::Connection;
    ///
    /// # fn main() -> rsqldrv::RsqlResult<()> {
    /// let mut connection =
    ///     Connection::new("server = 127.0.0.1:7777; login = john; password = secret")?;
    /// # Ok(()) }
    /// ```
    pub fn new<P: IntoConnectParams>(p: P) -> RsqlResult<Self> {
        Ok(Self {
            core: ConnectionCore::try_new(p.into_connect_params()?)?,
        })
    }

    /// Sends a batch of SQL statements and returns a cursor over its
    /// rowsets.
    ///
    /// Execution stops at the first rowset; the remaining statements run
    /// as the cursor advances. A server error is raised from the cursor
    /// method that reaches the end of the batch.
    pub fn query(&mut self, sql: &str) -> RsqlResult<Cursor<'_>> {
        self.core.send_batch(sql)?;
        let mut state = BatchState::new(&self.core.server_name());
        self.core.step(&mut state, StepMode::NextRecord)?;
        Ok(Cursor::new(&mut self.core, state))
    }

    /// Sends a batch of SQL statements, executes it to completion, and
    /// returns the total number of affected records.
    pub fn execute(&mut self, sql: &str) -> RsqlResult<i64> {
        let state = self.execute_batch(sql)?;
        Ok(state.exec_record_count())
    }

    /// Sends a batch of SQL statements, executes it to completion, and
    /// returns the first column of the first data row, if any.
    pub fn query_scalar(&mut self, sql: &str) -> RsqlResult<Option<RsqlValue>> {
        let mut state = self.execute_batch(sql)?;
        Ok(state.take_first_scalar())
    }

    fn execute_batch(&mut self, sql: &str) -> RsqlResult<BatchState> {
        self.core.send_batch(sql)?;
        let mut state = BatchState::new(&self.core.server_name());
        self.core.step(&mut state, StepMode::ExecuteAll)?;
        Ok(state)
    }

    /// Starts a transaction.
    pub fn begin_tran(&mut self) -> RsqlResult<()> {
        self.execute("BEGIN TRAN;").map(|_| ())
    }

    /// Commits the current transaction.
    pub fn commit(&mut self) -> RsqlResult<()> {
        self.execute("COMMIT;").map(|_| ())
    }

    /// Rolls back the current transaction, if one is open.
    pub fn rollback(&mut self) -> RsqlResult<()> {
        self.execute("IF @@TRANCOUNT > 0 ROLLBACK;").map(|_| ())
    }

    /// Returns a handle with which a batch running on this connection can
    /// be cancelled from another thread.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            am_write: std::sync::Arc::downgrade(self.core.am_write()),
        }
    }

    /// The server address in `host:port` form.
    pub fn server_name(&self) -> String {
        self.core.server_name()
    }

    /// True if the session was aborted and the connection is unusable.
    pub fn is_broken(&self) -> bool {
        self.core.is_broken()
    }
}

/// Cancels the batch currently executing on the originating connection.
///
/// The handle stays valid across batches; it does nothing after the
/// connection has been dropped.
#[derive(Clone, Debug)]
pub struct CancelHandle {
    am_write: Weak<Mutex<WriteCore>>,
}

impl CancelHandle {
    /// Asks the server to abort the running batch. Best-effort: cancelling
    /// an idle or closed connection has no effect.
    ///
    /// The cancelled batch itself still completes on the client side, with
    /// an error from the server describing the cancellation.
    pub fn cancel(&self) {
        let Some(am_write) = self.am_write.upgrade() else {
            return;
        };
        let Ok(mut write_core) = am_write.lock() else {
            return;
        };
        // single raw byte, sent out-of-band
        if let Err(e) = write_core.send_raw(&[RequestType::Cancel as u8]) {
            debug!("cancel request could not be sent: {e}");
        }
    }
}
