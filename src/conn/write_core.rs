use crate::{protocol::msgp::BufferOut, protocol::RequestType, RsqlResult, KEEPALIVE_INTERVAL};
use std::io::Write;
use std::net::TcpStream;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

pub(crate) type AmWriteCore = Arc<Mutex<WriteCore>>;

/// The write half of a connection: the request buffer and the stream
/// it is flushed to.
///
/// Shared behind a mutex so that the keep-alive thread and a cancel handle
/// can send while the owning thread is idle; writes are serialized, each
/// request is flushed as one unit.
#[derive(Debug)]
pub(crate) struct WriteCore {
    stream: TcpStream,
    pub(crate) buffout: BufferOut,
}

impl WriteCore {
    pub(crate) fn new(stream: TcpStream) -> Self {
        Self {
            stream,
            buffout: BufferOut::new(),
        }
    }

    /// Flushes the accumulated request bytes to the server.
    pub(crate) fn send(&mut self) -> RsqlResult<()> {
        trace!("WriteCore::send(): {} bytes", self.buffout.len());
        self.stream.write_all(self.buffout.as_bytes())?;
        self.stream.flush()?;
        Ok(())
    }

    /// Like `send`, but gives up when the server does not accept the bytes
    /// within the timeout. Used during authentication.
    pub(crate) fn send_with_timeout(&mut self, timeout: Duration) -> RsqlResult<()> {
        self.stream.set_write_timeout(Some(timeout))?;
        let result = self.send();
        self.stream.set_write_timeout(None)?;
        result
    }

    /// Sends raw bytes outside of the request buffer, without MessagePack
    /// framing. Used for the out-of-band cancel request.
    pub(crate) fn send_raw(&mut self, bytes: &[u8]) -> RsqlResult<()> {
        self.stream.write_all(bytes)?;
        self.stream.flush()?;
        Ok(())
    }
}

// Probes the connection every KEEPALIVE_INTERVAL so that the server does not
// drop an idle session. The thread ends when the connection is dropped or
// a probe cannot be sent.
pub(crate) fn spawn_keepalive(am_write: Weak<Mutex<WriteCore>>) {
    std::thread::Builder::new()
        .name("rsql-keepalive".to_string())
        .spawn(move || loop {
            std::thread::sleep(KEEPALIVE_INTERVAL);
            let Some(am_write) = am_write.upgrade() else {
                break;
            };
            let Ok(mut write_core) = am_write.lock() else {
                break;
            };
            write_core.buffout.reset();
            write_core.buffout.append_u64(RequestType::KeepAlive as u64);
            if let Err(e) = write_core.send() {
                debug!("keep-alive probe failed, stopping: {e}");
                break;
            }
        })
        .ok();
}
