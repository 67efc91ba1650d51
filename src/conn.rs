use std::io;
use std::net::{Shutdown, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::ConnectionError;

/// The one duplex stream of a session. Owned by the session for its whole
/// lifetime and shut down at most once, from whichever path gets there
/// first.
#[derive(Debug)]
pub struct Connection {
    socket: TcpStream,
    addr: String,
    closed: AtomicBool,
}

impl Connection {
    pub fn connect(host: &str, port: u16) -> Result<Connection, ConnectionError> {
        let addr = format!("{}:{}", host, port);

        let socket = TcpStream::connect((host, port)).map_err(|source| ConnectionError {
            addr: addr.clone(),
            source,
        })?;

        Ok(Connection {
            socket,
            addr,
            closed: AtomicBool::new(false),
        })
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Cloned handles for the receive and send directions.
    pub fn split(&self) -> io::Result<(TcpStream, TcpStream)> {
        Ok((self.socket.try_clone()?, self.socket.try_clone()?))
    }

    /// Shuts the socket down, unblocking any read parked on it. Calling it
    /// again is a no-op.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            let _ = self.socket.shutdown(Shutdown::Both);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.close();
    }
}
