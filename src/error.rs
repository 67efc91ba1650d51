use std::io;

use thiserror::Error;

/// The connection could not be established. The session never starts.
#[derive(Debug, Error)]
#[error("failed to connect to {addr}: {source}")]
pub struct ConnectionError {
    pub addr: String,
    #[source]
    pub source: io::Error,
}

/// I/O failure on an established session. Terminal, no retries.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("receive failed: {0}")]
    Receive(#[source] io::Error),

    #[error("send failed: {0}")]
    Send(#[source] io::Error),

    /// The transport already failed once; no further I/O is attempted.
    #[error("transport is broken")]
    Broken,
}
