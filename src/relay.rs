use std::io::{Read, Write};

use crossbeam_channel::{select, Receiver};
use tracing::debug;

use crate::error::TransportError;
use crate::line::{LineReader, LineWriter};

/// Why the receive side stopped.
#[derive(Debug)]
pub enum InboundEnd {
    PeerClosed,
    Failed(TransportError),
}

/// Why the send side stopped.
#[derive(Debug)]
pub enum OutboundEnd {
    InputClosed,
    Cancelled,
    Failed(TransportError),
}

/// Pumps server lines into the display sink, in arrival order, until the
/// peer closes or the transport fails. Never writes.
pub fn inbound<R, F>(mut reader: LineReader<R>, mut sink: F) -> InboundEnd
where
    R: Read,
    F: FnMut(String),
{
    loop {
        match reader.receive() {
            Ok(Some(line)) => sink(line),

            Ok(None) => {
                debug!("peer closed the stream");
                return InboundEnd::PeerClosed;
            }

            Err(err) => {
                debug!("receive failed: {}", err);
                return InboundEnd::Failed(err);
            }
        }
    }
}

/// Forwards local lines to the server, in typed order, until the input
/// ends, a send fails, or the session asks it to stop. The cancel channel
/// wakes it even while it sits waiting for a line that may never come.
pub fn outbound<W>(
    mut writer: LineWriter<W>,
    input: Receiver<String>,
    cancel: Receiver<()>,
) -> OutboundEnd
where
    W: Write,
{
    loop {
        select! {
            recv(input) -> line => match line {
                Ok(line) => {
                    if let Err(err) = writer.send(&line) {
                        debug!("send failed: {}", err);
                        return OutboundEnd::Failed(err);
                    }
                }

                Err(_) => {
                    debug!("local input closed");
                    return OutboundEnd::InputClosed;
                }
            },

            recv(cancel) -> _ => {
                debug!("cancelled");
                return OutboundEnd::Cancelled;
            }
        }
    }
}
