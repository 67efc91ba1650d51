use std::net::TcpStream;
use std::thread;

use crossbeam_channel::{bounded, unbounded, Receiver};
use tracing::{debug, info};

use crate::conn::Connection;
use crate::error::{ConnectionError, TransportError};
use crate::line::{LineReader, LineWriter};
use crate::relay::{self, InboundEnd, OutboundEnd};

/// Session lifecycle. Once Terminating is entered no new lines move in
/// either direction; Closed is terminal.
#[derive(Debug, PartialEq, Eq)]
pub enum State {
    Connecting,
    Active,
    Terminating,
    Closed,
}

/// How the session ended. ConnectionLost is the only error outcome; the
/// other two are natural ends.
#[derive(Debug)]
pub enum Outcome {
    ServerClosed,
    InputClosed,
    ConnectionLost(TransportError),
}

enum Event {
    Inbound(InboundEnd),
    Outbound(OutboundEnd),
}

/// Owns the connection and both relays, and decides, exactly once, when
/// the exchange is over.
#[derive(Debug)]
pub struct Session {
    conn: Connection,
    reader: LineReader<TcpStream>,
    writer: LineWriter<TcpStream>,
    state: State,
}

impl Session {
    pub fn connect(host: &str, port: u16) -> Result<Session, ConnectionError> {
        let conn = Connection::connect(host, port)?;

        let (receive_half, send_half) = conn.split().map_err(|source| ConnectionError {
            addr: conn.addr().to_owned(),
            source,
        })?;

        info!("connected to {}", conn.addr());

        Ok(Session {
            conn,
            reader: LineReader::new(receive_half),
            writer: LineWriter::new(send_half),
            state: State::Connecting,
        })
    }

    pub fn addr(&self) -> &str {
        self.conn.addr()
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Runs the exchange to completion: both relays concurrently, the first
    /// one to stop decides the outcome, the other is woken and the
    /// connection is closed exactly once.
    pub fn run<F>(mut self, input: Receiver<String>, sink: F) -> Outcome
    where
        F: FnMut(String) + Send,
    {
        let reader = self.reader;
        let writer = self.writer;

        self.state = State::Active;
        debug!("session active");

        let (event_tx, event_rx) = unbounded::<Event>();
        let (cancel_tx, cancel_rx) = bounded::<()>(1);

        let outcome = thread::scope(|scope| {
            let inbound_tx = event_tx.clone();
            scope.spawn(move || {
                let end = relay::inbound(reader, sink);
                let _ = inbound_tx.send(Event::Inbound(end));
            });

            let outbound_tx = event_tx;
            scope.spawn(move || {
                let end = relay::outbound(writer, input, cancel_rx);
                let _ = outbound_tx.send(Event::Outbound(end));
            });

            // Each relay sends its end exactly once, so the first event is
            // always there to take.
            let first = event_rx.recv().unwrap();

            self.state = State::Terminating;
            debug!("session terminating");

            // Wake whichever relay is still parked: the cancel signal for a
            // blocked input wait, the shutdown for a blocked read.
            let _ = cancel_tx.send(());
            self.conn.close();

            outcome_of(first)
        });

        self.state = State::Closed;
        self.conn.close(); // No-op the second time.
        info!("session closed: {:?}", outcome);

        outcome
    }
}

/// The first relay to stop decides how the session ended. A transport
/// failure on either side is never masked.
fn outcome_of(first: Event) -> Outcome {
    match first {
        Event::Inbound(InboundEnd::PeerClosed) => Outcome::ServerClosed,
        Event::Inbound(InboundEnd::Failed(err)) => Outcome::ConnectionLost(err),
        Event::Outbound(OutboundEnd::InputClosed) => Outcome::InputClosed,
        Event::Outbound(OutboundEnd::Failed(err)) => Outcome::ConnectionLost(err),
        // Cancel is only ever sent after a first event, so this arm is a
        // formality.
        Event::Outbound(OutboundEnd::Cancelled) => Outcome::InputClosed,
    }
}
