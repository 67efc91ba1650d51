use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, unbounded};

use parley::session::{Outcome, Session, State};

fn listen() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

#[test]
fn starts_out_connecting() {
    let (listener, port) = listen();

    let session = Session::connect("127.0.0.1", port).unwrap();
    let _peer = listener.accept().unwrap();

    assert_eq!(*session.state(), State::Connecting);
    assert_eq!(session.addr(), format!("127.0.0.1:{}", port));
}

#[test]
fn server_lines_are_displayed_in_order() {
    let (listener, port) = listen();

    let server = thread::spawn(move || {
        let (mut peer, _) = listener.accept().unwrap();
        peer.write_all(b"hello\nworld\n").unwrap();
        // Drop closes the connection with no further data.
    });

    let session = Session::connect("127.0.0.1", port).unwrap();

    // The user never types; the input channel stays open and silent.
    let (input_tx, input_rx) = unbounded::<String>();
    let (sink_tx, sink_rx) = unbounded::<String>();

    let outcome = session.run(input_rx, move |line| {
        sink_tx.send(line).unwrap();
    });

    assert!(matches!(outcome, Outcome::ServerClosed));

    let displayed: Vec<String> = sink_rx.iter().collect();
    assert_eq!(displayed, vec!["hello".to_string(), "world".to_string()]);

    server.join().unwrap();
    drop(input_tx);
}

#[test]
fn typed_line_reaches_the_wire_verbatim() {
    let (listener, port) = listen();

    let server = thread::spawn(move || {
        let (mut peer, _) = listener.accept().unwrap();
        let mut bytes = Vec::new();
        peer.read_to_end(&mut bytes).unwrap();
        bytes
    });

    let session = Session::connect("127.0.0.1", port).unwrap();

    let (input_tx, input_rx) = unbounded::<String>();
    input_tx.send("ping".to_string()).unwrap();
    drop(input_tx);

    let outcome = session.run(input_rx, |_line| {});
    assert!(matches!(outcome, Outcome::InputClosed));

    assert_eq!(server.join().unwrap(), b"ping\n");
}

#[test]
fn typed_lines_arrive_in_order_and_empty_lines_survive() {
    let (listener, port) = listen();

    let server = thread::spawn(move || {
        let (peer, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(peer);
        let mut lines = Vec::new();

        loop {
            let mut buffer = String::new();
            if reader.read_line(&mut buffer).unwrap() == 0 {
                break; // Client shut the stream down.
            }
            lines.push(buffer);
        }

        lines
    });

    let session = Session::connect("127.0.0.1", port).unwrap();

    let (input_tx, input_rx) = unbounded::<String>();
    input_tx.send("first".to_string()).unwrap();
    input_tx.send("".to_string()).unwrap();
    input_tx.send("third".to_string()).unwrap();
    drop(input_tx);

    let outcome = session.run(input_rx, |_line| {});
    assert!(matches!(outcome, Outcome::InputClosed));

    let received = server.join().unwrap();
    assert_eq!(
        received,
        vec!["first\n".to_string(), "\n".to_string(), "third\n".to_string()]
    );
}

#[test]
fn server_close_releases_a_session_waiting_on_input() {
    let (listener, port) = listen();

    let server = thread::spawn(move || {
        let (peer, _) = listener.accept().unwrap();
        drop(peer); // Close with no data at all.
    });

    let session = Session::connect("127.0.0.1", port).unwrap();

    // Input stays open: no keystroke is ever coming.
    let (input_tx, input_rx) = unbounded::<String>();
    let (done_tx, done_rx) = bounded(1);

    thread::spawn(move || {
        let _ = done_tx.send(session.run(input_rx, |_line| {}));
    });

    let outcome = done_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("session should close without further user action");
    assert!(matches!(outcome, Outcome::ServerClosed));

    server.join().unwrap();
    drop(input_tx);
}

#[test]
fn input_end_closes_the_session_and_the_connection() {
    let (listener, port) = listen();

    let server = thread::spawn(move || {
        let (peer, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(peer);
        let mut buffer = String::new();

        // The server stays silent; it only observes the client going away.
        reader.read_line(&mut buffer).unwrap()
    });

    let session = Session::connect("127.0.0.1", port).unwrap();

    let (input_tx, input_rx) = unbounded::<String>();
    drop(input_tx); // End of input before anything is typed.

    let outcome = session.run(input_rx, |_line| {});
    assert!(matches!(outcome, Outcome::InputClosed));

    // The server sees a clean end of stream.
    assert_eq!(server.join().unwrap(), 0);
}

#[test]
fn connect_failure_never_starts_a_session() {
    // Grab a free port and release it so nothing is listening there.
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let err = Session::connect("127.0.0.1", port).unwrap_err();
    assert!(err.to_string().contains("failed to connect"));
}
