use std::io::{self, BufRead};
use std::thread;

use crossbeam_channel::{unbounded, Receiver};
use tracing::debug;

/// Feeds stdin lines into a channel until end-of-input; the channel
/// disconnecting is the end signal. The pump thread may stay parked on
/// stdin after the session ends; the session never waits on it and the
/// process exits regardless.
pub fn spawn_stdin_pump() -> Receiver<String> {
    let (tx, rx) = unbounded::<String>();

    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(content) => {
                    if tx.send(content).is_err() {
                        break; // Session is gone.
                    }
                }

                Err(err) => {
                    debug!("stdin read failed: {}", err);
                    break;
                }
            }
        }
    });

    rx
}

/// Renders one server line on stdout.
pub fn show(line: &str) {
    println!("> {}", line);
}
