use std::io::{BufRead, BufReader, BufWriter, Read, Write};

use crate::error::TransportError;

/// Receive direction of the transport. Yields lines without their
/// terminator, decoded as UTF-8 (lossy).
#[derive(Debug)]
pub struct LineReader<R: Read> {
    reader: BufReader<R>,
    eof: bool,
    broken: bool,
}

impl<R: Read> LineReader<R> {
    pub fn new(source: R) -> LineReader<R> {
        LineReader {
            reader: BufReader::new(source),
            eof: false,
            broken: false,
        }
    }

    /// Blocks until a complete line, the peer closes, or an I/O error.
    /// Ok(None) is the end of the stream and repeats on every later call.
    /// After an error every later call fails fast without touching the
    /// stream.
    pub fn receive(&mut self) -> Result<Option<String>, TransportError> {
        if self.eof {
            return Ok(None);
        }

        if self.broken {
            return Err(TransportError::Broken);
        }

        let mut buffer = Vec::new();

        match self.reader.read_until(0xA, &mut buffer) {
            Ok(0) => {
                self.eof = true;
                Ok(None)
            }

            Ok(_) => {
                if buffer.last() == Some(&b'\n') {
                    buffer.pop();

                    // CRLF peers.
                    if buffer.last() == Some(&b'\r') {
                        buffer.pop();
                    }
                }

                Ok(Some(String::from_utf8_lossy(&buffer).into_owned()))
            }

            Err(err) => {
                self.broken = true;
                Err(TransportError::Receive(err))
            }
        }
    }
}

/// Send direction of the transport. Every send is line, terminator, flush.
#[derive(Debug)]
pub struct LineWriter<W: Write> {
    writer: BufWriter<W>,
    broken: bool,
}

impl<W: Write> LineWriter<W> {
    pub fn new(sink: W) -> LineWriter<W> {
        LineWriter {
            writer: BufWriter::new(sink),
            broken: false,
        }
    }

    /// Writes the line and its terminator and pushes the bytes out. On
    /// failure the writer is marked broken and every later call fails fast.
    pub fn send(&mut self, line: &str) -> Result<(), TransportError> {
        if self.broken {
            return Err(TransportError::Broken);
        }

        self.write_line(line).map_err(|err| {
            self.broken = true;
            TransportError::Send(err)
        })
    }

    fn write_line(&mut self, line: &str) -> std::io::Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(&[0xA])?; // Write line.
        self.writer.flush()
    }
}
