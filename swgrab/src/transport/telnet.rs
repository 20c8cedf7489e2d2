//! Telnet transport over a plain TCP stream.
//!
//! Every option the device proposes is refused (`WONT`/`DONT`), which leaves
//! the session in the default NVT mode that IOS handles fine.

use std::time::Duration;

use log::trace;
use memchr::memchr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::error::{SessionResult, TransportError};

const IAC: u8 = 255;
const DONT: u8 = 254;
const DO: u8 = 253;
const WONT: u8 = 252;
const WILL: u8 = 251;
const SB: u8 = 250;
const SE: u8 = 240;

/// Telnet transport.
pub struct TelnetTransport {
    stream: TcpStream,
    codec: TelnetCodec,
    read_buf: Vec<u8>,
}

impl TelnetTransport {
    /// Open the TCP connection.
    pub async fn connect(host: &str, port: u16, timeout: Duration) -> SessionResult<Self> {
        let stream = tokio::time::timeout(timeout, TcpStream::connect((host, port)))
            .await
            .map_err(|_| TransportError::Timeout(timeout))?
            .map_err(|source| TransportError::ConnectionFailed {
                host: host.to_string(),
                port,
                source,
            })?;
        stream.set_nodelay(true).map_err(TransportError::Io)?;

        Ok(Self {
            stream,
            codec: TelnetCodec::default(),
            read_buf: vec![0; 8192],
        })
    }

    /// Write raw bytes.
    pub async fn write(&mut self, data: &[u8]) -> SessionResult<()> {
        self.stream.write_all(data).await.map_err(TransportError::Io)?;
        Ok(())
    }

    /// Read one chunk, answering any option negotiation found in it.
    pub async fn read_chunk(&mut self) -> SessionResult<Vec<u8>> {
        let n = self
            .stream
            .read(&mut self.read_buf)
            .await
            .map_err(TransportError::Io)?;
        if n == 0 {
            return Err(TransportError::Disconnected.into());
        }

        let mut data = Vec::with_capacity(n);
        let mut replies = Vec::new();
        self.codec.decode(&self.read_buf[..n], &mut data, &mut replies);

        if !replies.is_empty() {
            trace!("telnet negotiation reply: {:?}", replies);
            self.stream
                .write_all(&replies)
                .await
                .map_err(TransportError::Io)?;
        }
        Ok(data)
    }

    /// Shut the stream down.
    pub async fn close(mut self) -> SessionResult<()> {
        self.stream.shutdown().await.map_err(TransportError::Io)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum State {
    #[default]
    Data,
    Iac,
    Option(u8),
    Sub,
    SubIac,
}

/// Incremental decoder separating shell data from telnet commands.
///
/// State carries across calls, so a command split between two reads is
/// still recognised.
#[derive(Debug, Default)]
pub struct TelnetCodec {
    state: State,
}

impl TelnetCodec {
    /// Decode `input`, appending shell bytes to `data` and negotiation
    /// refusals to `replies`.
    pub fn decode(&mut self, input: &[u8], data: &mut Vec<u8>, replies: &mut Vec<u8>) {
        let mut rest = input;
        while !rest.is_empty() {
            match self.state {
                State::Data => match memchr(IAC, rest) {
                    Some(pos) => {
                        data.extend_from_slice(&rest[..pos]);
                        self.state = State::Iac;
                        rest = &rest[pos + 1..];
                    }
                    None => {
                        data.extend_from_slice(rest);
                        rest = &[];
                    }
                },
                State::Iac => {
                    self.state = match rest[0] {
                        IAC => {
                            data.push(IAC);
                            State::Data
                        }
                        verb @ (DO | DONT | WILL | WONT) => State::Option(verb),
                        SB => State::Sub,
                        _ => State::Data,
                    };
                    rest = &rest[1..];
                }
                State::Option(verb) => {
                    let option = rest[0];
                    match verb {
                        DO => replies.extend_from_slice(&[IAC, WONT, option]),
                        WILL => replies.extend_from_slice(&[IAC, DONT, option]),
                        _ => {}
                    }
                    self.state = State::Data;
                    rest = &rest[1..];
                }
                State::Sub => {
                    match memchr(IAC, rest) {
                        Some(pos) => {
                            self.state = State::SubIac;
                            rest = &rest[pos + 1..];
                        }
                        None => rest = &[],
                    }
                }
                State::SubIac => {
                    self.state = if rest[0] == SE { State::Data } else { State::Sub };
                    rest = &rest[1..];
                }
            }
        }
    }
}
