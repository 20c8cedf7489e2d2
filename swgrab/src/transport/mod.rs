//! Transport layer: a raw byte stream to the device shell.
//!
//! SSH sessions run over russh with a PTY shell channel. Telnet sessions run
//! over a plain TCP stream with option negotiation refused.

pub mod config;
mod ssh;
mod telnet;

pub use config::{AuthMethod, HostKeyVerification, SshConfig};
pub use ssh::SshTransport;
pub use telnet::{TelnetCodec, TelnetTransport};

use std::time::Duration;

use crate::error::SessionResult;

/// An open byte stream to the device shell.
pub enum Transport {
    Ssh(SshTransport),
    Telnet(TelnetTransport),
}

impl Transport {
    /// Line terminator sent after each command.
    pub fn line_ending(&self) -> &'static str {
        match self {
            Transport::Ssh(_) => "\n",
            Transport::Telnet(_) => "\r\n",
        }
    }

    /// Write raw bytes.
    pub async fn write(&mut self, data: &[u8]) -> SessionResult<()> {
        match self {
            Transport::Ssh(t) => t.write(data).await,
            Transport::Telnet(t) => t.write(data).await,
        }
    }

    /// Read the next chunk of shell output. May return an empty chunk when
    /// only protocol traffic arrived.
    pub async fn read_chunk(&mut self) -> SessionResult<Vec<u8>> {
        match self {
            Transport::Ssh(t) => t.read_chunk().await,
            Transport::Telnet(t) => t.read_chunk().await,
        }
    }

    /// Close the connection.
    pub async fn close(self, timeout: Duration) -> SessionResult<()> {
        match self {
            Transport::Ssh(t) => t.close(timeout).await,
            Transport::Telnet(t) => t.close().await,
        }
    }
}
