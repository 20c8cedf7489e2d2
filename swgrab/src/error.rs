//! Error types for swgrab.
//!
//! The run-level errors (`ConfigError`, `ConnectionError`, `CommandError`,
//! `IncompleteDataError`, `PersistError`) are what the orchestrator and the
//! binary see. The transport/channel/driver errors stay inside the device
//! session adapter and are folded into the typed kinds at its boundary.

use std::fmt;
use std::io;
use std::time::Duration;

use thiserror::Error;

/// Main error type for a swgrab run.
#[derive(Error, Debug)]
pub enum Error {
    /// Connection parameters could not be built.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The device session could not be established.
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// A command failed while collecting data.
    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    /// All commands ran but the collected data set has gaps.
    #[error("Incomplete data: {0}")]
    Incomplete(#[from] IncompleteDataError),

    /// The record could not be written to local storage.
    #[error("Persist error: {0}")]
    Persist(#[from] PersistError),
}

/// Errors building connection parameters.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A mandatory field is missing after applying overrides.
    #[error("missing mandatory field '{0}'")]
    MissingField(&'static str),

    /// The device type identifier is not supported.
    #[error("unsupported device type '{0}'")]
    UnknownDeviceType(String),

    /// A field holds a value outside its allowed range.
    #[error("invalid value for '{field}': {message}")]
    InvalidValue { field: &'static str, message: String },
}

/// Failure class of a connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionErrorKind {
    /// The device did not answer within the configured timeout.
    Timeout,
    /// Login or privilege elevation was rejected.
    AuthFailure,
    /// The transport could not be opened or was dropped by the peer.
    Refused,
}

impl fmt::Display for ConnectionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionErrorKind::Timeout => "timeout",
            ConnectionErrorKind::AuthFailure => "authentication failure",
            ConnectionErrorKind::Refused => "connection refused",
        };
        f.write_str(name)
    }
}

/// Connecting or elevating privilege failed.
#[derive(Error, Debug)]
#[error("{kind}: {message}")]
pub struct ConnectionError {
    pub kind: ConnectionErrorKind,
    pub message: String,
}

impl ConnectionError {
    pub fn new(kind: ConnectionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<SessionError> for ConnectionError {
    fn from(err: SessionError) -> Self {
        Self::new(err.connection_kind(), err.to_string())
    }
}

/// Failure class of a single command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandErrorKind {
    /// The prompt did not come back before the read timeout.
    ReadTimeout,
    /// The session broke while the command was running.
    Transport,
}

impl fmt::Display for CommandErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CommandErrorKind::ReadTimeout => "read timeout",
            CommandErrorKind::Transport => "transport failure",
        };
        f.write_str(name)
    }
}

/// A command could not be completed.
#[derive(Error, Debug)]
#[error("'{command}' failed with {kind}: {message}")]
pub struct CommandError {
    pub command: String,
    pub kind: CommandErrorKind,
    pub message: String,
}

impl CommandError {
    pub fn new(
        command: impl Into<String>,
        kind: CommandErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            command: command.into(),
            kind,
            message: message.into(),
        }
    }

    /// Build a command error from an adapter-level failure.
    pub fn from_session(command: impl Into<String>, err: SessionError) -> Self {
        Self::new(command, err.command_kind(), err.to_string())
    }
}

/// The completeness check found empty fields.
#[derive(Error, Debug, PartialEq, Eq)]
#[error("missing or empty fields: {}", missing.join(", "))]
pub struct IncompleteDataError {
    pub missing: Vec<&'static str>,
}

/// Errors writing the persisted record.
#[derive(Error, Debug)]
pub enum PersistError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors raised inside the device session adapter.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Transport-level errors (TCP, SSH, Telnet).
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Channel errors (prompt matching, reads).
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Driver-level errors (login dialogue, privilege).
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),
}

impl SessionError {
    /// Classify this error as a connection failure kind.
    pub fn connection_kind(&self) -> ConnectionErrorKind {
        match self {
            SessionError::Transport(TransportError::Timeout(_))
            | SessionError::Channel(ChannelError::PatternTimeout(_)) => {
                ConnectionErrorKind::Timeout
            }
            SessionError::Transport(
                TransportError::AuthenticationFailed { .. }
                | TransportError::Key(_)
                | TransportError::HostKeyChanged { .. }
                | TransportError::HostKeyUnknown { .. },
            )
            | SessionError::Driver(
                DriverError::LoginRejected { .. } | DriverError::PrivilegeAcquisitionFailed { .. },
            ) => ConnectionErrorKind::AuthFailure,
            _ => ConnectionErrorKind::Refused,
        }
    }

    /// Classify this error as a command failure kind.
    pub fn command_kind(&self) -> CommandErrorKind {
        match self {
            SessionError::Transport(TransportError::Timeout(_))
            | SessionError::Channel(ChannelError::PatternTimeout(_)) => {
                CommandErrorKind::ReadTimeout
            }
            _ => CommandErrorKind::Transport,
        }
    }
}

/// Transport layer errors (TCP connect, SSH handshake, authentication).
#[derive(Error, Debug)]
pub enum TransportError {
    /// Failed to connect to host
    #[error("Connection failed to {host}:{port}: {source}")]
    ConnectionFailed {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication failed
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// SSH key error
    #[error("SSH key error: {0}")]
    Key(String),

    /// Server presented a key that differs from known_hosts
    #[error("Host key for {host}:{port} changed (known_hosts line {line})")]
    HostKeyChanged { host: String, port: u16, line: usize },

    /// Server is not in known_hosts and strict checking is on
    #[error("Host key for {host}:{port} is unknown")]
    HostKeyUnknown { host: String, port: u16 },

    /// known_hosts could not be read or written
    #[error("known_hosts error: {0}")]
    KnownHosts(String),

    /// Connection was closed unexpectedly
    #[error("Connection disconnected")]
    Disconnected,

    /// Operation timed out
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Channel layer errors.
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Pattern matching timed out
    #[error("Pattern not found within {0:?}")]
    PatternTimeout(Duration),

    /// Channel closed unexpectedly
    #[error("Channel closed")]
    Closed,

    /// Invalid regex pattern
    #[error("Invalid regex pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Driver layer errors.
#[derive(Error, Debug)]
pub enum DriverError {
    /// The device asked for credentials again after they were sent
    #[error("Login rejected for user '{user}'")]
    LoginRejected { user: String },

    /// Failed to acquire target privilege level
    #[error("Failed to acquire privilege level '{target}'")]
    PrivilegeAcquisitionFailed { target: String },

    /// Prompt did not match any known privilege level
    #[error("Unknown privilege level from prompt: '{prompt}'")]
    UnknownPrivilege { prompt: String },
}

/// Result type alias using swgrab's Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Result type alias used inside the device session adapter.
pub type SessionResult<T> = std::result::Result<T, SessionError>;
