//! SSH connection configuration.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::params::ConnectionParams;

/// Host key verification mode, analogous to OpenSSH's `StrictHostKeyChecking`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HostKeyVerification {
    /// Reject unknown and changed keys.
    Strict,

    /// Accept and learn unknown keys, reject changed keys.
    #[default]
    AcceptNew,
}

/// SSH connection configuration.
#[derive(Debug)]
pub struct SshConfig {
    /// Target host (hostname or IP address).
    pub host: String,

    /// SSH port.
    pub port: u16,

    /// Username for authentication.
    pub username: String,

    /// Authentication method.
    pub auth: AuthMethod,

    /// TCP connect and handshake timeout.
    pub connect_timeout: Duration,

    /// Authentication timeout.
    pub auth_timeout: Duration,

    /// Inactivity timeout for the whole session.
    pub inactivity_timeout: Duration,

    /// Keepalive interval, if enabled.
    pub keepalive: Option<Duration>,

    /// Terminal width for PTY.
    pub terminal_width: u32,

    /// Terminal height for PTY.
    pub terminal_height: u32,

    /// Host key verification mode.
    pub host_key_verification: HostKeyVerification,

    /// Path to known_hosts file.
    pub known_hosts_path: Option<PathBuf>,
}

impl SshConfig {
    /// Derive the SSH settings from connection parameters.
    pub fn from_params(params: &ConnectionParams, terminal_width: u32, terminal_height: u32) -> Self {
        let auth = match (&params.key_file, &params.password) {
            (Some(path), _) if params.use_keys => AuthMethod::PrivateKey {
                path: path.clone(),
                passphrase: params
                    .passphrase
                    .as_ref()
                    .map(|p| SecretString::from(p.expose_secret().to_string())),
            },
            (_, Some(password)) => {
                AuthMethod::Password(SecretString::from(password.expose_secret().to_string()))
            }
            _ => AuthMethod::None,
        };

        Self {
            host: params.host.clone(),
            port: params.port,
            username: params.username.clone().unwrap_or_default(),
            auth,
            connect_timeout: params.timeouts.conn,
            auth_timeout: params.auth_timeout(),
            inactivity_timeout: params.inactivity_timeout(),
            keepalive: params.keepalive,
            terminal_width,
            terminal_height,
            host_key_verification: if params.ssh_strict {
                HostKeyVerification::Strict
            } else {
                HostKeyVerification::AcceptNew
            },
            known_hosts_path: params.ssh_known_hosts_file.clone(),
        }
    }
}

/// Authentication method for SSH connections.
#[derive(Debug)]
pub enum AuthMethod {
    /// No authentication.
    None,

    /// Password authentication.
    Password(SecretString),

    /// Private key authentication.
    PrivateKey {
        /// Path to the private key file.
        path: PathBuf,
        /// Optional passphrase for encrypted keys.
        passphrase: Option<SecretString>,
    },
}
