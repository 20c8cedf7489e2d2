//! Connection parameters and the defaults-plus-overrides builder.
//!
//! Parameters are built once at startup and are read-only afterwards.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default transport port.
pub const DEFAULT_PORT: u16 = 5010;

/// Default device type identifier.
pub const DEFAULT_DEVICE_TYPE: &str = "cisco_ios_telnet";

/// Upper bound for every configured timeout and for the scaled read timeout.
pub const MAX_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Supported device types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceType {
    /// Cisco IOS over SSH.
    CiscoIos,
    /// Cisco IOS over Telnet.
    CiscoIosTelnet,
}

impl DeviceType {
    /// Identifier used on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::CiscoIos => "cisco_ios",
            DeviceType::CiscoIosTelnet => "cisco_ios_telnet",
        }
    }

    /// Whether the device is reached over Telnet instead of SSH.
    pub fn is_telnet(&self) -> bool {
        matches!(self, DeviceType::CiscoIosTelnet)
    }
}

impl FromStr for DeviceType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cisco_ios" | "cisco_ios_ssh" => Ok(DeviceType::CiscoIos),
            "cisco_ios_telnet" => Ok(DeviceType::CiscoIosTelnet),
            other => Err(ConfigError::UnknownDeviceType(other.to_string())),
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Timeouts applied by the device session.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeouts {
    /// TCP connect and SSH handshake.
    pub conn: Duration,
    /// Authentication; falls back to `conn` when unset.
    pub auth: Option<Duration>,
    /// Wait for the first prompt after login.
    pub banner: Duration,
    /// Privilege elevation and session setup commands.
    pub blocking: Duration,
    /// Base read timeout for a single command.
    pub command: Duration,
    /// SSH inactivity timeout. Never shorter than the longest read the
    /// session performs, see [`ConnectionParams::inactivity_timeout`].
    pub session: Duration,
    /// Fixed per-command read timeout, overriding `command` and the delay factor.
    pub read_override: Option<Duration>,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            conn: Duration::from_secs(10),
            auth: None,
            banner: Duration::from_secs(15),
            blocking: Duration::from_secs(20),
            command: Duration::from_secs(100),
            session: Duration::from_secs(60),
            read_override: None,
        }
    }
}

/// Validated connection parameters for one device.
#[derive(Debug)]
pub struct ConnectionParams {
    pub host: String,
    pub port: u16,
    pub device_type: DeviceType,
    pub username: Option<String>,
    pub password: Option<SecretString>,
    /// Privileged-mode (`enable`) secret.
    pub secret: Option<SecretString>,
    pub timeouts: Timeouts,
    /// SSH keepalive interval; `None` disables keepalives.
    pub keepalive: Option<Duration>,
    pub global_delay_factor: f64,
    pub fast_cli: bool,
    pub use_keys: bool,
    pub key_file: Option<PathBuf>,
    pub passphrase: Option<SecretString>,
    /// Reject hosts missing from known_hosts.
    pub ssh_strict: bool,
    pub ssh_known_hosts_file: Option<PathBuf>,
}

impl ConnectionParams {
    /// Authentication timeout, falling back to the connect timeout.
    pub fn auth_timeout(&self) -> Duration {
        self.timeouts.auth.unwrap_or(self.timeouts.conn)
    }

    /// Read timeout for one command.
    ///
    /// `read_override` wins when set. Otherwise the base timeout is scaled
    /// by the delay factor; with `fast_cli` the factor never stretches the
    /// timeout beyond the base.
    pub fn command_timeout(&self) -> Duration {
        if let Some(fixed) = self.timeouts.read_override {
            return fixed;
        }
        let factor = if self.fast_cli {
            self.global_delay_factor.min(1.0)
        } else {
            self.global_delay_factor
        };
        Duration::try_from_secs_f64(self.timeouts.command.as_secs_f64() * factor)
            .map_or(MAX_TIMEOUT, |timeout| timeout.min(MAX_TIMEOUT))
    }

    /// Idle limit for the SSH connection.
    ///
    /// A device that stays silent for a whole command read has to surface
    /// as a read timeout, so this is the session timeout raised to the
    /// longest single read.
    pub fn inactivity_timeout(&self) -> Duration {
        self.timeouts
            .session
            .max(self.command_timeout())
            .max(self.timeouts.blocking)
            .max(self.timeouts.banner)
    }
}

/// User-supplied overrides. `None` and empty strings are not applied.
#[derive(Debug, Default)]
pub struct ParamOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub device_type: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub secret: Option<String>,
    pub conn_timeout: Option<u64>,
    pub auth_timeout: Option<u64>,
    pub banner_timeout: Option<u64>,
    pub blocking_timeout: Option<u64>,
    pub timeout: Option<u64>,
    pub session_timeout: Option<u64>,
    pub read_timeout_override: Option<f64>,
    pub keepalive: Option<u64>,
    pub global_delay_factor: Option<f64>,
    pub fast_cli: Option<bool>,
    pub use_keys: Option<bool>,
    pub key_file: Option<String>,
    pub passphrase: Option<String>,
    pub ssh_strict: Option<bool>,
    pub ssh_known_hosts_file: Option<String>,
}

/// Builder that overlays overrides on top of baseline defaults.
///
/// # Example
///
/// ```rust
/// use swgrab::params::{ParamOverrides, ParamsBuilder};
///
/// let params = ParamsBuilder::defaults()
///     .overlay(ParamOverrides {
///         host: Some("192.0.2.10".to_string()),
///         username: Some("admin".to_string()),
///         ..Default::default()
///     })
///     .build()
///     .unwrap();
/// assert_eq!(params.port, 5010);
/// ```
#[derive(Debug)]
pub struct ParamsBuilder {
    host: Option<String>,
    port: u16,
    device_type: Option<String>,
    username: Option<String>,
    password: Option<String>,
    secret: Option<String>,
    timeouts: Timeouts,
    read_timeout_override: Option<f64>,
    keepalive: u64,
    global_delay_factor: f64,
    fast_cli: bool,
    use_keys: bool,
    key_file: Option<String>,
    passphrase: Option<String>,
    ssh_strict: bool,
    ssh_known_hosts_file: Option<String>,
}

impl ParamsBuilder {
    /// Baseline defaults. Host is unset and must be supplied.
    pub fn defaults() -> Self {
        Self {
            host: None,
            port: DEFAULT_PORT,
            device_type: Some(DEFAULT_DEVICE_TYPE.to_string()),
            username: None,
            password: None,
            secret: None,
            timeouts: Timeouts::default(),
            read_timeout_override: None,
            keepalive: 0,
            global_delay_factor: 1.0,
            fast_cli: true,
            use_keys: false,
            key_file: None,
            passphrase: None,
            ssh_strict: false,
            ssh_known_hosts_file: None,
        }
    }

    /// Set the target host.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = non_empty(Some(host.into()));
        self
    }

    /// Set the device type identifier.
    pub fn device_type(mut self, device_type: impl Into<String>) -> Self {
        self.device_type = non_empty(Some(device_type.into()));
        self
    }

    /// Set the username for authentication.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set the login password.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set the enable secret.
    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    /// Apply every override that carries a value.
    pub fn overlay(mut self, o: ParamOverrides) -> Self {
        fn apply<T>(slot: &mut T, value: Option<T>) {
            if let Some(v) = value {
                *slot = v;
            }
        }
        fn apply_str(slot: &mut Option<String>, value: Option<String>) {
            if let Some(v) = non_empty(value) {
                *slot = Some(v);
            }
        }

        apply_str(&mut self.host, o.host);
        apply(&mut self.port, o.port);
        apply_str(&mut self.device_type, o.device_type);
        apply_str(&mut self.username, o.username);
        apply_str(&mut self.password, o.password);
        apply_str(&mut self.secret, o.secret);
        apply(&mut self.timeouts.conn, o.conn_timeout.map(Duration::from_secs));
        if let Some(secs) = o.auth_timeout {
            self.timeouts.auth = Some(Duration::from_secs(secs));
        }
        apply(&mut self.timeouts.banner, o.banner_timeout.map(Duration::from_secs));
        apply(&mut self.timeouts.blocking, o.blocking_timeout.map(Duration::from_secs));
        apply(&mut self.timeouts.command, o.timeout.map(Duration::from_secs));
        apply(&mut self.timeouts.session, o.session_timeout.map(Duration::from_secs));
        if o.read_timeout_override.is_some() {
            self.read_timeout_override = o.read_timeout_override;
        }
        apply(&mut self.keepalive, o.keepalive);
        apply(&mut self.global_delay_factor, o.global_delay_factor);
        apply(&mut self.fast_cli, o.fast_cli);
        apply(&mut self.use_keys, o.use_keys);
        apply_str(&mut self.key_file, o.key_file);
        apply_str(&mut self.passphrase, o.passphrase);
        apply(&mut self.ssh_strict, o.ssh_strict);
        apply_str(&mut self.ssh_known_hosts_file, o.ssh_known_hosts_file);
        self
    }

    /// Validate and build the parameters.
    pub fn build(self) -> Result<ConnectionParams, ConfigError> {
        let host = self.host.ok_or(ConfigError::MissingField("host"))?;
        let device_type: DeviceType = self
            .device_type
            .ok_or(ConfigError::MissingField("device_type"))?
            .parse()?;

        if self.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "port",
                message: "must be between 1 and 65535".to_string(),
            });
        }
        if !self.global_delay_factor.is_finite() || self.global_delay_factor <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "global_delay_factor",
                message: format!("must be positive, got {}", self.global_delay_factor),
            });
        }

        let mut timeouts = self.timeouts;
        check_timeout("conn_timeout", timeouts.conn)?;
        if let Some(auth) = timeouts.auth {
            check_timeout("auth_timeout", auth)?;
        }
        check_timeout("banner_timeout", timeouts.banner)?;
        check_timeout("blocking_timeout", timeouts.blocking)?;
        check_timeout("timeout", timeouts.command)?;
        check_timeout("session_timeout", timeouts.session)?;
        check_timeout("keepalive", Duration::from_secs(self.keepalive))?;

        timeouts.read_override = match self.read_timeout_override {
            Some(secs) if secs.is_finite() && secs > 0.0 => {
                let fixed = Duration::try_from_secs_f64(secs)
                    .ok()
                    .filter(|fixed| *fixed <= MAX_TIMEOUT)
                    .ok_or_else(|| ConfigError::InvalidValue {
                        field: "read_timeout_override",
                        message: format!(
                            "must not exceed {} seconds, got {secs}",
                            MAX_TIMEOUT.as_secs()
                        ),
                    })?;
                Some(fixed)
            }
            Some(secs) => {
                return Err(ConfigError::InvalidValue {
                    field: "read_timeout_override",
                    message: format!("must be positive, got {secs}"),
                });
            }
            None => None,
        };
        if timeouts.command.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "timeout",
                message: "must be at least 1 second".to_string(),
            });
        }
        if self.use_keys && self.key_file.is_none() {
            return Err(ConfigError::MissingField("key_file"));
        }

        Ok(ConnectionParams {
            host,
            port: self.port,
            device_type,
            username: self.username,
            password: self.password.map(SecretString::from),
            secret: self.secret.map(SecretString::from),
            timeouts,
            keepalive: (self.keepalive > 0).then(|| Duration::from_secs(self.keepalive)),
            global_delay_factor: self.global_delay_factor,
            fast_cli: self.fast_cli,
            use_keys: self.use_keys,
            key_file: self.key_file.map(PathBuf::from),
            passphrase: self.passphrase.map(SecretString::from),
            ssh_strict: self.ssh_strict,
            ssh_known_hosts_file: self.ssh_known_hosts_file.map(PathBuf::from),
        })
    }
}

impl Default for ParamsBuilder {
    fn default() -> Self {
        Self::defaults()
    }
}

fn check_timeout(field: &'static str, value: Duration) -> Result<(), ConfigError> {
    if value > MAX_TIMEOUT {
        return Err(ConfigError::InvalidValue {
            field,
            message: format!(
                "must not exceed {} seconds, got {}",
                MAX_TIMEOUT.as_secs(),
                value.as_secs()
            ),
        });
    }
    Ok(())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
