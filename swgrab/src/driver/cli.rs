//! Interactive CLI driver.
//!
//! Owns the transport and the prompt buffer, walks the device into the
//! default privilege level, and sends commands one at a time, reading until
//! the prompt comes back.

use std::time::{Duration, Instant};

use log::{debug, trace, warn};
use regex::bytes::Regex;
use secrecy::{ExposeSecret, SecretString};

use super::response::Response;
use crate::channel::PatternBuffer;
use crate::error::{
    ChannelError, CommandError, ConnectionError, DriverError, SessionError, SessionResult,
    TransportError,
};
use crate::params::{ConnectionParams, MAX_TIMEOUT};
use crate::platform::{self, PlatformDefinition, PrivilegeLevel};
use crate::session::{Connector, DeviceSession};
use crate::transport::{SshConfig, SshTransport, TelnetTransport, Transport};

/// An open, prepared CLI session on one device.
pub struct CliDriver {
    transport: Transport,
    platform: PlatformDefinition,
    buffer: PatternBuffer,
    prompt_pattern: Regex,
    current_privilege: Option<String>,
    close_timeout: Duration,
}

impl CliDriver {
    /// Connect, log in, reach the default privilege level and run the
    /// platform's on-open commands.
    ///
    /// The transport is shut down again if any step after connecting fails.
    pub async fn open(params: &ConnectionParams) -> SessionResult<Self> {
        let platform = platform::for_device(params.device_type);
        let prompt_pattern = platform.prompt_pattern().map_err(ChannelError::from)?;

        let transport = if params.device_type.is_telnet() {
            let telnet =
                TelnetTransport::connect(&params.host, params.port, params.timeouts.conn).await?;
            Transport::Telnet(telnet)
        } else {
            let config =
                SshConfig::from_params(params, platform.terminal_width, platform.terminal_height);
            Transport::Ssh(SshTransport::connect(config).await?)
        };
        debug!(
            "{} transport to {}:{} open",
            params.device_type, params.host, params.port
        );

        let mut driver = Self {
            transport,
            platform,
            buffer: PatternBuffer::default(),
            prompt_pattern,
            current_privilege: None,
            close_timeout: params.timeouts.blocking,
        };

        match driver.prepare(params).await {
            Ok(()) => Ok(driver),
            Err(e) => {
                driver.disconnect().await;
                Err(e)
            }
        }
    }

    /// Name of the privilege level the last prompt belonged to.
    pub fn current_privilege(&self) -> Option<&str> {
        self.current_privilege.as_deref()
    }

    async fn prepare(&mut self, params: &ConnectionParams) -> SessionResult<()> {
        if params.device_type.is_telnet() {
            self.login(params).await?;
        } else {
            let pattern = self.prompt_pattern.clone();
            let data = self.read_until(&pattern, params.timeouts.banner).await?;
            self.update_privilege(&data);
        }

        let target = self.platform.default_privilege.clone();
        tokio::time::timeout(
            params.timeouts.blocking,
            self.acquire_privilege(&target, params.secret.as_ref(), params.timeouts.blocking),
        )
        .await
        .map_err(|_| TransportError::Timeout(params.timeouts.blocking))??;

        for command in self.platform.on_open_commands.clone() {
            let response = self.send_command(&command, params.timeouts.blocking).await?;
            if let Some(marker) = &response.rejection {
                warn!("On-open command '{}' rejected: {}", command, marker);
            }
        }
        Ok(())
    }

    /// Telnet login dialogue: answer username and password prompts until a
    /// shell prompt shows up.
    async fn login(&mut self, params: &ConnectionParams) -> SessionResult<()> {
        let user = params.username.clone().unwrap_or_default();
        let pattern = Regex::new(&format!(
            "(?:{})|(?:{})|(?:{})",
            self.platform.login_prompt.as_str(),
            self.platform.password_prompt.as_str(),
            self.prompt_pattern.as_str()
        ))
        .map_err(ChannelError::from)?;

        let mut sent_user = false;
        let mut sent_password = false;
        let mut timeout = params.timeouts.banner;
        loop {
            let data = match self.read_until(&pattern, timeout).await {
                Ok(data) => data,
                // IOS drops the line after too many bad passwords
                Err(SessionError::Transport(TransportError::Disconnected)) if sent_password => {
                    return Err(DriverError::LoginRejected { user }.into());
                }
                Err(e) => return Err(e),
            };
            timeout = params.auth_timeout();

            if self.prompt_pattern.is_match(&data) {
                self.update_privilege(&data);
                debug!("Logged in as '{}'", user);
                return Ok(());
            }

            if self.platform.password_prompt.is_match(&data) {
                if sent_password {
                    return Err(DriverError::LoginRejected { user }.into());
                }
                trace!("Answering password prompt");
                self.send_secret(params.password.as_ref()).await?;
                sent_password = true;
            } else {
                if sent_user {
                    return Err(DriverError::LoginRejected { user }.into());
                }
                trace!("Answering username prompt");
                self.send_line(&user).await?;
                sent_user = true;
            }
        }
    }

    /// Walk up or down the privilege levels until `target` is reached.
    async fn acquire_privilege(
        &mut self,
        target: &str,
        secret: Option<&SecretString>,
        timeout: Duration,
    ) -> SessionResult<()> {
        let target_index =
            self.platform
                .privilege_index(target)
                .ok_or_else(|| DriverError::UnknownPrivilege {
                    prompt: target.to_string(),
                })?;
        let failed = || DriverError::PrivilegeAcquisitionFailed {
            target: target.to_string(),
        };

        for _ in 0..self.platform.privilege_levels.len() {
            let current_index = self
                .current_privilege
                .as_deref()
                .and_then(|name| self.platform.privilege_index(name))
                .ok_or_else(failed)?;

            if current_index == target_index {
                debug!("At privilege level '{}'", target);
                return Ok(());
            }

            if current_index < target_index {
                let next = self
                    .platform
                    .privilege_levels
                    .get_index(current_index + 1)
                    .map(|(_, level)| level.clone())
                    .ok_or_else(failed)?;
                self.escalate(&next, secret, timeout).await?;
            } else {
                let command = self
                    .platform
                    .privilege_levels
                    .get_index(current_index)
                    .and_then(|(_, level)| level.deescalate_command.clone())
                    .ok_or_else(failed)?;
                self.send_line(&command).await?;
                let pattern = self.prompt_pattern.clone();
                let data = self.read_until(&pattern, timeout).await?;
                self.update_privilege(&data);
            }
        }

        Err(failed().into())
    }

    async fn escalate(
        &mut self,
        next: &PrivilegeLevel,
        secret: Option<&SecretString>,
        timeout: Duration,
    ) -> SessionResult<()> {
        let failed = || DriverError::PrivilegeAcquisitionFailed {
            target: next.name.clone(),
        };
        let command = next.escalate_command.as_deref().ok_or_else(failed)?;
        debug!("Escalating to '{}' with '{}'", next.name, command);
        self.send_line(command).await?;

        let data = match &next.escalate_prompt {
            Some(auth) => {
                let pattern = Regex::new(&format!(
                    "(?:{})|(?:{})",
                    auth.as_str(),
                    self.prompt_pattern.as_str()
                ))
                .map_err(ChannelError::from)?;

                let data = self.read_until(&pattern, timeout).await?;
                if auth.is_match(&data) {
                    self.send_secret(secret).await?;
                    let data = self.read_until(&pattern, timeout).await?;
                    // Asked again: the secret was rejected
                    if auth.is_match(&data) {
                        return Err(failed().into());
                    }
                    data
                } else {
                    data
                }
            }
            None => {
                let pattern = self.prompt_pattern.clone();
                self.read_until(&pattern, timeout).await?
            }
        };

        self.update_privilege(&data);
        if self.current_privilege.as_deref() != Some(next.name.as_str()) {
            return Err(failed().into());
        }
        Ok(())
    }

    /// Send one command and read its output up to the next prompt.
    pub async fn send_command(&mut self, command: &str, timeout: Duration) -> SessionResult<Response> {
        let start = Instant::now();
        self.send_line(command).await?;

        let pattern = self.prompt_pattern.clone();
        let data = self.read_until(&pattern, timeout).await?;
        let raw = String::from_utf8_lossy(&data);
        let prompt = trailing_line(&raw).to_string();
        self.update_privilege(&data);

        let output = self.platform.normalize_output(&raw, command);
        let rejection = self.platform.detect_failure(&output).map(str::to_string);
        let response = Response::new(output, prompt, start.elapsed());
        Ok(match rejection {
            Some(marker) => response.rejected(marker),
            None => response,
        })
    }

    /// Read until `pattern` matches the buffer tail, returning everything
    /// read so far.
    async fn read_until(&mut self, pattern: &Regex, timeout: Duration) -> SessionResult<Vec<u8>> {
        let now = tokio::time::Instant::now();
        let deadline = now
            .checked_add(timeout)
            .unwrap_or_else(|| now + MAX_TIMEOUT);
        loop {
            if self.buffer.tail_contains(pattern) {
                return Ok(self.buffer.take());
            }
            let chunk = tokio::time::timeout_at(deadline, self.transport.read_chunk())
                .await
                .map_err(|_| ChannelError::PatternTimeout(timeout))??;
            trace!("Read {} bytes", chunk.len());
            self.buffer.extend(&chunk);
        }
    }

    async fn send_line(&mut self, line: &str) -> SessionResult<()> {
        let data = format!("{}{}", line, self.transport.line_ending());
        self.transport.write(data.as_bytes()).await
    }

    async fn send_secret(&mut self, secret: Option<&SecretString>) -> SessionResult<()> {
        let value = secret.map(|s| s.expose_secret()).unwrap_or_default();
        let data = format!("{}{}", value, self.transport.line_ending());
        self.transport.write(data.as_bytes()).await
    }

    fn update_privilege(&mut self, data: &[u8]) {
        let text = String::from_utf8_lossy(data);
        let prompt = trailing_line(&text);
        match self.platform.determine_privilege(prompt) {
            Some(level) => {
                trace!("Prompt '{}' is level '{}'", prompt, level.name);
                self.current_privilege = Some(level.name.clone());
            }
            None => trace!("Prompt '{}' matches no privilege level", prompt),
        }
    }

    /// Best-effort logout and transport shutdown.
    async fn disconnect(mut self) {
        for command in self.platform.on_close_commands.clone() {
            if let Err(e) = self.send_line(&command).await {
                debug!("On-close command '{}' not sent: {}", command, e);
                break;
            }
        }
        if let Err(e) = self.transport.close(self.close_timeout).await {
            warn!("Error while closing the session: {}", e);
        }
    }
}

impl DeviceSession for CliDriver {
    async fn run(&mut self, command: &str, timeout: Duration) -> Result<String, CommandError> {
        let response = self
            .send_command(command, timeout)
            .await
            .map_err(|e| CommandError::from_session(command, e))?;

        trace!(
            "'{}' finished at prompt '{}' after {:?}",
            command, response.prompt, response.elapsed
        );
        // The device's error text is not data; an empty slot fails the completeness check
        if let Some(marker) = &response.rejection {
            warn!("Device rejected '{}': {}", command, marker);
            return Ok(String::new());
        }
        Ok(response.into_output())
    }

    async fn close(self) {
        self.disconnect().await;
    }
}

/// Opens [`CliDriver`] sessions over SSH or Telnet according to the device type.
#[derive(Debug, Default, Clone, Copy)]
pub struct CliConnector;

impl Connector for CliConnector {
    type Session = CliDriver;

    async fn connect(&self, params: &ConnectionParams) -> Result<CliDriver, ConnectionError> {
        CliDriver::open(params).await.map_err(ConnectionError::from)
    }
}

/// Last non-empty line of `text`, trimmed.
fn trailing_line(text: &str) -> &str {
    text.trim_end()
        .rsplit('\n')
        .next()
        .unwrap_or_default()
        .trim()
}
