//! Command-line interface for the `swgrab` binary.
//!
//! Three required positionals (host, port, device type) plus optional flags
//! for the remaining connection parameters. Unset flags fall back to the
//! defaults in [`ParamsBuilder::defaults`](crate::params::ParamsBuilder::defaults).

use std::path::PathBuf;

use clap::Parser;

use crate::params::ParamOverrides;
use crate::persist::DEFAULT_OUTPUT_PATH;

/// Collect a read-only snapshot of one switch.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "swgrab")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Switch address.
    pub host: String,

    /// Transport port.
    pub port: u16,

    /// Device type: cisco_ios (SSH) or cisco_ios_telnet.
    pub device_type: String,

    /// Login username.
    #[arg(short, long)]
    pub username: Option<String>,

    /// Login password.
    #[arg(short, long, env = "SWGRAB_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Enable secret.
    #[arg(short, long, env = "SWGRAB_SECRET", hide_env_values = true)]
    pub secret: Option<String>,

    /// TCP connect timeout in seconds.
    #[arg(long)]
    pub conn_timeout: Option<u64>,

    /// Authentication timeout in seconds (defaults to the connect timeout).
    #[arg(long)]
    pub auth_timeout: Option<u64>,

    /// Seconds to wait for the first prompt.
    #[arg(long)]
    pub banner_timeout: Option<u64>,

    /// Timeout in seconds for session setup steps.
    #[arg(long)]
    pub blocking_timeout: Option<u64>,

    /// Per-command read timeout in seconds, scaled by the delay factor.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Session timeout in seconds.
    #[arg(long)]
    pub session_timeout: Option<u64>,

    /// Fixed per-command read timeout in seconds, ignoring the delay factor.
    #[arg(long)]
    pub read_timeout_override: Option<f64>,

    /// SSH keepalive interval in seconds (0 disables).
    #[arg(long)]
    pub keepalive: Option<u64>,

    /// Multiplier applied to the per-command read timeout.
    #[arg(long)]
    pub global_delay_factor: Option<f64>,

    /// Cap the delay factor at 1.0.
    #[arg(long)]
    pub fast_cli: Option<bool>,

    /// Authenticate over SSH with a private key.
    #[arg(long)]
    pub use_keys: bool,

    /// Private key file for --use-keys.
    #[arg(long)]
    pub key_file: Option<String>,

    /// Passphrase for the private key.
    #[arg(long)]
    pub passphrase: Option<String>,

    /// Reject SSH hosts missing from known_hosts.
    #[arg(long)]
    pub ssh_strict: bool,

    /// known_hosts file to check and update.
    #[arg(long)]
    pub known_hosts: Option<String>,

    /// Debug-level logging.
    #[arg(short, long)]
    pub verbose: bool,

    /// File the JSON record is appended to.
    #[arg(short, long, default_value = DEFAULT_OUTPUT_PATH)]
    pub output: PathBuf,
}

impl Cli {
    /// Map the arguments onto parameter overrides.
    ///
    /// Boolean switches only override when they are set, so an absent
    /// switch keeps the builder default.
    pub fn overrides(&self) -> ParamOverrides {
        ParamOverrides {
            host: Some(self.host.clone()),
            port: Some(self.port),
            device_type: Some(self.device_type.clone()),
            username: self.username.clone(),
            password: self.password.clone(),
            secret: self.secret.clone(),
            conn_timeout: self.conn_timeout,
            auth_timeout: self.auth_timeout,
            banner_timeout: self.banner_timeout,
            blocking_timeout: self.blocking_timeout,
            timeout: self.timeout,
            session_timeout: self.session_timeout,
            read_timeout_override: self.read_timeout_override,
            keepalive: self.keepalive,
            global_delay_factor: self.global_delay_factor,
            fast_cli: self.fast_cli,
            use_keys: self.use_keys.then_some(true),
            key_file: self.key_file.clone(),
            passphrase: self.passphrase.clone(),
            ssh_strict: self.ssh_strict.then_some(true),
            ssh_known_hosts_file: self.known_hosts.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::params::{DeviceType, ParamsBuilder};
    use std::time::Duration;

    const TARGET: [&str; 3] = ["10.0.0.1", "23", "cisco_ios_telnet"];

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("swgrab").chain(args.iter().copied()))
    }

    fn parse_with_target(flags: &[&str]) -> Cli {
        let args: Vec<&str> = TARGET.iter().chain(flags.iter()).copied().collect();
        parse(&args).unwrap()
    }

    fn build(cli: &Cli) -> Result<crate::params::ConnectionParams, ConfigError> {
        ParamsBuilder::defaults().overlay(cli.overrides()).build()
    }

    #[test]
    fn test_positionals() {
        let cli = parse(&TARGET).unwrap();
        assert_eq!(cli.host, "10.0.0.1");
        assert_eq!(cli.port, 23);
        assert_eq!(cli.device_type, "cisco_ios_telnet");
        assert_eq!(cli.output, PathBuf::from(DEFAULT_OUTPUT_PATH));
    }

    #[test]
    fn test_positionals_are_required() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["10.0.0.1"]).is_err());
        assert!(parse(&["10.0.0.1", "23"]).is_err());
    }

    #[test]
    fn test_port_must_be_numeric() {
        assert!(parse(&["10.0.0.1", "telnet", "cisco_ios_telnet"]).is_err());
        assert!(parse(&["10.0.0.1", "70000", "cisco_ios_telnet"]).is_err());
    }

    #[test]
    fn test_positionals_reach_params() {
        let params = build(&parse(&["10.0.0.1", "22", "cisco_ios"]).unwrap()).unwrap();
        assert_eq!(params.host, "10.0.0.1");
        assert_eq!(params.port, 22);
        assert_eq!(params.device_type, DeviceType::CiscoIos);
        assert!(params.fast_cli);
        assert!(!params.use_keys);
    }

    #[test]
    fn test_unknown_device_type_is_config_error() {
        let cli = parse(&["10.0.0.1", "22", "juniper_junos"]).unwrap();
        assert_eq!(
            build(&cli).unwrap_err(),
            ConfigError::UnknownDeviceType("juniper_junos".to_string())
        );
    }

    #[test]
    fn test_timeout_flags() {
        let cli = parse_with_target(&[
            "--timeout",
            "30",
            "--global-delay-factor",
            "2",
            "--fast-cli",
            "false",
            "--banner-timeout",
            "5",
        ]);
        let params = build(&cli).unwrap();
        assert_eq!(params.timeouts.banner, Duration::from_secs(5));
        assert_eq!(params.command_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_oversized_timeout_flag_is_config_error() {
        let cli = parse_with_target(&["--timeout", "18446744073709551615"]);
        assert!(matches!(
            build(&cli).unwrap_err(),
            ConfigError::InvalidValue { field: "timeout", .. }
        ));
    }

    #[test]
    fn test_switches_only_override_when_set() {
        let overrides = parse_with_target(&[]).overrides();
        assert_eq!(overrides.use_keys, None);
        assert_eq!(overrides.ssh_strict, None);

        let cli = parse_with_target(&["--ssh-strict", "-v"]);
        assert!(cli.verbose);
        assert_eq!(cli.overrides().ssh_strict, Some(true));
    }

    #[test]
    fn test_custom_output() {
        let cli = parse_with_target(&["-o", "/tmp/out.jsonl"]);
        assert_eq!(cli.output, PathBuf::from("/tmp/out.jsonl"));
    }
}
