//! Device session interface consumed by the orchestrator.
//!
//! [`CliConnector`](crate::driver::CliConnector) is the real implementation;
//! tests substitute scripted sessions.

use std::future::Future;
use std::time::Duration;

use crate::error::{CommandError, ConnectionError};
use crate::params::ConnectionParams;

/// Opens device sessions.
pub trait Connector: Send + Sync {
    /// Session type produced by this connector.
    type Session: DeviceSession;

    /// Connect, log in and elevate to privileged mode in one step.
    fn connect(
        &self,
        params: &ConnectionParams,
    ) -> impl Future<Output = Result<Self::Session, ConnectionError>> + Send;
}

/// An open, privileged shell on the device.
pub trait DeviceSession: Send + Sized {
    /// Send one command and return its output without the echo or the
    /// trailing prompt.
    fn run(
        &mut self,
        command: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<String, CommandError>> + Send;

    /// Release the session. Errors while closing are logged, not returned.
    fn close(self) -> impl Future<Output = ()> + Send;
}
