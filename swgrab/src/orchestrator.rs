//! Run orchestration: connect, collect, validate, report, persist.
//!
//! ```text
//! Idle ─► Connecting ─► Collecting ─► Validating ─► Reporting ─► Done
//!             │              │             │             │
//!             └──────────────┴─────────────┴─────────────┴────► Aborted
//! ```
//!
//! Any failure ends the run. Nothing is reported or stored for an aborted
//! run, and the session is closed on every path once it has been opened.

use std::fmt;
use std::time::{Duration, Instant};

use log::{debug, error, info};

use crate::classify::classify;
use crate::command::{COMMANDS, CommandDescriptor};
use crate::error::{CommandError, Error, IncompleteDataError, Result};
use crate::params::ConnectionParams;
use crate::persist::Persister;
use crate::record::ResultRecord;
use crate::report::Reporter;
use crate::session::{Connector, DeviceSession};

/// Orchestrator states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Connecting,
    Collecting,
    Validating,
    Reporting,
    Done,
    Aborted,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Idle => "idle",
            RunState::Connecting => "connecting",
            RunState::Collecting => "collecting",
            RunState::Validating => "validating",
            RunState::Reporting => "reporting",
            RunState::Done => "done",
            RunState::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Drives one collection run against a single device.
pub struct Orchestrator<C, R, P> {
    params: ConnectionParams,
    connector: C,
    reporter: R,
    persister: P,
    commands: &'static [CommandDescriptor],
    state: RunState,
    failed_phase: Option<RunState>,
}

impl<C, R, P> Orchestrator<C, R, P>
where
    C: Connector,
    R: Reporter,
    P: Persister,
{
    /// Create an orchestrator that issues the standard command table.
    pub fn new(params: ConnectionParams, connector: C, reporter: R, persister: P) -> Self {
        Self {
            params,
            connector,
            reporter,
            persister,
            commands: &COMMANDS,
            state: RunState::Idle,
            failed_phase: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// The state the run was in when it aborted.
    pub fn failed_phase(&self) -> Option<RunState> {
        self.failed_phase
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn persister(&self) -> &P {
        &self.persister
    }

    /// Execute the run and return the complete record.
    pub async fn run(&mut self) -> Result<ResultRecord> {
        self.failed_phase = None;
        self.transition(RunState::Connecting);
        info!(
            "Initialized connection to the switch {}:{} ({}) ...",
            self.params.host, self.params.port, self.params.device_type
        );
        let mut session = match self.connector.connect(&self.params).await {
            Ok(session) => session,
            Err(e) => return Err(self.abort(e.into())),
        };
        info!("Connection was successful");

        self.transition(RunState::Collecting);
        info!("Receiving data from the switch ...");
        let collected = collect(&mut session, self.commands, self.params.command_timeout()).await;
        session.close().await;
        let record = collected.map_err(|e| self.abort(e.into()))?;

        self.transition(RunState::Validating);
        if !record.is_complete() {
            let missing = record.missing_fields();
            return Err(self.abort(IncompleteDataError { missing }.into()));
        }
        info!("Data received from the switch successfully!");

        self.transition(RunState::Reporting);
        info!("Outputting received data to the terminal:");
        self.reporter.report(&record);
        info!("Writing received data to a file");
        if let Err(e) = self.persister.persist(&record) {
            return Err(self.abort(e.into()));
        }

        self.transition(RunState::Done);
        Ok(record)
    }

    fn transition(&mut self, next: RunState) {
        debug!("{} -> {}", self.state, next);
        self.state = next;
    }

    fn abort(&mut self, err: Error) -> Error {
        error!("Run aborted while {}: {}", self.state, err);
        self.failed_phase = Some(self.state);
        self.transition(RunState::Aborted);
        err
    }
}

/// Run every command in order, stopping at the first failure.
async fn collect<S: DeviceSession>(
    session: &mut S,
    commands: &[CommandDescriptor],
    timeout: Duration,
) -> std::result::Result<ResultRecord, CommandError> {
    let mut record = ResultRecord::new();
    for descriptor in commands {
        let start = Instant::now();
        let output = session.run(descriptor.command, timeout).await?;
        debug!(
            "'{}' returned {} bytes in {:?}",
            descriptor.command,
            output.len(),
            start.elapsed()
        );
        classify(&mut record, descriptor, &output);
    }
    Ok(record)
}
