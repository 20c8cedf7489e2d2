//! # swgrab
//!
//! Read-only snapshot collector for a single network switch.
//!
//! One run connects to the device over SSH or Telnet, issues a fixed set of
//! `show` commands, routes each output into a [`ResultRecord`], checks that
//! nothing is missing, prints a fixed-width report and appends the record
//! as one JSON line to a local file. Any failure ends the run.
//!
//! ## Features
//!
//! - Async SSH (russh) and Telnet transports behind one CLI driver
//! - Tail-search prompt detection over a VT-cleaned buffer
//! - Privilege elevation with `enable` and the configured secret
//! - Typed errors per phase, mapped to process exit codes
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use swgrab::{CliConnector, JsonLinesFile, LogReporter, Orchestrator, ParamsBuilder};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), swgrab::Error> {
//!     let params = ParamsBuilder::defaults()
//!         .host("192.0.2.10")
//!         .username("admin")
//!         .password("secret")
//!         .secret("enable-secret")
//!         .build()?;
//!
//!     let mut run = Orchestrator::new(
//!         params,
//!         CliConnector,
//!         LogReporter,
//!         JsonLinesFile::new("db/output_data.txt"),
//!     );
//!     let record = run.run().await?;
//!     println!("{:?}", record.software_version());
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod classify;
pub mod cli;
pub mod command;
pub mod driver;
pub mod error;
pub mod exit;
pub mod orchestrator;
pub mod params;
pub mod persist;
pub mod platform;
pub mod record;
pub mod report;
pub mod session;
pub mod transport;
pub mod version;

// Re-export main types for convenience
pub use command::{COMMANDS, CommandDescriptor};
pub use driver::{CliConnector, CliDriver, Response};
pub use error::{
    CommandError, CommandErrorKind, ConfigError, ConnectionError, ConnectionErrorKind, Error,
    IncompleteDataError, PersistError, Result,
};
pub use orchestrator::{Orchestrator, RunState};
pub use params::{ConnectionParams, DeviceType, ParamOverrides, ParamsBuilder};
pub use persist::{JsonLinesFile, Persister};
pub use platform::{PlatformDefinition, PrivilegeLevel};
pub use record::{ResultRecord, Slot};
pub use report::{LogReporter, Reporter};
pub use session::{Connector, DeviceSession};
