//! CLI driver: the device session over a real transport.

mod cli;
mod response;

pub use cli::{CliConnector, CliDriver};
pub use response::Response;
