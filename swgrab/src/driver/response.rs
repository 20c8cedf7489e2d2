//! Output of one command sent through the CLI driver.

use std::time::Duration;

/// What came back for one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Output with the echoed command and the trailing prompt removed.
    pub output: String,

    /// Prompt the read stopped at.
    pub prompt: String,

    pub elapsed: Duration,

    /// Device error marker found in the output (e.g. `% Invalid input detected`).
    pub rejection: Option<String>,
}

impl Response {
    pub fn new(
        output: impl Into<String>,
        prompt: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            output: output.into(),
            prompt: prompt.into(),
            elapsed,
            rejection: None,
        }
    }

    /// Record that the device refused the command.
    pub fn rejected(mut self, marker: impl Into<String>) -> Self {
        self.rejection = Some(marker.into());
        self
    }

    pub fn is_rejected(&self) -> bool {
        self.rejection.is_some()
    }

    /// Drop the metadata and keep the text.
    pub fn into_output(self) -> String {
        self.output
    }
}
