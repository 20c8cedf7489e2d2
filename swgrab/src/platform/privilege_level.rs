//! Privilege level definition.

use regex::bytes::Regex;

/// A privilege level of a device CLI.
///
/// Levels are ordered from least to most privileged inside a
/// [`PlatformDefinition`](super::PlatformDefinition); each level knows how
/// to enter it from the level below and how to leave it again.
#[derive(Debug, Clone)]
pub struct PrivilegeLevel {
    /// Name of this privilege level (e.g., "exec", "privilege_exec").
    pub name: String,

    /// Regex matching the prompt of this level at the end of the output.
    pub pattern: Regex,

    /// Command to enter this level from the one below.
    pub escalate_command: Option<String>,

    /// Command to drop back to the level below.
    pub deescalate_command: Option<String>,

    /// Prompt asking for a secret while escalating, if any.
    pub escalate_prompt: Option<Regex>,

    /// Strings that must NOT be in the prompt for this level to match.
    pub not_contains: Vec<String>,
}

impl PrivilegeLevel {
    /// Create a new privilege level.
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.into(),
            pattern: Regex::new(pattern)?,
            escalate_command: None,
            deescalate_command: None,
            escalate_prompt: None,
            not_contains: vec![],
        })
    }

    /// Set the escalation command.
    pub fn with_escalate(mut self, command: impl Into<String>) -> Self {
        self.escalate_command = Some(command.into());
        self
    }

    /// Set the de-escalation command.
    pub fn with_deescalate(mut self, command: impl Into<String>) -> Self {
        self.deescalate_command = Some(command.into());
        self
    }

    /// Set the secret prompt shown while escalating.
    pub fn with_auth(mut self, prompt_pattern: &str) -> Result<Self, regex::Error> {
        self.escalate_prompt = Some(Regex::new(prompt_pattern)?);
        Ok(self)
    }

    /// Add a not_contains pattern.
    pub fn with_not_contains(mut self, pattern: impl Into<String>) -> Self {
        self.not_contains.push(pattern.into());
        self
    }

    /// Check if this privilege level matches a prompt.
    pub fn matches(&self, prompt: &str) -> bool {
        if self.not_contains.iter().any(|nc| prompt.contains(nc)) {
            return false;
        }
        self.pattern.is_match(prompt.as_bytes())
    }
}
