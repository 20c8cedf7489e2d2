//! Platform definition for a device CLI family.

use indexmap::IndexMap;
use regex::bytes::Regex;

use super::privilege_level::PrivilegeLevel;

/// Everything the driver needs to know about a CLI family.
#[derive(Debug, Clone)]
pub struct PlatformDefinition {
    /// Platform name (e.g., "cisco_ios").
    pub name: String,

    /// Privilege levels, least privileged first.
    pub privilege_levels: IndexMap<String, PrivilegeLevel>,

    /// Level the driver moves to after login.
    pub default_privilege: String,

    /// Output fragments that mean the device rejected a command.
    pub failed_when_contains: Vec<String>,

    /// Commands to run when the session is established.
    pub on_open_commands: Vec<String>,

    /// Commands to run before the session is closed.
    pub on_close_commands: Vec<String>,

    /// Telnet username prompt.
    pub login_prompt: Regex,

    /// Telnet password prompt.
    pub password_prompt: Regex,

    /// Terminal width for PTY.
    pub terminal_width: u32,

    /// Terminal height for PTY.
    pub terminal_height: u32,
}

impl PlatformDefinition {
    /// Create a new platform definition with generic login prompts.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            privilege_levels: IndexMap::new(),
            default_privilege: String::new(),
            failed_when_contains: vec![],
            on_open_commands: vec![],
            on_close_commands: vec![],
            login_prompt: Regex::new(r"(?i)(?:user ?name|login)\s*:\s*\z").expect("valid login prompt"),
            password_prompt: Regex::new(r"(?i)password\s*:\s*\z").expect("valid password prompt"),
            terminal_width: 511,
            terminal_height: 24,
        }
    }

    /// Add a privilege level above the ones already defined.
    pub fn with_privilege(mut self, level: PrivilegeLevel) -> Self {
        self.privilege_levels.insert(level.name.clone(), level);
        self
    }

    /// Set the default privilege level.
    pub fn with_default_privilege(mut self, name: impl Into<String>) -> Self {
        self.default_privilege = name.into();
        self
    }

    /// Add a failure pattern.
    pub fn with_failure_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.failed_when_contains.push(pattern.into());
        self
    }

    /// Add an on_open command.
    pub fn with_on_open_command(mut self, command: impl Into<String>) -> Self {
        self.on_open_commands.push(command.into());
        self
    }

    /// Add an on_close command.
    pub fn with_on_close_command(mut self, command: impl Into<String>) -> Self {
        self.on_close_commands.push(command.into());
        self
    }

    /// Set terminal dimensions.
    pub fn with_terminal_size(mut self, width: u32, height: u32) -> Self {
        self.terminal_width = width;
        self.terminal_height = height;
        self
    }

    /// Get a privilege level by name.
    pub fn get_privilege(&self, name: &str) -> Option<&PrivilegeLevel> {
        self.privilege_levels.get(name)
    }

    /// Position of a level in the escalation order.
    pub fn privilege_index(&self, name: &str) -> Option<usize> {
        self.privilege_levels.get_index_of(name)
    }

    /// Regex matching the prompt of any privilege level.
    pub fn prompt_pattern(&self) -> Result<Regex, regex::Error> {
        let combined = self
            .privilege_levels
            .values()
            .map(|level| format!("(?:{})", level.pattern.as_str()))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&combined)
    }

    /// Find the privilege level a prompt belongs to.
    pub fn determine_privilege(&self, prompt: &str) -> Option<&PrivilegeLevel> {
        self.privilege_levels.values().find(|level| level.matches(prompt))
    }

    /// Strip the command echo and the trailing prompt line from raw output.
    pub fn normalize_output(&self, raw: &str, command: &str) -> String {
        let output = raw.trim_start_matches(['\r', '\n']);
        let output = output
            .strip_prefix(command)
            .unwrap_or(output)
            .trim_start_matches(['\r', '\n']);

        // The last line is always the prompt
        match output.rfind('\n') {
            Some(pos) => output[..pos].to_string(),
            None => String::new(),
        }
    }

    /// First failure pattern found in the output.
    pub fn detect_failure(&self, output: &str) -> Option<&str> {
        self.failed_when_contains
            .iter()
            .find(|pattern| output.contains(pattern.as_str()))
            .map(String::as_str)
    }
}
