//! Cisco IOS platform definition.
//!
//! Privilege levels:
//! - `exec` - User EXEC mode with `>` prompt
//! - `privilege_exec` - Privileged EXEC mode with `#` prompt
//! - `configuration` - Configuration mode with `(config*)#` prompt
//!
//! # Prompt Examples
//!
//! ```text
//! Switch>                            # exec mode
//! Switch#                            # privilege_exec mode
//! Switch(config)#                    # configuration mode
//! Switch(config-if)#                 # config sub-mode (interface)
//! ```
//!
//! # Privilege Graph
//!
//! ```text
//! ┌──────┐  enable     ┌────────────────┐                      ┌───────────────┐
//! │ exec ├──────────────► privilege_exec │                      │ configuration │
//! │  >   │   disable   │       #        │        end           │  (config*)#   │
//! └──────┘◄────────────┴────────────────┘◄─────────────────────┴───────────────┘
//! ```
//!
//! Configuration mode has no way in. It is only recognised so that a line
//! left in `(config)#` by a previous user can be walked back down with `end`.
//!
//! Prompts are anchored to the very end of the output so that `>` or `#`
//! inside command output never ends a read early.

use crate::platform::{PlatformDefinition, PrivilegeLevel};

/// Create the Cisco IOS platform definition.
pub fn platform() -> PlatformDefinition {
    let exec = PrivilegeLevel::new("exec", r"(?m)^[\w.\-@()/:]{1,63}>\s*\z").unwrap();

    // "(config" keeps configuration prompts out of this level
    let privilege_exec = PrivilegeLevel::new("privilege_exec", r"(?m)^[\w.\-@()/:]{1,63}#\s*\z")
        .unwrap()
        .with_escalate("enable")
        .with_deescalate("disable")
        .with_auth(r"(?i)password\s*:\s*\z")
        .unwrap()
        .with_not_contains("(config");

    let configuration = PrivilegeLevel::new(
        "configuration",
        r"(?m)^[\w.\-@/:]{1,63}\(config[\w.\-@/:+]{0,32}\)#\s*\z",
    )
    .unwrap()
    .with_deescalate("end");

    PlatformDefinition::new("cisco_ios")
        .with_privilege(exec)
        .with_privilege(privilege_exec)
        .with_privilege(configuration)
        .with_default_privilege("privilege_exec")
        .with_failure_pattern("% Ambiguous command")
        .with_failure_pattern("% Incomplete command")
        .with_failure_pattern("% Invalid input detected")
        .with_failure_pattern("% Unknown command")
        .with_on_open_command("terminal length 0")
        .with_on_open_command("terminal width 511")
        .with_on_close_command("exit")
        .with_terminal_size(511, 24)
}
