//! The fixed, ordered command table.
//!
//! Each entry pairs the text sent to the device with the place its output
//! lands in the [`ResultRecord`](crate::record::ResultRecord). Commands are
//! issued in table order on one session.

use crate::record::Slot;

/// Where a command's output is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Parsed by the version extractor into the two version slots.
    Version,
    /// Stored verbatim (trimmed) in one slot.
    Text(Slot),
}

impl Target {
    /// Slots this target writes.
    pub fn slots(&self) -> &'static [Slot] {
        match self {
            Target::Version => &[Slot::SoftwareVersion, Slot::HardwareVersion],
            Target::Text(Slot::StartupConfig) => &[Slot::StartupConfig],
            Target::Text(Slot::RunningConfig) => &[Slot::RunningConfig],
            Target::Text(Slot::AccessLists) => &[Slot::AccessLists],
            Target::Text(Slot::IpInterfaces) => &[Slot::IpInterfaces],
            Target::Text(Slot::Interfaces) => &[Slot::Interfaces],
            Target::Text(Slot::SoftwareVersion) => &[Slot::SoftwareVersion],
            Target::Text(Slot::HardwareVersion) => &[Slot::HardwareVersion],
        }
    }
}

/// A command and the destination of its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandDescriptor {
    pub command: &'static str,
    pub target: Target,
}

/// Commands sent to the device, in order.
pub const COMMANDS: [CommandDescriptor; 6] = [
    CommandDescriptor {
        command: "show version",
        target: Target::Version,
    },
    CommandDescriptor {
        command: "show startup-config",
        target: Target::Text(Slot::StartupConfig),
    },
    CommandDescriptor {
        command: "show running-config",
        target: Target::Text(Slot::RunningConfig),
    },
    CommandDescriptor {
        command: "show access-lists",
        target: Target::Text(Slot::AccessLists),
    },
    CommandDescriptor {
        command: "show ip interface brief",
        target: Target::Text(Slot::IpInterfaces),
    },
    CommandDescriptor {
        command: "show interfaces",
        target: Target::Text(Slot::Interfaces),
    },
];

/// Look up the descriptor for a command text.
pub fn lookup(command: &str) -> Option<&'static CommandDescriptor> {
    COMMANDS.iter().find(|d| d.command == command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_order() {
        let order: Vec<&str> = COMMANDS.iter().map(|d| d.command).collect();
        assert_eq!(
            order,
            vec![
                "show version",
                "show startup-config",
                "show running-config",
                "show access-lists",
                "show ip interface brief",
                "show interfaces",
            ]
        );
    }

    #[test]
    fn test_every_slot_written_by_exactly_one_command() {
        for slot in Slot::ALL {
            let writers = COMMANDS
                .iter()
                .filter(|d| d.target.slots().contains(&slot))
                .count();
            assert_eq!(writers, 1, "{slot} has {writers} writers");
        }
    }

    #[test]
    fn test_commands_are_unique() {
        for (i, d) in COMMANDS.iter().enumerate() {
            assert!(
                COMMANDS[i + 1..].iter().all(|o| o.command != d.command),
                "duplicate command {}",
                d.command
            );
        }
    }

    #[test]
    fn test_lookup() {
        assert_eq!(lookup("show version").unwrap().target, Target::Version);
        assert_eq!(
            lookup("show interfaces").unwrap().target,
            Target::Text(Slot::Interfaces)
        );
        assert!(lookup("show clock").is_none());
        assert!(lookup("SHOW VERSION").is_none());
    }
}
