//! Routing of command output into the result record.

use log::{debug, warn};

use crate::command::{self, CommandDescriptor, Target};
use crate::record::{ResultRecord, Slot};
use crate::version::extract_version;

/// Store one command's output in the slot(s) its descriptor names.
///
/// Version output goes through the extractor; when the banner is not
/// recognised both version slots stay unset. Any other output is stored
/// trimmed but otherwise untouched.
pub fn classify(record: &mut ResultRecord, descriptor: &CommandDescriptor, raw: &str) {
    match descriptor.target {
        Target::Version => match extract_version(raw) {
            Some(info) => {
                store(record, descriptor, Slot::SoftwareVersion, info.software);
                store(record, descriptor, Slot::HardwareVersion, info.hardware);
            }
            None => warn!(
                "'{}': version banner not recognised, versions left empty",
                descriptor.command
            ),
        },
        Target::Text(slot) => store(record, descriptor, slot, raw.trim().to_string()),
    }
}

/// Classify output by command text.
///
/// Returns `false` for commands outside the command table; those are never
/// issued, so this only happens on a programming error.
pub fn classify_command(record: &mut ResultRecord, command: &str, raw: &str) -> bool {
    match command::lookup(command) {
        Some(descriptor) => {
            classify(record, descriptor, raw);
            true
        }
        None => {
            debug_assert!(false, "command '{command}' is not in the command table");
            false
        }
    }
}

fn store(record: &mut ResultRecord, descriptor: &CommandDescriptor, slot: Slot, value: String) {
    let len = value.len();
    if record.set(slot, value) {
        debug!("'{}' -> {} ({} bytes)", descriptor.command, slot, len);
    } else {
        warn!(
            "'{}': {} already set, keeping the first value",
            descriptor.command, slot
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::COMMANDS;

    const VERSION: &str = "Cisco IOS Software, Version 12.2(55)SE7, RELEASE SOFTWARE (fc1)\n\
cisco WS-C2960-24TT-L (PowerPC405) processor with 65536K bytes of memory.\n";

    #[test]
    fn test_text_output_is_trimmed_only() {
        let mut record = ResultRecord::new();
        let raw = "\n  Standard IP access list 10\n    10 permit 10.0.0.0, wildcard bits 0.0.0.255\n\n";
        assert!(classify_command(&mut record, "show access-lists", raw));
        assert_eq!(
            record.access_lists(),
            Some("Standard IP access list 10\n    10 permit 10.0.0.0, wildcard bits 0.0.0.255")
        );
    }

    #[test]
    fn test_each_text_command_lands_in_its_slot() {
        let mut record = ResultRecord::new();
        for descriptor in COMMANDS.iter().skip(1) {
            classify(&mut record, descriptor, descriptor.command);
        }
        assert_eq!(record.startup_config(), Some("show startup-config"));
        assert_eq!(record.running_config(), Some("show running-config"));
        assert_eq!(record.access_lists(), Some("show access-lists"));
        assert_eq!(record.ip_interfaces(), Some("show ip interface brief"));
        assert_eq!(record.interfaces(), Some("show interfaces"));
        assert!(record.software_version().is_none());
    }

    #[test]
    fn test_version_output_fills_both_slots() {
        let mut record = ResultRecord::new();
        classify_command(&mut record, "show version", VERSION);
        assert!(record.software_version().unwrap().ends_with("(fc1)"));
        assert!(record.hardware_version().unwrap().ends_with("memory."));
    }

    #[test]
    fn test_unrecognised_version_leaves_both_empty() {
        let mut record = ResultRecord::new();
        classify_command(
            &mut record,
            "show version",
            "Cisco IOS Software, Version 12.2(55)SE7, RELEASE SOFTWARE (fc1)\n",
        );
        assert!(record.software_version().is_none());
        assert!(record.hardware_version().is_none());
    }

    #[test]
    fn test_empty_output_is_stored_as_empty() {
        let mut record = ResultRecord::new();
        classify_command(&mut record, "show access-lists", "  \n");
        assert_eq!(record.access_lists(), Some(""));
        assert!(record.missing_fields().contains(&"access_lists"));
    }

    #[test]
    fn test_second_write_is_ignored() {
        let mut record = ResultRecord::new();
        classify_command(&mut record, "show interfaces", "first");
        classify_command(&mut record, "show interfaces", "second");
        assert_eq!(record.interfaces(), Some("first"));
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn test_unknown_command_is_not_classified() {
        let mut record = ResultRecord::new();
        assert!(!classify_command(&mut record, "show clock", "12:00:00"));
        assert_eq!(record, ResultRecord::new());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "not in the command table")]
    fn test_unknown_command_is_not_classified() {
        let mut record = ResultRecord::new();
        classify_command(&mut record, "show clock", "12:00:00");
    }
}
