//! The result record accumulated during one run.

use std::fmt;

use serde::{Serialize, Serializer};

/// One data field of the result record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    SoftwareVersion,
    HardwareVersion,
    StartupConfig,
    RunningConfig,
    AccessLists,
    Interfaces,
    IpInterfaces,
}

impl Slot {
    /// Every slot, in report order.
    pub const ALL: [Slot; 7] = [
        Slot::SoftwareVersion,
        Slot::HardwareVersion,
        Slot::StartupConfig,
        Slot::RunningConfig,
        Slot::AccessLists,
        Slot::IpInterfaces,
        Slot::Interfaces,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Slot::SoftwareVersion => "software_version",
            Slot::HardwareVersion => "hardware_version",
            Slot::StartupConfig => "startup_config",
            Slot::RunningConfig => "running_config",
            Slot::AccessLists => "access_lists",
            Slot::Interfaces => "interfaces",
            Slot::IpInterfaces => "ip_interfaces",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything read from the device during one run.
///
/// Each slot starts unset and can be written once. Later writes to a slot
/// that already holds a value are refused.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultRecord {
    software_version: Option<String>,
    hardware_version: Option<String>,
    startup_config: Option<String>,
    running_config: Option<String>,
    access_lists: Option<String>,
    interfaces: Option<String>,
    ip_interfaces: Option<String>,
}

impl ResultRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut Option<String> {
        match slot {
            Slot::SoftwareVersion => &mut self.software_version,
            Slot::HardwareVersion => &mut self.hardware_version,
            Slot::StartupConfig => &mut self.startup_config,
            Slot::RunningConfig => &mut self.running_config,
            Slot::AccessLists => &mut self.access_lists,
            Slot::Interfaces => &mut self.interfaces,
            Slot::IpInterfaces => &mut self.ip_interfaces,
        }
    }

    /// Read a slot.
    pub fn get(&self, slot: Slot) -> Option<&str> {
        let value = match slot {
            Slot::SoftwareVersion => &self.software_version,
            Slot::HardwareVersion => &self.hardware_version,
            Slot::StartupConfig => &self.startup_config,
            Slot::RunningConfig => &self.running_config,
            Slot::AccessLists => &self.access_lists,
            Slot::Interfaces => &self.interfaces,
            Slot::IpInterfaces => &self.ip_interfaces,
        };
        value.as_deref()
    }

    /// Write a slot if it is still unset.
    ///
    /// Returns `false` and leaves the record untouched when the slot
    /// already holds a value.
    pub fn set(&mut self, slot: Slot, value: impl Into<String>) -> bool {
        let current = self.slot_mut(slot);
        if current.is_some() {
            return false;
        }
        *current = Some(value.into());
        true
    }

    /// Whether a slot has been written, empty or not.
    pub fn is_set(&self, slot: Slot) -> bool {
        self.get(slot).is_some()
    }

    pub fn software_version(&self) -> Option<&str> {
        self.software_version.as_deref()
    }

    pub fn hardware_version(&self) -> Option<&str> {
        self.hardware_version.as_deref()
    }

    pub fn startup_config(&self) -> Option<&str> {
        self.startup_config.as_deref()
    }

    pub fn running_config(&self) -> Option<&str> {
        self.running_config.as_deref()
    }

    pub fn access_lists(&self) -> Option<&str> {
        self.access_lists.as_deref()
    }

    pub fn interfaces(&self) -> Option<&str> {
        self.interfaces.as_deref()
    }

    pub fn ip_interfaces(&self) -> Option<&str> {
        self.ip_interfaces.as_deref()
    }

    /// Slots that are unset or hold only whitespace.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        Slot::ALL
            .iter()
            .filter(|slot| self.get(**slot).is_none_or(|v| v.trim().is_empty()))
            .map(Slot::name)
            .collect()
    }

    /// True only when all seven slots hold non-empty data.
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

/// Stored layout: version and config values nest under their own keys.
#[derive(Serialize)]
struct StoredRecord<'a> {
    sw_version: StoredVersion<'a>,
    sw_config: StoredConfig<'a>,
    sw_acl: Option<&'a str>,
    sw_interface: Option<&'a str>,
    sw_ip_interface: Option<&'a str>,
}

#[derive(Serialize)]
struct StoredVersion<'a> {
    soft_version: Option<&'a str>,
    hard_version: Option<&'a str>,
}

#[derive(Serialize)]
struct StoredConfig<'a> {
    start_config: Option<&'a str>,
    running_config: Option<&'a str>,
}

impl Serialize for ResultRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        StoredRecord {
            sw_version: StoredVersion {
                soft_version: self.software_version(),
                hard_version: self.hardware_version(),
            },
            sw_config: StoredConfig {
                start_config: self.startup_config(),
                running_config: self.running_config(),
            },
            sw_acl: self.access_lists(),
            sw_interface: self.interfaces(),
            sw_ip_interface: self.ip_interfaces(),
        }
        .serialize(serializer)
    }
}
