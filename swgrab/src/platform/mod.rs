//! Platform definitions: prompts, privilege levels and session setup.

mod definition;
mod privilege_level;
pub mod vendors;

pub use definition::PlatformDefinition;
pub use privilege_level::PrivilegeLevel;

use crate::params::DeviceType;

/// Platform definition for a device type.
pub fn for_device(device_type: DeviceType) -> PlatformDefinition {
    match device_type {
        DeviceType::CiscoIos | DeviceType::CiscoIosTelnet => vendors::cisco_ios::platform(),
    }
}
