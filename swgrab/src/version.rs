//! Software and hardware version extraction from `show version` output.

use once_cell::sync::Lazy;
use regex::Regex;

/// Vendor token through the image release marker, e.g.
/// `Cisco IOS Software, ... RELEASE SOFTWARE (fc2)`.
static SOFTWARE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Cisco\b.*\bfc\d+\)?").expect("valid software pattern"));

/// Vendor token through the memory description, e.g.
/// `cisco WS-C2960-24TT-L (PowerPC405) processor ... with 65536K bytes of memory.`
static HARDWARE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)cisco\b.*\bmemory\.?").expect("valid hardware pattern"));

/// Versions parsed from one banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    pub software: String,
    pub hardware: String,
}

/// Extract both versions from `show version` output.
///
/// Returns `None` unless both patterns match; a banner that yields only
/// one of them is treated as unrecognised. Matches never span lines, and
/// the first matching line wins.
pub fn extract_version(text: &str) -> Option<VersionInfo> {
    let software = SOFTWARE_PATTERN.find(text)?;
    let hardware = HARDWARE_PATTERN.find(text)?;
    Some(VersionInfo {
        software: software.as_str().trim().to_string(),
        hardware: hardware.as_str().trim().to_string(),
    })
}
