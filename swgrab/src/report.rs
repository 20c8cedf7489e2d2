//! Fixed-width text report of a result record.

use log::info;

use crate::record::{ResultRecord, Slot};

/// Inner width of the report box.
pub const REPORT_WIDTH: usize = 120;

/// Last titled row of the report.
const CLOSING_TITLE: &str = "Thanks for the interesting challenge!";

/// Report sections in output order.
const SECTIONS: [(&str, &[Slot]); 6] = [
    (
        "Switch software and hardware version:",
        &[Slot::SoftwareVersion, Slot::HardwareVersion],
    ),
    ("Contents of startup configuration:", &[Slot::StartupConfig]),
    ("Current operating configuration:", &[Slot::RunningConfig]),
    ("List access lists:", &[Slot::AccessLists]),
    ("IP interface status and configuration:", &[Slot::IpInterfaces]),
    ("Interface status and configuration:", &[Slot::Interfaces]),
];

/// Receives the final record for display.
pub trait Reporter {
    fn report(&mut self, record: &ResultRecord);
}

/// Writes the rendered report to the info log.
#[derive(Debug, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&mut self, record: &ResultRecord) {
        info!("\n{}", render(record));
    }
}

/// Render the record as a bordered block.
///
/// Blank lines are skipped; lines wider than the box wrap onto the next row.
pub fn render(record: &ResultRecord) -> String {
    let mut out = String::new();
    border(&mut out);
    title(&mut out, "SWITCH OUT DATA");
    border(&mut out);

    for (heading, slots) in SECTIONS {
        title(&mut out, heading);
        border(&mut out);
        for slot in slots {
            for line in record.get(*slot).unwrap_or_default().lines() {
                text(&mut out, line.trim_end());
            }
        }
        border(&mut out);
    }

    title(&mut out, CLOSING_TITLE);
    out.push('+');
    out.push_str(&"-".repeat(REPORT_WIDTH));
    out.push('+');
    out
}

fn border(out: &mut String) {
    out.push('+');
    out.push_str(&"-".repeat(REPORT_WIDTH));
    out.push_str("+\n");
}

fn title(out: &mut String, name: &str) {
    out.push_str(&format!("|{name:^width$}|\n", width = REPORT_WIDTH));
}

fn text(out: &mut String, line: &str) {
    if line.trim().is_empty() {
        return;
    }
    let chars: Vec<char> = line.chars().collect();
    for chunk in chars.chunks(REPORT_WIDTH) {
        let row: String = chunk.iter().collect();
        out.push_str(&format!("|{row:<width$}|\n", width = REPORT_WIDTH));
    }
}
