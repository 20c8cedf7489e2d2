//! Process exit codes.

use crate::error::Error;

/// Exit code constants.
pub mod codes {
    /// Run completed and the record was stored.
    pub const SUCCESS: u8 = 0;
    /// Connection parameters were invalid.
    pub const CONFIG_ERROR: u8 = 1;
    /// The device session could not be established.
    pub const CONNECTION_ERROR: u8 = 2;
    /// A command failed during collection.
    pub const COMMAND_ERROR: u8 = 3;
    /// Collected data was incomplete.
    pub const INCOMPLETE_DATA: u8 = 4;
    /// The record could not be written.
    pub const PERSIST_ERROR: u8 = 5;
}

/// Map an error to its exit code.
pub fn exit_code(error: &Error) -> u8 {
    match error {
        Error::Config(_) => codes::CONFIG_ERROR,
        Error::Connection(_) => codes::CONNECTION_ERROR,
        Error::Command(_) => codes::COMMAND_ERROR,
        Error::Incomplete(_) => codes::INCOMPLETE_DATA,
        Error::Persist(_) => codes::PERSIST_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{
        CommandError, CommandErrorKind, ConfigError, ConnectionError, ConnectionErrorKind,
        IncompleteDataError, PersistError,
    };

    #[test]
    fn test_exit_code_per_error() {
        let cases: Vec<(Error, u8)> = vec![
            (ConfigError::MissingField("host").into(), codes::CONFIG_ERROR),
            (
                ConnectionError::new(ConnectionErrorKind::AuthFailure, "denied").into(),
                codes::CONNECTION_ERROR,
            ),
            (
                CommandError::new("show version", CommandErrorKind::ReadTimeout, "slow").into(),
                codes::COMMAND_ERROR,
            ),
            (
                IncompleteDataError {
                    missing: vec!["interfaces"],
                }
                .into(),
                codes::INCOMPLETE_DATA,
            ),
            (
                PersistError::Io(std::io::Error::other("disk full")).into(),
                codes::PERSIST_ERROR,
            ),
        ];
        for (error, code) in cases {
            assert_eq!(exit_code(&error), code, "{error}");
        }
    }

    #[test]
    fn test_codes_are_distinct() {
        let all = [
            codes::SUCCESS,
            codes::CONFIG_ERROR,
            codes::CONNECTION_ERROR,
            codes::COMMAND_ERROR,
            codes::INCOMPLETE_DATA,
            codes::PERSIST_ERROR,
        ];
        for (i, a) in all.iter().enumerate() {
            assert!(all[i + 1..].iter().all(|b| a != b));
        }
    }
}
