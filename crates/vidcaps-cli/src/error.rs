// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

use std::fmt;
use std::process::ExitCode;

/// CLI-specific error type with exit code mapping
///
/// The tool defines two exit codes: 0 for a completed run (including the
/// "no camera found" case) and 1 for fatal failures. The dominant fatal case
/// is the missing capability-query backend, which aborts before any device
/// work starts.
#[derive(Debug)]
pub enum CliError {
    /// The v4l2-ctl backend is not installed or not on PATH
    BackendNotFound,
    /// General fatal error (unreadable device namespace, output failure)
    General(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::BackendNotFound => write!(
                f,
                "ERROR: `v4l2-ctl` not found in PATH.\n\
                 Install `v4l-utils` (e.g. `sudo apt-get install v4l-utils`) \
                 to use this inspection tool."
            ),
            CliError::General(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            CliError::BackendNotFound => ExitCode::from(1),
            CliError::General(_) => ExitCode::from(1),
        }
    }
}

/// Map vidcaps::Error to CliError
impl From<vidcaps::Error> for CliError {
    fn from(err: vidcaps::Error) -> Self {
        match err {
            vidcaps::Error::BackendNotFound => CliError::BackendNotFound,
            vidcaps::Error::Spawn { .. } | vidcaps::Error::Io(_) => {
                CliError::General(err.to_string())
            }
        }
    }
}

/// Helper function to convert result to exit code
pub fn result_to_exit_code<T>(result: Result<T, CliError>) -> ExitCode {
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            e.exit_code()
        }
    }
}
