use std::fmt;

pub mod executor;

pub use executor::{ProcessExecutor, Running, Spawned, StageInput};

use crate::core::commands::ExitCode;

#[derive(Debug)]
pub enum ProcessError {
    CommandNotFound(String),
    PermissionDenied(String),
    Io(String, std::io::Error),
}

impl ProcessError {
    pub(crate) fn from_spawn(command: &str, e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::NotFound => ProcessError::CommandNotFound(command.to_string()),
            std::io::ErrorKind::PermissionDenied => {
                ProcessError::PermissionDenied(command.to_string())
            }
            _ => ProcessError::Io(command.to_string(), e),
        }
    }

    /// Status the shell reports for a command that never ran.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            ProcessError::CommandNotFound(_) => 127,
            ProcessError::PermissionDenied(_) => 126,
            ProcessError::Io(..) => 1,
        }
    }
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessError::CommandNotFound(cmd) => write!(f, "{}: command not found", cmd),
            ProcessError::PermissionDenied(cmd) => write!(f, "{}: Permission denied", cmd),
            ProcessError::Io(cmd, e) => write!(f, "{}: {}", cmd, e),
        }
    }
}

impl std::error::Error for ProcessError {}
