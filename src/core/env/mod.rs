mod level;
mod vars;

pub use level::{increment_shell_level, SHLVL_PREFIX};
pub use vars::{is_valid_name, split_entry, Environment};

use std::collections::TryReserveError;

#[derive(Debug)]
pub enum EnvError {
    InvalidName(String),
    Allocation(TryReserveError),
}

impl std::fmt::Display for EnvError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnvError::InvalidName(name) => write!(f, "`{}': not a valid identifier", name),
            EnvError::Allocation(e) => write!(f, "cannot allocate environment entry: {}", e),
        }
    }
}

impl std::error::Error for EnvError {}

impl From<TryReserveError> for EnvError {
    fn from(e: TryReserveError) -> Self {
        EnvError::Allocation(e)
    }
}
