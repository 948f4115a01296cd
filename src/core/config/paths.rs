use super::ConfigError;
use std::path::{Path, PathBuf};

pub const RC_FILE: &str = ".conchrc";
pub const HISTORY_FILE: &str = ".conch_history";

#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub rc_path: PathBuf,
    pub history_path: PathBuf,
    /// Set when the rc path was asked for explicitly, so a missing file is an error.
    pub rc_required: bool,
}

impl ConfigPaths {
    pub fn new() -> Result<Self, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeDirNotFound)?;
        Ok(Self::from_home(&home))
    }

    pub fn from_home(home: &Path) -> Self {
        ConfigPaths {
            rc_path: home.join(RC_FILE),
            history_path: home.join(HISTORY_FILE),
            rc_required: false,
        }
    }

    pub fn with_rc_path(mut self, path: impl Into<PathBuf>, required: bool) -> Self {
        self.rc_path = path.into();
        self.rc_required = required;
        self
    }
}
