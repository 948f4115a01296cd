use std::{fmt, path::Path};

mod loader;
mod paths;

use crate::flags::Flags;
use loader::ConfigLoader;
pub use paths::{ConfigPaths, HISTORY_FILE, RC_FILE};

/// Startup configuration: where the rc file and the history live, and
/// whether the rc file is read at all.
#[derive(Debug, Clone)]
pub struct Config {
    paths: ConfigPaths,
    load_rc: bool,
}

impl Config {
    pub fn new(flags: &Flags) -> Result<Self, ConfigError> {
        Ok(Self::from_flags(ConfigPaths::new()?, flags))
    }

    /// Applies `--rcfile` and `--norc` on top of `paths`.
    pub fn from_flags(paths: ConfigPaths, flags: &Flags) -> Self {
        let paths = match flags.get_value("rcfile") {
            Some(rcfile) => paths.with_rc_path(rcfile, true),
            None => paths,
        };

        Config {
            paths,
            load_rc: !flags.is_set("norc"),
        }
    }

    pub fn from_paths(paths: ConfigPaths, load_rc: bool) -> Self {
        Config { paths, load_rc }
    }

    pub fn history_path(&self) -> &Path {
        &self.paths.history_path
    }

    /// Lines of the rc file that should be run, in file order.
    pub fn startup_commands(&self) -> Result<Vec<String>, ConfigError> {
        if !self.load_rc {
            return Ok(Vec::new());
        }
        ConfigLoader::new(&self.paths).load_commands()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    HomeDirNotFound,
    ConfigFileNotFound(String),
    IoError(std::io::Error),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::IoError(e)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::HomeDirNotFound => write!(f, "Home directory not found"),
            ConfigError::ConfigFileNotFound(path) => write!(f, "Config file not found: {}", path),
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}
