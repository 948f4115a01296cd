use std::{fs, path::Path};

use super::{ConfigError, ConfigPaths};
use tracing::debug;

pub struct ConfigLoader<'a> {
    paths: &'a ConfigPaths,
}

impl<'a> ConfigLoader<'a> {
    pub fn new(paths: &'a ConfigPaths) -> Self {
        Self { paths }
    }

    pub fn load_commands(&self) -> Result<Vec<String>, ConfigError> {
        let path = &self.paths.rc_path;
        if !path.exists() {
            if self.paths.rc_required {
                return Err(ConfigError::ConfigFileNotFound(path.display().to_string()));
            }
            debug!(path = %path.display(), "no rc file");
            return Ok(Vec::new());
        }
        self.source(path)
    }

    fn source(&self, path: &Path) -> Result<Vec<String>, ConfigError> {
        let content = fs::read_to_string(path)?;
        let commands: Vec<String> = content.lines().filter_map(process_line).collect();
        debug!(path = %path.display(), count = commands.len(), "loaded rc file");
        Ok(commands)
    }
}

/// Blank lines and `#` comments are skipped.
fn process_line(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    Some(line.to_string())
}
