use super::EnvError;
use std::env;
use tracing::debug;

/// Ordered `NAME=VALUE` vector owned by the shell state.
///
/// Names are unique; replacing a value keeps the entry where it was, so
/// listings come out in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Environment {
    entries: Vec<String>,
}

/// Splits an entry at its first `=`. An entry without `=` is all name.
pub fn split_entry(entry: &str) -> (&str, &str) {
    entry.split_once('=').unwrap_or((entry, ""))
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn compose_entry(name: &str, value: &str) -> Result<String, EnvError> {
    let mut entry = String::new();
    entry.try_reserve_exact(name.len() + 1 + value.len())?;
    entry.push_str(name);
    entry.push('=');
    entry.push_str(value);
    Ok(entry)
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the process environment. Entries that are not valid
    /// unicode are skipped.
    pub fn from_process() -> Self {
        Self::from_entries(env::vars_os().filter_map(|(key, value)| {
            match (key.into_string(), value.into_string()) {
                (Ok(key), Ok(value)) => Some(format!("{}={}", key, value)),
                (key, _) => {
                    debug!(name = ?key, "skipping non-unicode environment entry");
                    None
                }
            }
        }))
    }

    /// Builds from raw entries; a later duplicate name overwrites the earlier
    /// value in place.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut environment = Self::new();
        for entry in entries {
            let entry = entry.into();
            let (name, _) = split_entry(&entry);
            match environment.position(name) {
                Some(index) => environment.entries[index] = entry,
                None => environment.entries.push(entry),
            }
        }
        environment
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| split_entry(entry).0 == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|entry| split_entry(entry))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name)
            .map(|index| split_entry(&self.entries[index]).1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Sets `name` to `value`, replacing an existing entry in place.
    ///
    /// The new entry is fully built before the old one is touched, so on
    /// failure the environment is unchanged.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), EnvError> {
        if !is_valid_name(name) {
            return Err(EnvError::InvalidName(name.to_string()));
        }

        let entry = compose_entry(name, value)?;
        match self.position(name) {
            Some(index) => self.entries[index] = entry,
            None => {
                self.entries.try_reserve(1)?;
                self.entries.push(entry);
            }
        }
        Ok(())
    }

    /// Removes the entry for `name`. Returns whether one existed.
    pub fn unset(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Replaces the value of the first entry starting with `prefix`
    /// (e.g. `"SHLVL="`). The replacement buffer is consumed either way.
    pub fn find_and_replace(&mut self, prefix: &str, value: String) -> Result<bool, EnvError> {
        let Some(index) = self.entries.iter().position(|entry| entry.starts_with(prefix)) else {
            return Ok(false);
        };

        let mut entry = String::new();
        entry.try_reserve_exact(prefix.len() + value.len())?;
        entry.push_str(prefix);
        entry.push_str(&value);
        self.entries[index] = entry;
        Ok(true)
    }

    pub fn into_entries(self) -> Vec<String> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Environment {
        Environment::from_entries(["HOME=/home/test", "PATH=/usr/bin", "EMPTY="])
    }

    #[test]
    fn test_get_and_contains() {
        let environment = sample();
        assert_eq!(environment.get("HOME"), Some("/home/test"));
        assert_eq!(environment.get("EMPTY"), Some(""));
        assert_eq!(environment.get("HOM"), None);
        assert!(environment.contains("PATH"));
        assert!(!environment.contains("PATH="));
    }

    #[test]
    fn test_set_replaces_in_place() -> Result<(), EnvError> {
        let mut environment = sample();
        environment.set("HOME", "/root")?;
        environment.set("NEW", "value")?;

        let entries: Vec<&str> = environment.iter().collect();
        assert_eq!(entries, ["HOME=/root", "PATH=/usr/bin", "EMPTY=", "NEW=value"]);
        Ok(())
    }

    #[test]
    fn test_set_rejects_invalid_names() {
        let mut environment = sample();
        assert!(matches!(environment.set("", "x"), Err(EnvError::InvalidName(_))));
        assert!(matches!(environment.set("1ABC", "x"), Err(EnvError::InvalidName(_))));
        assert!(matches!(environment.set("A-B", "x"), Err(EnvError::InvalidName(_))));
        assert_eq!(environment, sample());
    }

    #[test]
    fn test_value_keeps_extra_equals() -> Result<(), EnvError> {
        let mut environment = Environment::new();
        environment.set("OPTS", "a=b=c")?;
        assert_eq!(environment.get("OPTS"), Some("a=b=c"));
        assert_eq!(environment.iter().next(), Some("OPTS=a=b=c"));
        Ok(())
    }

    #[test]
    fn test_unset_removes_only_target() {
        let mut environment = sample();
        assert!(environment.unset("PATH"));
        assert!(!environment.unset("PATH"));

        let entries: Vec<&str> = environment.iter().collect();
        assert_eq!(entries, ["HOME=/home/test", "EMPTY="]);
    }

    #[test]
    fn test_from_entries_deduplicates() {
        let environment = Environment::from_entries(["A=1", "B=2", "A=3"]);
        let entries: Vec<&str> = environment.iter().collect();
        assert_eq!(entries, ["A=3", "B=2"]);
    }

    #[test]
    fn test_find_and_replace() -> Result<(), EnvError> {
        let mut environment = Environment::from_entries(["SHLVL=1", "SHLVLX=9"]);
        assert!(environment.find_and_replace("SHLVL=", "2".to_string())?);
        assert_eq!(environment.get("SHLVL"), Some("2"));
        assert_eq!(environment.get("SHLVLX"), Some("9"));

        assert!(!environment.find_and_replace("MISSING=", "x".to_string())?);
        assert_eq!(environment.len(), 2);
        Ok(())
    }

    #[test]
    fn test_valid_names() {
        assert!(is_valid_name("_"));
        assert!(is_valid_name("PATH"));
        assert!(is_valid_name("a1_b2"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("9lives"));
        assert!(!is_valid_name("with space"));
    }

    #[cfg(unix)]
    #[test]
    fn test_from_process_skips_non_unicode() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        env::set_var("CONCH_TEST_BAD_VALUE", OsStr::from_bytes(b"\xff\xfe"));
        env::set_var("CONCH_TEST_GOOD_VALUE", "fine");
        let environment = Environment::from_process();
        env::remove_var("CONCH_TEST_BAD_VALUE");
        env::remove_var("CONCH_TEST_GOOD_VALUE");

        assert!(!environment.contains("CONCH_TEST_BAD_VALUE"));
        assert_eq!(environment.get("CONCH_TEST_GOOD_VALUE"), Some("fine"));
    }
}
