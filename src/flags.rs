use crate::error::ShellError;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct Flags {
    flags: BTreeMap<String, Flag>,
}

#[derive(Debug, Clone)]
pub struct Flag {
    pub short: Option<String>,
    pub long: String,
    pub description: String,
    pub takes_value: bool,
    pub value: Option<String>,
}

impl Flag {
    fn new(short: Option<&str>, long: &str, description: &str, takes_value: bool) -> Self {
        Self {
            short: short.map(String::from),
            long: long.to_string(),
            description: description.to_string(),
            takes_value,
            value: None,
        }
    }

    fn matches(&self, arg: &str) -> bool {
        arg == self.long || self.short.as_deref() == Some(arg)
    }
}

impl Default for Flags {
    fn default() -> Self {
        Self::new()
    }
}

impl Flags {
    pub fn new() -> Self {
        let table = [
            ("help", Flag::new(Some("-h"), "--help", "Print this help message", false)),
            ("version", Flag::new(Some("-v"), "--version", "Show version information", false)),
            ("quiet", Flag::new(Some("-q"), "--quiet", "Suppress shell diagnostics", false)),
            ("debug", Flag::new(Some("-d"), "--debug", "Enable debug logging", false)),
            ("command", Flag::new(Some("-c"), "--command", "Run COMMAND and exit", true)),
            ("rcfile", Flag::new(Some("-r"), "--rcfile", "Read startup commands from PATH", true)),
            ("norc", Flag::new(None, "--norc", "Do not read a startup file", false)),
        ];

        Flags {
            flags: table
                .into_iter()
                .map(|(name, flag)| (name.to_string(), flag))
                .collect(),
        }
    }

    pub fn parse(&mut self, args: &[String]) -> Result<(), ShellError> {
        let mut i = 0;
        while i < args.len() {
            let arg = &args[i];
            let flag = self
                .flags
                .values_mut()
                .find(|flag| flag.matches(arg))
                .ok_or_else(|| ShellError::FlagError(format!("Unknown flag {}", arg)))?;

            if flag.takes_value {
                let value = args.get(i + 1).ok_or_else(|| {
                    ShellError::FlagError(format!("Flag {} requires a value", arg))
                })?;
                flag.value = Some(value.clone());
                i += 1;
            } else {
                flag.value = Some("true".to_string());
            }
            i += 1;
        }
        Ok(())
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.flags
            .get(name)
            .and_then(|f| f.value.as_ref())
            .is_some()
    }

    pub fn get_value(&self, name: &str) -> Option<&String> {
        self.flags.get(name).and_then(|f| f.value.as_ref())
    }

    pub fn print_help(&self) {
        println!("Usage: conch [OPTIONS]");
        println!("\nOptions:");
        for flag in self.flags.values() {
            let short = flag.short.as_deref().unwrap_or("  ");
            let long = if flag.takes_value {
                format!("{} <VALUE>", flag.long)
            } else {
                flag.long.clone()
            };
            println!("  {}, {:<20} {}", short, long, flag.description);
        }
    }
}
