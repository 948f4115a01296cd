use std::env;
use std::io::{self, Write};
use std::path::PathBuf;

use rustyline::{error::ReadlineError, DefaultEditor};
use tracing::{debug, info, warn};

mod executor;

pub use executor::{execute_line, EXIT_SYNTAX};

use crate::{
    core::{
        commands::{CommandExecutor, ExitCode},
        config::Config,
        env::{increment_shell_level, Environment},
        lifecycle::release_all,
        state::ShellState,
    },
    error::ShellError,
    flags::Flags,
    highlight::SyntaxHighlighter,
};

use executor::CommandHandler;

pub struct Shell {
    pub(crate) editor: DefaultEditor,
    pub(crate) state: Option<ShellState>,
    pub(crate) executor: CommandExecutor,
    pub(crate) highlighter: SyntaxHighlighter,
    pub(crate) history_path: Option<PathBuf>,
    pub(crate) flags: Flags,
}

/// Builds the long-lived state: the inherited environment with SHLVL bumped,
/// then every rc line run against it.
fn bootstrap(flags: &Flags, executor: &CommandExecutor) -> Result<(ShellState, Option<Config>), ShellError> {
    let mut state = ShellState::new(Environment::from_process());
    let level = increment_shell_level(state.environment_mut())?;
    debug!(level, "shell level");

    let config = match Config::new(flags) {
        Ok(config) => Some(config),
        Err(e) if flags.get_value("rcfile").is_none() => {
            warn!("skipping startup file: {}", e);
            None
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(config) = &config {
        let stdout = io::stdout();
        let stderr = io::stderr();
        for line in config.startup_commands()? {
            execute_line(&mut state, executor, line, &mut stdout.lock(), &mut stderr.lock());
        }
    }
    Ok((state, config))
}

/// Runs a single line the way `-c` does and returns its status.
pub fn run_once(flags: &Flags, line: String) -> Result<ExitCode, ShellError> {
    let executor = CommandExecutor::new(flags);
    let (mut state, _) = bootstrap(flags, &executor)?;

    let status = {
        let stdout = io::stdout();
        let stderr = io::stderr();
        execute_line(&mut state, &executor, line, &mut stdout.lock(), &mut stderr.lock())
    };
    let released = release_all(&mut Some(state));
    debug!(?released, "released");
    io::stdout().flush()?;
    Ok(status)
}

impl Shell {
    pub fn new(flags: Flags) -> Result<Self, ShellError> {
        let mut editor = DefaultEditor::new()?;
        let executor = CommandExecutor::new(&flags);
        let (state, config) = bootstrap(&flags, &executor)?;

        let history_path = config.map(|config| config.history_path().to_path_buf());
        if let Some(path) = &history_path {
            if let Err(e) = editor.load_history(path) {
                debug!(path = %path.display(), "no history loaded: {}", e);
            }
        }

        // The line editor handles Ctrl-C at the prompt; this keeps the shell
        // alive while a foreground child is running.
        ctrlc::set_handler(|| {})?;

        Ok(Shell {
            editor,
            state: Some(state),
            executor,
            highlighter: SyntaxHighlighter::new(),
            history_path,
            flags,
        })
    }

    fn last_status(&self) -> ExitCode {
        self.state.as_ref().map_or(0, ShellState::last_status)
    }

    fn prompt(&self) -> String {
        let dir = env::current_dir()
            .map(|dir| dir.to_string_lossy().into_owned())
            .unwrap_or_else(|_| String::from("?"));
        let dir = match dirs::home_dir() {
            Some(home) => {
                let home = home.to_string_lossy();
                match dir.strip_prefix(home.as_ref()) {
                    Some(rest) if rest.is_empty() || rest.starts_with('/') => format!("~{}", rest),
                    _ => dir,
                }
            }
            None => dir,
        };
        self.highlighter.prompt(&dir, self.last_status())
    }

    /// Reads and runs lines until end of input, then returns the last status.
    pub fn run(&mut self) -> Result<ExitCode, ShellError> {
        info!("interactive session started");
        loop {
            let prompt = self.prompt();
            match self.editor.readline(&prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        if let Err(e) = self.editor.add_history_entry(line.as_str()) {
                            debug!("history entry not added: {}", e);
                        }
                    }
                    self.execute_command(line);
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => {
                    if !self.flags.is_set("quiet") {
                        println!("exit");
                    }
                    break;
                }
                Err(e) => {
                    if !self.flags.is_set("quiet") {
                        eprintln!("{}", self.highlighter.highlight_error(&format!("conch: {}", e)));
                    }
                    release_all(&mut self.state);
                    return Err(e.into());
                }
            }
        }

        if let Some(path) = &self.history_path {
            if let Err(e) = self.editor.save_history(path) {
                warn!(path = %path.display(), "could not save history: {}", e);
            }
        }

        let status = self.last_status();
        let released = release_all(&mut self.state);
        debug!(?released, "session released");
        Ok(status)
    }
}

impl Drop for Shell {
    fn drop(&mut self) {
        release_all(&mut self.state);
    }
}
