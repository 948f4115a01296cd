use super::{Command, CommandError, Context, ExitCode, EXIT_SUCCESS};
use crate::core::state::ShellState;
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Clone, Copy, Debug, Default)]
pub struct CdCommand;

/// The OS reason without the trailing `(os error N)`.
fn reason(err: &io::Error) -> String {
    let message = err.to_string();
    match message.split_once(" (os error") {
        Some((reason, _)) => reason.to_string(),
        None => message,
    }
}

impl CdCommand {
    fn home(&self, state: &ShellState) -> Result<PathBuf, CommandError> {
        state
            .var("HOME")
            .filter(|home| !home.is_empty())
            .map(PathBuf::from)
            .or_else(dirs::home_dir)
            .ok_or(CommandError::VarNotSet("HOME"))
    }

    fn target(&self, state: &ShellState, args: &[String]) -> Result<(PathBuf, bool), CommandError> {
        match args {
            [] => Ok((self.home(state)?, false)),
            [dir] if dir == "-" => state
                .var("OLDPWD")
                .map(|old| (PathBuf::from(old), true))
                .ok_or(CommandError::VarNotSet("OLDPWD")),
            [dir] => Ok((PathBuf::from(dir), false)),
            _ => Err(CommandError::TooManyArguments),
        }
    }

    /// Changes the process directory, or inside a pipeline copy only checks
    /// that the target is a directory.
    fn change_dir(&self, state: &ShellState, target: &Path) -> Result<PathBuf, CommandError> {
        let failed = |e: io::Error| {
            CommandError::ExecutionError(format!("{}: {}", target.display(), reason(&e)))
        };

        if state.is_subshell() {
            let resolved = fs::canonicalize(target).map_err(failed)?;
            if !resolved.is_dir() {
                return Err(CommandError::ExecutionError(format!(
                    "{}: Not a directory",
                    target.display()
                )));
            }
            return Ok(resolved);
        }

        env::set_current_dir(target).map_err(failed)?;
        Ok(env::current_dir()?)
    }
}

impl Command for CdCommand {
    fn execute(&self, ctx: &mut Context<'_>, args: &[String]) -> Result<ExitCode, CommandError> {
        if matches!(args, [dir] if dir.is_empty()) {
            return Ok(EXIT_SUCCESS);
        }

        let (target, announce) = self.target(ctx.state, args)?;
        let previous = ctx
            .state
            .var("PWD")
            .map(str::to_owned)
            .or_else(|| env::current_dir().ok().map(|dir| dir.to_string_lossy().into_owned()));

        let resolved = self.change_dir(ctx.state, &target)?;
        let resolved = resolved.to_string_lossy();
        debug!(from = ?previous, to = %resolved, "changed directory");

        let environment = ctx.state.environment_mut();
        if let Some(previous) = previous {
            environment.set("OLDPWD", &previous)?;
        }
        environment.set("PWD", &resolved)?;

        if announce {
            writeln!(ctx.out, "{}", resolved)?;
        }
        Ok(EXIT_SUCCESS)
    }
}
