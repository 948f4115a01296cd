use super::{Command, CommandError, Context, ExitCode, EXIT_SUCCESS};
use std::env;
use std::io::Write;

#[derive(Clone, Copy, Debug, Default)]
pub struct PwdCommand;

impl Command for PwdCommand {
    fn execute(&self, ctx: &mut Context<'_>, _args: &[String]) -> Result<ExitCode, CommandError> {
        let dir = match env::current_dir() {
            Ok(dir) => dir.to_string_lossy().into_owned(),
            Err(e) => ctx
                .state
                .var("PWD")
                .map(str::to_owned)
                .ok_or(CommandError::IoError(e))?,
        };

        writeln!(ctx.out, "{}", dir)?;
        Ok(EXIT_SUCCESS)
    }
}
