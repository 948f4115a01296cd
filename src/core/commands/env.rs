use super::{Command, CommandError, Context, ExitCode, EXIT_SUCCESS};
use std::io::Write;

#[derive(Clone, Copy, Debug, Default)]
pub struct EnvCommand;

impl Command for EnvCommand {
    fn execute(&self, ctx: &mut Context<'_>, args: &[String]) -> Result<ExitCode, CommandError> {
        if !args.is_empty() {
            return Err(CommandError::TooManyArguments);
        }

        if let Some(environment) = ctx.state.environment() {
            for entry in environment.iter() {
                writeln!(ctx.out, "{}", entry)?;
            }
        }
        Ok(EXIT_SUCCESS)
    }
}
