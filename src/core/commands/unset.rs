use super::{Command, CommandError, Context, ExitCode, EXIT_FAILURE, EXIT_SUCCESS};
use crate::core::env::{is_valid_name, EnvError};
use tracing::trace;

#[derive(Clone, Copy, Debug, Default)]
pub struct UnsetCommand;

impl Command for UnsetCommand {
    fn execute(&self, ctx: &mut Context<'_>, args: &[String]) -> Result<ExitCode, CommandError> {
        if args.is_empty() {
            return Err(CommandError::NotEnoughArguments);
        }

        let mut status = EXIT_SUCCESS;
        for name in args {
            if !is_valid_name(name) {
                ctx.report("unset", EnvError::InvalidName(name.clone()));
                status = EXIT_FAILURE;
                continue;
            }

            let removed = ctx.state.environment_mut().unset(name);
            trace!(name = name.as_str(), removed, "unset");
        }
        Ok(status)
    }
}
