use super::{Command, CommandError, Context, ExitCode, Invocation, EXIT_SUCCESS};
use std::io::Write;

#[derive(Clone, Copy, Debug, Default)]
pub struct EchoCommand;

/// `-n`, `-nn`, ... all mean "no trailing newline".
fn is_no_newline_flag(arg: &str) -> bool {
    arg.strip_prefix('-')
        .is_some_and(|flags| !flags.is_empty() && flags.chars().all(|c| c == 'n'))
}

impl Command for EchoCommand {
    fn execute(&self, ctx: &mut Context<'_>, args: &[String]) -> Result<ExitCode, CommandError> {
        let words_start = args
            .iter()
            .position(|arg| !is_no_newline_flag(arg))
            .unwrap_or(args.len());
        let newline = words_start == 0;

        write!(ctx.out, "{}", args[words_start..].join(" "))?;
        if newline {
            writeln!(ctx.out)?;
        }
        if ctx.invocation == Invocation::Terminal {
            ctx.out.flush()?;
        }
        Ok(EXIT_SUCCESS)
    }
}
