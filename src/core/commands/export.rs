use super::{Command, CommandError, Context, ExitCode, EXIT_FAILURE, EXIT_SUCCESS};
use crate::core::env::{is_valid_name, EnvError};
use std::io::Write;

#[derive(Clone, Copy, Debug, Default)]
pub struct ExportCommand;

#[derive(Debug, PartialEq, Eq)]
enum Assignment<'a> {
    Set(&'a str, &'a str),
    Append(&'a str, &'a str),
    Declare(&'a str),
}

impl<'a> Assignment<'a> {
    fn parse(arg: &'a str) -> Result<Self, EnvError> {
        let assignment = match arg.split_once('=') {
            Some((name, value)) => match name.strip_suffix('+') {
                Some(name) => Assignment::Append(name, value),
                None => Assignment::Set(name, value),
            },
            None => Assignment::Declare(arg),
        };

        if is_valid_name(assignment.name()) {
            Ok(assignment)
        } else {
            Err(EnvError::InvalidName(arg.to_string()))
        }
    }

    fn name(&self) -> &'a str {
        match self {
            Assignment::Set(name, _) | Assignment::Append(name, _) | Assignment::Declare(name) => {
                name
            }
        }
    }
}

/// `"value"` with `"`, `\`, `$` and backquote escaped.
fn quote_value(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Empty buffer with room for `len` bytes.
fn reserved(len: usize) -> Result<String, EnvError> {
    let mut buffer = String::new();
    buffer.try_reserve_exact(len)?;
    Ok(buffer)
}

impl ExportCommand {
    fn list(&self, ctx: &mut Context<'_>) -> Result<ExitCode, CommandError> {
        if let Some(environment) = ctx.state.environment() {
            for (name, value) in environment.pairs() {
                writeln!(ctx.out, "declare -x {}={}", name, quote_value(value))?;
            }
        }
        Ok(EXIT_SUCCESS)
    }

    fn apply(&self, ctx: &mut Context<'_>, assignment: Assignment<'_>) -> Result<(), EnvError> {
        let environment = ctx.state.environment_mut();
        match assignment {
            Assignment::Set(name, value) => environment.set(name, value),
            Assignment::Append(name, value) => {
                let current = environment.get(name).unwrap_or_default();
                let mut joined = reserved(current.len().saturating_add(value.len()))?;
                joined.push_str(current);
                joined.push_str(value);
                environment.set(name, &joined)
            }
            // Only NAME=VALUE entries are stored, so a bare name has nothing to add.
            Assignment::Declare(_) => Ok(()),
        }
    }
}

impl Command for ExportCommand {
    fn execute(&self, ctx: &mut Context<'_>, args: &[String]) -> Result<ExitCode, CommandError> {
        if args.is_empty() {
            return self.list(ctx);
        }

        let mut status = EXIT_SUCCESS;
        for arg in args {
            let result = Assignment::parse(arg).and_then(|assignment| self.apply(ctx, assignment));
            if let Err(e) = result {
                ctx.report("export", e);
                status = EXIT_FAILURE;
            }
        }
        Ok(status)
    }
}
