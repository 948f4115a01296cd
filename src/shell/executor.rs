use std::io::{self, Write};

use crate::core::commands::{CommandExecutor, ExitCode};
use crate::core::lifecycle::release_iteration;
use crate::core::state::ShellState;
use crate::input::{parse, tokenize};
use tracing::debug;

/// Status for a line that does not parse.
pub const EXIT_SYNTAX: ExitCode = 2;

pub(crate) trait CommandHandler {
    fn execute_command(&mut self, line: String) -> ExitCode;
}

/// One loop iteration: the line is stored in the state, tokenized, parsed,
/// executed, and every per-line structure is released again before
/// returning, whatever happened in between.
pub fn execute_line(
    state: &mut ShellState,
    executor: &CommandExecutor,
    line: String,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> ExitCode {
    state.set_input_line(line);
    let tokens = tokenize(state.input_line().unwrap_or_default());

    let status = match parse(&tokens) {
        Ok(commands) => {
            state.set_tokens(tokens);
            state.set_commands(commands);
            executor.execute(state, out, err)
        }
        Err(e) => {
            let _ = writeln!(err, "conch: {}", e);
            state.set_tokens(tokens);
            state.set_last_status(EXIT_SYNTAX);
            EXIT_SYNTAX
        }
    };

    let released = release_iteration(state);
    debug!(status, tokens = released.tokens, commands = released.commands, "line done");
    status
}

impl CommandHandler for super::Shell {
    fn execute_command(&mut self, line: String) -> ExitCode {
        let state = self.state.get_or_insert_with(ShellState::default);
        let stdout = io::stdout();
        let stderr = io::stderr();
        let status = execute_line(
            state,
            &self.executor,
            line,
            &mut stdout.lock(),
            &mut stderr.lock(),
        );
        let _ = io::stdout().flush();
        status
    }
}
