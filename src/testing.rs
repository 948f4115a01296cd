//! Helpers shared by unit tests.

use crate::core::commands::{Command, CommandError, Context, ExitCode, Invocation};
use crate::core::env::Environment;
use crate::core::state::ShellState;
use std::sync::{Mutex, MutexGuard};

static CWD_LOCK: Mutex<()> = Mutex::new(());

/// Serialises tests that read or change the process working directory.
pub(crate) fn cwd_lock() -> MutexGuard<'static, ()> {
    CWD_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub(crate) fn state_with(entries: &[&str]) -> ShellState {
    ShellState::new(Environment::from_entries(entries.iter().copied()))
}

/// Runs `command` as a terminal builtin on a fresh state.
pub(crate) fn invoke<C: Command>(
    command: &C,
    args: &[&str],
) -> (Result<ExitCode, CommandError>, String, String) {
    invoke_with(command, &mut state_with(&[]), args, Invocation::Terminal)
}

pub(crate) fn invoke_with<C: Command>(
    command: &C,
    state: &mut ShellState,
    args: &[&str],
    invocation: Invocation,
) -> (Result<ExitCode, CommandError>, String, String) {
    let args: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();
    let (mut out, mut err) = (Vec::new(), Vec::new());
    let result = {
        let mut ctx = Context {
            state,
            out: &mut out,
            err: &mut err,
            invocation,
        };
        command.execute(&mut ctx, &args)
    };
    (
        result,
        String::from_utf8_lossy(&out).into_owned(),
        String::from_utf8_lossy(&err).into_owned(),
    )
}
