use std::fmt::Display;
use std::io::Write;

mod cd;
mod echo;
mod env;
mod export;
mod pwd;
mod unset;

pub use cd::CdCommand;
pub use echo::EchoCommand;
pub use env::EnvCommand;
pub use export::ExportCommand;
pub use pwd::PwdCommand;
pub use unset::UnsetCommand;

use crate::core::env::EnvError;
use crate::core::state::ShellState;
use crate::flags::Flags;
use crate::process::{ProcessError, ProcessExecutor, Running, StageInput};
use tracing::{debug, trace};

/// Shell exit status: 0 is success, anything else is failure.
pub type ExitCode = i32;

pub const EXIT_SUCCESS: ExitCode = 0;
pub const EXIT_FAILURE: ExitCode = 1;

/// Every name [`is_builtin`] accepts.
pub const BUILTIN_NAMES: [&str; 6] = ["cd", "pwd", "echo", "env", "unset", "export"];

#[derive(Debug)]
pub enum CommandError {
    TooManyArguments,
    NotEnoughArguments,
    VarNotSet(&'static str),
    ExecutionError(String),
    IoError(std::io::Error),
    EnvError(EnvError),
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::TooManyArguments => write!(f, "too many arguments"),
            CommandError::NotEnoughArguments => write!(f, "not enough arguments"),
            CommandError::VarNotSet(var) => write!(f, "{} not set", var),
            CommandError::ExecutionError(msg) => write!(f, "{}", msg),
            CommandError::IoError(err) => write!(f, "{}", err),
            CommandError::EnvError(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for CommandError {}

impl From<std::io::Error> for CommandError {
    fn from(err: std::io::Error) -> Self {
        CommandError::IoError(err)
    }
}

impl From<EnvError> for CommandError {
    fn from(err: EnvError) -> Self {
        CommandError::EnvError(err)
    }
}

/// Where in the pipeline a builtin runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invocation {
    /// Last stage: output goes straight to the user.
    Terminal,
    /// Output feeds the next stage.
    Piped,
}

impl Invocation {
    pub fn for_stage(index: usize, stages: usize) -> Self {
        if index + 1 >= stages {
            Invocation::Terminal
        } else {
            Invocation::Piped
        }
    }
}

/// Everything a builtin gets to work with.
pub struct Context<'a> {
    pub state: &'a mut ShellState,
    pub out: &'a mut dyn Write,
    pub err: &'a mut dyn Write,
    pub invocation: Invocation,
}

impl Context<'_> {
    /// Writes a `conch: <command>: <message>` diagnostic.
    pub fn report(&mut self, command: &str, message: impl Display) {
        let _ = writeln!(self.err, "conch: {}: {}", command, message);
    }
}

pub trait Command {
    /// `args` are the operands, without the command name.
    fn execute(&self, ctx: &mut Context<'_>, args: &[String]) -> Result<ExitCode, CommandError>;
}

#[derive(Clone, Copy, Debug)]
pub enum CommandType {
    Cd(CdCommand),
    Pwd(PwdCommand),
    Echo(EchoCommand),
    Env(EnvCommand),
    Unset(UnsetCommand),
    Export(ExportCommand),
}

impl CommandType {
    /// Exact, full-length lookup; `"cdx"` or `"ech"` are not builtins.
    pub fn from_name(name: &str) -> Option<Self> {
        let command = match name {
            "cd" => CommandType::Cd(CdCommand),
            "pwd" => CommandType::Pwd(PwdCommand),
            "echo" => CommandType::Echo(EchoCommand),
            "env" => CommandType::Env(EnvCommand),
            "unset" => CommandType::Unset(UnsetCommand),
            "export" => CommandType::Export(ExportCommand),
            _ => return None,
        };
        Some(command)
    }

    pub fn name(&self) -> &'static str {
        match self {
            CommandType::Cd(_) => "cd",
            CommandType::Pwd(_) => "pwd",
            CommandType::Echo(_) => "echo",
            CommandType::Env(_) => "env",
            CommandType::Unset(_) => "unset",
            CommandType::Export(_) => "export",
        }
    }

    /// Runs the builtin and turns any error into a diagnostic plus a
    /// failure status. Never terminates the shell.
    pub fn run(&self, ctx: &mut Context<'_>, args: &[String]) -> ExitCode {
        match self.execute(ctx, args) {
            Ok(status) => status,
            Err(e) => {
                debug!(command = self.name(), error = %e, "builtin failed");
                ctx.report(self.name(), e);
                EXIT_FAILURE
            }
        }
    }
}

impl Command for CommandType {
    fn execute(&self, ctx: &mut Context<'_>, args: &[String]) -> Result<ExitCode, CommandError> {
        match self {
            CommandType::Cd(cmd) => cmd.execute(ctx, args),
            CommandType::Pwd(cmd) => cmd.execute(ctx, args),
            CommandType::Echo(cmd) => cmd.execute(ctx, args),
            CommandType::Env(cmd) => cmd.execute(ctx, args),
            CommandType::Unset(cmd) => cmd.execute(ctx, args),
            CommandType::Export(cmd) => cmd.execute(ctx, args),
        }
    }
}

/// Whether `name` is one of the builtins. No side effects.
pub fn is_builtin(name: &str) -> bool {
    CommandType::from_name(name).is_some()
}

/// Runs the first command node as a builtin.
///
/// Returns `None` when there is no command or it is not a builtin; the
/// caller then takes the external path. Nothing is written in that case.
pub fn dispatch(
    state: &mut ShellState,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Option<ExitCode> {
    let stages = state.commands().map_or(0, <[_]>::len);
    let node = state.current_command()?;
    let Some(builtin) = CommandType::from_name(node.program()) else {
        trace!(program = node.program(), "not a builtin");
        return None;
    };
    let args = node.args()[1..].to_vec();

    debug!(command = builtin.name(), args = args.len(), "dispatching builtin");
    let mut ctx = Context {
        state,
        out,
        err,
        invocation: Invocation::for_stage(0, stages),
    };
    Some(builtin.run(&mut ctx, &args))
}

/// Runs a whole command list: builtins in-process, everything else through
/// the [`ProcessExecutor`].
#[derive(Clone, Debug, Default)]
pub struct CommandExecutor {
    process_executor: ProcessExecutor,
    quiet_mode: bool,
}

/// A pipeline stage after it was started.
enum Stage {
    Finished(ExitCode),
    Running(Running),
}

impl CommandExecutor {
    pub fn new(flags: &Flags) -> Self {
        Self {
            process_executor: ProcessExecutor::new(),
            quiet_mode: flags.is_set("quiet"),
        }
    }

    /// Executes the parsed command list held by `state` and records the
    /// resulting status in it. An empty or absent list keeps the previous
    /// status.
    pub fn execute(
        &self,
        state: &mut ShellState,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> ExitCode {
        let stages: Vec<Vec<String>> = match state.commands() {
            Some(commands) if !commands.is_empty() => {
                commands.iter().map(|node| node.args().to_vec()).collect()
            }
            _ => return state.last_status(),
        };

        let status = if stages.len() == 1 {
            match dispatch(state, out, err) {
                Some(status) => status,
                None => self.run_external(state, &stages[0], out, err),
            }
        } else {
            self.execute_pipeline(state, &stages, out, err)
        };

        state.set_last_status(status);
        status
    }

    fn report(&self, err: &mut dyn Write, e: &ProcessError) {
        if !self.quiet_mode {
            let _ = writeln!(err, "conch: {}", e);
        }
    }

    fn run_external(
        &self,
        state: &ShellState,
        args: &[String],
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> ExitCode {
        let _ = out.flush();
        match self
            .process_executor
            .run(args, state.environment(), StageInput::Inherit, false)
        {
            Ok(spawned) => spawned.status,
            Err(e) => {
                self.report(err, &e);
                e.exit_code()
            }
        }
    }

    /// External stages are all started before any is waited on, each one
    /// reading the previous stage's stdout pipe. Builtins run on a forked
    /// copy of the state, so they cannot change the shell itself; their
    /// output is buffered for the next stage and they never read stdin.
    fn execute_pipeline(
        &self,
        state: &ShellState,
        stages: &[Vec<String>],
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> ExitCode {
        debug!(stages = stages.len(), "running pipeline");
        let mut upstream = StageInput::Inherit;
        let mut started = Vec::with_capacity(stages.len());

        for (index, args) in stages.iter().enumerate() {
            let invocation = Invocation::for_stage(index, stages.len());
            let piped = invocation == Invocation::Piped;
            let input = std::mem::take(&mut upstream);

            match CommandType::from_name(&args[0]) {
                Some(builtin) => {
                    // Dropping an unread pipe closes it, so the writer stops.
                    drop(input);
                    let mut fork = state.fork();
                    let mut buffer = Vec::new();
                    let target: &mut dyn Write = match invocation {
                        Invocation::Terminal => &mut *out,
                        Invocation::Piped => &mut buffer,
                    };
                    let mut ctx = Context {
                        state: &mut fork,
                        out: target,
                        err: &mut *err,
                        invocation,
                    };
                    started.push(Stage::Finished(builtin.run(&mut ctx, &args[1..])));
                    if piped {
                        upstream = StageInput::Buffer(buffer);
                    }
                }
                None => {
                    let _ = out.flush();
                    match self.process_executor.spawn(args, state.environment(), input, piped) {
                        Ok(mut running) => {
                            if let Some(stdout) = running.take_stdout() {
                                upstream = StageInput::Pipe(stdout);
                            }
                            started.push(Stage::Running(running));
                        }
                        Err(e) => {
                            self.report(err, &e);
                            if piped {
                                upstream = StageInput::Buffer(Vec::new());
                            }
                            started.push(Stage::Finished(e.exit_code()));
                        }
                    }
                }
            }
        }
        drop(upstream);

        let mut status = EXIT_SUCCESS;
        for stage in started {
            status = match stage {
                Stage::Finished(status) => status,
                Stage::Running(running) => match running.wait() {
                    Ok(status) => status,
                    Err(e) => {
                        self.report(err, &e);
                        e.exit_code()
                    }
                },
            };
        }
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::env::Environment;
    use crate::core::state::CommandNode;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    fn state_with_line(line: &[&[&str]]) -> ShellState {
        let mut state = ShellState::new(Environment::from_entries(["HOME=/home/test", "A=1"]));
        let nodes = line
            .iter()
            .map(|stage| CommandNode::new(stage.iter().map(|s| s.to_string()).collect()).unwrap())
            .collect();
        state.set_commands(nodes);
        state
    }

    #[test]
    fn test_builtin_command_detection() {
        for name in BUILTIN_NAMES {
            assert!(is_builtin(name), "{} should be a builtin", name);
        }

        for name in ["", "c", "cdx", "ech", "echo1", "Cd", "ECHO", "pw", "pwdd", "en", "envs", "unse", "exports", " cd", "cd "] {
            assert!(!is_builtin(name), "{:?} should not be a builtin", name);
        }
    }

    #[test]
    fn test_names_round_trip() {
        for name in BUILTIN_NAMES {
            assert_eq!(CommandType::from_name(name).map(|c| c.name()), Some(name));
        }
    }

    #[test]
    fn test_dispatch_echo_without_newline() {
        let mut state = state_with_line(&[&["echo", "-n", "hello"]]);
        let (mut out, mut err) = (Vec::new(), Vec::new());

        assert_eq!(dispatch(&mut state, &mut out, &mut err), Some(0));
        assert_eq!(out, b"hello");
        assert!(err.is_empty());
    }

    #[test]
    fn test_dispatch_unknown_command_is_no_op() {
        let mut state = state_with_line(&[&["unknownprog", "arg1"]]);
        let before = state.environment().cloned();
        let (mut out, mut err) = (Vec::new(), Vec::new());

        assert_eq!(dispatch(&mut state, &mut out, &mut err), None);
        assert!(out.is_empty());
        assert!(err.is_empty());
        assert_eq!(state.environment().cloned(), before);
    }

    #[test]
    fn test_dispatch_without_commands() {
        let mut state = ShellState::default();
        let (mut out, mut err) = (Vec::new(), Vec::new());
        assert_eq!(dispatch(&mut state, &mut out, &mut err), None);
    }

    #[test]
    fn test_dispatch_export_sets_single_entry() {
        let mut state = state_with_line(&[&["export", "A=2"]]);
        let (mut out, mut err) = (Vec::new(), Vec::new());

        assert_eq!(dispatch(&mut state, &mut out, &mut err), Some(0));
        let environment = state.environment().unwrap();
        assert_eq!(environment.get("A"), Some("2"));
        assert_eq!(environment.iter().filter(|e| e.starts_with("A=")).count(), 1);
    }

    #[test]
    fn test_dispatch_unset_removes_only_key() {
        let mut state = state_with_line(&[&["unset", "A"]]);
        let (mut out, mut err) = (Vec::new(), Vec::new());

        assert_eq!(dispatch(&mut state, &mut out, &mut err), Some(0));
        let entries: Vec<&str> = state.environment().unwrap().iter().collect();
        assert_eq!(entries, ["HOME=/home/test"]);
    }

    #[test]
    fn test_builtin_failure_is_reported_not_fatal() {
        let mut state = state_with_line(&[&["unset"]]);
        let (mut out, mut err) = (Vec::new(), Vec::new());

        assert_eq!(dispatch(&mut state, &mut out, &mut err), Some(EXIT_FAILURE));
        assert_eq!(
            String::from_utf8(err).unwrap(),
            "conch: unset: not enough arguments\n"
        );
    }

    #[test]
    fn test_execute_records_status() {
        let executor = CommandExecutor::default();
        let mut state = state_with_line(&[&["env", "extra"]]);
        let (mut out, mut err) = (Vec::new(), Vec::new());

        assert_eq!(executor.execute(&mut state, &mut out, &mut err), EXIT_FAILURE);
        assert_eq!(state.last_status(), EXIT_FAILURE);
    }

    #[test]
    fn test_execute_empty_list_keeps_status() {
        let executor = CommandExecutor::default();
        let mut state = ShellState::default();
        state.set_last_status(4);
        state.set_commands(Vec::new());
        let (mut out, mut err) = (Vec::new(), Vec::new());

        assert_eq!(executor.execute(&mut state, &mut out, &mut err), 4);
    }

    #[test]
    fn test_execute_unknown_command() {
        let executor = CommandExecutor::default();
        let mut state = state_with_line(&[&["conch-test-no-such-program", "arg1"]]);
        let (mut out, mut err) = (Vec::new(), Vec::new());

        assert_eq!(executor.execute(&mut state, &mut out, &mut err), 127);
        assert!(String::from_utf8(err).unwrap().contains("command not found"));
    }

    #[test]
    fn test_pipeline_builtins_run_on_a_copy() {
        let executor = CommandExecutor::default();
        let mut state = state_with_line(&[&["export", "B=2"], &["env"]]);
        let (mut out, mut err) = (Vec::new(), Vec::new());

        assert_eq!(executor.execute(&mut state, &mut out, &mut err), 0);
        assert_eq!(state.var("B"), None);
        assert_eq!(String::from_utf8(out).unwrap(), "HOME=/home/test\nA=1\n");
    }

    #[test]
    fn test_pipeline_status_is_last_stage() {
        let executor = CommandExecutor::default();
        let mut state = state_with_line(&[&["unset"], &["echo", "ok"]]);
        let (mut out, mut err) = (Vec::new(), Vec::new());

        assert_eq!(executor.execute(&mut state, &mut out, &mut err), 0);
        assert_eq!(out, b"ok\n");
        assert!(!err.is_empty());
    }

    #[test]
    fn test_pipeline_through_external_stage() {
        let _guard = crate::testing::cwd_lock();
        let executor = CommandExecutor::default();
        let mut state = ShellState::new(Environment::from_process());
        state.set_commands(vec![
            CommandNode::new(vec!["echo".into(), "piped".into()]).unwrap(),
            CommandNode::new(vec!["cat".into()]).unwrap(),
            CommandNode::new(vec!["pwd".into()]).unwrap(),
        ]);
        let (mut out, mut err) = (Vec::new(), Vec::new());

        assert_eq!(executor.execute(&mut state, &mut out, &mut err), 0);
        assert!(err.is_empty());
    }

    /// Runs `line` on a helper thread and gives up after ten seconds.
    fn execute_with_deadline(line: &[&[&str]]) -> (ExitCode, Vec<u8>) {
        let nodes: Vec<CommandNode> = line
            .iter()
            .map(|stage| CommandNode::new(stage.iter().map(|s| s.to_string()).collect()).unwrap())
            .collect();
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let executor = CommandExecutor::default();
            let mut state = ShellState::new(Environment::from_process());
            state.set_commands(nodes);
            let (mut out, mut err) = (Vec::new(), Vec::new());
            let status = executor.execute(&mut state, &mut out, &mut err);
            let _ = tx.send((status, out));
        });
        rx.recv_timeout(Duration::from_secs(10))
            .expect("pipeline did not finish")
    }

    #[test]
    fn test_pipeline_endless_producer_into_head() {
        let (status, _) = execute_with_deadline(&[
            &["sh", "-c", "while :; do echo y; done"],
            &["head", "-n1"],
        ]);
        assert_eq!(status, 0);
    }

    #[test]
    fn test_pipeline_endless_producer_into_builtin() {
        let (status, out) = execute_with_deadline(&[
            &["sh", "-c", "while :; do echo y; done"],
            &["echo", "done"],
        ]);
        assert_eq!(status, 0);
        assert_eq!(out, b"done\n");
    }

    #[test]
    fn test_pipeline_builtin_feeds_external() {
        let (status, _) = execute_with_deadline(&[&["echo", "abc"], &["grep", "-q", "abc"]]);
        assert_eq!(status, 0);

        let (status, _) = execute_with_deadline(&[&["echo", "abc"], &["grep", "-q", "xyz"]]);
        assert_eq!(status, 1);
    }

    #[test]
    fn test_invocation_for_stage() {
        assert_eq!(Invocation::for_stage(0, 1), Invocation::Terminal);
        assert_eq!(Invocation::for_stage(0, 2), Invocation::Piped);
        assert_eq!(Invocation::for_stage(1, 2), Invocation::Terminal);
    }

    #[test]
    fn test_command_error_display() {
        let errors = vec![
            CommandError::TooManyArguments,
            CommandError::NotEnoughArguments,
            CommandError::VarNotSet("HOME"),
            CommandError::ExecutionError("failed".to_string()),
            CommandError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "io error",
            )),
            CommandError::EnvError(EnvError::InvalidName("1x".to_string())),
        ];

        for error in errors {
            assert!(!error.to_string().is_empty());
        }
    }
}
