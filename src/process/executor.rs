use std::io::{self, Read, Write};
use std::process::{Child, ChildStdout, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};

use super::ProcessError;
use crate::core::commands::ExitCode;
use crate::core::env::Environment;
use tracing::{debug, warn};

/// Result of one finished external command.
#[derive(Debug)]
pub struct Spawned {
    pub status: ExitCode,
    /// Captured stdout, when capture was requested.
    pub output: Option<Vec<u8>>,
}

/// Where a stage's stdin comes from.
#[derive(Debug, Default)]
pub enum StageInput {
    /// The shell's own stdin.
    #[default]
    Inherit,
    /// Output a builtin produced, written by a helper thread.
    Buffer(Vec<u8>),
    /// Read end of the previous stage's stdout pipe.
    Pipe(ChildStdout),
}

/// A started external stage that has not been waited on yet.
#[derive(Debug)]
pub struct Running {
    program: String,
    child: Child,
    feeder: Option<JoinHandle<io::Result<()>>>,
}

impl Running {
    /// Read end of the stage's stdout, when it was spawned piped.
    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.child.stdout.take()
    }

    pub fn wait(mut self) -> Result<ExitCode, ProcessError> {
        let status = self
            .child
            .wait()
            .map_err(|e| ProcessError::Io(self.program.clone(), e))?;

        if let Some(feeder) = self.feeder.take() {
            // A reader that exits early closes the pipe; that is not our error.
            if let Ok(Err(e)) = feeder.join() {
                if e.kind() != io::ErrorKind::BrokenPipe {
                    warn!(program = %self.program, error = %e, "failed to feed stdin");
                }
            }
        }

        let status = status_code(status);
        debug!(program = %self.program, status, "finished");
        Ok(status)
    }
}

#[derive(Clone, Debug, Default)]
pub struct ProcessExecutor;

fn status_code(status: ExitStatus) -> ExitCode {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

impl ProcessExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Starts `args[0]` with exactly the shell's environment and returns
    /// without waiting. With `piped` the child's stdout is a pipe the caller
    /// takes through [`Running::take_stdout`].
    pub fn spawn(
        &self,
        args: &[String],
        environment: Option<&Environment>,
        input: StageInput,
        piped: bool,
    ) -> Result<Running, ProcessError> {
        let program = args[0].as_str();
        let mut command = Command::new(program);
        command
            .args(&args[1..])
            .env_clear()
            .stdout(if piped { Stdio::piped() } else { Stdio::inherit() })
            .stderr(Stdio::inherit());
        if let Some(environment) = environment {
            command.envs(environment.pairs());
        }

        let buffer = match input {
            StageInput::Inherit => {
                command.stdin(Stdio::inherit());
                None
            }
            StageInput::Buffer(buffer) => {
                command.stdin(Stdio::piped());
                Some(buffer)
            }
            StageInput::Pipe(upstream) => {
                command.stdin(Stdio::from(upstream));
                None
            }
        };

        let mut child = command
            .spawn()
            .map_err(|e| ProcessError::from_spawn(program, e))?;
        debug!(program, pid = child.id(), piped, "spawned");

        // Written from a helper thread so a child that writes before it
        // finishes reading cannot block us.
        let feeder = match (buffer, child.stdin.take()) {
            (Some(buffer), Some(mut stdin)) => Some(thread::spawn(move || stdin.write_all(&buffer))),
            _ => None,
        };

        Ok(Running {
            program: program.to_string(),
            child,
            feeder,
        })
    }

    /// Spawns and waits. With `capture` the whole stdout comes back in
    /// [`Spawned::output`].
    pub fn run(
        &self,
        args: &[String],
        environment: Option<&Environment>,
        input: StageInput,
        capture: bool,
    ) -> Result<Spawned, ProcessError> {
        let mut running = self.spawn(args, environment, input, capture)?;

        let output = match running.take_stdout() {
            Some(mut stdout) => {
                let mut output = Vec::new();
                stdout
                    .read_to_end(&mut output)
                    .map_err(|e| ProcessError::Io(args[0].clone(), e))?;
                Some(output)
            }
            None => None,
        };

        let status = running.wait()?;
        Ok(Spawned { status, output })
    }
}
