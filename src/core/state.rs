use crate::core::commands::ExitCode;
use crate::core::env::Environment;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Word(String),
    Pipe,
}

/// One pipeline stage. The argument vector is owned by the node and goes
/// away with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandNode {
    args: Vec<String>,
}

impl CommandNode {
    /// Returns `None` for an empty argument vector; a node always has a
    /// program name.
    pub fn new(args: Vec<String>) -> Option<Self> {
        if args.is_empty() {
            None
        } else {
            Some(Self { args })
        }
    }

    pub fn program(&self) -> &str {
        &self.args[0]
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

pub type TokenList = Vec<Token>;

/// Pipeline stages in order; stage `i` feeds stage `i + 1`.
pub type CommandList = Vec<CommandNode>;

/// Everything one shell process owns between reading a line and releasing it.
///
/// Each slot is `None` when absent. Releasing a slot (see
/// [`crate::core::lifecycle`]) always leaves it `None`.
#[derive(Debug, Default)]
pub struct ShellState {
    pub(crate) environment: Option<Environment>,
    pub(crate) tokens: Option<TokenList>,
    pub(crate) commands: Option<CommandList>,
    pub(crate) input_line: Option<String>,
    pub(crate) last_status: ExitCode,
    pub(crate) subshell: bool,
}

impl ShellState {
    pub fn new(environment: Environment) -> Self {
        Self {
            environment: Some(environment),
            ..Self::default()
        }
    }

    /// Copy used for builtins running inside a pipeline: same environment,
    /// nothing else, and changes never reach the parent.
    pub fn fork(&self) -> Self {
        Self {
            environment: self.environment.clone(),
            last_status: self.last_status,
            subshell: true,
            ..Self::default()
        }
    }

    pub fn environment(&self) -> Option<&Environment> {
        self.environment.as_ref()
    }

    /// Mutable environment, created empty if it was released.
    pub fn environment_mut(&mut self) -> &mut Environment {
        self.environment.get_or_insert_with(Environment::new)
    }

    pub fn var(&self, name: &str) -> Option<&str> {
        self.environment.as_ref().and_then(|env| env.get(name))
    }

    pub fn tokens(&self) -> Option<&[Token]> {
        self.tokens.as_deref()
    }

    pub fn set_tokens(&mut self, tokens: TokenList) {
        self.tokens = Some(tokens);
    }

    pub fn commands(&self) -> Option<&[CommandNode]> {
        self.commands.as_deref()
    }

    pub fn set_commands(&mut self, commands: CommandList) {
        self.commands = Some(commands);
    }

    /// The first stage of the parsed command list, if any.
    pub fn current_command(&self) -> Option<&CommandNode> {
        self.commands.as_ref().and_then(|commands| commands.first())
    }

    pub fn input_line(&self) -> Option<&str> {
        self.input_line.as_deref()
    }

    pub fn set_input_line(&mut self, line: String) {
        self.input_line = Some(line);
    }

    pub fn last_status(&self) -> ExitCode {
        self.last_status
    }

    pub fn set_last_status(&mut self, status: ExitCode) {
        self.last_status = status;
    }

    pub fn is_subshell(&self) -> bool {
        self.subshell
    }
}
