use super::ParseError;
use crate::core::state::{CommandList, CommandNode, Token};

/// Groups tokens into pipeline stages. Every stage must have a program name.
pub fn parse(tokens: &[Token]) -> Result<CommandList, ParseError> {
    if tokens.is_empty() {
        return Ok(Vec::new());
    }

    let mut commands = Vec::new();
    let mut args = Vec::new();
    for token in tokens {
        match token {
            Token::Word(word) => args.push(word.clone()),
            Token::Pipe => {
                let node = CommandNode::new(std::mem::take(&mut args))
                    .ok_or_else(|| ParseError::UnexpectedToken("|".to_string()))?;
                commands.push(node);
            }
        }
    }

    let last = CommandNode::new(args).ok_or_else(|| ParseError::UnexpectedToken("|".to_string()))?;
    commands.push(last);
    Ok(commands)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::tokenize;

    #[test]
    fn test_single_command() {
        let commands = parse(&tokenize("echo -n hello")).unwrap();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].args(), ["echo", "-n", "hello"]);
    }

    #[test]
    fn test_pipeline() {
        let commands = parse(&tokenize("env | grep A | wc -l")).unwrap();
        let programs: Vec<&str> = commands.iter().map(|c| c.program()).collect();
        assert_eq!(programs, ["env", "grep", "wc"]);
    }

    #[test]
    fn test_empty_line() {
        assert!(parse(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_empty_stage_is_rejected() {
        for line in ["| wc", "env |", "env || wc"] {
            let err = parse(&tokenize(line)).unwrap_err();
            assert_eq!(err.to_string(), "syntax error near unexpected token `|'");
        }
    }
}
