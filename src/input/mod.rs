//! Minimal line front end: just enough lexing and parsing to hand the core
//! a token list and a command list.

mod lexer;
mod parser;

pub use lexer::tokenize;
pub use parser::parse;

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    UnexpectedToken(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnexpectedToken(token) => {
                write!(f, "syntax error near unexpected token `{}'", token)
            }
        }
    }
}

impl std::error::Error for ParseError {}
