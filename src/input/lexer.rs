use crate::core::state::{Token, TokenList};

/// Splits on whitespace; `|` is always a token of its own.
pub fn tokenize(line: &str) -> TokenList {
    let mut tokens = Vec::new();
    let mut word = String::new();

    for c in line.chars() {
        match c {
            '|' => {
                flush_word(&mut word, &mut tokens);
                tokens.push(Token::Pipe);
            }
            c if c.is_whitespace() => flush_word(&mut word, &mut tokens),
            c => word.push(c),
        }
    }
    flush_word(&mut word, &mut tokens);
    tokens
}

fn flush_word(word: &mut String, tokens: &mut TokenList) {
    if !word.is_empty() {
        tokens.push(Token::Word(std::mem::take(word)));
    }
}
