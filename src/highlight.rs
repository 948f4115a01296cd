use inksac::prelude::*;

use crate::core::commands::{ExitCode, EXIT_SUCCESS};

#[derive(Debug, Clone, Copy)]
pub struct SyntaxHighlighter {
    color_support: ColorSupport,
}

impl Default for SyntaxHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxHighlighter {
    pub fn new() -> Self {
        let support = check_color_support().unwrap_or(ColorSupport::NoColor);
        Self {
            color_support: support,
        }
    }

    pub fn plain() -> Self {
        Self {
            color_support: ColorSupport::NoColor,
        }
    }

    fn paint(&self, text: &str, style: Style) -> String {
        if matches!(self.color_support, ColorSupport::NoColor) {
            return text.to_string();
        }
        text.style(style).to_string()
    }

    /// `dir > `, with the last status in brackets when it was not zero.
    pub fn prompt(&self, dir: &str, last_status: ExitCode) -> String {
        let dir_style = Style::builder().foreground(Color::Cyan).bold().build();
        let mut prompt = self.paint(dir, dir_style);

        if last_status != EXIT_SUCCESS {
            prompt.push(' ');
            prompt.push_str(&self.highlight_error(&format!("[{}]", last_status)));
        }
        prompt.push_str(" > ");
        prompt
    }

    pub fn highlight_error(&self, error: &str) -> String {
        let error_style = Style::builder().foreground(Color::Red).bold().build();
        self.paint(error, error_style)
    }
}
