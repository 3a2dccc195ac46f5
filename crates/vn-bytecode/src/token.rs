use vn_core::{malformed_bail, Error, Result};

/// Single-pass cursor over the raw parameter tokens of one instruction.
#[derive(Debug, Clone)]
pub struct TokenStream<'a> {
    tokens: &'a [String],
    position: usize,
}

impl<'a> TokenStream<'a> {
    pub fn new(tokens: &'a [String]) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    pub fn next_token(&mut self) -> Result<&'a str> {
        match self.tokens.get(self.position) {
            Some(token) => {
                self.position += 1;
                Ok(token.as_str())
            }
            None => Err(Error::malformed(format!(
                "expected parameter {} but the instruction only carries {}",
                self.position + 1,
                self.tokens.len()
            ))),
        }
    }

    pub fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.position).map(String::as_str)
    }

    /// Raw units consumed so far.
    pub fn consumed(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.tokens.len() - self.position
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.tokens.len()
    }
}

/// Split a raw parameter text at top-level commas.
///
/// Commas inside string literals, brackets or parentheses do not split.
pub fn split_raw_parameters(text: &str) -> Result<Vec<String>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape = false;
    let mut start = 0usize;
    for (idx, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escape => escape = false,
                '\\' => escape = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '(' | '[' => depth += 1,
            ')' | ']' => {
                if depth == 0 {
                    malformed_bail!("unbalanced `{}` in `{}`", ch, text);
                }
                depth -= 1;
            }
            ',' if depth == 0 => {
                tokens.push(take_piece(text, start, idx)?);
                start = idx + 1;
            }
            _ => {}
        }
    }
    if in_string {
        malformed_bail!("unterminated string literal in `{}`", text);
    }
    if depth != 0 {
        malformed_bail!("unbalanced brackets in `{}`", text);
    }
    tokens.push(take_piece(text, start, text.len())?);
    Ok(tokens)
}

fn take_piece(text: &str, start: usize, end: usize) -> Result<String> {
    let piece = text[start..end].trim();
    if piece.is_empty() {
        malformed_bail!("empty parameter in `{}`", text);
    }
    Ok(piece.to_string())
}
