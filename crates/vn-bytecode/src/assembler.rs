//! Line-oriented text form of a [`Script`].
//!
//! Each non-blank line is `module:opcode:overload` followed by the raw
//! parameter text, split at top-level commas. Lines starting with `#` or `;`
//! are comments.

use crate::parser::parse_expression;
use crate::script::{BytecodeError, Instruction, OpcodeKey, Script};
use crate::token::split_raw_parameters;

pub fn assemble(name: &str, source: &str) -> Result<Script, BytecodeError> {
    let mut instructions = Vec::new();
    for (index, line) in source.lines().enumerate() {
        let line_no = index + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        let (key_text, rest) = match line.split_once(char::is_whitespace) {
            Some((key, rest)) => (key, rest),
            None => (line, ""),
        };
        let key: OpcodeKey = key_text
            .parse()
            .map_err(|err: BytecodeError| assemble_error(line_no, err.to_string()))?;
        let params =
            split_raw_parameters(rest).map_err(|err| assemble_error(line_no, err.to_string()))?;
        for token in &params {
            parse_expression(token).map_err(|err| assemble_error(line_no, err.to_string()))?;
        }
        instructions.push(Instruction::new(key, params));
    }
    Ok(Script::new(name, instructions))
}

fn assemble_error(line: usize, message: String) -> BytecodeError {
    BytecodeError::Assemble { line, message }
}
