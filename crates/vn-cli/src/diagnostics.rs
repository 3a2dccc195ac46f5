//! Diagnostic and error reporting utilities

use crate::{CliError, Result};
use miette::{NamedSource, SourceSpan};
use vn_bytecode::BytecodeError;

/// Install miette as the global report handler.
pub fn setup_error_reporting() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(false)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .map_err(|e| CliError::Config(format!("Failed to setup error reporting: {}", e)))?;
    Ok(())
}

/// Attach the offending source line to assembler errors.
pub fn assemble_error(name: &str, source: &str, err: BytecodeError) -> CliError {
    let BytecodeError::Assemble { line, message } = err else {
        return CliError::Bytecode(err);
    };
    CliError::Assemble {
        message: format!("line {}: {}", line, message),
        src: NamedSource::new(name, source.to_string()),
        span: line_span(source, line),
    }
}

fn line_span(source: &str, line: usize) -> SourceSpan {
    let mut offset = 0;
    for (index, text) in source.split_inclusive('\n').enumerate() {
        if index + 1 == line {
            return (offset, text.trim_end().len()).into();
        }
        offset += text.len();
    }
    (source.len(), 0).into()
}

/// Print a failed command through the installed report hook.
pub fn render_cli_error(error: CliError) {
    eprintln!("{:?}", miette::Report::new(error));
}
