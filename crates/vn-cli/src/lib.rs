//! Command-line front end for the script machine: assemble text scripts
//! into the binary container, list them back, and run them headlessly.

pub mod cli;
pub mod commands;
pub mod diagnostics;

pub mod error {
    use miette::{Diagnostic, NamedSource, SourceSpan};
    use thiserror::Error;
    use vn_bytecode::BytecodeError;
    use vn_machine::MachineError;

    #[derive(Error, Debug, Diagnostic)]
    pub enum CliError {
        #[error("IO error: {0}")]
        #[diagnostic(code(vn::io))]
        Io(#[from] std::io::Error),

        #[error("Configuration error: {0}")]
        #[diagnostic(code(vn::config), help("check the [machine] and [run] tables of vn.toml"))]
        Config(String),

        #[error("Assembly failed: {message}")]
        #[diagnostic(code(vn::assemble))]
        Assemble {
            message: String,
            #[source_code]
            src: NamedSource<String>,
            #[label("here")]
            span: SourceSpan,
        },

        #[error(transparent)]
        #[diagnostic(code(vn::bytecode))]
        Bytecode(#[from] BytecodeError),

        #[error(transparent)]
        #[diagnostic(code(vn::machine), help("the failing instruction was not executed"))]
        Machine(#[from] MachineError),

        #[error("Invalid input: {0}")]
        #[diagnostic(code(vn::input))]
        InvalidInput(String),
    }

    pub type Result<T> = std::result::Result<T, CliError>;
}

pub use error::{CliError, Result};
