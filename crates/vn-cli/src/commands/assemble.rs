//! Assemble text scripts into the binary container.

use crate::commands::common::{assemble_source, script_name};
use crate::{cli::CliConfig, CliError, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Args)]
pub struct AssembleArgs {
    /// Assembler source file
    #[arg(required = true)]
    pub input: PathBuf,

    /// Output file (defaults to the input with a `.vnbc` extension)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Script name stored in the container (defaults to the file stem)
    #[arg(long)]
    pub name: Option<String>,
}

pub fn assemble_command(args: AssembleArgs, _config: &CliConfig) -> Result<()> {
    let source = std::fs::read_to_string(&args.input).map_err(CliError::Io)?;
    let mut script = assemble_source(&args.input, &source)?;
    script.name = args.name.unwrap_or_else(|| script_name(&args.input));

    let output = args
        .output
        .unwrap_or_else(|| args.input.with_extension("vnbc"));
    let bytes = vn_bytecode::encode_file(&script)?;
    std::fs::write(&output, &bytes).map_err(CliError::Io)?;

    info!("wrote {} bytes to {}", bytes.len(), output.display());
    println!(
        "assembled {} instructions into {}",
        script.len(),
        output.display()
    );
    Ok(())
}
