//! List a script container as assembler source or JSON.

use crate::commands::common::load_script;
use crate::{cli::CliConfig, CliError, Result};
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Clone, Args)]
pub struct DisasmArgs {
    /// Script container or assembler source
    #[arg(required = true)]
    pub input: PathBuf,

    /// Print the script as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn disasm_command(args: DisasmArgs, _config: &CliConfig) -> Result<()> {
    let script = load_script(&args.input)?;
    if args.json {
        let json = serde_json::to_string_pretty(&script)
            .map_err(|e| CliError::InvalidInput(format!("Failed to encode JSON: {}", e)))?;
        println!("{}", json);
    } else {
        print!("{}", vn_bytecode::format_script(&script));
    }
    Ok(())
}
