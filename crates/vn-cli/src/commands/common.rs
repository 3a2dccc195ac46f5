use crate::diagnostics::assemble_error;
use crate::{CliError, Result};
use std::path::Path;
use vn_bytecode::{assemble, decode_file, Script, SCRIPT_MAGIC};

/// Name a script after its file stem.
pub fn script_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "script".to_string())
}

/// Read either a binary container or assembler source.
pub fn load_script(path: &Path) -> Result<Script> {
    let bytes = std::fs::read(path).map_err(CliError::Io)?;
    if bytes.starts_with(&SCRIPT_MAGIC) {
        return Ok(decode_file(&bytes)?.script);
    }
    let source = String::from_utf8(bytes).map_err(|_| {
        CliError::InvalidInput(format!(
            "{} is neither a script container nor UTF-8 source",
            path.display()
        ))
    })?;
    assemble_source(path, &source)
}

pub fn assemble_source(path: &Path, source: &str) -> Result<Script> {
    assemble(&script_name(path), source)
        .map_err(|err| assemble_error(&path.display().to_string(), source, err))
}
