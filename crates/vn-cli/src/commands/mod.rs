//! Command implementations for the `vn` binary

pub mod assemble;
pub mod common;
pub mod disasm;
pub mod run;

pub use assemble::assemble_command;
pub use disasm::disasm_command;
pub use run::run_command;
