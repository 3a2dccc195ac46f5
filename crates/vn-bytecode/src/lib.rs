//! Compiled script representation and the typed parameter-decoding framework.
//!
//! An [`Instruction`] stores its parameters as raw tokens. At dispatch time a
//! [`ParameterList`] walks them with a [`TokenStream`], parsing every token into
//! an [`Expression`] and evaluating the expressions against [`LiveState`] into
//! [`DecodedValue`]s.

pub mod assembler;
pub mod descriptor;
pub mod expr;
pub mod params;
mod parser;
pub mod script;
pub mod token;
pub mod value;

pub use assembler::assemble;
pub use descriptor::{RectConvention, TypeDescriptor};
pub use expr::{BinaryOp, Expression, IntBank, LiveState, StrBank, UnaryOp};
pub use params::{ParameterList, ParsedParameters};
pub use parser::parse_expression;
pub use script::{
    decode_file, encode_file, format_script, BytecodeError, Instruction, OpcodeKey, Script,
    ScriptFile, SCRIPT_MAGIC, SCRIPT_VERSION,
};
pub use token::{split_raw_parameters, TokenStream};
pub use value::{DecodedValue, FromParams, FromValue, IntLocation};
