use crate::parser::parse_expression;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

pub const SCRIPT_MAGIC: [u8; 4] = *b"VNBC";
pub const SCRIPT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptFile {
    pub version: u32,
    pub script: Script,
}

/// `(module, opcode, overload)` triple naming one registered handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OpcodeKey {
    pub module: u16,
    pub opcode: u16,
    pub overload: u8,
}

impl OpcodeKey {
    pub const fn new(module: u16, opcode: u16, overload: u8) -> Self {
        Self {
            module,
            opcode,
            overload,
        }
    }
}

impl Display for OpcodeKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.module, self.opcode, self.overload)
    }
}

impl FromStr for OpcodeKey {
    type Err = BytecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || BytecodeError::Format {
            message: format!("invalid opcode key `{}`, expected module:opcode:overload", s),
        };
        let mut parts = s.split(':');
        let (Some(module), Some(opcode), Some(overload), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        Ok(Self {
            module: module.trim().parse().map_err(|_| invalid())?,
            opcode: opcode.trim().parse().map_err(|_| invalid())?,
            overload: overload.trim().parse().map_err(|_| invalid())?,
        })
    }
}

/// One compiled instruction: a handler key and its raw parameter tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub key: OpcodeKey,
    pub params: Vec<String>,
}

impl Instruction {
    pub fn new(key: OpcodeKey, params: Vec<String>) -> Self {
        Self { key, params }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    pub name: String,
    pub instructions: Vec<Instruction>,
}

impl Script {
    pub fn new(name: impl Into<String>, instructions: Vec<Instruction>) -> Self {
        Self {
            name: name.into(),
            instructions,
        }
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum BytecodeError {
    #[error("script encode failed: {0}")]
    Encode(#[from] bincode::Error),
    #[error("script decode failed: {0}")]
    Decode(bincode::Error),
    #[error("script format error: {message}")]
    Format { message: String },
    #[error("line {line}: {message}")]
    Assemble { line: usize, message: String },
}

pub fn encode_file(script: &Script) -> Result<Vec<u8>, BytecodeError> {
    let file = ScriptFile {
        version: SCRIPT_VERSION,
        script: script.clone(),
    };
    let mut encoded = Vec::new();
    encoded.extend_from_slice(&SCRIPT_MAGIC);
    encoded.extend_from_slice(&SCRIPT_VERSION.to_le_bytes());
    encoded.extend_from_slice(&bincode::serialize(&file)?);
    Ok(encoded)
}

pub fn decode_file(bytes: &[u8]) -> Result<ScriptFile, BytecodeError> {
    if bytes.len() < 8 {
        return Err(BytecodeError::Format {
            message: "script header too short".to_string(),
        });
    }
    if bytes[..4] != SCRIPT_MAGIC {
        return Err(BytecodeError::Format {
            message: "invalid script magic".to_string(),
        });
    }
    let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    if version != SCRIPT_VERSION {
        return Err(BytecodeError::Format {
            message: format!(
                "unsupported script version {}, expected {}",
                version, SCRIPT_VERSION
            ),
        });
    }
    let file: ScriptFile = bincode::deserialize(&bytes[8..]).map_err(BytecodeError::Decode)?;
    if file.version != SCRIPT_VERSION {
        return Err(BytecodeError::Format {
            message: format!(
                "script payload version {} does not match expected {}",
                file.version, SCRIPT_VERSION
            ),
        });
    }
    validate_script(&file.script)?;
    Ok(file)
}

fn validate_script(script: &Script) -> Result<(), BytecodeError> {
    for (pc, instruction) in script.instructions.iter().enumerate() {
        for (position, token) in instruction.params.iter().enumerate() {
            parse_expression(token).map_err(|err| BytecodeError::Format {
                message: format!(
                    "instruction {} ({}) parameter {}: {}",
                    pc, instruction.key, position, err
                ),
            })?;
        }
    }
    Ok(())
}

/// Render a script as assembler source; `assemble` reads it back unchanged.
pub fn format_script(script: &Script) -> String {
    let mut output = String::new();
    output.push_str(&format!("# script {}\n", script.name));
    for (pc, instruction) in script.instructions.iter().enumerate() {
        output.push_str(&format!("# {}\n", pc));
        if instruction.params.is_empty() {
            output.push_str(&format!("{}\n", instruction.key));
        } else {
            output.push_str(&format!(
                "{} {}\n",
                instruction.key,
                instruction.params.join(", ")
            ));
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Script {
        Script::new(
            "sample",
            vec![
                Instruction::new(
                    OpcodeKey::new(1, 3, 0),
                    vec!["\"Hello, world\"".to_string()],
                ),
                Instruction::new(OpcodeKey::new(1, 5, 0), vec![]),
            ],
        )
    }

    #[test]
    fn opcode_key_round_trips_through_text() {
        let key: OpcodeKey = "1:102:3".parse().unwrap();
        assert_eq!(key, OpcodeKey::new(1, 102, 3));
        assert_eq!(key.to_string(), "1:102:3");
        assert!("1:2".parse::<OpcodeKey>().is_err());
        assert!("1:2:3:4".parse::<OpcodeKey>().is_err());
        assert!("1:x:3".parse::<OpcodeKey>().is_err());
        assert!("1:2:300".parse::<OpcodeKey>().is_err());
    }

    #[test]
    fn container_starts_with_header() {
        let bytes = encode_file(&sample()).unwrap();
        assert_eq!(&bytes[..4], b"VNBC");
        assert_eq!(&bytes[4..8], &SCRIPT_VERSION.to_le_bytes());
        let file = decode_file(&bytes).unwrap();
        assert_eq!(file.script, sample());
    }

    #[test]
    fn rejects_bad_header() {
        assert!(matches!(
            decode_file(b"VNB"),
            Err(BytecodeError::Format { .. })
        ));
        let mut bytes = encode_file(&sample()).unwrap();
        bytes[0] = b'X';
        assert!(matches!(
            decode_file(&bytes),
            Err(BytecodeError::Format { .. })
        ));
        let mut bytes = encode_file(&sample()).unwrap();
        bytes[4] = 9;
        assert!(decode_file(&bytes).is_err());
    }

    #[test]
    fn rejects_unparseable_tokens() {
        let script = Script::new(
            "bad",
            vec![Instruction::new(
                OpcodeKey::new(0, 0, 0),
                vec!["1 +".to_string()],
            )],
        );
        let bytes = encode_file(&script).unwrap();
        let err = decode_file(&bytes).unwrap_err();
        assert!(err.to_string().contains("instruction 0 (0:0:0) parameter 0"));
    }

    #[test]
    fn listing_joins_tokens() {
        assert_eq!(
            format_script(&sample()),
            "# script sample\n# 0\n1:3:0 \"Hello, world\"\n# 1\n1:5:0\n"
        );
    }
}
