use thiserror::Error;
use vn_bytecode::OpcodeKey;

#[derive(Debug, Error)]
pub enum MachineError {
    /// An instruction failed to decode or execute. Never retried.
    #[error("system error at instruction {pc} ({key}): {source}")]
    System {
        pc: usize,
        key: OpcodeKey,
        source: vn_core::Error,
    },
    #[error("operation {name} failed: {source}")]
    Operation {
        name: String,
        source: vn_core::Error,
    },
    #[error("registry error: {message}")]
    Registry { message: String },
}

impl MachineError {
    pub fn registry(message: impl Into<String>) -> Self {
        MachineError::Registry {
            message: message.into(),
        }
    }

    /// The underlying instruction or operation failure, if any.
    pub fn cause(&self) -> Option<&vn_core::Error> {
        match self {
            MachineError::System { source, .. } | MachineError::Operation { source, .. } => {
                Some(source)
            }
            MachineError::Registry { .. } => None,
        }
    }
}
