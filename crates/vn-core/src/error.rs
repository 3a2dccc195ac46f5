use std::result;
use thiserror::Error;

/// Failures raised while decoding or executing a single instruction.
///
/// None of these are transient: decoding and evaluation are pure functions of
/// the program text and the current live state, so nothing is ever retried.
#[derive(Error, Debug)]
pub enum Error {
    /// Token stream exhausted, a token that does not parse, or a shape mismatch.
    #[error("malformed parameter: {message}")]
    MalformedParameter { message: String },
    #[error("unknown opcode {module}:{opcode}:{overload}")]
    UnknownOpcode { module: u16, opcode: u16, overload: u8 },
    /// An expression read invalid live state (bank index out of range, division by zero).
    #[error("evaluation error: {message}")]
    Evaluation { message: String },
    /// A rendering, audio or text collaborator refused a request.
    #[error("collaborator error: {message}")]
    Collaborator { message: String },
    #[error("Generic error: {0}")]
    Generic(String),
}

impl Error {
    pub fn malformed(message: impl Into<String>) -> Self {
        Error::MalformedParameter {
            message: message.into(),
        }
    }

    pub fn evaluation(message: impl Into<String>) -> Self {
        Error::Evaluation {
            message: message.into(),
        }
    }

    pub fn collaborator(message: impl Into<String>) -> Self {
        Error::Collaborator {
            message: message.into(),
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::MalformedParameter { .. })
    }
}

pub type Result<T> = result::Result<T, Error>;

// Convert from eyre::Report to our Error type
impl From<eyre::Report> for Error {
    fn from(err: eyre::Report) -> Self {
        Error::Generic(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Generic(e.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Generic(s)
    }
}
