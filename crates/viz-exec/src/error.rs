use thiserror::Error;
use viz_core::SessionError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterpretError {
    #[error("could not reach collaborator at {url}: {message}")]
    Transport { url: String, message: String },

    #[error("collaborator did not answer within {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    #[error("collaborator returned {code}: {message}")]
    Status { code: u16, message: String },

    #[error("malformed collaborator response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Interpret(#[from] InterpretError),
}
