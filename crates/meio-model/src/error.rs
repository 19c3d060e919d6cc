use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid {what} parameter: {detail}")]
    InvalidParameter {
        what:   &'static str,
        detail: String,
    },

    #[error("empty {0} sequence")]
    EmptySequence(&'static str),
}

pub type ModelResult<T> = Result<T, ModelError>;
