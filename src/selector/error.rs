use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SelectorError {
    #[error("softmax temperature must be > 0, got {value}")]
    InvalidTemperature { value: f32 },

    #[error("softmax top_k must be > 0")]
    InvalidTopK,
}

pub type SelectorResult<T> = Result<T, SelectorError>;
