use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
/// Quality gate misconfiguration.
pub enum QualityError {
    #[error("quality threshold {value} is outside [0, 1]")]
    InvalidThreshold { value: f32 },

    #[error("invalid {field} length bounds: max {max} is below min {min}")]
    InvalidBounds {
        field: &'static str,
        min: usize,
        max: usize,
    },
}

pub type QualityResult<T> = Result<T, QualityError>;
