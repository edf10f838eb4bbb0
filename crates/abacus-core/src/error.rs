use thiserror::Error;

#[derive(Debug, Error)]
pub enum AbacusError {
    #[error("{0}")]
    ValidationRejected(String),

    #[error("arithmetic fault: {0}")]
    Arithmetic(#[from] ArithmeticFault),

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type AbacusResult<T> = Result<T, AbacusError>;

/// Faults raised by the evaluator. The engine never returns these to callers;
/// they become the sticky error state with [`ArithmeticFault::display_text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ArithmeticFault {
    #[error("result is not a finite number")]
    NonFinite,

    #[error("result is out of display range")]
    MagnitudeOverflow,
}

impl ArithmeticFault {
    pub fn display_text(self) -> &'static str {
        match self {
            Self::NonFinite => "ERROR, CLEAR",
            Self::MagnitudeOverflow => "TOO LONG, CLEAR",
        }
    }
}
