use thiserror::Error;

/// Failure taxonomy of a single evaluation call.
///
/// Every stage of the pipeline reports through this type and the caller
/// decides whether to retry, skip or penalize the configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("Invalid parameter {parameter}: {message}")]
    InvalidParameter { parameter: String, message: String },

    #[error("Numerical failure on fold {fold}: {message}")]
    NumericalFailure { fold: usize, message: String },

    #[error("Empty input: {message}")]
    EmptyInput { message: String },
}

impl EvalError {
    pub fn invalid(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    pub fn numerical(fold: usize, message: impl Into<String>) -> Self {
        Self::NumericalFailure {
            fold,
            message: message.into(),
        }
    }

    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, Self::InvalidParameter { .. })
    }

    pub fn is_numerical_failure(&self) -> bool {
        matches!(self, Self::NumericalFailure { .. })
    }
}

/// Outer error type for everything layered around the evaluation call
/// (configuration loading, overrides, objective adapters).
#[derive(Error, Debug)]
pub enum KfError {
    #[error("Evaluation error: {0}")]
    Eval(#[from] EvalError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result of a pipeline stage.
pub type EvalResult<T> = Result<T, EvalError>;

/// Result of an operation at the outer boundary.
pub type KfResult<T> = Result<T, KfError>;

/// Macro for creating invalid-parameter errors
#[macro_export]
macro_rules! invalid_parameter {
    ($param:expr, $($arg:tt)*) => {
        $crate::EvalError::invalid($param, format!($($arg)*))
    };
}

/// Macro for creating configuration errors
#[macro_export]
macro_rules! config_error {
    ($($arg:tt)*) => {
        $crate::KfError::Config(format!($($arg)*))
    };
}
