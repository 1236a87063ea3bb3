use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmpresasError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("incorrect admin password")]
    Unauthorized,

    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type EmpresasResult<T> = Result<T, EmpresasError>;

/// Rejected client input. `index` is set when the offending value is one
/// element of a submitted list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub index: Option<usize>,
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            index: None,
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn at(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(i) => write!(f, "item {i}: {} {}", self.field, self.reason),
            None => write!(f, "{} {}", self.field, self.reason),
        }
    }
}

impl std::error::Error for ValidationError {}
