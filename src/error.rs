use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AggregateError {
    #[error("Invalid record #{index} (region '{region}'): {reason}")]
    InvalidRecord {
        index: usize,
        region: String,
        reason: String,
    },

    #[error("Empty input: {0}")]
    EmptyInput(String),
}

impl AggregateError {
    /// Point an `InvalidRecord` at its row in the caller's batch.
    pub fn at_index(self, row: usize) -> Self {
        match self {
            AggregateError::InvalidRecord { region, reason, .. } => AggregateError::InvalidRecord {
                index: row,
                region,
                reason,
            },
            other => other,
        }
    }
}

pub type AggregateResult<T> = Result<T, AggregateError>;
