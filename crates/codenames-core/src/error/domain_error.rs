//! Domain errors - error types for the domain layer

use thiserror::Error;

/// Domain layer errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    // =========================================================================
    // Capacity Errors (board generation)
    // =========================================================================
    #[error("Word pool too small: board needs {required} words, pool has {available}")]
    InsufficientWords { required: usize, available: usize },

    #[error("Board overflow: {required} assigned cells requested on a board of {cells}")]
    BoardOverflow { required: usize, cells: usize },

    #[error("Board size must be non-zero")]
    EmptyBoard,

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Turn order must contain each team colour exactly once")]
    InvalidTurnOrder,

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::InsufficientWords { .. } => "INSUFFICIENT_WORDS",
            Self::BoardOverflow { .. } => "BOARD_OVERFLOW",
            Self::EmptyBoard => "EMPTY_BOARD",
            Self::InvalidTurnOrder => "INVALID_TURN_ORDER",
            Self::ValidationError(_) => "VALIDATION_ERROR",
        }
    }

    /// Check if the board could not be seeded with the requested counts
    pub fn is_capacity(&self) -> bool {
        matches!(
            self,
            Self::InsufficientWords { .. } | Self::BoardOverflow { .. } | Self::EmptyBoard
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidTurnOrder | Self::ValidationError(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = DomainError::InsufficientWords { required: 25, available: 3 };
        assert_eq!(err.code(), "INSUFFICIENT_WORDS");
        assert_eq!(DomainError::InvalidTurnOrder.code(), "INVALID_TURN_ORDER");
    }

    #[test]
    fn test_classification() {
        assert!(DomainError::BoardOverflow { required: 30, cells: 25 }.is_capacity());
        assert!(DomainError::EmptyBoard.is_capacity());
        assert!(!DomainError::InvalidTurnOrder.is_capacity());
        assert!(DomainError::InvalidTurnOrder.is_validation());
    }

    #[test]
    fn test_error_display() {
        let err = DomainError::InsufficientWords { required: 9, available: 4 };
        assert_eq!(
            err.to_string(),
            "Word pool too small: board needs 9 words, pool has 4"
        );
    }
}
