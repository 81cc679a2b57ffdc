//! Common error types for kakeibo

use thiserror::Error;

/// Common result type for kakeibo operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the kakeibo crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON data file could not be read or written
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Ingredient is still used by one or more recipes and cannot be deleted
    #[error("Ingredient '{ingredient}' is used by recipe(s): {}", recipes.join(", "))]
    Conflict {
        ingredient: String,
        recipes: Vec<String>,
    },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Shorthand for an `InvalidInput` error
    pub fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidInput(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_message_lists_recipes() {
        let err = Error::Conflict {
            ingredient: "Onion".to_string(),
            recipes: vec!["Curry".to_string(), "Stir-fry".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Ingredient 'Onion' is used by recipe(s): Curry, Stir-fry"
        );
    }
}
