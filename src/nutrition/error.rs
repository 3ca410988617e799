use thiserror::Error;
use time::Date;
use uuid::Uuid;

/// Errors raised while validating or aggregating nutrition data.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NutritionError {
    #[error("quantity must be a positive number of grams, got {quantity}")]
    InvalidQuantity { quantity: f64 },

    #[error("{field} must be a non-negative number, got {value}")]
    InvalidNutrient { field: &'static str, value: f64 },

    #[error("{field} is too large to compute")]
    OutOfRange { field: &'static str },

    #[error("meal dated {found} does not belong to the summary for {expected}")]
    DateMismatch { expected: Date, found: Date },

    #[error("food {id} not found")]
    UnknownFood { id: Uuid },

    #[error("no goal configured for user {user_id}")]
    NoGoalConfigured { user_id: Uuid },
}
