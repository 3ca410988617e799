use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::nutrition::NutritionError;

/// Error type returned by every HTTP handler.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Nutrition(#[from] NutritionError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Nutrition(e) => match e {
                NutritionError::InvalidQuantity { .. }
                | NutritionError::InvalidNutrient { .. }
                | NutritionError::OutOfRange { .. } => StatusCode::BAD_REQUEST,
                NutritionError::UnknownFood { .. } | NutritionError::NoGoalConfigured { .. } => {
                    StatusCode::NOT_FOUND
                }
                NutritionError::DateMismatch { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
            return (status, "Internal server error".to_string()).into_response();
        }
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn nutrition_errors_map_to_client_statuses() {
        let bad = ApiError::from(NutritionError::InvalidQuantity { quantity: 0.0 });
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

        let missing = ApiError::from(NutritionError::UnknownFood { id: Uuid::new_v4() });
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let no_goal = ApiError::from(NutritionError::NoGoalConfigured {
            user_id: Uuid::new_v4(),
        });
        assert_eq!(no_goal.status(), StatusCode::NOT_FOUND);

        let huge = ApiError::from(NutritionError::OutOfRange { field: "calories" });
        assert_eq!(huge.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn mixed_dates_are_a_server_fault() {
        let err = ApiError::from(NutritionError::DateMismatch {
            expected: time::macros::date!(2025 - 03 - 14),
            found: time::macros::date!(2025 - 03 - 15),
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn internal_errors_hide_details() {
        let res = ApiError::from(anyhow::anyhow!("secret connection string")).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
