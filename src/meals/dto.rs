use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateMealRequest {
    pub food_id: Uuid,
    /// Grams.
    pub quantity: f64,
    #[serde(default)]
    pub date: Option<Date>,
}

/// Full replacement; a missing date keeps the stored one.
#[derive(Debug, Deserialize)]
pub struct UpdateMealRequest {
    pub food_id: Uuid,
    pub quantity: f64,
    #[serde(default)]
    pub date: Option<Date>,
}

#[derive(Debug, Deserialize)]
pub struct MealFilter {
    pub day: Option<Date>,
}

/// A meal with the nutrients it contributes.
#[derive(Debug, Serialize)]
pub struct MealResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub food_id: Uuid,
    pub food_name: String,
    pub quantity: f64,
    pub date: Date,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub created_at: OffsetDateTime,
}
