use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::Food;
use crate::nutrition::{FoodProfile, NutrientAmounts, NutritionError};

/// Create/replace body; nutrient values are per 100 grams.
#[derive(Debug, Deserialize)]
pub struct FoodRequest {
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl FoodRequest {
    pub fn into_profile(self) -> Result<FoodProfile, NutritionError> {
        FoodProfile::new(
            self.name.trim(),
            NutrientAmounts::new(self.calories, self.protein, self.carbs, self.fat),
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct FoodSearch {
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FoodResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl From<Food> for FoodResponse {
    fn from(f: Food) -> Self {
        Self {
            id: f.id,
            owner_id: f.user_id,
            name: f.name,
            calories: f.calories,
            protein: f.protein,
            carbs: f.carbs,
            fat: f.fat,
        }
    }
}
