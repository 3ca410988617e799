use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::nutrition::{FoodProfile, MealEntry, NutrientAmounts, NutritionError};

/// A meal row joined with the food it references.
#[derive(Debug, Clone, FromRow)]
pub struct MealRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub food_id: Uuid,
    pub quantity: f64,
    pub date: Date,
    pub created_at: OffsetDateTime,
    pub food_name: String,
    pub food_calories: f64,
    pub food_protein: f64,
    pub food_carbs: f64,
    pub food_fat: f64,
}

impl MealRow {
    pub fn food_profile(&self) -> Result<FoodProfile, NutritionError> {
        FoodProfile::new(
            self.food_name.clone(),
            NutrientAmounts::new(
                self.food_calories,
                self.food_protein,
                self.food_carbs,
                self.food_fat,
            ),
        )
    }

    pub fn into_entry(self) -> Result<MealEntry, NutritionError> {
        Ok(MealEntry {
            food: self.food_profile()?,
            quantity_grams: self.quantity,
            date: self.date,
        })
    }
}

/// Values written by insert and update.
#[derive(Debug, Clone, Copy)]
pub struct MealWrite {
    pub food_id: Uuid,
    pub quantity: f64,
    pub date: Date,
}
