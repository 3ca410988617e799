use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use super::error::NutritionError;

/// Calories, protein, carbs and fat. Used both for per-100g bases and for
/// absolute amounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientAmounts {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl NutrientAmounts {
    pub fn new(calories: f64, protein: f64, carbs: f64, fat: f64) -> Self {
        Self {
            calories,
            protein,
            carbs,
            fat,
        }
    }

    /// Rejects negative, NaN or infinite fields.
    pub fn validate(&self) -> Result<(), NutritionError> {
        for (field, value) in [
            ("calories", self.calories),
            ("protein", self.protein),
            ("carbs", self.carbs),
            ("fat", self.fat),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(NutritionError::InvalidNutrient { field, value });
            }
        }
        Ok(())
    }

    /// Fails when scaling or summing has overflowed a field.
    pub(crate) fn ensure_finite(self) -> Result<Self, NutritionError> {
        for (field, value) in [
            ("calories", self.calories),
            ("protein", self.protein),
            ("carbs", self.carbs),
            ("fat", self.fat),
        ] {
            if !value.is_finite() {
                return Err(NutritionError::OutOfRange { field });
            }
        }
        Ok(self)
    }

    pub(crate) fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            calories: f(self.calories),
            protein: f(self.protein),
            carbs: f(self.carbs),
            fat: f(self.fat),
        }
    }
}

impl Add for NutrientAmounts {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            calories: self.calories + rhs.calories,
            protein: self.protein + rhs.protein,
            carbs: self.carbs + rhs.carbs,
            fat: self.fat + rhs.fat,
        }
    }
}

impl AddAssign for NutrientAmounts {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// A named food with its nutrients expressed per 100 grams.
#[derive(Debug, Clone, PartialEq)]
pub struct FoodProfile {
    name: String,
    per_100g: NutrientAmounts,
}

impl FoodProfile {
    pub fn new(name: impl Into<String>, per_100g: NutrientAmounts) -> Result<Self, NutritionError> {
        per_100g.validate()?;
        Ok(Self {
            name: name.into(),
            per_100g,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn per_100g(&self) -> NutrientAmounts {
        self.per_100g
    }
}

/// A logged meal whose food has already been resolved by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct MealEntry {
    pub food: FoodProfile,
    pub quantity_grams: f64,
    pub date: Date,
}

/// Daily targets for a user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalTargets {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl GoalTargets {
    pub fn validate(&self) -> Result<(), NutritionError> {
        NutrientAmounts::from(*self).validate()
    }
}

impl From<GoalTargets> for NutrientAmounts {
    fn from(g: GoalTargets) -> Self {
        NutrientAmounts::new(g.calories, g.protein, g.carbs, g.fat)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Goal {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(flatten)]
    pub targets: GoalTargets,
}

/// One line of the per-meal detail list in a summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealContribution {
    pub food: String,
    pub quantity: f64,
    pub calories: f64,
}

/// Whether each total meets its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GoalStatus {
    pub calories: bool,
    pub protein: bool,
    pub carbs: bool,
    pub fat: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GoalComparison {
    pub target_calories: f64,
    pub target_protein: f64,
    pub target_carbs: f64,
    pub target_fat: f64,
    pub status: GoalStatus,
}

/// Nutrient totals for one user on one date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    pub date: Date,
    pub user_id: Uuid,
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fat: f64,
    pub meals: Vec<MealContribution>,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub comparison: Option<GoalComparison>,
}
