//! Pure nutrition arithmetic: scaling per-100g values, daily totals and goal
//! comparison. Nothing in here touches the database.

mod aggregator;
mod error;
mod types;

pub use aggregator::{
    check_quantity, compute_daily_summary, compute_meal_nutrients, require_goal, upsert_goal,
};
pub use error::NutritionError;
pub use types::{DailySummary, FoodProfile, Goal, GoalTargets, MealEntry, NutrientAmounts};
