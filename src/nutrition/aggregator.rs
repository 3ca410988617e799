use time::Date;
use tracing::debug;
use uuid::Uuid;

use super::error::NutritionError;
use super::types::{
    DailySummary, FoodProfile, Goal, GoalComparison, GoalStatus, GoalTargets, MealContribution,
    MealEntry, NutrientAmounts,
};

/// A consumed quantity must be a positive, finite number of grams.
pub fn check_quantity(quantity_grams: f64) -> Result<(), NutritionError> {
    if !quantity_grams.is_finite() || quantity_grams <= 0.0 {
        return Err(NutritionError::InvalidQuantity {
            quantity: quantity_grams,
        });
    }
    Ok(())
}

/// Scales a food's per-100g values to the consumed quantity. No rounding.
pub fn compute_meal_nutrients(
    food: &FoodProfile,
    quantity_grams: f64,
) -> Result<NutrientAmounts, NutritionError> {
    check_quantity(quantity_grams)?;
    food.per_100g()
        .map(|v| v * quantity_grams / 100.0)
        .ensure_finite()
}

/// Aggregates the resolved meals of one user on one date.
///
/// Goal status is evaluated on the exact totals; rounding with [`round2`]
/// only applies to the reported totals and per-meal calories.
pub fn compute_daily_summary(
    user_id: Uuid,
    date: Date,
    entries: &[MealEntry],
    goal: Option<&GoalTargets>,
) -> Result<DailySummary, NutritionError> {
    let mut totals = NutrientAmounts::default();
    let mut meals = Vec::with_capacity(entries.len());

    for entry in entries {
        if entry.date != date {
            return Err(NutritionError::DateMismatch {
                expected: date,
                found: entry.date,
            });
        }
        let amounts = compute_meal_nutrients(&entry.food, entry.quantity_grams)?;
        totals += amounts;
        meals.push(MealContribution {
            food: entry.food.name().to_owned(),
            quantity: entry.quantity_grams,
            calories: round2(amounts.calories),
        });
    }

    let totals = totals.ensure_finite()?;
    let comparison = goal.map(|g| compare_with_goal(&totals, g));
    let rounded = totals.map(round2);
    debug!(%user_id, %date, meals = meals.len(), has_goal = comparison.is_some(), "daily summary computed");

    Ok(DailySummary {
        date,
        user_id,
        total_calories: rounded.calories,
        total_protein: rounded.protein,
        total_carbs: rounded.carbs,
        total_fat: rounded.fat,
        meals,
        comparison,
    })
}

/// Calories, carbs and fat are ceilings; protein is a floor.
pub fn compare_with_goal(totals: &NutrientAmounts, goal: &GoalTargets) -> GoalComparison {
    GoalComparison {
        target_calories: goal.calories,
        target_protein: goal.protein,
        target_carbs: goal.carbs,
        target_fat: goal.fat,
        status: GoalStatus {
            calories: totals.calories <= goal.calories,
            protein: totals.protein >= goal.protein,
            carbs: totals.carbs <= goal.carbs,
            fat: totals.fat <= goal.fat,
        },
    }
}

/// Overwrites the existing goal in place, or creates one bound to `user_id`.
pub fn upsert_goal(
    existing: Option<Goal>,
    user_id: Uuid,
    targets: GoalTargets,
) -> Result<Goal, NutritionError> {
    targets.validate()?;
    Ok(match existing {
        Some(goal) => Goal { targets, ..goal },
        None => Goal {
            id: Uuid::new_v4(),
            user_id,
            targets,
        },
    })
}

pub fn require_goal(goal: Option<Goal>, user_id: Uuid) -> Result<Goal, NutritionError> {
    goal.ok_or(NutritionError::NoGoalConfigured { user_id })
}

/// Rounds to two decimals, half away from zero on the decimal value.
///
/// `12.345` is stored as `12.3449999…`; the scaled value is nudged by a few
/// ulps before rounding so decimal ties land on the upper side. Values too
/// large to scale carry no fractional digits and come back unchanged.
pub fn round2(value: f64) -> f64 {
    let scaled = value * 100.0;
    if !scaled.is_finite() {
        return value;
    }
    let nudged = scaled + scaled.signum() * scaled.abs() * 4.0 * f64::EPSILON;
    nudged.round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn totals(s: &DailySummary) -> NutrientAmounts {
        NutrientAmounts::new(s.total_calories, s.total_protein, s.total_carbs, s.total_fat)
    }

    fn rice() -> FoodProfile {
        FoodProfile::new("rice", NutrientAmounts::new(200.0, 10.0, 30.0, 5.0)).unwrap()
    }

    fn entry(food: FoodProfile, grams: f64) -> MealEntry {
        MealEntry {
            food,
            quantity_grams: grams,
            date: date!(2025 - 03 - 14),
        }
    }

    #[test]
    fn meal_nutrients_scale_per_100g() {
        let n = compute_meal_nutrients(&rice(), 150.0).unwrap();
        assert_eq!(n, NutrientAmounts::new(300.0, 15.0, 45.0, 7.5));
    }

    #[test]
    fn meal_nutrients_are_linear_in_quantity() {
        let food = FoodProfile::new("oats", NutrientAmounts::new(389.0, 16.9, 66.3, 6.9)).unwrap();
        for q in [0.5, 1.0, 33.3, 87.0, 250.0, 1234.5] {
            let single = compute_meal_nutrients(&food, q).unwrap();
            let double = compute_meal_nutrients(&food, q * 2.0).unwrap();
            assert_eq!(double, single.map(|v| v * 2.0), "q = {q}");
        }
    }

    #[test]
    fn meal_nutrients_reject_non_positive_quantity() {
        assert!(check_quantity(0.1).is_ok());
        for q in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(check_quantity(q).is_err(), "q = {q}");
            let err = compute_meal_nutrients(&rice(), q).unwrap_err();
            assert!(matches!(err, NutritionError::InvalidQuantity { .. }), "q = {q}");
        }
    }

    #[test]
    fn meal_nutrients_reject_overflowing_product() {
        let food = FoodProfile::new("dense", NutrientAmounts::new(1e308, 1.0, 1.0, 1.0)).unwrap();
        assert_eq!(
            compute_meal_nutrients(&food, 1e10).unwrap_err(),
            NutritionError::OutOfRange { field: "calories" }
        );
    }

    #[test]
    fn summary_rejects_totals_that_overflow() {
        let food = FoodProfile::new("dense", NutrientAmounts::new(1e306, 0.0, 0.0, 0.0)).unwrap();
        let entries = vec![entry(food, 100.0); 200];
        let err = compute_daily_summary(Uuid::new_v4(), date!(2025 - 03 - 14), &entries, None)
            .unwrap_err();
        assert_eq!(err, NutritionError::OutOfRange { field: "calories" });
    }

    #[test]
    fn summary_rejects_entries_from_another_day() {
        let mut other = entry(rice(), 100.0);
        other.date = date!(2025 - 03 - 15);
        let err = compute_daily_summary(
            Uuid::new_v4(),
            date!(2025 - 03 - 14),
            &[entry(rice(), 100.0), other],
            None,
        )
        .unwrap_err();
        assert!(matches!(err, NutritionError::DateMismatch { .. }));
    }

    #[test]
    fn food_profile_rejects_negative_values() {
        let err = FoodProfile::new("bad", NutrientAmounts::new(100.0, -1.0, 0.0, 0.0)).unwrap_err();
        assert_eq!(
            err,
            NutritionError::InvalidNutrient {
                field: "protein",
                value: -1.0
            }
        );
    }

    #[test]
    fn empty_day_is_all_zero_without_comparison() {
        let s = compute_daily_summary(Uuid::new_v4(), date!(2025 - 03 - 14), &[], None).unwrap();
        assert_eq!(totals(&s), NutrientAmounts::default());
        assert!(s.meals.is_empty());
        assert!(s.comparison.is_none());

        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["total_calories"], 0.0);
        assert_eq!(json["meals"], serde_json::json!([]));
        assert!(json.get("status").is_none());
        assert!(json.get("target_calories").is_none());
    }

    #[test]
    fn split_meals_add_up_to_single_meal() {
        let user = Uuid::new_v4();
        let day = date!(2025 - 03 - 14);
        let split = compute_daily_summary(user, day, &[entry(rice(), 100.0), entry(rice(), 50.0)], None)
            .unwrap();
        let single = compute_daily_summary(user, day, &[entry(rice(), 150.0)], None).unwrap();
        assert_eq!(totals(&split), totals(&single));
        assert_eq!(totals(&split), NutrientAmounts::new(300.0, 15.0, 45.0, 7.5));
        assert_eq!(split.meals.len(), 2);
        assert_eq!(split.meals[1].calories, 100.0);
        assert_eq!(split.meals[1].food, "rice");
        assert_eq!(split.meals[1].quantity, 50.0);
    }

    #[test]
    fn totals_exactly_at_goal_are_compliant() {
        let goal = GoalTargets {
            calories: 300.0,
            protein: 15.0,
            carbs: 45.0,
            fat: 7.5,
        };
        let s = compute_daily_summary(
            Uuid::new_v4(),
            date!(2025 - 03 - 14),
            &[entry(rice(), 150.0)],
            Some(&goal),
        )
        .unwrap();
        let cmp = s.comparison.unwrap();
        assert_eq!(
            cmp.status,
            GoalStatus {
                calories: true,
                protein: true,
                carbs: true,
                fat: true
            }
        );
        assert_eq!(cmp.target_fat, 7.5);
    }

    #[test]
    fn protein_is_a_floor_and_the_rest_are_ceilings() {
        let goal = GoalTargets {
            calories: 250.0,
            protein: 20.0,
            carbs: 100.0,
            fat: 5.0,
        };
        let s = compute_daily_summary(
            Uuid::new_v4(),
            date!(2025 - 03 - 14),
            &[entry(rice(), 150.0)],
            Some(&goal),
        )
        .unwrap();
        let status = s.comparison.unwrap().status;
        assert!(!status.calories);
        assert!(!status.protein);
        assert!(status.carbs);
        assert!(!status.fat);
    }

    #[test]
    fn goal_status_uses_exact_totals_not_displayed_ones() {
        let food =
            FoodProfile::new("shake", NutrientAmounts::new(100.004, 99.996, 0.0, 0.0)).unwrap();
        let goal = GoalTargets {
            calories: 100.0,
            protein: 100.0,
            carbs: 0.0,
            fat: 0.0,
        };
        let s = compute_daily_summary(
            Uuid::new_v4(),
            date!(2025 - 03 - 14),
            &[entry(food, 100.0)],
            Some(&goal),
        )
        .unwrap();
        assert_eq!(s.total_calories, 100.0);
        assert_eq!(s.total_protein, 100.0);
        let status = s.comparison.unwrap().status;
        assert!(!status.calories);
        assert!(!status.protein);
        assert!(status.carbs);
        assert!(status.fat);
    }

    #[test]
    fn goal_fields_serialize_flat() {
        let goal = GoalTargets {
            calories: 2000.0,
            protein: 120.0,
            carbs: 250.0,
            fat: 70.0,
        };
        let s = compute_daily_summary(
            Uuid::new_v4(),
            date!(2025 - 03 - 14),
            &[entry(rice(), 150.0)],
            Some(&goal),
        )
        .unwrap();
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["date"], "2025-03-14");
        assert_eq!(json["target_calories"], 2000.0);
        assert_eq!(json["status"]["protein"], false);
        assert_eq!(json["status"]["calories"], true);
    }

    #[test]
    fn summary_fails_on_invalid_entry() {
        let err = compute_daily_summary(
            Uuid::new_v4(),
            date!(2025 - 03 - 14),
            &[entry(rice(), 100.0), entry(rice(), 0.0)],
            None,
        )
        .unwrap_err();
        assert!(matches!(err, NutritionError::InvalidQuantity { .. }));
    }

    #[test]
    fn rounding_goes_half_up_at_the_boundary() {
        assert_eq!(round2(12.345), 12.35);
        assert_eq!(round2(1.005), 1.01);
        assert_eq!(round2(2.675), 2.68);
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(12.344), 12.34);
        assert_eq!(round2(7.5), 7.5);
        assert_eq!(round2(0.0), 0.0);
        assert_eq!(round2(f64::MAX), f64::MAX);
        assert!(round2(1.7e307).is_finite());
    }

    #[test]
    fn summary_rounds_totals_and_meal_calories() {
        // 123.45 kcal/100g * 10g = 12.345
        let food = FoodProfile::new("nuts", NutrientAmounts::new(123.45, 0.0, 0.0, 0.0)).unwrap();
        let s = compute_daily_summary(Uuid::new_v4(), date!(2025 - 03 - 14), &[entry(food, 10.0)], None)
            .unwrap();
        assert_eq!(s.total_calories, 12.35);
        assert_eq!(s.meals[0].calories, 12.35);
    }

    #[test]
    fn upsert_twice_keeps_one_goal_with_latest_values() {
        let user = Uuid::new_v4();
        let first = GoalTargets {
            calories: 2000.0,
            protein: 100.0,
            carbs: 250.0,
            fat: 70.0,
        };
        let second = GoalTargets {
            calories: 1800.0,
            protein: 140.0,
            carbs: 180.0,
            fat: 60.0,
        };
        let created = upsert_goal(None, user, first).unwrap();
        let updated = upsert_goal(Some(created), user, second).unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.user_id, user);
        assert_eq!(updated.targets, second);
    }

    #[test]
    fn upsert_rejects_negative_targets() {
        let bad = GoalTargets {
            calories: -5.0,
            protein: 0.0,
            carbs: 0.0,
            fat: 0.0,
        };
        assert!(upsert_goal(None, Uuid::new_v4(), bad).is_err());
    }

    #[test]
    fn require_goal_reports_missing_goal() {
        let user = Uuid::new_v4();
        assert_eq!(
            require_goal(None, user).unwrap_err(),
            NutritionError::NoGoalConfigured { user_id: user }
        );
    }
}
