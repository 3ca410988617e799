use sqlx::PgPool;
use time::{Date, OffsetDateTime};
use tracing::warn;
use uuid::Uuid;

use super::{
    dto::MealResponse,
    repo,
    repo_types::{MealRow, MealWrite},
};
use crate::{
    error::ApiError,
    foods::{repo as foods_repo, repo_types::Food},
    nutrition::{check_quantity, compute_meal_nutrients, NutritionError},
};

pub fn to_response(row: MealRow) -> Result<MealResponse, NutritionError> {
    let nutrients = compute_meal_nutrients(&row.food_profile()?, row.quantity)?;
    Ok(MealResponse {
        id: row.id,
        user_id: row.user_id,
        food_id: row.food_id,
        food_name: row.food_name,
        quantity: row.quantity,
        date: row.date,
        calories: nutrients.calories,
        protein: nutrients.protein,
        carbs: nutrients.carbs,
        fat: nutrients.fat,
        created_at: row.created_at,
    })
}

pub fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

pub async fn resolve_food(db: &PgPool, food_id: Uuid) -> Result<Food, ApiError> {
    foods_repo::find_by_id(db, food_id).await?.ok_or_else(|| {
        warn!(%food_id, "meal references unknown food");
        NutritionError::UnknownFood { id: food_id }.into()
    })
}

pub async fn create_meal(
    db: &PgPool,
    user_id: Uuid,
    food_id: Uuid,
    quantity: f64,
    date: Option<Date>,
) -> Result<MealResponse, ApiError> {
    check_quantity(quantity)?;
    resolve_food(db, food_id).await?;

    let write = MealWrite {
        food_id,
        quantity,
        date: date.unwrap_or_else(today),
    };
    let id = repo::insert(db, user_id, write).await?;
    load_meal(db, user_id, id).await
}

pub async fn update_meal(
    db: &PgPool,
    user_id: Uuid,
    meal_id: Uuid,
    food_id: Uuid,
    quantity: f64,
    date: Option<Date>,
) -> Result<MealResponse, ApiError> {
    check_quantity(quantity)?;
    let current = repo::get_for_user(db, user_id, meal_id)
        .await?
        .ok_or_else(meal_not_found)?;

    if current.food_id != food_id {
        resolve_food(db, food_id).await?;
    }

    let write = MealWrite {
        food_id,
        quantity,
        date: date.unwrap_or(current.date),
    };
    if !repo::update(db, user_id, meal_id, write).await? {
        return Err(meal_not_found());
    }
    load_meal(db, user_id, meal_id).await
}

pub async fn load_meal(db: &PgPool, user_id: Uuid, meal_id: Uuid) -> Result<MealResponse, ApiError> {
    let row = repo::get_for_user(db, user_id, meal_id)
        .await?
        .ok_or_else(meal_not_found)?;
    Ok(to_response(row)?)
}

pub fn meal_not_found() -> ApiError {
    ApiError::NotFound("Meal not found".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn row(quantity: f64) -> MealRow {
        MealRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            food_id: Uuid::new_v4(),
            quantity,
            date: date!(2025 - 03 - 14),
            created_at: OffsetDateTime::now_utc(),
            food_name: "lentils".into(),
            food_calories: 116.0,
            food_protein: 9.0,
            food_carbs: 20.0,
            food_fat: 0.4,
        }
    }

    #[test]
    fn response_carries_scaled_nutrients() {
        let res = to_response(row(250.0)).unwrap();
        assert_eq!(res.calories, 290.0);
        assert_eq!(res.protein, 22.5);
        assert_eq!(res.carbs, 50.0);
        assert_eq!(res.food_name, "lentils");
    }

    #[test]
    fn stored_row_with_zero_quantity_is_rejected() {
        assert!(matches!(
            to_response(row(0.0)),
            Err(NutritionError::InvalidQuantity { .. })
        ));
    }
}
