use anyhow::Context;
use sqlx::PgPool;
use time::Date;
use uuid::Uuid;

use super::repo_types::{MealRow, MealWrite};

const SELECT_JOINED: &str = r#"
    SELECT m.id, m.user_id, m.food_id, m.quantity, m.date, m.created_at,
           f.name     AS food_name,
           f.calories AS food_calories,
           f.protein  AS food_protein,
           f.carbs    AS food_carbs,
           f.fat      AS food_fat
      FROM meals m
      JOIN foods f ON f.id = m.food_id
"#;

/// Meals of a user, newest day first, optionally restricted to one day.
pub async fn list_by_user(
    db: &PgPool,
    user_id: Uuid,
    day: Option<Date>,
) -> anyhow::Result<Vec<MealRow>> {
    let rows = sqlx::query_as::<_, MealRow>(&format!(
        r#"{SELECT_JOINED}
         WHERE m.user_id = $1 AND ($2::date IS NULL OR m.date = $2)
         ORDER BY m.date DESC, m.created_at ASC
        "#
    ))
    .bind(user_id)
    .bind(day)
    .fetch_all(db)
    .await
    .context("list meals by user")?;
    Ok(rows)
}

pub async fn get_for_user(
    db: &PgPool,
    user_id: Uuid,
    meal_id: Uuid,
) -> anyhow::Result<Option<MealRow>> {
    let row = sqlx::query_as::<_, MealRow>(&format!(
        "{SELECT_JOINED} WHERE m.id = $1 AND m.user_id = $2"
    ))
    .bind(meal_id)
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("get meal")?;
    Ok(row)
}

pub async fn insert(db: &PgPool, user_id: Uuid, meal: MealWrite) -> anyhow::Result<Uuid> {
    let id = sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO meals (user_id, food_id, quantity, date)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(meal.food_id)
    .bind(meal.quantity)
    .bind(meal.date)
    .fetch_one(db)
    .await
    .context("insert meal")?;
    Ok(id)
}

/// Returns `false` when the meal does not exist for this user.
pub async fn update(
    db: &PgPool,
    user_id: Uuid,
    meal_id: Uuid,
    meal: MealWrite,
) -> anyhow::Result<bool> {
    let res = sqlx::query(
        r#"
        UPDATE meals
           SET food_id = $3, quantity = $4, date = $5
         WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(meal_id)
    .bind(user_id)
    .bind(meal.food_id)
    .bind(meal.quantity)
    .bind(meal.date)
    .execute(db)
    .await
    .context("update meal")?;
    Ok(res.rows_affected() == 1)
}

pub async fn delete(db: &PgPool, user_id: Uuid, meal_id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM meals WHERE id = $1 AND user_id = $2")
        .bind(meal_id)
        .bind(user_id)
        .execute(db)
        .await
        .context("delete meal")?;
    Ok(res.rows_affected() == 1)
}
