use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::Food;
use crate::nutrition::FoodProfile;

const FOOD_COLUMNS: &str = "id, user_id, name, calories, protein, carbs, fat, created_at";

pub async fn insert(db: &PgPool, owner: Uuid, food: &FoodProfile) -> sqlx::Result<Food> {
    let n = food.per_100g();
    sqlx::query_as::<_, Food>(&format!(
        r#"
        INSERT INTO foods (user_id, name, calories, protein, carbs, fat)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {FOOD_COLUMNS}
        "#
    ))
    .bind(owner)
    .bind(food.name())
    .bind(n.calories)
    .bind(n.protein)
    .bind(n.carbs)
    .bind(n.fat)
    .fetch_one(db)
    .await
}

/// All foods, optionally filtered by a case-insensitive name fragment.
pub async fn search(db: &PgPool, name: Option<&str>) -> sqlx::Result<Vec<Food>> {
    let pattern = name.map(|n| format!("%{}%", escape_like(n)));
    sqlx::query_as::<_, Food>(&format!(
        r#"
        SELECT {FOOD_COLUMNS}
          FROM foods
         WHERE $1::text IS NULL OR name ILIKE $1
         ORDER BY name ASC
        "#
    ))
    .bind(pattern)
    .fetch_all(db)
    .await
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<Food>> {
    sqlx::query_as::<_, Food>(&format!("SELECT {FOOD_COLUMNS} FROM foods WHERE id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn exists_for_owner(
    db: &PgPool,
    owner: Uuid,
    name: &str,
    except: Option<Uuid>,
) -> sqlx::Result<bool> {
    sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM foods
             WHERE user_id = $1 AND lower(name) = lower($2)
               AND ($3::uuid IS NULL OR id <> $3)
        )
        "#,
    )
    .bind(owner)
    .bind(name)
    .bind(except)
    .fetch_one(db)
    .await
}

/// Updates a food owned by `owner`; `None` when no such food exists for them.
pub async fn update(
    db: &PgPool,
    owner: Uuid,
    id: Uuid,
    food: &FoodProfile,
) -> sqlx::Result<Option<Food>> {
    let n = food.per_100g();
    sqlx::query_as::<_, Food>(&format!(
        r#"
        UPDATE foods
           SET name = $3, calories = $4, protein = $5, carbs = $6, fat = $7
         WHERE id = $1 AND user_id = $2
        RETURNING {FOOD_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(owner)
    .bind(food.name())
    .bind(n.calories)
    .bind(n.protein)
    .bind(n.carbs)
    .bind(n.fat)
    .fetch_optional(db)
    .await
}

pub async fn count_meals_using(db: &PgPool, id: Uuid) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM meals WHERE food_id = $1")
        .bind(id)
        .fetch_one(db)
        .await
}

pub async fn delete(db: &PgPool, owner: Uuid, id: Uuid) -> sqlx::Result<Option<Food>> {
    sqlx::query_as::<_, Food>(&format!(
        "DELETE FROM foods WHERE id = $1 AND user_id = $2 RETURNING {FOOD_COLUMNS}"
    ))
    .bind(id)
    .bind(owner)
    .fetch_optional(db)
    .await
}

fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn food_names_are_unique_per_owner_in_schema() {
        let schema = include_str!("../../migrations/20250301000000_init.sql");
        assert!(schema.contains("UNIQUE INDEX IF NOT EXISTS foods_owner_name_key ON foods (user_id, lower(name))"));
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("rice"), "rice");
        assert_eq!(escape_like("50%_fat"), "50\\%\\_fat");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }
}
