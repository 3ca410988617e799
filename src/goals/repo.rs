use anyhow::Context;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    error::ApiError,
    nutrition::{upsert_goal, Goal, GoalTargets},
};

#[derive(Debug, Clone, FromRow)]
pub struct GoalRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl From<GoalRow> for Goal {
    fn from(r: GoalRow) -> Self {
        Goal {
            id: r.id,
            user_id: r.user_id,
            targets: GoalTargets {
                calories: r.calories,
                protein: r.protein,
                carbs: r.carbs,
                fat: r.fat,
            },
        }
    }
}

pub async fn find_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<Goal>> {
    let row = sqlx::query_as::<_, GoalRow>(
        r#"
        SELECT id, user_id, calories, protein, carbs, fat
          FROM goals
         WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("find goal by user")?;
    Ok(row.map(Goal::from))
}

async fn lock_for_user(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
) -> anyhow::Result<Option<Goal>> {
    let row = sqlx::query_as::<_, GoalRow>(
        r#"
        SELECT id, user_id, calories, protein, carbs, fat
          FROM goals
         WHERE user_id = $1
           FOR UPDATE
        "#,
    )
    .bind(user_id)
    .fetch_optional(&mut **tx)
    .await
    .context("lock goal")?;
    Ok(row.map(Goal::from))
}

/// Creates or overwrites the user's only goal.
///
/// The existing row is locked for the duration of the transaction. Two
/// first-time inserts racing each other are settled by `UNIQUE(user_id)`:
/// the insert does nothing on conflict and the loser re-reads the winner's row
/// and overwrites it.
pub async fn save(db: &PgPool, user_id: Uuid, targets: GoalTargets) -> Result<Goal, ApiError> {
    let mut tx = db.begin().await.context("begin tx")?;

    let existing = lock_for_user(&mut tx, user_id).await?;
    let is_new = existing.is_none();
    let mut goal = upsert_goal(existing, user_id, targets)?;

    if is_new && !insert_tx(&mut tx, &goal).await? {
        let winner = lock_for_user(&mut tx, user_id)
            .await?
            .context("goal vanished after insert conflict")?;
        goal = upsert_goal(Some(winner), user_id, targets)?;
        update_tx(&mut tx, &goal).await?;
    } else if !is_new {
        update_tx(&mut tx, &goal).await?;
    }

    tx.commit().await.context("commit tx")?;
    Ok(goal)
}

async fn insert_tx(tx: &mut Transaction<'_, Postgres>, goal: &Goal) -> anyhow::Result<bool> {
    let res = sqlx::query(
        r#"
        INSERT INTO goals (id, user_id, calories, protein, carbs, fat)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (user_id) DO NOTHING
        "#,
    )
    .bind(goal.id)
    .bind(goal.user_id)
    .bind(goal.targets.calories)
    .bind(goal.targets.protein)
    .bind(goal.targets.carbs)
    .bind(goal.targets.fat)
    .execute(&mut **tx)
    .await
    .context("insert goal")?;
    Ok(res.rows_affected() == 1)
}

async fn update_tx(tx: &mut Transaction<'_, Postgres>, goal: &Goal) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        UPDATE goals
           SET calories = $2, protein = $3, carbs = $4, fat = $5, updated_at = now()
         WHERE id = $1
        "#,
    )
    .bind(goal.id)
    .bind(goal.targets.calories)
    .bind(goal.targets.protein)
    .bind(goal.targets.carbs)
    .bind(goal.targets.fat)
    .execute(&mut **tx)
    .await
    .context("update goal")?;
    Ok(())
}
