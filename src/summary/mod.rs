//! Daily summary endpoint: loads the caller's meals and goal for a date and
//! hands them to the aggregator.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use sqlx::PgPool;
use time::Date;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser,
    error::ApiError,
    goals::repo as goals_repo,
    meals::{repo as meals_repo, services::today},
    nutrition::{compute_daily_summary, require_goal, DailySummary},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub date: Option<Date>,
    #[serde(default)]
    pub require_goal: bool,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/summary", get(get_summary))
}

#[instrument(skip(state))]
pub async fn get_summary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<SummaryQuery>,
) -> Result<Json<DailySummary>, ApiError> {
    let date = q.date.unwrap_or_else(today);
    Ok(Json(
        daily_summary(&state.db, user_id, date, q.require_goal).await?,
    ))
}

pub async fn daily_summary(
    db: &PgPool,
    user_id: Uuid,
    date: Date,
    goal_required: bool,
) -> Result<DailySummary, ApiError> {
    let entries = meals_repo::list_by_user(db, user_id, Some(date))
        .await?
        .into_iter()
        .map(|row| row.into_entry())
        .collect::<Result<Vec<_>, _>>()?;

    let goal = goals_repo::find_by_user(db, user_id).await?;
    let goal = if goal_required {
        Some(require_goal(goal, user_id)?)
    } else {
        goal
    };

    Ok(compute_daily_summary(
        user_id,
        date,
        &entries,
        goal.as_ref().map(|g| &g.targets),
    )?)
}
