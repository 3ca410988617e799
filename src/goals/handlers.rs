use axum::{extract::State, routing::get, Json, Router};
use serde::Deserialize;
use tracing::{info, instrument};

use super::repo;
use crate::{
    auth::jwt::AuthUser,
    error::ApiError,
    nutrition::{require_goal, Goal, GoalTargets},
    state::AppState,
};

/// Daily targets as sent by clients.
#[derive(Debug, Deserialize)]
pub struct GoalRequest {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl From<GoalRequest> for GoalTargets {
    fn from(r: GoalRequest) -> Self {
        GoalTargets {
            calories: r.calories,
            protein: r.protein,
            carbs: r.carbs,
            fat: r.fat,
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/goals", get(get_goal).put(set_goal).post(set_goal))
}

#[instrument(skip(state))]
pub async fn get_goal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Goal>, ApiError> {
    let goal = repo::find_by_user(&state.db, user_id).await?;
    Ok(Json(require_goal(goal, user_id)?))
}

#[instrument(skip(state, body))]
pub async fn set_goal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<GoalRequest>,
) -> Result<Json<Goal>, ApiError> {
    let targets = GoalTargets::from(body);
    targets.validate()?;

    let goal = repo::save(&state.db, user_id, targets).await?;
    info!(%user_id, goal_id = %goal.id, "goal saved");
    Ok(Json(goal))
}
