use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{FoodRequest, FoodResponse, FoodSearch},
    repo,
    repo_types::Food,
};
use crate::{auth::jwt::AuthUser, error::ApiError, nutrition::FoodProfile, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/foods", get(search_foods).post(create_food))
        .route(
            "/foods/:id",
            get(get_food).put(update_food).delete(delete_food),
        )
}

fn validated(body: FoodRequest) -> Result<FoodProfile, ApiError> {
    if body.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Food name is required".into()));
    }
    Ok(body.into_profile()?)
}

fn food_not_found() -> ApiError {
    ApiError::NotFound("Food not found".into())
}

fn food_in_use() -> ApiError {
    ApiError::Conflict("Food is used by logged meals and cannot be deleted".into())
}

/// Another user's food is reported as missing, never as in use or duplicated.
fn owned_by(food: Option<Food>, user_id: Uuid) -> Result<Food, ApiError> {
    food.filter(|f| f.user_id == user_id).ok_or_else(food_not_found)
}

/// Maps the per-owner name index to 409; the up-front check can lose a race.
fn duplicate_name(e: sqlx::Error) -> ApiError {
    match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            ApiError::Conflict("Food already exists".into())
        }
        other => other.into(),
    }
}

#[instrument(skip(state, body))]
pub async fn create_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<FoodRequest>,
) -> Result<(StatusCode, Json<FoodResponse>), ApiError> {
    let profile = validated(body)?;

    if repo::exists_for_owner(&state.db, user_id, profile.name(), None).await? {
        warn!(%user_id, name = profile.name(), "duplicate food");
        return Err(ApiError::Conflict("Food already exists".into()));
    }

    let food = repo::insert(&state.db, user_id, &profile)
        .await
        .map_err(duplicate_name)?;
    info!(%user_id, food_id = %food.id, "food created");
    Ok((StatusCode::CREATED, Json(food.into())))
}

#[instrument(skip(state))]
pub async fn search_foods(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Query(q): Query<FoodSearch>,
) -> Result<Json<Vec<FoodResponse>>, ApiError> {
    let name = q.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
    let foods = repo::search(&state.db, name).await?;
    Ok(Json(foods.into_iter().map(FoodResponse::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_food(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<FoodResponse>, ApiError> {
    repo::find_by_id(&state.db, id)
        .await?
        .map(|f| Json(f.into()))
        .ok_or_else(food_not_found)
}

#[instrument(skip(state, body))]
pub async fn update_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<FoodRequest>,
) -> Result<Json<FoodResponse>, ApiError> {
    let profile = validated(body)?;

    if repo::exists_for_owner(&state.db, user_id, profile.name(), Some(id)).await? {
        return Err(ApiError::Conflict("Food already exists".into()));
    }

    let food = repo::update(&state.db, user_id, id, &profile)
        .await
        .map_err(duplicate_name)?
        .ok_or_else(food_not_found)?;
    info!(%user_id, food_id = %food.id, "food updated");
    Ok(Json(food.into()))
}

#[instrument(skip(state))]
pub async fn delete_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<FoodResponse>, ApiError> {
    owned_by(repo::find_by_id(&state.db, id).await?, user_id)?;

    if repo::count_meals_using(&state.db, id).await? > 0 {
        return Err(food_in_use());
    }

    let food = repo::delete(&state.db, user_id, id)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => food_in_use(),
            other => other.into(),
        })?
        .ok_or_else(food_not_found)?;
    info!(%user_id, food_id = %food.id, "food deleted");
    Ok(Json(food.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn food(owner: Uuid) -> Food {
        Food {
            id: Uuid::new_v4(),
            user_id: owner,
            name: "rice".into(),
            calories: 130.0,
            protein: 2.7,
            carbs: 28.0,
            fat: 0.3,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn someone_elses_food_is_not_found() {
        let owner = Uuid::new_v4();
        let err = owned_by(Some(food(owner)), Uuid::new_v4()).unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            owned_by(None, owner).unwrap_err().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(owned_by(Some(food(owner)), owner).unwrap().user_id, owner);
    }

    #[test]
    fn non_constraint_errors_stay_server_errors() {
        assert_eq!(
            duplicate_name(sqlx::Error::RowNotFound).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    fn body(name: &str, protein: f64) -> FoodRequest {
        FoodRequest {
            name: name.into(),
            calories: 130.0,
            protein,
            carbs: 28.0,
            fat: 0.3,
        }
    }

    #[test]
    fn validated_trims_name() {
        let profile = validated(body("  rice ", 2.7)).unwrap();
        assert_eq!(profile.name(), "rice");
        assert_eq!(profile.per_100g().protein, 2.7);
    }

    #[test]
    fn validated_rejects_blank_name_and_negative_values() {
        assert_eq!(
            validated(body("   ", 2.7)).unwrap_err().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            validated(body("rice", -2.7)).unwrap_err().status(),
            StatusCode::BAD_REQUEST
        );
    }
}
