use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{validate_name, CreateCategoryRequest, UpdateCategoryRequest};
use crate::auth::session::CurrentUser;
use crate::state::AppState;
use crate::store::{Category, CategoryUpdate};

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories))
        .route("/categories/:id", get(get_category))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", post(create_category))
        .route(
            "/categories/:id",
            put(update_category).delete(delete_category),
        )
}

#[instrument(skip(state))]
pub async fn list_categories(State(state): State<AppState>) -> Json<Vec<Category>> {
    Json(state.store.list_categories().await)
}

#[instrument(skip(state))]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Category>, (StatusCode, String)> {
    match state.store.category(id).await {
        Some(category) => Ok(Json(category)),
        None => Err((StatusCode::NOT_FOUND, "Category not found".into())),
    }
}

#[instrument(skip(state, user, payload))]
pub async fn create_category(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>), (StatusCode, String)> {
    let name = validate_name(&payload.name).map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;

    if state.store.category_by_name(&name).await.is_some() {
        return Err((StatusCode::CONFLICT, "Category already exists".into()));
    }

    let category = state
        .store
        .insert_category(Category {
            id: Uuid::new_v4(),
            name,
            description: payload.description,
            sort_order: payload.sort_order,
            created_at: OffsetDateTime::now_utc(),
        })
        .await;

    info!(category_id = %category.id, actor = %user.username, "category created");
    Ok((StatusCode::CREATED, Json(category)))
}

#[instrument(skip(state, user, payload))]
pub async fn update_category(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> Result<Json<Category>, (StatusCode, String)> {
    let name = match payload.name {
        Some(ref raw) => {
            let name = validate_name(raw).map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;
            if let Some(existing) = state.store.category_by_name(&name).await {
                if existing.id != id {
                    return Err((StatusCode::CONFLICT, "Category already exists".into()));
                }
            }
            Some(name)
        }
        None => None,
    };

    let updated = state
        .store
        .update_category(
            id,
            CategoryUpdate {
                name,
                description: payload.description,
                sort_order: payload.sort_order,
            },
        )
        .await
        .ok_or((StatusCode::NOT_FOUND, "Category not found".to_string()))?;

    info!(category_id = %updated.id, actor = %user.username, "category updated");
    Ok(Json(updated))
}

#[instrument(skip(state, user))]
pub async fn delete_category(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    if state.store.category(id).await.is_none() {
        return Err((StatusCode::NOT_FOUND, "Category not found".into()));
    }

    let product_count = state.store.product_count_in_category(id).await;
    if product_count > 0 {
        warn!(category_id = %id, product_count, "refusing to delete non-empty category");
        return Err((
            StatusCode::CONFLICT,
            "Category still has products".to_string(),
        ));
    }

    state.store.delete_category(id).await;
    info!(category_id = %id, actor = %user.username, "category deleted");
    Ok(StatusCode::NO_CONTENT)
}
