use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::dto::{HeroResponse, UpdateHeroRequest};
use crate::auth::session::CurrentUser;
use crate::state::AppState;
use crate::store::{HeroImage, HeroImageUpdate};
use crate::uploads::ext_from_mime;

pub fn public_routes() -> Router<AppState> {
    Router::new().route("/hero-images", get(list_active_heroes))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/hero-images", get(admin_list_heroes).post(create_hero))
        .route("/hero-images/:id", put(update_hero).delete(delete_hero))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB
}

#[instrument(skip(state))]
pub async fn list_active_heroes(State(state): State<AppState>) -> Json<Vec<HeroResponse>> {
    let heroes = state.store.list_hero_images(true).await;
    Json(heroes.into_iter().map(HeroResponse::from).collect())
}

#[instrument(skip(state, _user))]
pub async fn admin_list_heroes(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> Json<Vec<HeroResponse>> {
    let heroes = state.store.list_hero_images(false).await;
    Json(heroes.into_iter().map(HeroResponse::from).collect())
}

/// POST /hero-images (multipart: one `file` plus optional text fields
/// `title`, `subtitle`, `link_url`, `sort_order`)
#[instrument(skip(state, user, multipart))]
pub async fn create_hero(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<HeroResponse>), (StatusCode, String)> {
    let mut file: Option<(String, bytes::Bytes)> = None;
    let mut title = None;
    let mut subtitle = None;
    let mut link_url = None;
    let mut sort_order = 0i32;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("Invalid multipart body: {e}")))?
    {
        let field_name = field.name().map(|s| s.to_string());
        match field_name.as_deref() {
            Some("file") => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".into());
                let Some(ext) = ext_from_mime(&content_type) else {
                    return Err((
                        StatusCode::BAD_REQUEST,
                        format!("Unsupported image type: {content_type}"),
                    ));
                };
                let data = field.bytes().await.map_err(|e| {
                    (StatusCode::BAD_REQUEST, format!("Failed to read upload: {e}"))
                })?;
                if data.is_empty() {
                    return Err((StatusCode::BAD_REQUEST, "Empty file upload".into()));
                }
                file = Some((ext.to_string(), data));
            }
            Some("title") => title = read_text(field).await?,
            Some("subtitle") => subtitle = read_text(field).await?,
            Some("link_url") => link_url = read_text(field).await?,
            Some("sort_order") => {
                if let Some(raw) = read_text(field).await? {
                    sort_order = raw.parse::<i32>().map_err(|_| {
                        (
                            StatusCode::BAD_REQUEST,
                            "sort_order must be an integer".to_string(),
                        )
                    })?;
                }
            }
            _ => continue,
        }
    }

    let Some((ext, data)) = file else {
        return Err((StatusCode::BAD_REQUEST, "file is required".into()));
    };

    let file_name = state.uploads.save(&ext, data).await.map_err(internal)?;
    let hero = state
        .store
        .insert_hero_image(HeroImage {
            id: Uuid::new_v4(),
            title,
            subtitle,
            link_url,
            file_name,
            sort_order,
            active: true,
            created_at: OffsetDateTime::now_utc(),
        })
        .await;

    info!(hero_id = %hero.id, actor = %user.username, "hero image created");
    Ok((StatusCode::CREATED, Json(HeroResponse::from(hero))))
}

#[instrument(skip(state, user, payload))]
pub async fn update_hero(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateHeroRequest>,
) -> Result<Json<HeroResponse>, (StatusCode, String)> {
    let updated = state
        .store
        .update_hero_image(
            id,
            HeroImageUpdate {
                title: payload.title,
                subtitle: payload.subtitle,
                link_url: payload.link_url,
                sort_order: payload.sort_order,
                active: payload.active,
            },
        )
        .await
        .ok_or((StatusCode::NOT_FOUND, "Hero image not found".to_string()))?;

    info!(hero_id = %id, actor = %user.username, "hero image updated");
    Ok(Json(HeroResponse::from(updated)))
}

#[instrument(skip(state, user))]
pub async fn delete_hero(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    let hero = state
        .store
        .remove_hero_image(id)
        .await
        .ok_or((StatusCode::NOT_FOUND, "Hero image not found".to_string()))?;

    if let Err(e) = state.uploads.remove(&hero.file_name).await {
        warn!(error = %e, file = %hero.file_name, "failed to remove hero file");
    }

    info!(hero_id = %id, actor = %user.username, "hero image deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Reads a text field, mapping empty strings to `None`.
async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<Option<String>, (StatusCode, String)> {
    let value = field
        .text()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("Failed to read field: {e}")))?;
    let value = value.trim().to_string();
    Ok(if value.is_empty() { None } else { Some(value) })
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    error!(error = %e, "internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Something went wrong".to_string(),
    )
}
