use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::CreateContactRequest;
use crate::auth::session::CurrentUser;
use crate::state::AppState;
use crate::store::ContactRequest;

pub fn public_routes() -> Router<AppState> {
    Router::new().route("/contact", post(create_contact_request))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/contact-requests", get(list_contact_requests))
        .route("/contact-requests/:id/read", put(mark_read))
        .route("/contact-requests/:id", delete(delete_contact_request))
}

#[instrument(skip(state, payload))]
pub async fn create_contact_request(
    State(state): State<AppState>,
    Json(payload): Json<CreateContactRequest>,
) -> Result<(StatusCode, Json<ContactRequest>), (StatusCode, String)> {
    let payload = payload
        .validate()
        .map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;

    let request = state
        .store
        .insert_contact_request(ContactRequest {
            id: Uuid::new_v4(),
            name: payload.name,
            email: payload.email,
            phone: payload.phone,
            message: payload.message,
            read: false,
            created_at: OffsetDateTime::now_utc(),
        })
        .await;

    info!(request_id = %request.id, "contact request received");
    Ok((StatusCode::CREATED, Json(request)))
}

#[instrument(skip(state, _user))]
pub async fn list_contact_requests(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> Json<Vec<ContactRequest>> {
    Json(state.store.list_contact_requests().await)
}

#[instrument(skip(state, user))]
pub async fn mark_read(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ContactRequest>, (StatusCode, String)> {
    let request = state
        .store
        .mark_contact_request_read(id)
        .await
        .ok_or((StatusCode::NOT_FOUND, "Contact request not found".to_string()))?;

    info!(request_id = %id, actor = %user.username, "contact request marked read");
    Ok(Json(request))
}

#[instrument(skip(state, user))]
pub async fn delete_contact_request(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    if !state.store.delete_contact_request(id).await {
        return Err((StatusCode::NOT_FOUND, "Contact request not found".into()));
    }
    info!(request_id = %id, actor = %user.username, "contact request deleted");
    Ok(StatusCode::NO_CONTENT)
}
