use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod lockout;
pub mod password;
pub mod service;
pub(crate) mod session;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
