use std::net::SocketAddr;

use axum::{routing::get, Router};
use time::Duration;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::state::AppState;
use crate::{auth, categories, contact, heroes, products, settings, uploads, users};

pub fn build_app(state: AppState) -> Router {
    // Sessions live server-side in memory, like everything else here; the
    // cookie only carries the id.
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(false)
        .with_expiry(Expiry::OnInactivity(Duration::minutes(
            state.config.session_ttl_minutes,
        )));
    let upload_dir = state.config.upload_dir.clone();

    let admin = Router::new()
        .merge(categories::admin_router())
        .merge(products::admin_router())
        .merge(heroes::admin_router())
        .merge(contact::admin_router())
        .merge(settings::admin_router())
        .merge(users::admin_router());

    let api = Router::new()
        .merge(auth::router())
        .merge(categories::public_router())
        .merge(products::public_router())
        .merge(heroes::public_router())
        .merge(contact::public_router())
        .merge(settings::public_router())
        .route("/health", get(|| async { "ok" }))
        .nest("/admin", admin);

    Router::new()
        .nest("/api", api)
        .nest_service(uploads::PUBLIC_PREFIX, ServeDir::new(upload_dir))
        .with_state(state)
        .layer(session_layer)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
