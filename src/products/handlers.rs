use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::dto::{
    validate_name, validate_price, CreateProductRequest, ImageResponse, ProductDetails,
    ProductFilter, UpdateProductRequest,
};
use crate::auth::session::CurrentUser;
use crate::state::AppState;
use crate::store::{Product, ProductImage, ProductUpdate};
use crate::uploads::ext_from_mime;

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/:id", get(get_product))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(admin_list_products).post(create_product))
        .route("/products/:id", put(update_product).delete(delete_product))
        .route("/products/:id/images", post(upload_product_images))
        .route("/product-images/:id", delete(delete_product_image))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB
}

#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Json<Vec<Product>> {
    Json(state.store.list_products(filter.category_id, true).await)
}

#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductDetails>, (StatusCode, String)> {
    let product = state
        .store
        .product(id)
        .await
        .filter(|p| p.active)
        .ok_or((StatusCode::NOT_FOUND, "Product not found".to_string()))?;
    let images = state.store.images_for_product(id).await;
    Ok(Json(ProductDetails::from_parts(product, images)))
}

#[instrument(skip(state, _user))]
pub async fn admin_list_products(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> Json<Vec<Product>> {
    Json(state.store.list_products(None, false).await)
}

#[instrument(skip(state, user, payload))]
pub async fn create_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>), (StatusCode, String)> {
    let name = validate_name(&payload.name).map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;
    validate_price(payload.price_cents).map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;

    if state.store.category(payload.category_id).await.is_none() {
        return Err((StatusCode::BAD_REQUEST, "Unknown category".into()));
    }

    let product = state
        .store
        .insert_product(Product {
            id: Uuid::new_v4(),
            category_id: payload.category_id,
            name,
            description: payload.description,
            price_cents: payload.price_cents,
            active: payload.active,
            created_at: OffsetDateTime::now_utc(),
        })
        .await;

    info!(product_id = %product.id, actor = %user.username, "product created");
    Ok((StatusCode::CREATED, Json(product)))
}

#[instrument(skip(state, user, payload))]
pub async fn update_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<Json<Product>, (StatusCode, String)> {
    let name = match payload.name {
        Some(ref raw) => {
            Some(validate_name(raw).map_err(|msg| (StatusCode::BAD_REQUEST, msg))?)
        }
        None => None,
    };
    if let Some(price_cents) = payload.price_cents {
        validate_price(price_cents).map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;
    }
    if let Some(category_id) = payload.category_id {
        if state.store.category(category_id).await.is_none() {
            return Err((StatusCode::BAD_REQUEST, "Unknown category".into()));
        }
    }

    let updated = state
        .store
        .update_product(
            id,
            ProductUpdate {
                category_id: payload.category_id,
                name,
                description: payload.description,
                price_cents: payload.price_cents,
                active: payload.active,
            },
        )
        .await
        .ok_or((StatusCode::NOT_FOUND, "Product not found".to_string()))?;

    info!(product_id = %updated.id, actor = %user.username, "product updated");
    Ok(Json(updated))
}

#[instrument(skip(state, user))]
pub async fn delete_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    if state.store.product(id).await.is_none() {
        return Err((StatusCode::NOT_FOUND, "Product not found".into()));
    }

    let images = state.store.remove_images_for_product(id).await;
    for image in &images {
        if let Err(e) = state.uploads.remove(&image.file_name).await {
            warn!(error = %e, file = %image.file_name, "failed to remove image file");
        }
    }
    state.store.delete_product(id).await;

    info!(product_id = %id, images = images.len(), actor = %user.username, "product deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /products/:id/images (multipart, field `files` / `files[]`)
#[instrument(skip(state, user, multipart))]
pub async fn upload_product_images(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Vec<ImageResponse>>), (StatusCode, String)> {
    let product = state
        .store
        .product(id)
        .await
        .ok_or((StatusCode::NOT_FOUND, "Product not found".to_string()))?;

    let mut uploaded = Vec::new();
    let mut sort_order = state.store.images_for_product(id).await.len() as i32;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("Invalid multipart body: {e}")))?
    {
        let field_name = field.name().map(|s| s.to_string());
        if !matches!(field_name.as_deref(), Some("files") | Some("files[]")) {
            continue;
        }

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

        let data = field
            .bytes()
            .await
            .map_err(|e| (StatusCode::BAD_REQUEST, format!("Failed to read upload: {e}")))?;
        if data.is_empty() {
            return Err((StatusCode::BAD_REQUEST, "Empty file upload".into()));
        }

        let file_name = state.uploads.save(ext, data).await.map_err(internal)?;
        let image = state
            .store
            .insert_product_image(ProductImage {
                id: Uuid::new_v4(),
                product_id: product.id,
                file_name,
                alt: None,
                sort_order,
                created_at: OffsetDateTime::now_utc(),
            })
            .await;
        sort_order += 1;
        uploaded.push(ImageResponse::from(image));
    }

    if uploaded.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "files[] is required".into()));
    }

    info!(
        product_id = %product.id,
        count = uploaded.len(),
        actor = %user.username,
        "product images uploaded"
    );
    Ok((StatusCode::CREATED, Json(uploaded)))
}

#[instrument(skip(state, user))]
pub async fn delete_product_image(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    let image = state
        .store
        .remove_product_image(id)
        .await
        .ok_or((StatusCode::NOT_FOUND, "Image not found".to_string()))?;

    if let Err(e) = state.uploads.remove(&image.file_name).await {
        warn!(error = %e, file = %image.file_name, "failed to remove image file");
    }

    info!(image_id = %id, actor = %user.username, "product image deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    error!(error = %e, "internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Something went wrong".to_string(),
    )
}
