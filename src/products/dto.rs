use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::store::{Product, ProductImage};
use crate::uploads;

#[derive(Debug, Deserialize)]
pub struct ProductFilter {
    pub category_id: Option<Uuid>,
}

/// Body for creating a product.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub category_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Body for updating a product; absent fields stay unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub category_id: Option<Uuid>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ImageResponse {
    pub id: Uuid,
    pub url: String,
    pub alt: Option<String>,
    pub sort_order: i32,
}

impl From<ProductImage> for ImageResponse {
    fn from(image: ProductImage) -> Self {
        Self {
            id: image.id,
            url: uploads::public_url(&image.file_name),
            alt: image.alt,
            sort_order: image.sort_order,
        }
    }
}

/// One product with its gallery, as served by the detail endpoint.
#[derive(Debug, Serialize)]
pub struct ProductDetails {
    pub id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub active: bool,
    pub created_at: OffsetDateTime,
    pub images: Vec<ImageResponse>,
}

impl ProductDetails {
    pub fn from_parts(product: Product, images: Vec<ProductImage>) -> Self {
        Self {
            id: product.id,
            category_id: product.category_id,
            name: product.name,
            description: product.description,
            price_cents: product.price_cents,
            active: product.active,
            created_at: product.created_at,
            images: images.into_iter().map(ImageResponse::from).collect(),
        }
    }
}

pub fn validate_name(name: &str) -> Result<String, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Product name is required".to_string());
    }
    if name.len() > 120 {
        return Err("Product name must be at most 120 characters".to_string());
    }
    Ok(name.to_string())
}

pub fn validate_price(price_cents: i64) -> Result<(), String> {
    if price_cents < 0 {
        return Err("Price must not be negative".to_string());
    }
    Ok(())
}
