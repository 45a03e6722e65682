use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::HeroImage;
use crate::uploads;

#[derive(Debug, Serialize)]
pub struct HeroResponse {
    pub id: Uuid,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub link_url: Option<String>,
    pub url: String,
    pub sort_order: i32,
    pub active: bool,
}

impl From<HeroImage> for HeroResponse {
    fn from(hero: HeroImage) -> Self {
        Self {
            id: hero.id,
            title: hero.title,
            subtitle: hero.subtitle,
            link_url: hero.link_url,
            url: uploads::public_url(&hero.file_name),
            sort_order: hero.sort_order,
            active: hero.active,
        }
    }
}

/// Body for updating banner metadata; the image itself is immutable, replace
/// the banner to change it.
#[derive(Debug, Deserialize)]
pub struct UpdateHeroRequest {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub link_url: Option<String>,
    pub sort_order: Option<i32>,
    pub active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    #[test]
    fn hero_response_builds_public_url() {
        let hero = HeroImage {
            id: Uuid::new_v4(),
            title: Some("Fresh every morning".to_string()),
            subtitle: None,
            link_url: None,
            file_name: "banner.webp".to_string(),
            sort_order: 0,
            active: true,
            created_at: OffsetDateTime::now_utc(),
        };
        let response = HeroResponse::from(hero);
        assert_eq!(response.url, "/uploads/banner.webp");
        assert!(response.active);
    }
}
