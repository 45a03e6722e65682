use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Admin account role. `SuperAdmin` unlocks user management.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Admin,
}

/// Admin account record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, not exposed in JSON
    pub role: Role,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub sort_order: i32,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: Uuid,
    pub category_id: Uuid, // application-level reference, not enforced here
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub active: bool,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductImage {
    pub id: Uuid,
    pub product_id: Uuid,
    pub file_name: String,
    pub alt: Option<String>,
    pub sort_order: i32,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeroImage {
    pub id: Uuid,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub link_url: Option<String>,
    pub file_name: String,
    pub sort_order: i32,
    pub active: bool,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactRequest {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub read: bool,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Default)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Default)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Default)]
pub struct ProductUpdate {
    pub category_id: Option<Uuid>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub active: Option<bool>,
}

#[derive(Debug, Default)]
pub struct HeroImageUpdate {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub link_url: Option<String>,
    pub sort_order: Option<i32>,
    pub active: Option<bool>,
}

/// In-memory storage for every collection the site serves. All state is
/// process-local and lost on restart; uploaded files on disk are the only
/// thing that survives.
#[derive(Clone, Default)]
pub struct Store {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    users: RwLock<HashMap<Uuid, User>>,
    categories: RwLock<HashMap<Uuid, Category>>,
    products: RwLock<HashMap<Uuid, Product>>,
    product_images: RwLock<HashMap<Uuid, ProductImage>>,
    hero_images: RwLock<HashMap<Uuid, HeroImage>>,
    contact_requests: RwLock<HashMap<Uuid, ContactRequest>>,
    settings: RwLock<HashMap<String, String>>,
}

// ---- Users ----

impl Store {
    pub async fn insert_user(&self, user: User) -> User {
        self.inner.users.write().await.insert(user.id, user.clone());
        user
    }

    pub async fn user(&self, id: Uuid) -> Option<User> {
        self.inner.users.read().await.get(&id).cloned()
    }

    pub async fn user_by_username(&self, username: &str) -> Option<User> {
        self.inner
            .users
            .read()
            .await
            .values()
            .find(|u| u.username == username)
            .cloned()
    }

    pub async fn list_users(&self) -> Vec<User> {
        let mut users: Vec<User> = self.inner.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.username.cmp(&b.username)));
        users
    }

    pub async fn update_user(&self, id: Uuid, update: UserUpdate) -> Option<User> {
        let mut users = self.inner.users.write().await;
        let user = users.get_mut(&id)?;
        if let Some(username) = update.username {
            user.username = username;
        }
        if let Some(password_hash) = update.password_hash {
            user.password_hash = password_hash;
        }
        if let Some(role) = update.role {
            user.role = role;
        }
        Some(user.clone())
    }

    pub async fn delete_user(&self, id: Uuid) -> bool {
        self.inner.users.write().await.remove(&id).is_some()
    }
}

// ---- Categories ----

impl Store {
    pub async fn insert_category(&self, category: Category) -> Category {
        self.inner
            .categories
            .write()
            .await
            .insert(category.id, category.clone());
        category
    }

    pub async fn category(&self, id: Uuid) -> Option<Category> {
        self.inner.categories.read().await.get(&id).cloned()
    }

    /// Case-insensitive name lookup, used for uniqueness checks.
    pub async fn category_by_name(&self, name: &str) -> Option<Category> {
        self.inner
            .categories
            .read()
            .await
            .values()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .cloned()
    }

    pub async fn list_categories(&self) -> Vec<Category> {
        let mut categories: Vec<Category> =
            self.inner.categories.read().await.values().cloned().collect();
        categories.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.name.cmp(&b.name)));
        categories
    }

    pub async fn update_category(&self, id: Uuid, update: CategoryUpdate) -> Option<Category> {
        let mut categories = self.inner.categories.write().await;
        let category = categories.get_mut(&id)?;
        if let Some(name) = update.name {
            category.name = name;
        }
        if let Some(description) = update.description {
            category.description = Some(description);
        }
        if let Some(sort_order) = update.sort_order {
            category.sort_order = sort_order;
        }
        Some(category.clone())
    }

    pub async fn delete_category(&self, id: Uuid) -> bool {
        self.inner.categories.write().await.remove(&id).is_some()
    }

    pub async fn product_count_in_category(&self, category_id: Uuid) -> usize {
        self.inner
            .products
            .read()
            .await
            .values()
            .filter(|p| p.category_id == category_id)
            .count()
    }
}

// ---- Products ----

impl Store {
    pub async fn insert_product(&self, product: Product) -> Product {
        self.inner
            .products
            .write()
            .await
            .insert(product.id, product.clone());
        product
    }

    pub async fn product(&self, id: Uuid) -> Option<Product> {
        self.inner.products.read().await.get(&id).cloned()
    }

    /// Newest first, optionally narrowed to one category and/or active products.
    pub async fn list_products(&self, category_id: Option<Uuid>, only_active: bool) -> Vec<Product> {
        let mut products: Vec<Product> = self
            .inner
            .products
            .read()
            .await
            .values()
            .filter(|p| category_id.map_or(true, |c| p.category_id == c))
            .filter(|p| !only_active || p.active)
            .cloned()
            .collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.name.cmp(&b.name)));
        products
    }

    pub async fn update_product(&self, id: Uuid, update: ProductUpdate) -> Option<Product> {
        let mut products = self.inner.products.write().await;
        let product = products.get_mut(&id)?;
        if let Some(category_id) = update.category_id {
            product.category_id = category_id;
        }
        if let Some(name) = update.name {
            product.name = name;
        }
        if let Some(description) = update.description {
            product.description = Some(description);
        }
        if let Some(price_cents) = update.price_cents {
            product.price_cents = price_cents;
        }
        if let Some(active) = update.active {
            product.active = active;
        }
        Some(product.clone())
    }

    pub async fn delete_product(&self, id: Uuid) -> bool {
        self.inner.products.write().await.remove(&id).is_some()
    }
}

// ---- Product images ----

impl Store {
    pub async fn insert_product_image(&self, image: ProductImage) -> ProductImage {
        self.inner
            .product_images
            .write()
            .await
            .insert(image.id, image.clone());
        image
    }

    pub async fn images_for_product(&self, product_id: Uuid) -> Vec<ProductImage> {
        let mut images: Vec<ProductImage> = self
            .inner
            .product_images
            .read()
            .await
            .values()
            .filter(|i| i.product_id == product_id)
            .cloned()
            .collect();
        images.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.created_at.cmp(&b.created_at)));
        images
    }

    /// Removes the record and hands it back so the caller can delete the file.
    pub async fn remove_product_image(&self, id: Uuid) -> Option<ProductImage> {
        self.inner.product_images.write().await.remove(&id)
    }

    pub async fn remove_images_for_product(&self, product_id: Uuid) -> Vec<ProductImage> {
        let mut images = self.inner.product_images.write().await;
        let ids: Vec<Uuid> = images
            .values()
            .filter(|i| i.product_id == product_id)
            .map(|i| i.id)
            .collect();
        ids.into_iter().filter_map(|id| images.remove(&id)).collect()
    }
}

// ---- Hero images ----

impl Store {
    pub async fn insert_hero_image(&self, hero: HeroImage) -> HeroImage {
        self.inner
            .hero_images
            .write()
            .await
            .insert(hero.id, hero.clone());
        hero
    }

    pub async fn list_hero_images(&self, only_active: bool) -> Vec<HeroImage> {
        let mut heroes: Vec<HeroImage> = self
            .inner
            .hero_images
            .read()
            .await
            .values()
            .filter(|h| !only_active || h.active)
            .cloned()
            .collect();
        heroes.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.created_at.cmp(&b.created_at)));
        heroes
    }

    pub async fn update_hero_image(&self, id: Uuid, update: HeroImageUpdate) -> Option<HeroImage> {
        let mut heroes = self.inner.hero_images.write().await;
        let hero = heroes.get_mut(&id)?;
        if let Some(title) = update.title {
            hero.title = Some(title);
        }
        if let Some(subtitle) = update.subtitle {
            hero.subtitle = Some(subtitle);
        }
        if let Some(link_url) = update.link_url {
            hero.link_url = Some(link_url);
        }
        if let Some(sort_order) = update.sort_order {
            hero.sort_order = sort_order;
        }
        if let Some(active) = update.active {
            hero.active = active;
        }
        Some(hero.clone())
    }

    pub async fn remove_hero_image(&self, id: Uuid) -> Option<HeroImage> {
        self.inner.hero_images.write().await.remove(&id)
    }
}

// ---- Contact requests ----

impl Store {
    pub async fn insert_contact_request(&self, request: ContactRequest) -> ContactRequest {
        self.inner
            .contact_requests
            .write()
            .await
            .insert(request.id, request.clone());
        request
    }

    pub async fn list_contact_requests(&self) -> Vec<ContactRequest> {
        let mut requests: Vec<ContactRequest> = self
            .inner
            .contact_requests
            .read()
            .await
            .values()
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        requests
    }

    pub async fn mark_contact_request_read(&self, id: Uuid) -> Option<ContactRequest> {
        let mut requests = self.inner.contact_requests.write().await;
        let request = requests.get_mut(&id)?;
        request.read = true;
        Some(request.clone())
    }

    pub async fn delete_contact_request(&self, id: Uuid) -> bool {
        self.inner.contact_requests.write().await.remove(&id).is_some()
    }
}

// ---- Settings ----

impl Store {
    pub async fn settings(&self) -> HashMap<String, String> {
        self.inner.settings.read().await.clone()
    }

    /// Merge-upsert: existing keys are overwritten, absent keys are kept.
    pub async fn merge_settings(&self, values: HashMap<String, String>) -> HashMap<String, String> {
        let mut settings = self.inner.settings.write().await;
        settings.extend(values);
        settings.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(name: &str, sort_order: i32) -> Category {
        Category {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            sort_order,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    fn product(category_id: Uuid, name: &str, active: bool) -> Product {
        Product {
            id: Uuid::new_v4(),
            category_id,
            name: name.to_string(),
            description: None,
            price_cents: 1000,
            active,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    fn image(product_id: Uuid, sort_order: i32) -> ProductImage {
        ProductImage {
            id: Uuid::new_v4(),
            product_id,
            file_name: format!("{}.jpg", Uuid::new_v4()),
            alt: None,
            sort_order,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[tokio::test]
    async fn categories_sort_by_sort_order_then_name() {
        let store = Store::default();
        store.insert_category(category("Zebra", 1)).await;
        store.insert_category(category("Apples", 2)).await;
        store.insert_category(category("Bread", 1)).await;

        let names: Vec<String> = store
            .list_categories()
            .await
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Bread", "Zebra", "Apples"]);
    }

    #[tokio::test]
    async fn category_name_lookup_is_case_insensitive() {
        let store = Store::default();
        let inserted = store.insert_category(category("Pastries", 0)).await;
        let found = store.category_by_name("pastries").await.unwrap();
        assert_eq!(found.id, inserted.id);
        assert!(store.category_by_name("no-such").await.is_none());
    }

    #[tokio::test]
    async fn product_listing_filters_by_category_and_active() {
        let store = Store::default();
        let bakery = store.insert_category(category("Bakery", 0)).await;
        let deli = store.insert_category(category("Deli", 1)).await;
        store.insert_product(product(bakery.id, "Rye loaf", true)).await;
        store.insert_product(product(bakery.id, "Day-old rolls", false)).await;
        store.insert_product(product(deli.id, "Ham", true)).await;

        assert_eq!(store.list_products(None, false).await.len(), 3);
        assert_eq!(store.list_products(None, true).await.len(), 2);
        let bakery_active = store.list_products(Some(bakery.id), true).await;
        assert_eq!(bakery_active.len(), 1);
        assert_eq!(bakery_active[0].name, "Rye loaf");
        assert_eq!(store.product_count_in_category(bakery.id).await, 2);
    }

    #[tokio::test]
    async fn product_update_applies_only_provided_fields() {
        let store = Store::default();
        let cat = store.insert_category(category("Bakery", 0)).await;
        let p = store.insert_product(product(cat.id, "Rye loaf", true)).await;

        let updated = store
            .update_product(
                p.id,
                ProductUpdate {
                    price_cents: Some(450),
                    active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Rye loaf");
        assert_eq!(updated.price_cents, 450);
        assert!(!updated.active);

        assert!(store
            .update_product(Uuid::new_v4(), ProductUpdate::default())
            .await
            .is_none());
    }

    #[tokio::test]
    async fn product_images_sort_and_cascade() {
        let store = Store::default();
        let cat = store.insert_category(category("Bakery", 0)).await;
        let p = store.insert_product(product(cat.id, "Rye loaf", true)).await;
        store.insert_product_image(image(p.id, 2)).await;
        store.insert_product_image(image(p.id, 0)).await;
        store.insert_product_image(image(p.id, 1)).await;

        let images = store.images_for_product(p.id).await;
        assert_eq!(images.len(), 3);
        assert_eq!(
            images.iter().map(|i| i.sort_order).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );

        let removed = store.remove_images_for_product(p.id).await;
        assert_eq!(removed.len(), 3);
        assert!(store.images_for_product(p.id).await.is_empty());
    }

    #[tokio::test]
    async fn hero_images_active_filter() {
        let store = Store::default();
        store
            .insert_hero_image(HeroImage {
                id: Uuid::new_v4(),
                title: Some("Summer sale".into()),
                subtitle: None,
                link_url: None,
                file_name: "a.jpg".into(),
                sort_order: 0,
                active: true,
                created_at: OffsetDateTime::now_utc(),
            })
            .await;
        store
            .insert_hero_image(HeroImage {
                id: Uuid::new_v4(),
                title: None,
                subtitle: None,
                link_url: None,
                file_name: "b.jpg".into(),
                sort_order: 1,
                active: false,
                created_at: OffsetDateTime::now_utc(),
            })
            .await;

        assert_eq!(store.list_hero_images(false).await.len(), 2);
        let active = store.list_hero_images(true).await;
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].file_name, "a.jpg");
    }

    #[tokio::test]
    async fn contact_requests_mark_read_and_delete() {
        let store = Store::default();
        let req = store
            .insert_contact_request(ContactRequest {
                id: Uuid::new_v4(),
                name: "Ada".into(),
                email: "ada@example.com".into(),
                phone: None,
                message: "Do you deliver?".into(),
                read: false,
                created_at: OffsetDateTime::now_utc(),
            })
            .await;

        let marked = store.mark_contact_request_read(req.id).await.unwrap();
        assert!(marked.read);
        assert!(store.delete_contact_request(req.id).await);
        assert!(!store.delete_contact_request(req.id).await);
    }

    #[tokio::test]
    async fn settings_merge_keeps_existing_keys() {
        let store = Store::default();
        store
            .merge_settings(HashMap::from([
                ("site_title".to_string(), "Corner Bakery".to_string()),
                ("phone".to_string(), "555-0100".to_string()),
            ]))
            .await;
        let merged = store
            .merge_settings(HashMap::from([(
                "phone".to_string(),
                "555-0199".to_string(),
            )]))
            .await;
        assert_eq!(merged.get("site_title").unwrap(), "Corner Bakery");
        assert_eq!(merged.get("phone").unwrap(), "555-0199");
    }

    #[tokio::test]
    async fn user_lookup_and_update() {
        let store = Store::default();
        let user = store
            .insert_user(User {
                id: Uuid::new_v4(),
                username: "clerk".into(),
                password_hash: "x".into(),
                role: Role::Admin,
                created_at: OffsetDateTime::now_utc(),
            })
            .await;

        assert!(store.user_by_username("clerk").await.is_some());
        assert!(store.user_by_username("CLERK").await.is_none());

        let updated = store
            .update_user(
                user.id,
                UserUpdate {
                    role: Some(Role::SuperAdmin),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.role, Role::SuperAdmin);
        assert_eq!(updated.username, "clerk");

        assert!(store.delete_user(user.id).await);
        assert!(store.user(user.id).await.is_none());
    }

    #[test]
    fn password_hash_is_not_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            username: "clerk".into(),
            password_hash: "secret-hash".into(),
            role: Role::Admin,
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(json.contains("clerk"));
        assert!(json.contains("admin"));
    }
}
