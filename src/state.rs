use std::sync::Arc;

use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::auth::lockout::LockoutTracker;
use crate::auth::password::hash_password;
use crate::config::AppConfig;
use crate::store::{Role, Store, User};
use crate::uploads::{DiskUploads, UploadStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub config: Arc<AppConfig>,
    pub uploads: Arc<dyn UploadStore>,
    pub lockouts: Arc<LockoutTracker>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let uploads =
            Arc::new(DiskUploads::new(&config.upload_dir).await?) as Arc<dyn UploadStore>;

        let state = Self {
            store: Store::default(),
            config,
            uploads,
            lockouts: Arc::new(LockoutTracker::default()),
        };
        state.seed_admin().await?;
        Ok(state)
    }

    /// The store starts empty on every boot; the one super admin account
    /// comes from the environment. All other accounts are created through
    /// the admin API.
    async fn seed_admin(&self) -> anyhow::Result<()> {
        let username = self.config.admin_username.trim().to_lowercase();
        let user = self
            .store
            .insert_user(User {
                id: Uuid::new_v4(),
                username,
                password_hash: hash_password(&self.config.admin_password)?,
                role: Role::SuperAdmin,
                created_at: OffsetDateTime::now_utc(),
            })
            .await;
        info!(user_id = %user.id, username = %user.username, "seeded super admin");
        Ok(())
    }

    pub fn fake() -> Self {
        use axum::async_trait;
        use bytes::Bytes;

        struct FakeUploads;
        #[async_trait]
        impl UploadStore for FakeUploads {
            async fn save(&self, ext: &str, _body: Bytes) -> anyhow::Result<String> {
                Ok(format!("{}.{}", Uuid::new_v4(), ext))
            }
            async fn remove(&self, _file_name: &str) -> anyhow::Result<()> {
                Ok(())
            }
        }

        let config = Arc::new(AppConfig {
            upload_dir: "uploads-test".into(),
            session_ttl_minutes: 60,
            admin_username: "admin".into(),
            admin_password: "test-password".into(),
        });

        Self {
            store: Store::default(),
            config,
            uploads: Arc::new(FakeUploads),
            lockouts: Arc::new(LockoutTracker::default()),
        }
    }
}
