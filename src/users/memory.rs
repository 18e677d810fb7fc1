use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{NewUser, StoreError, User, UserDocument, UserStore};

/// Process-local store; contents vanish on restart.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    document: Mutex<UserDocument>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.document.lock().await.find_by_id(id))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.document.lock().await.find_by_email(email))
    }

    async fn save(&self, user: NewUser) -> Result<User, StoreError> {
        self.document.lock().await.insert(user)
    }

    async fn all(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.document.lock().await.all())
    }
}
