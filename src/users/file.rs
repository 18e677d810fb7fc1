use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{NewUser, StoreError, User, UserDocument, UserStore};

/// JSON-file store. Writes go through a temp file and rename so a crash
/// never leaves a half-written document behind.
#[derive(Debug)]
pub struct FileUserStore {
    path: PathBuf,
    document: Mutex<UserDocument>,
}

impl FileUserStore {
    /// A missing file is an empty store.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let document = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt(format!("{}: {}", path.display(), e)))?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => UserDocument::default(),
            Err(e) => return Err(e.into()),
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        Ok(Self {
            path,
            document: Mutex::new(document),
        })
    }

    async fn persist(&self, document: &UserDocument) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(document).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for FileUserStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.document.lock().await.find_by_id(id))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.document.lock().await.find_by_email(email))
    }

    async fn save(&self, user: NewUser) -> Result<User, StoreError> {
        let mut doc = self.document.lock().await;
        let mut next = doc.clone();
        let saved = next.insert(user)?;
        self.persist(&next).await?;
        *doc = next;
        Ok(saved)
    }

    async fn all(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.document.lock().await.all())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::contract;

    #[tokio::test]
    async fn file_store_contract() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileUserStore::open(dir.path().join("users.json")).await.unwrap();
        contract::exercise(&store).await;
    }

    #[tokio::test]
    async fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("users.json");

        let saved = {
            let store = FileUserStore::open(&path).await.unwrap();
            store.save(contract::new_user("Ada", "ada@example.com")).await.unwrap()
        };

        let reopened = FileUserStore::open(&path).await.unwrap();
        let found = reopened.find_by_email("ada@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, saved.id);
        assert!(found.verify_password("secret123"));

        let next = reopened.save(contract::new_user("Bob", "bob@example.com")).await.unwrap();
        assert!(next.id > saved.id);
    }

    #[tokio::test]
    async fn file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(&path, b"[").unwrap();
        assert!(matches!(FileUserStore::open(&path).await, Err(StoreError::Corrupt(_))));
    }
}
