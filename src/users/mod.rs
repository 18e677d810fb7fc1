//! Account records and the storage seam behind them.

pub mod file;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::{verify_password, Identity};

pub use file::FileUserStore;
pub use memory::MemoryUserStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    #[error("User store unavailable: {0}")]
    Unavailable(String),

    #[error("User store data is corrupt: {0}")]
    Corrupt(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Decode(_) | sqlx::Error::ColumnDecode { .. } => StoreError::Corrupt(err.to_string()),
            _ => StoreError::Unavailable(err.to_string()),
        }
    }
}

/// A stored account. The password hash never leaves the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[sqlx(rename = "password")]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn verify_password(&self, password: &str) -> bool {
        verify_password(password, &self.password_hash)
    }

    /// Claims payload: id, name and email only.
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Public view of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registration payload with an already-hashed password.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;

    /// Exact, case-sensitive match.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Assigns the id and timestamps. Fails with `DuplicateEmail` if the email is taken.
    async fn save(&self, user: NewUser) -> Result<User, StoreError>;

    /// Every user, ordered by id.
    async fn all(&self) -> Result<Vec<User>, StoreError>;
}

/// Shared state for the in-process backends.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct UserDocument {
    next_id: i64,
    users: Vec<User>,
}

impl UserDocument {
    fn find_by_id(&self, id: i64) -> Option<User> {
        self.users.iter().find(|u| u.id == id).cloned()
    }

    fn find_by_email(&self, email: &str) -> Option<User> {
        self.users.iter().find(|u| u.email == email).cloned()
    }

    fn insert(&mut self, new: NewUser) -> Result<User, StoreError> {
        if self.users.iter().any(|u| u.email == new.email) {
            return Err(StoreError::DuplicateEmail(new.email));
        }
        let id = self.next_id.max(self.users.iter().map(|u| u.id).max().unwrap_or(0)) + 1;
        let now = Utc::now();
        let user = User {
            id,
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            created_at: now,
            updated_at: now,
        };
        self.next_id = id;
        self.users.push(user.clone());
        Ok(user)
    }

    fn all(&self) -> Vec<User> {
        let mut users = self.users.clone();
        users.sort_by_key(|u| u.id);
        users
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_and_profile_omit_password() {
        let now = Utc::now();
        let user = User {
            id: 7,
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password_hash: "$argon2id$...".into(),
            created_at: now,
            updated_at: now,
        };

        assert_eq!(user.identity(), Identity { id: 7, name: "Ada".into(), email: "ada@example.com".into() });

        let json = serde_json::to_value(user.profile()).unwrap();
        assert_eq!(json["id"], 7);
        assert!(json.get("password").is_none());
        assert!(json.get("password_hash").is_none());
    }
}
