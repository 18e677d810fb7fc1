use async_trait::async_trait;
use sqlx::PgPool;

use crate::users::{NewUser, StoreError, User, UserStore};

const UNIQUE_VIOLATION: &str = "23505";
const USER_COLUMNS: &str = "id, name, email, password, created_at, updated_at";

/// User store over the `users` table created by the built-in migrations.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql).bind(email).fetch_optional(&self.pool).await?)
    }

    async fn save(&self, user: NewUser) -> Result<User, StoreError> {
        let sql = format!(
            "INSERT INTO users (name, email, password) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        );
        let result = sqlx::query_as::<_, User>(&sql)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .fetch_one(&self.pool)
            .await;

        match result {
            Ok(saved) => Ok(saved),
            Err(sqlx::Error::Database(db)) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                Err(StoreError::DuplicateEmail(user.email))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn all(&self) -> Result<Vec<User>, StoreError> {
        let sql = format!("SELECT {} FROM users ORDER BY id ASC", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await?)
    }
}
