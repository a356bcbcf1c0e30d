use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{UserError, UserResult};
use crate::models::{NewUser, User};

/// Repository trait for User persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user; the store assigns the id
    async fn create(&self, user: NewUser) -> UserResult<User>;

    async fn get_by_id(&self, id: i64) -> UserResult<Option<User>>;

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>>;

    /// All users, ordered by id
    async fn list(&self) -> UserResult<Vec<User>>;

    /// Overwrite a stored user
    async fn update(&self, user: User) -> UserResult<User>;

    /// Returns `false` when no row matched
    async fn delete(&self, id: i64) -> UserResult<bool>;

    async fn email_exists(&self, email: &str) -> UserResult<bool>;
}

#[derive(Debug, Default)]
struct Table {
    next_id: i64,
    rows: BTreeMap<i64, User>,
}

impl Table {
    fn check_unique(&self, id: Option<i64>, username: &str, email: &str) -> UserResult<()> {
        let others = self.rows.values().filter(|u| Some(u.id) != id);
        for other in others {
            if other.email == email {
                return Err(UserError::DuplicateEmail(email.to_string()));
            }
            if other.username == username {
                return Err(UserError::DuplicateUsername(username.to_string()));
            }
        }
        Ok(())
    }
}

/// In-memory implementation of UserRepository (for development/testing).
///
/// Enforces the same uniqueness rules as the `users` table.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    table: Arc<RwLock<Table>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> UserResult<User> {
        let mut table = self.table.write().await;
        table.check_unique(None, &user.username, &user.email)?;

        table.next_id += 1;
        let now = Utc::now();
        let stored = User {
            id: table.next_id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(stored.id, stored.clone());

        Ok(stored)
    }

    async fn get_by_id(&self, id: i64) -> UserResult<Option<User>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let table = self.table.read().await;
        Ok(table.rows.values().find(|u| u.email == email).cloned())
    }

    async fn list(&self) -> UserResult<Vec<User>> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn update(&self, user: User) -> UserResult<User> {
        let mut table = self.table.write().await;

        if !table.rows.contains_key(&user.id) {
            return Err(UserError::NotFound(user.id));
        }
        table.check_unique(Some(user.id), &user.username, &user.email)?;

        table.rows.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: i64) -> UserResult<bool> {
        Ok(self.table.write().await.rows.remove(&id).is_some())
    }

    async fn email_exists(&self, email: &str) -> UserResult<bool> {
        let table = self.table.read().await;
        Ok(table.rows.values().any(|u| u.email == email))
    }
}
