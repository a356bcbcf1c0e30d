use crate::error::{UserError, UserResult};
use crate::models::{NewUser, User};
use crate::repository::UserRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, DbBackend, DbErr, FromQueryResult, SqlErr, Statement};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id            BIGSERIAL PRIMARY KEY,
        username      TEXT NOT NULL UNIQUE,
        email         TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

const COLUMNS: &str = "id, username, email, password_hash, created_at, updated_at";

/// PostgreSQL implementation of UserRepository using SeaORM raw statements
#[derive(Clone)]
pub struct PgUserRepository {
    db: sea_orm::DatabaseConnection,
}

impl PgUserRepository {
    pub fn new(db: sea_orm::DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create the `users` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> UserResult<()> {
        self.db
            .execute_unprepared(CREATE_TABLE)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn fetch_one(&self, stmt: Statement) -> UserResult<Option<User>> {
        let row = UserRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(db_error)?;
        Ok(row.map(Into::into))
    }
}

#[derive(Debug, FromQueryResult)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn db_error(e: DbErr) -> UserError {
    UserError::Internal(format!("Database error: {}", e))
}

/// Map unique violations on `users` to the matching duplicate error.
fn write_error(e: DbErr, username: &str, email: &str) -> UserError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) if detail.contains("email") => {
            UserError::DuplicateEmail(email.to_string())
        }
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            UserError::DuplicateUsername(username.to_string())
        }
        _ => db_error(e),
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: NewUser) -> UserResult<User> {
        let sql = format!(
            "INSERT INTO users (username, email, password_hash, created_at, updated_at) \
             VALUES ($1, $2, $3, NOW(), NOW()) RETURNING {COLUMNS}"
        );

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                user.username.clone().into(),
                user.email.clone().into(),
                user.password_hash.into(),
            ],
        );

        UserRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(|e| write_error(e, &user.username, &user.email))?
            .map(Into::into)
            .ok_or_else(|| UserError::Internal("Failed to create user".to_string()))
    }

    async fn get_by_id(&self, id: i64) -> UserResult<Option<User>> {
        let sql = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        self.fetch_one(Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [id.into()],
        ))
        .await
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let sql = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        self.fetch_one(Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [email.into()],
        ))
        .await
    }

    async fn list(&self) -> UserResult<Vec<User>> {
        let sql = format!("SELECT {COLUMNS} FROM users ORDER BY id");
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, []);

        let rows = UserRow::find_by_statement(stmt)
            .all(&self.db)
            .await
            .map_err(db_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(&self, user: User) -> UserResult<User> {
        let sql = format!(
            "UPDATE users SET username = $2, email = $3, password_hash = $4, updated_at = $5 \
             WHERE id = $1 RETURNING {COLUMNS}"
        );

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                user.id.into(),
                user.username.clone().into(),
                user.email.clone().into(),
                user.password_hash.clone().into(),
                user.updated_at.into(),
            ],
        );

        UserRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(|e| write_error(e, &user.username, &user.email))?
            .map(Into::into)
            .ok_or(UserError::NotFound(user.id))
    }

    async fn delete(&self, id: i64) -> UserResult<bool> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "DELETE FROM users WHERE id = $1",
            [id.into()],
        );

        let result = self.db.execute_raw(stmt).await.map_err(db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn email_exists(&self, email: &str) -> UserResult<bool> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1) AS exists",
            [email.into()],
        );

        #[derive(FromQueryResult)]
        struct ExistsResult {
            exists: bool,
        }

        let result = ExistsResult::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(db_error)?;

        Ok(result.is_some_and(|r| r.exists))
    }
}
