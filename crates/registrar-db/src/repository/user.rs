//! SurrealDB implementation of [`UserRepository`].
//!
//! Passwords arrive already hashed; this layer never sees plaintext.
//! Username uniqueness is enforced by `idx_user_username`.

use chrono::{DateTime, Utc};
use registrar_core::error::RegistrarResult;
use registrar_core::models::user::{NewUser, Role, User};
use registrar_core::repository::UserRepository;
use serde::Deserialize;
use surrealdb::{Connection, Surreal};
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, Deserialize)]
struct UserRow {
    username: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: i64,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, Deserialize)]
struct UserRowWithId {
    record_id: String,
    #[serde(flatten)]
    row: UserRow,
}

pub(crate) fn timestamp(secs: i64) -> Result<DateTime<Utc>, DbError> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| DbError::Corrupt(format!("timestamp out of range: {secs}")))
}

impl UserRow {
    fn into_user(self, id: Uuid) -> Result<User, DbError> {
        let role = self
            .role
            .parse::<Role>()
            .map_err(|e| DbError::Corrupt(e.to_string()))?;
        Ok(User {
            id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            role,
            created_at: timestamp(self.created_at)?,
        })
    }
}

impl UserRowWithId {
    fn try_into_user(self) -> Result<User, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Corrupt(format!("invalid UUID: {e}")))?;
        self.row.into_user(id)
    }
}

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 WHERE username = $username",
            )
            .bind(("username", username.to_string()))
            .await?;

        let rows: Vec<UserRowWithId> = result.take(0)?;
        rows.into_iter()
            .next()
            .map(UserRowWithId::try_into_user)
            .transpose()
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: NewUser) -> RegistrarResult<User> {
        if self.find_by_username(&input.username).await?.is_some() {
            return Err(DbError::Duplicate {
                entity: "user".into(),
            }
            .into());
        }

        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::thing('user', $id) SET \
                 username = $username, email = $email, \
                 password_hash = $password_hash, role = $role",
            )
            .bind(("id", id_str.clone()))
            .bind(("username", input.username))
            .bind(("email", input.email))
            .bind(("password_hash", input.password_hash))
            .bind(("role", input.role.as_str()))
            .await
            .map_err(DbError::from)?;

        // A concurrent registration can still trip the unique index.
        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("user", e))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> RegistrarResult<User> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::thing('user', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn get_by_username(&self, username: &str) -> RegistrarResult<User> {
        let user = self
            .find_by_username(username)
            .await?
            .ok_or_else(|| DbError::NotFound {
                entity: "user".into(),
                id: format!("username={username}"),
            })?;
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> RegistrarResult<()> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("DELETE type::thing('user', $id) RETURN BEFORE")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "user".into(),
                id: id_str,
            }
            .into());
        }

        Ok(())
    }
}
