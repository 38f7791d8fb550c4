use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{is_unique_violation, unexpected};
use wayfare_core::DomainError;
use wayfare_shared::models::{UserRecord, UserRole};

pub struct UserRepository {
    pool: PgPool,
}

const USER_COLUMNS: &str = "id, email, username, role, is_active, created_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    username: String,
    role: String,
    is_active: bool,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl UserRow {
    fn into_record(self) -> Result<UserRecord, DomainError> {
        let role = self
            .role
            .parse::<UserRole>()
            .map_err(DomainError::internal)?;
        Ok(UserRecord {
            id: self.id,
            email: self.email,
            username: self.username,
            role,
            is_active: self.is_active,
            created_at: self.created_at,
        })
    }
}

/// Row for login: the only place the password digest leaves the table.
#[derive(sqlx::FromRow)]
struct CredentialRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_digest: String,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        email: &str,
        username: &str,
        password_digest: &str,
        role: UserRole,
    ) -> Result<UserRecord, DomainError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (email, username, password_digest, role) \
             VALUES ($1, $2, $3, $4) RETURNING {USER_COLUMNS}"
        ))
        .bind(email)
        .bind(username)
        .bind(password_digest)
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::conflict("Email or username already registered")
            } else {
                unexpected(e)
            }
        })?;

        row.into_record()
    }

    /// Active user plus digest, for credential verification at login.
    pub async fn find_active_by_email(
        &self,
        email: &str,
    ) -> Result<Option<(UserRecord, String)>, DomainError> {
        let row = sqlx::query_as::<_, CredentialRow>(&format!(
            "SELECT {USER_COLUMNS}, password_digest FROM users \
             WHERE email = $1 AND is_active = TRUE"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        match row {
            Some(r) => Ok(Some((r.user.into_record()?, r.password_digest))),
            None => Ok(None),
        }
    }

    /// Token subjects resolve through here; inactive users fail to resolve.
    pub async fn find_active_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, DomainError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1 AND is_active = TRUE"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        row.map(UserRow::into_record).transpose()
    }

    pub async fn rename(&self, id: Uuid, new_username: &str) -> Result<UserRecord, DomainError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET username = $1 WHERE id = $2 RETURNING {USER_COLUMNS}"
        ))
        .bind(new_username)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::conflict("Username already taken")
            } else {
                unexpected(e)
            }
        })?;

        row.ok_or_else(|| DomainError::not_found("User not found"))?
            .into_record()
    }

    pub async fn promote(&self, id: Uuid) -> Result<UserRecord, DomainError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET role = 'admin' WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        row.ok_or_else(|| DomainError::not_found("User not found"))?
            .into_record()
    }
}
