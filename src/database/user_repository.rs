use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::User;

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub organization_id: Option<Uuid>,
}

/// API accounts used to issue tokens
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, role, organization_id, created_at \
             FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::storage("failed to get user"))
    }

    pub async fn create_user(&self, user: &NewUser) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, username, password_hash, role, organization_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, username, password_hash, role, organization_id, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.role)
        .bind(user.organization_id)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::storage("failed to create user"))
    }
}
