use crate::models::user::{RequestStatus, User, UserType};
use async_trait::async_trait;
use sqlx::SqlitePool;

use super::{RepositoryError, RepositoryResult};

/// Insert payload for a user row.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub user_type: UserType,
    pub full_name: String,
    pub grade_level: Option<String>,
    pub parent_id: Option<i64>,
}

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, new_user: NewUser) -> RepositoryResult<User>;
    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>>;
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>>;
    /// The student row, but only when it is owned by the given parent.
    async fn find_child(&self, parent_id: i64, student_id: i64) -> RepositoryResult<Option<User>>;
    async fn list_by_parent(&self, parent_id: i64) -> RepositoryResult<Vec<User>>;
    /// Update the workflow status, leaving `parent_message` untouched.
    async fn set_request_status(&self, id: i64, status: RequestStatus) -> RepositoryResult<()>;
    /// Update the workflow status and overwrite `parent_message` (None clears it).
    async fn set_request_state(
        &self,
        id: i64,
        status: RequestStatus,
        parent_message: Option<&str>,
    ) -> RepositoryResult<()>;
}

const USER_COLUMNS: &str = "id, username, password_hash, user_type, full_name, grade_level, \
                            parent_id, request_status, parent_message, created_at";

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create_user(&self, new_user: NewUser) -> RepositoryResult<User> {
        let result = sqlx::query(
            "INSERT INTO users (username, password_hash, user_type, full_name, grade_level, parent_id) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&new_user.username)
        .bind(&new_user.password_hash)
        .bind(new_user.user_type)
        .bind(&new_user.full_name)
        .bind(&new_user.grade_level)
        .bind(new_user.parent_id)
        .execute(&self.pool)
        .await;

        match result {
            Ok(res) => {
                let id = res.last_insert_rowid();
                self.find_by_id(id).await?.ok_or(RepositoryError::NotFound)
            }
            Err(e) => {
                if e.to_string().contains("UNIQUE") {
                    Err(RepositoryError::AlreadyExists)
                } else {
                    Err(RepositoryError::Database(e))
                }
            }
        }
    }

    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_child(&self, parent_id: i64, student_id: i64) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ? AND parent_id = ?"
        ))
        .bind(student_id)
        .bind(parent_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn list_by_parent(&self, parent_id: i64) -> RepositoryResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE parent_id = ? ORDER BY id"
        ))
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn set_request_status(&self, id: i64, status: RequestStatus) -> RepositoryResult<()> {
        let result = sqlx::query("UPDATE users SET request_status = ? WHERE id = ?")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn set_request_state(
        &self,
        id: i64,
        status: RequestStatus,
        parent_message: Option<&str>,
    ) -> RepositoryResult<()> {
        let result =
            sqlx::query("UPDATE users SET request_status = ?, parent_message = ? WHERE id = ?")
                .bind(status)
                .bind(parent_message)
                .bind(id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
