use crate::models::session::DeviceSession;
use async_trait::async_trait;
use sqlx::SqlitePool;

use super::{RepositoryError, RepositoryResult};

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait SessionRepository: Send + Sync {
    /// Bind a device to a student. Revokes the student's previous session
    /// and displaces any other student currently holding the device.
    async fn bind_device(&self, student_id: i64, device_id: &str)
        -> RepositoryResult<DeviceSession>;
    async fn find_by_device(&self, device_id: &str) -> RepositoryResult<Option<DeviceSession>>;
    async fn find_by_student(&self, student_id: i64) -> RepositoryResult<Option<DeviceSession>>;
    /// Returns the number of sessions revoked (0 or 1).
    async fn revoke_for_student(&self, student_id: i64) -> RepositoryResult<u64>;
}

pub struct SqliteSessionRepository {
    pool: SqlitePool,
}

impl SqliteSessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for SqliteSessionRepository {
    async fn bind_device(
        &self,
        student_id: i64,
        device_id: &str,
    ) -> RepositoryResult<DeviceSession> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM device_sessions WHERE student_id = ? OR device_id = ?")
            .bind(student_id)
            .bind(device_id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("INSERT INTO device_sessions (student_id, device_id) VALUES (?, ?)")
            .bind(student_id)
            .bind(device_id)
            .execute(&mut *tx)
            .await?;
        let id = result.last_insert_rowid();

        let session = sqlx::query_as::<_, DeviceSession>(
            "SELECT id, student_id, device_id, created_at FROM device_sessions WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        tx.commit().await?;

        Ok(session)
    }

    async fn find_by_device(&self, device_id: &str) -> RepositoryResult<Option<DeviceSession>> {
        let session = sqlx::query_as::<_, DeviceSession>(
            "SELECT id, student_id, device_id, created_at FROM device_sessions WHERE device_id = ?",
        )
        .bind(device_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    async fn find_by_student(&self, student_id: i64) -> RepositoryResult<Option<DeviceSession>> {
        let session = sqlx::query_as::<_, DeviceSession>(
            "SELECT id, student_id, device_id, created_at FROM device_sessions WHERE student_id = ?",
        )
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    async fn revoke_for_student(&self, student_id: i64) -> RepositoryResult<u64> {
        let result = sqlx::query("DELETE FROM device_sessions WHERE student_id = ?")
            .bind(student_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
