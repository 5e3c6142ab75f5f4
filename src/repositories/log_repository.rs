use crate::models::daily_log::DailyLog;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::SqlitePool;

use super::{RepositoryError, RepositoryResult};

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait DailyLogRepository: Send + Sync {
    async fn insert_log(
        &self,
        student_id: i64,
        score: i64,
        details: Option<&str>,
        log_date: NaiveDate,
    ) -> RepositoryResult<DailyLog>;
    /// Whether the student has at least one log on the given day.
    async fn logged_on(&self, student_id: i64, date: NaiveDate) -> RepositoryResult<bool>;
    /// Score of the student's most recent log by date, if any.
    async fn last_score(&self, student_id: i64) -> RepositoryResult<Option<i64>>;
}

pub struct SqliteDailyLogRepository {
    pool: SqlitePool,
}

impl SqliteDailyLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DailyLogRepository for SqliteDailyLogRepository {
    async fn insert_log(
        &self,
        student_id: i64,
        score: i64,
        details: Option<&str>,
        log_date: NaiveDate,
    ) -> RepositoryResult<DailyLog> {
        let result = sqlx::query(
            "INSERT INTO daily_logs (student_id, score, details, log_date) VALUES (?, ?, ?, ?)",
        )
        .bind(student_id)
        .bind(score)
        .bind(details)
        .bind(log_date)
        .execute(&self.pool)
        .await?;
        let id = result.last_insert_rowid();

        let log = sqlx::query_as::<_, DailyLog>(
            "SELECT id, student_id, score, details, log_date, created_at \
             FROM daily_logs WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(log)
    }

    async fn logged_on(&self, student_id: i64, date: NaiveDate) -> RepositoryResult<bool> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM daily_logs WHERE student_id = ? AND log_date = ?",
        )
        .bind(student_id)
        .bind(date)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    async fn last_score(&self, student_id: i64) -> RepositoryResult<Option<i64>> {
        let score = sqlx::query_scalar::<_, i64>(
            "SELECT score FROM daily_logs WHERE student_id = ? \
             ORDER BY log_date DESC, id DESC LIMIT 1",
        )
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(score)
    }
}
