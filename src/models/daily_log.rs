use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;

/// One row per quiz submission. Immutable after insert.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DailyLog {
    pub id: i64,
    pub student_id: i64,
    pub score: i64,
    pub details: Option<String>,
    pub log_date: NaiveDate,
    pub created_at: Option<String>,
}
