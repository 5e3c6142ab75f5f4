pub mod log_repository;
pub mod question_repository;
pub mod session_repository;
pub mod user_repository;

pub use log_repository::{DailyLogRepository, SqliteDailyLogRepository};
pub use question_repository::{QuestionRepository, SqliteQuestionRepository};
pub use session_repository::{SessionRepository, SqliteSessionRepository};
pub use user_repository::{SqliteUserRepository, UserRepository};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Row not found")]
    NotFound,
    #[error("Row already exists")]
    AlreadyExists,
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
