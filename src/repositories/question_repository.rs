use crate::models::question::{NewQuestion, Question};
use async_trait::async_trait;
use sqlx::SqlitePool;

use super::RepositoryResult;

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait QuestionRepository: Send + Sync {
    async fn insert_question(&self, question: NewQuestion) -> RepositoryResult<i64>;
    async fn list_for_quiz(
        &self,
        grade_level: &str,
        subject: &str,
    ) -> RepositoryResult<Vec<Question>>;
    async fn count_for_quiz(&self, grade_level: &str, subject: &str) -> RepositoryResult<i64>;
}

const QUESTION_COLUMNS: &str = "id, grade_level, subject, question_text, options, \
                                correct_answer, explanation, verse_text, highlight_text";

pub struct SqliteQuestionRepository {
    pool: SqlitePool,
}

impl SqliteQuestionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuestionRepository for SqliteQuestionRepository {
    async fn insert_question(&self, question: NewQuestion) -> RepositoryResult<i64> {
        let result = sqlx::query(
            "INSERT INTO questions (grade_level, subject, question_text, options, \
             correct_answer, explanation, verse_text, highlight_text) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&question.grade_level)
        .bind(&question.subject)
        .bind(&question.question_text)
        .bind(&question.options)
        .bind(&question.correct_answer)
        .bind(&question.explanation)
        .bind(&question.verse_text)
        .bind(&question.highlight_text)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn list_for_quiz(
        &self,
        grade_level: &str,
        subject: &str,
    ) -> RepositoryResult<Vec<Question>> {
        let questions = sqlx::query_as::<_, Question>(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions \
             WHERE grade_level = ? AND subject = ? ORDER BY id"
        ))
        .bind(grade_level)
        .bind(subject)
        .fetch_all(&self.pool)
        .await?;

        Ok(questions)
    }

    async fn count_for_quiz(&self, grade_level: &str, subject: &str) -> RepositoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM questions WHERE grade_level = ? AND subject = ?",
        )
        .bind(grade_level)
        .bind(subject)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
