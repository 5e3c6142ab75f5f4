use crate::models::question::{ImportQuestion, QuizQuestion};
use crate::repositories::{DailyLogRepository, QuestionRepository, RepositoryError};
use chrono::Utc;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum QuizServiceError {
    #[error("Missing required fields")]
    MissingFields,
    #[error("Invalid student id")]
    InvalidStudent,
    #[error("Malformed JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

pub struct SubmitQuizRequest {
    pub student_id: i64,
    pub score: i64,
    pub details: Option<serde_json::Value>,
}

/// Summary of one import run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOutcome {
    pub inserted: usize,
    pub skipped: usize,
}

pub struct QuizService {
    questions: Arc<dyn QuestionRepository>,
    logs: Arc<dyn DailyLogRepository>,
}

impl QuizService {
    pub fn new(questions: Arc<dyn QuestionRepository>, logs: Arc<dyn DailyLogRepository>) -> Self {
        Self { questions, logs }
    }

    pub async fn get_quiz(
        &self,
        grade_level: &str,
        subject: &str,
    ) -> Result<Vec<QuizQuestion>, QuizServiceError> {
        let grade_level = grade_level.trim();
        let subject = subject.trim();
        if grade_level.is_empty() || subject.is_empty() {
            return Err(QuizServiceError::MissingFields);
        }

        let rows = self.questions.list_for_quiz(grade_level, subject).await?;
        let mut questions = Vec::with_capacity(rows.len());
        for row in rows {
            questions.push(row.into_quiz()?);
        }

        Ok(questions)
    }

    /// Record a submission. `score` is caller-supplied and trusted; the
    /// details payload is stored opaquely.
    pub async fn submit_quiz(&self, request: SubmitQuizRequest) -> Result<(), QuizServiceError> {
        if request.student_id <= 0 {
            return Err(QuizServiceError::InvalidStudent);
        }

        let details = match &request.details {
            Some(value) => Some(serde_json::to_string(value)?),
            None => None,
        };

        let today = Utc::now().date_naive();
        self.logs
            .insert_log(request.student_id, request.score, details.as_deref(), today)
            .await?;

        Ok(())
    }

    /// Load a question-bank file into the store. Entries whose answer index
    /// falls outside their options are skipped, not fatal.
    pub async fn import_questions(
        &self,
        entries: Vec<ImportQuestion>,
        grade_level: &str,
        subject: &str,
    ) -> Result<ImportOutcome, QuizServiceError> {
        let grade_level = grade_level.trim();
        let subject = subject.trim();
        if grade_level.is_empty() || subject.is_empty() {
            return Err(QuizServiceError::MissingFields);
        }

        let mut outcome = ImportOutcome::default();
        for entry in entries {
            match entry.into_new(grade_level, subject) {
                Some(question) => {
                    self.questions.insert_question(question).await?;
                    outcome.inserted += 1;
                }
                None => outcome.skipped += 1,
            }
        }

        Ok(outcome)
    }

    pub async fn count_questions(
        &self,
        grade_level: &str,
        subject: &str,
    ) -> Result<i64, QuizServiceError> {
        Ok(self.questions.count_for_quiz(grade_level, subject).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::log_repository::MockDailyLogRepository;
    use crate::repositories::question_repository::MockQuestionRepository;

    #[tokio::test]
    async fn test_submit_rejects_bad_student_id() {
        let service = QuizService::new(
            Arc::new(MockQuestionRepository::new()),
            Arc::new(MockDailyLogRepository::new()),
        );

        let request = SubmitQuizRequest {
            student_id: 0,
            score: 85,
            details: None,
        };

        let result = service.submit_quiz(request).await;
        assert!(matches!(result, Err(QuizServiceError::InvalidStudent)));
    }

    #[tokio::test]
    async fn test_import_skips_out_of_range_answer() {
        let mut mock_questions = MockQuestionRepository::new();
        mock_questions
            .expect_insert_question()
            .times(1)
            .returning(|_| Box::pin(async move { Ok(1) }));

        let service = QuizService::new(
            Arc::new(mock_questions),
            Arc::new(MockDailyLogRepository::new()),
        );

        let entries = vec![
            ImportQuestion {
                q: "Valid question".to_string(),
                opts: vec!["a".to_string(), "b".to_string()],
                ans: 1,
                exp: None,
                text: None,
                highlight: None,
            },
            ImportQuestion {
                q: "Broken question".to_string(),
                opts: vec!["a".to_string()],
                ans: 5,
                exp: None,
                text: None,
                highlight: None,
            },
        ];

        let outcome = service
            .import_questions(entries, "6th", "tajweed")
            .await
            .expect("import should succeed");
        assert_eq!(outcome.inserted, 1);
        assert_eq!(outcome.skipped, 1);
    }
}
