use std::sync::Arc;
use studylock::{
    models::question::ImportQuestion,
    repositories::{SqliteDailyLogRepository, SqliteQuestionRepository},
    services::quiz_service::{QuizService, QuizServiceError, SubmitQuizRequest},
    test_utils::test_helpers,
};

fn quiz_service(pool: &sqlx::SqlitePool) -> QuizService {
    QuizService::new(
        Arc::new(SqliteQuestionRepository::new(pool.clone())),
        Arc::new(SqliteDailyLogRepository::new(pool.clone())),
    )
}

fn entry(q: &str, opts: &[&str], ans: usize) -> ImportQuestion {
    ImportQuestion {
        q: q.to_string(),
        opts: opts.iter().map(|s| s.to_string()).collect(),
        ans,
        exp: None,
        text: None,
        highlight: None,
    }
}

#[tokio::test]
async fn test_import_then_get_quiz() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = quiz_service(&pool);

    let entries = vec![
        entry("What is idgham?", &["a rule", "a letter", "a verse"], 0),
        entry("What is ikhfa?", &["a verse", "a rule"], 1),
    ];

    let outcome = service
        .import_questions(entries, "6th", "tajweed")
        .await
        .unwrap();
    assert_eq!(outcome.inserted, 2);
    assert_eq!(outcome.skipped, 0);

    let questions = service.get_quiz("6th", "tajweed").await.unwrap();
    assert_eq!(questions.len(), 2);

    // The answer index was resolved into the option text, and the stored
    // options column round-trips into the original list
    assert_eq!(questions[0].correct_answer, "a rule");
    assert_eq!(questions[0].options, vec!["a rule", "a letter", "a verse"]);
    assert_eq!(questions[1].correct_answer, "a rule");

    assert_eq!(service.count_questions("6th", "tajweed").await.unwrap(), 2);
}

#[tokio::test]
async fn test_get_quiz_filters_by_grade_and_subject() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = quiz_service(&pool);

    test_helpers::insert_test_question(&pool, "6th", "tajweed", "q1")
        .await
        .unwrap();
    test_helpers::insert_test_question(&pool, "6th", "grammar", "q2")
        .await
        .unwrap();
    test_helpers::insert_test_question(&pool, "5th", "tajweed", "q3")
        .await
        .unwrap();

    let questions = service.get_quiz("6th", "tajweed").await.unwrap();
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].question_text, "q1");

    let questions = service.get_quiz("4th", "tajweed").await.unwrap();
    assert!(questions.is_empty());
}

#[tokio::test]
async fn test_get_quiz_requires_grade_and_subject() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = quiz_service(&pool);

    let result = service.get_quiz("", "tajweed").await;
    assert!(matches!(result, Err(QuizServiceError::MissingFields)));

    let result = service.get_quiz("6th", "  ").await;
    assert!(matches!(result, Err(QuizServiceError::MissingFields)));
}

#[tokio::test]
async fn test_submit_quiz_records_one_log_row() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = quiz_service(&pool);
    let student_id = test_helpers::insert_test_student(&pool, "s1", "pw", None)
        .await
        .unwrap();

    service
        .submit_quiz(SubmitQuizRequest {
            student_id,
            score: 85,
            details: Some(serde_json::json!({"answers": [0, 2, 1]})),
        })
        .await
        .unwrap();

    let (count, score, details): (i64, i64, String) = sqlx::query_as(
        "SELECT COUNT(*), MAX(score), MAX(details) FROM daily_logs WHERE student_id = ?",
    )
    .bind(student_id)
    .fetch_one(&pool)
    .await
    .unwrap();

    assert_eq!(count, 1);
    assert_eq!(score, 85);
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(&details).unwrap(),
        serde_json::json!({"answers": [0, 2, 1]})
    );
}

#[tokio::test]
async fn test_submit_quiz_rejects_nonpositive_student() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = quiz_service(&pool);

    let result = service
        .submit_quiz(SubmitQuizRequest {
            student_id: -1,
            score: 85,
            details: None,
        })
        .await;

    assert!(matches!(result, Err(QuizServiceError::InvalidStudent)));
}
