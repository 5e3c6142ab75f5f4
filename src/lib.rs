pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod services;

// Make test_utils available for both unit tests and integration tests
pub mod test_utils;

use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub account_service: Arc<services::account_service::AccountService>,
    pub auth_service: Arc<services::auth_service::AuthService>,
    pub lock_service: Arc<services::lock_service::LockService>,
    pub quiz_service: Arc<services::quiz_service::QuizService>,
    pub update_config: config::update::UpdateConfig,
    pub pool: sqlx::SqlitePool,
}

impl AppState {
    /// Wire the full service stack over a pool. The server binary, the CLI
    /// and the integration tests all go through here.
    pub fn build(
        pool: sqlx::SqlitePool,
        lock_config: config::lock::LockConfig,
        update_config: config::update::UpdateConfig,
    ) -> Self {
        use repositories::{
            SqliteDailyLogRepository, SqliteQuestionRepository, SqliteSessionRepository,
            SqliteUserRepository,
        };
        use services::{AccountService, AuthService, LockService, QuizService};

        let user_repository = Arc::new(SqliteUserRepository::new(pool.clone()));
        let session_repository = Arc::new(SqliteSessionRepository::new(pool.clone()));
        let log_repository = Arc::new(SqliteDailyLogRepository::new(pool.clone()));
        let question_repository = Arc::new(SqliteQuestionRepository::new(pool.clone()));

        let account_service = Arc::new(AccountService::new(
            user_repository.clone(),
            session_repository.clone(),
            log_repository.clone(),
        ));
        let auth_service = Arc::new(AuthService::new(
            user_repository.clone(),
            session_repository.clone(),
        ));
        let lock_service = Arc::new(LockService::new(
            user_repository,
            session_repository,
            lock_config.policy,
        ));
        let quiz_service = Arc::new(QuizService::new(question_repository, log_repository));

        AppState {
            account_service,
            auth_service,
            lock_service,
            quiz_service,
            update_config,
            pool,
        }
    }
}
