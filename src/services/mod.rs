pub mod account_service;
pub mod auth_service;
pub mod lock_service;
pub mod quiz_service;

pub use account_service::AccountService;
pub use auth_service::AuthService;
pub use lock_service::{LockService, SessionStatus, TransitionPolicy};
pub use quiz_service::QuizService;
