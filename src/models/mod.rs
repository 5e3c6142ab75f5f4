pub mod daily_log;
pub mod question;
pub mod session;
pub mod user;

pub use daily_log::DailyLog;
pub use question::{ImportQuestion, NewQuestion, Question, QuizQuestion};
pub use session::DeviceSession;
pub use user::{ChildSummary, RequestStatus, User, UserProfile, UserType};
