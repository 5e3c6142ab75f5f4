use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum UserType {
    Parent,
    Student,
}

/// Where a student sits in the exit/unlock approval workflow.
///
/// `None` is the quiescent state. The pending states wait on a parent
/// decision; the approved/rejected states are terminal until the student
/// acknowledges the alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum RequestStatus {
    None,
    ExitPending,
    UnlockPending,
    ExitApproved,
    UnlockApproved,
    ExitRejected,
    UnlockRejected,
}

impl RequestStatus {
    /// A decided state the student still has to acknowledge.
    pub fn is_alert(self) -> bool {
        matches!(
            self,
            RequestStatus::ExitApproved
                | RequestStatus::UnlockApproved
                | RequestStatus::ExitRejected
                | RequestStatus::UnlockRejected
        )
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let token = match self {
            RequestStatus::None => "none",
            RequestStatus::ExitPending => "exit_pending",
            RequestStatus::UnlockPending => "unlock_pending",
            RequestStatus::ExitApproved => "exit_approved",
            RequestStatus::UnlockApproved => "unlock_approved",
            RequestStatus::ExitRejected => "exit_rejected",
            RequestStatus::UnlockRejected => "unlock_rejected",
        };
        write!(f, "{}", token)
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub user_type: UserType,
    pub full_name: String,
    pub grade_level: Option<String>,
    pub parent_id: Option<i64>,
    pub request_status: RequestStatus,
    pub parent_message: Option<String>,
    pub created_at: Option<String>,
}

/// Outward representation of a user. Never carries the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub user_type: UserType,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    pub request_status: RequestStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

impl UserProfile {
    pub fn from_user(user: User, device_id: Option<String>) -> Self {
        UserProfile {
            id: user.id,
            username: user.username,
            user_type: user.user_type,
            full_name: user.full_name,
            grade_level: user.grade_level,
            parent_id: user.parent_id,
            request_status: user.request_status,
            device_id,
        }
    }
}

/// One entry in a parent's children listing, augmented with quiz activity.
#[derive(Debug, Clone, Serialize)]
pub struct ChildSummary {
    pub id: i64,
    pub full_name: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade_level: Option<String>,
    pub logged_today: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_score: Option<i64>,
}
