use serde::Serialize;
use sqlx::FromRow;

/// An active device binding for a student.
///
/// At most one session exists per student and per device; creating a new
/// binding displaces both the student's previous session and any other
/// student holding the device. A student with no session row is logged out
/// everywhere.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DeviceSession {
    pub id: i64,
    pub student_id: i64,
    pub device_id: String,
    pub created_at: Option<String>,
}
