use crate::models::user::{RequestStatus, User};
use crate::repositories::{RepositoryError, SessionRepository, UserRepository};
use std::sync::Arc;

/// How strictly triggers are checked against the current workflow state.
///
/// `Relaxed` applies every trigger unconditionally by id, matching the
/// deployed clients. `Guarded` enforces the documented happy path and
/// rejects out-of-order triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPolicy {
    #[default]
    Relaxed,
    Guarded,
}

impl std::str::FromStr for TransitionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "relaxed" => Ok(TransitionPolicy::Relaxed),
            "guarded" => Ok(TransitionPolicy::Guarded),
            _ => Err(format!("{:?} is not a valid transition policy", s)),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LockServiceError {
    #[error("Student not found")]
    StudentNotFound,
    #[error("Student does not belong to this parent")]
    NotYourChild,
    #[error("Cannot {trigger} while request status is {from}")]
    InvalidTransition {
        from: RequestStatus,
        trigger: &'static str,
    },
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// What the student device sees when it polls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Active {
        request_status: RequestStatus,
        parent_message: Option<String>,
    },
    LoggedOut,
}

/// Drives the exit/unlock approval workflow between a student device and
/// the owning parent. All state lives on the student row; the device
/// observes decisions by polling `check_session_status`.
pub struct LockService {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
    policy: TransitionPolicy,
}

impl LockService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionRepository>,
        policy: TransitionPolicy,
    ) -> Self {
        Self {
            users,
            sessions,
            policy,
        }
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    pub async fn request_exit(&self, student_id: i64) -> Result<RequestStatus, LockServiceError> {
        let student = self.load_student(student_id).await?;
        self.guard(&student, "request_exit", &[RequestStatus::None])?;
        self.users
            .set_request_status(student.id, RequestStatus::ExitPending)
            .await?;
        Ok(RequestStatus::ExitPending)
    }

    pub async fn request_unlock(&self, student_id: i64) -> Result<RequestStatus, LockServiceError> {
        let student = self.load_student(student_id).await?;
        self.guard(&student, "request_unlock", &[RequestStatus::None])?;
        self.users
            .set_request_status(student.id, RequestStatus::UnlockPending)
            .await?;
        Ok(RequestStatus::UnlockPending)
    }

    /// Approving an exit also revokes the device binding: the lock shell
    /// releases the device and the session is gone.
    pub async fn approve_exit(
        &self,
        parent_id: i64,
        student_id: i64,
    ) -> Result<RequestStatus, LockServiceError> {
        let student = self.load_child(parent_id, student_id).await?;
        self.guard(&student, "approve_exit", &[RequestStatus::ExitPending])?;
        self.users
            .set_request_status(student.id, RequestStatus::ExitApproved)
            .await?;
        self.sessions.revoke_for_student(student.id).await?;
        Ok(RequestStatus::ExitApproved)
    }

    pub async fn reject_exit(
        &self,
        parent_id: i64,
        student_id: i64,
        message: &str,
    ) -> Result<RequestStatus, LockServiceError> {
        let student = self.load_child(parent_id, student_id).await?;
        self.guard(&student, "reject_exit", &[RequestStatus::ExitPending])?;
        self.users
            .set_request_state(student.id, RequestStatus::ExitRejected, Some(message))
            .await?;
        Ok(RequestStatus::ExitRejected)
    }

    pub async fn approve_unlock(
        &self,
        parent_id: i64,
        student_id: i64,
    ) -> Result<RequestStatus, LockServiceError> {
        let student = self.load_child(parent_id, student_id).await?;
        self.guard(&student, "approve_unlock", &[RequestStatus::UnlockPending])?;
        self.users
            .set_request_status(student.id, RequestStatus::UnlockApproved)
            .await?;
        Ok(RequestStatus::UnlockApproved)
    }

    pub async fn reject_unlock(
        &self,
        parent_id: i64,
        student_id: i64,
        message: &str,
    ) -> Result<RequestStatus, LockServiceError> {
        let student = self.load_child(parent_id, student_id).await?;
        self.guard(&student, "reject_unlock", &[RequestStatus::UnlockPending])?;
        self.users
            .set_request_state(student.id, RequestStatus::UnlockRejected, Some(message))
            .await?;
        Ok(RequestStatus::UnlockRejected)
    }

    /// Force-unlock from the parent dashboard. Valid from any state, under
    /// either policy.
    pub async fn remote_unlock(
        &self,
        parent_id: i64,
        student_id: i64,
    ) -> Result<RequestStatus, LockServiceError> {
        let student = self.load_child(parent_id, student_id).await?;
        self.users
            .set_request_status(student.id, RequestStatus::UnlockApproved)
            .await?;
        Ok(RequestStatus::UnlockApproved)
    }

    /// The student dismisses a decided request. Re-acknowledging from the
    /// quiescent state is a success no-op under either policy.
    pub async fn acknowledge_alert(
        &self,
        student_id: i64,
    ) -> Result<RequestStatus, LockServiceError> {
        let student = self.load_student(student_id).await?;

        if student.request_status == RequestStatus::None {
            return Ok(RequestStatus::None);
        }

        if self.policy == TransitionPolicy::Guarded && !student.request_status.is_alert() {
            return Err(LockServiceError::InvalidTransition {
                from: student.request_status,
                trigger: "acknowledge_alert",
            });
        }

        self.users
            .set_request_state(student.id, RequestStatus::None, None)
            .await?;
        Ok(RequestStatus::None)
    }

    /// Polling entry point for the student device. `Active` only when the
    /// stored binding matches the supplied device exactly.
    pub async fn check_session_status(
        &self,
        student_id: i64,
        device_id: &str,
    ) -> Result<SessionStatus, LockServiceError> {
        let device_id = device_id.trim();
        if device_id.is_empty() {
            return Ok(SessionStatus::LoggedOut);
        }

        let session = match self.sessions.find_by_student(student_id).await? {
            Some(session) if session.device_id == device_id => session,
            _ => return Ok(SessionStatus::LoggedOut),
        };

        let student = self
            .users
            .find_by_id(session.student_id)
            .await?
            .ok_or(LockServiceError::StudentNotFound)?;

        Ok(SessionStatus::Active {
            request_status: student.request_status,
            parent_message: student.parent_message,
        })
    }

    fn guard(
        &self,
        student: &User,
        trigger: &'static str,
        allowed_from: &[RequestStatus],
    ) -> Result<(), LockServiceError> {
        if self.policy == TransitionPolicy::Guarded
            && !allowed_from.contains(&student.request_status)
        {
            return Err(LockServiceError::InvalidTransition {
                from: student.request_status,
                trigger,
            });
        }
        Ok(())
    }

    async fn load_student(&self, student_id: i64) -> Result<User, LockServiceError> {
        self.users
            .find_by_id(student_id)
            .await?
            .ok_or(LockServiceError::StudentNotFound)
    }

    async fn load_child(&self, parent_id: i64, student_id: i64) -> Result<User, LockServiceError> {
        self.users
            .find_child(parent_id, student_id)
            .await?
            .ok_or(LockServiceError::NotYourChild)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserType;
    use crate::repositories::session_repository::MockSessionRepository;
    use crate::repositories::user_repository::MockUserRepository;
    use mockall::predicate::*;

    fn student(id: i64, status: RequestStatus) -> User {
        User {
            id,
            username: format!("s{}", id),
            password_hash: "hash".to_string(),
            user_type: UserType::Student,
            full_name: "Student".to_string(),
            grade_level: Some("6th".to_string()),
            parent_id: Some(1),
            request_status: status,
            parent_message: None,
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_guarded_rejects_approve_from_none() {
        let mut mock_users = MockUserRepository::new();
        mock_users
            .expect_find_child()
            .with(eq(1), eq(2))
            .times(1)
            .returning(|_, _| Box::pin(async move { Ok(Some(student(2, RequestStatus::None))) }));

        let service = LockService::new(
            Arc::new(mock_users),
            Arc::new(MockSessionRepository::new()),
            TransitionPolicy::Guarded,
        );

        let result = service.approve_exit(1, 2).await;
        assert!(matches!(
            result,
            Err(LockServiceError::InvalidTransition {
                from: RequestStatus::None,
                trigger: "approve_exit",
            })
        ));
    }

    #[tokio::test]
    async fn test_relaxed_accepts_approve_from_none() {
        let mut mock_users = MockUserRepository::new();
        mock_users
            .expect_find_child()
            .with(eq(1), eq(2))
            .times(1)
            .returning(|_, _| Box::pin(async move { Ok(Some(student(2, RequestStatus::None))) }));
        mock_users
            .expect_set_request_status()
            .with(eq(2), eq(RequestStatus::ExitApproved))
            .times(1)
            .returning(|_, _| Box::pin(async move { Ok(()) }));

        let mut mock_sessions = MockSessionRepository::new();
        mock_sessions
            .expect_revoke_for_student()
            .with(eq(2))
            .times(1)
            .returning(|_| Box::pin(async move { Ok(1) }));

        let service = LockService::new(
            Arc::new(mock_users),
            Arc::new(mock_sessions),
            TransitionPolicy::Relaxed,
        );

        let result = service.approve_exit(1, 2).await;
        assert!(matches!(result, Ok(RequestStatus::ExitApproved)));
    }

    #[tokio::test]
    async fn test_acknowledge_from_none_is_noop_even_guarded() {
        let mut mock_users = MockUserRepository::new();
        mock_users
            .expect_find_by_id()
            .with(eq(2))
            .times(1)
            .returning(|_| Box::pin(async move { Ok(Some(student(2, RequestStatus::None))) }));

        let service = LockService::new(
            Arc::new(mock_users),
            Arc::new(MockSessionRepository::new()),
            TransitionPolicy::Guarded,
        );

        let result = service.acknowledge_alert(2).await;
        assert!(matches!(result, Ok(RequestStatus::None)));
    }

    #[tokio::test]
    async fn test_parent_trigger_rejects_foreign_student() {
        let mut mock_users = MockUserRepository::new();
        mock_users
            .expect_find_child()
            .with(eq(9), eq(2))
            .times(1)
            .returning(|_, _| Box::pin(async move { Ok(None) }));

        let service = LockService::new(
            Arc::new(mock_users),
            Arc::new(MockSessionRepository::new()),
            TransitionPolicy::Relaxed,
        );

        let result = service.remote_unlock(9, 2).await;
        assert!(matches!(result, Err(LockServiceError::NotYourChild)));
    }
}
