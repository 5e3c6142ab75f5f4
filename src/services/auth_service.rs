use crate::models::user::{RequestStatus, UserProfile, UserType};
use crate::repositories::{RepositoryError, SessionRepository, UserRepository};
use argon2::{password_hash::PasswordHash, Argon2, PasswordVerifier};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("Username is required")]
    MissingUsername,
    #[error("Device id is required")]
    MissingDevice,
    #[error("Unknown username")]
    UnknownUsername,
    #[error("Incorrect password")]
    WrongPassword,
    #[error("No account is bound to this device")]
    DeviceNotFound,
    #[error("Student does not belong to this parent")]
    NotYourChild,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub device_id: Option<String>,
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, sessions: Arc<dyn SessionRepository>) -> Self {
        Self { users, sessions }
    }

    /// Username/password login for either role. A student supplying a
    /// device id is rebound to it unconditionally, displacing whatever
    /// session held that device before.
    pub async fn login_manual(
        &self,
        request: LoginRequest,
    ) -> Result<UserProfile, AuthServiceError> {
        let username = request.username.trim();
        if username.is_empty() {
            return Err(AuthServiceError::MissingUsername);
        }

        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(AuthServiceError::UnknownUsername)?;

        if !self.verify_password(&request.password, &user.password_hash) {
            return Err(AuthServiceError::WrongPassword);
        }

        let device_id = request
            .device_id
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty());

        let bound_device = match device_id {
            Some(device_id) if user.user_type == UserType::Student => {
                let session = self.sessions.bind_device(user.id, device_id).await?;
                Some(session.device_id)
            }
            _ => self
                .sessions
                .find_by_student(user.id)
                .await?
                .map(|session| session.device_id),
        };

        Ok(UserProfile::from_user(user, bound_device))
    }

    /// Automatic login: resolve the student bound to this device.
    pub async fn login_by_device(&self, device_id: &str) -> Result<UserProfile, AuthServiceError> {
        let device_id = device_id.trim();
        if device_id.is_empty() {
            return Err(AuthServiceError::MissingDevice);
        }

        let session = self
            .sessions
            .find_by_device(device_id)
            .await?
            .ok_or(AuthServiceError::DeviceNotFound)?;

        let user = self
            .users
            .find_by_id(session.student_id)
            .await?
            .filter(|u| u.user_type == UserType::Student)
            .ok_or(AuthServiceError::DeviceNotFound)?;

        Ok(UserProfile::from_user(user, Some(session.device_id)))
    }

    /// A parent force-logs-out one of their children: the device binding is
    /// revoked and any in-flight request is reset.
    pub async fn remote_logout(
        &self,
        parent_id: i64,
        student_id: i64,
    ) -> Result<(), AuthServiceError> {
        let student = self
            .users
            .find_child(parent_id, student_id)
            .await?
            .ok_or(AuthServiceError::NotYourChild)?;

        self.sessions.revoke_for_student(student.id).await?;
        self.users
            .set_request_state(student.id, RequestStatus::None, None)
            .await?;

        Ok(())
    }

    fn verify_password(&self, password: &str, password_hash: &str) -> bool {
        if let Ok(parsed_hash) = PasswordHash::new(password_hash) {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok()
        } else {
            false
        }
    }
}
