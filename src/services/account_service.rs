use crate::models::user::{ChildSummary, User, UserProfile, UserType};
use crate::repositories::user_repository::NewUser;
use crate::repositories::{
    DailyLogRepository, RepositoryError, SessionRepository, UserRepository,
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use chrono::Utc;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum AccountServiceError {
    #[error("Missing required fields")]
    MissingFields,
    #[error("Username is already taken")]
    UsernameTaken,
    #[error("Password hashing failed: {0}")]
    HashingError(String),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

pub struct RegisterStudentRequest {
    pub full_name: String,
    pub username: String,
    pub password: String,
    pub grade_level: String,
    pub device_id: String,
    pub parent_username: Option<String>,
}

pub struct RegisterParentRequest {
    pub full_name: String,
    pub username: String,
    pub password: String,
}

pub struct CreateChildRequest {
    pub parent_id: i64,
    pub full_name: String,
    pub username: String,
    pub password: String,
    pub grade_level: String,
}

pub struct AccountService {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
    logs: Arc<dyn DailyLogRepository>,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionRepository>,
        logs: Arc<dyn DailyLogRepository>,
    ) -> Self {
        Self {
            users,
            sessions,
            logs,
        }
    }

    /// Self-registration from a student device. The device is bound
    /// immediately; a matching parent username links the account, an unknown
    /// one leaves it unclaimed.
    pub async fn register_student(
        &self,
        request: RegisterStudentRequest,
    ) -> Result<UserProfile, AccountServiceError> {
        let full_name = request.full_name.trim();
        let username = request.username.trim();
        let password = request.password.trim();
        let grade_level = request.grade_level.trim();
        let device_id = request.device_id.trim();

        if full_name.is_empty()
            || username.is_empty()
            || password.is_empty()
            || grade_level.is_empty()
            || device_id.is_empty()
        {
            return Err(AccountServiceError::MissingFields);
        }

        let parent_id = match request.parent_username.as_deref().map(str::trim) {
            Some(parent_username) if !parent_username.is_empty() => self
                .users
                .find_by_username(parent_username)
                .await?
                .filter(|u| u.user_type == UserType::Parent)
                .map(|u| u.id),
            _ => None,
        };

        let user = self
            .create_user(
                username,
                password,
                UserType::Student,
                full_name,
                Some(grade_level),
                parent_id,
            )
            .await?;

        let session = self.sessions.bind_device(user.id, device_id).await?;

        Ok(UserProfile::from_user(user, Some(session.device_id)))
    }

    pub async fn register_parent(
        &self,
        request: RegisterParentRequest,
    ) -> Result<UserProfile, AccountServiceError> {
        let full_name = request.full_name.trim();
        let username = request.username.trim();
        let password = request.password.trim();

        if full_name.is_empty() || username.is_empty() || password.is_empty() {
            return Err(AccountServiceError::MissingFields);
        }

        let user = self
            .create_user(username, password, UserType::Parent, full_name, None, None)
            .await?;

        Ok(UserProfile::from_user(user, None))
    }

    /// A parent creates a child account from their dashboard. No device is
    /// bound; the child logs in separately.
    pub async fn create_child_account(
        &self,
        request: CreateChildRequest,
    ) -> Result<(), AccountServiceError> {
        let full_name = request.full_name.trim();
        let username = request.username.trim();
        let password = request.password.trim();
        let grade_level = request.grade_level.trim();

        if request.parent_id <= 0
            || full_name.is_empty()
            || username.is_empty()
            || password.is_empty()
            || grade_level.is_empty()
        {
            return Err(AccountServiceError::MissingFields);
        }

        self.create_user(
            username,
            password,
            UserType::Student,
            full_name,
            Some(grade_level),
            Some(request.parent_id),
        )
        .await?;

        Ok(())
    }

    pub async fn list_children(
        &self,
        parent_id: i64,
    ) -> Result<Vec<ChildSummary>, AccountServiceError> {
        let today = Utc::now().date_naive();
        let students = self.users.list_by_parent(parent_id).await?;

        let mut children = Vec::with_capacity(students.len());
        for student in students {
            let logged_today = self.logs.logged_on(student.id, today).await?;
            let last_score = self.logs.last_score(student.id).await?;
            children.push(ChildSummary {
                id: student.id,
                full_name: student.full_name,
                username: student.username,
                grade_level: student.grade_level,
                logged_today,
                last_score,
            });
        }

        Ok(children)
    }

    async fn create_user(
        &self,
        username: &str,
        password: &str,
        user_type: UserType,
        full_name: &str,
        grade_level: Option<&str>,
        parent_id: Option<i64>,
    ) -> Result<User, AccountServiceError> {
        if self.users.find_by_username(username).await?.is_some() {
            return Err(AccountServiceError::UsernameTaken);
        }

        let password_hash = self.hash_password(password)?;

        let new_user = NewUser {
            username: username.to_string(),
            password_hash,
            user_type,
            full_name: full_name.to_string(),
            grade_level: grade_level.map(str::to_string),
            parent_id,
        };

        match self.users.create_user(new_user).await {
            Ok(user) => Ok(user),
            // Lost the race between the existence check and the insert.
            Err(RepositoryError::AlreadyExists) => Err(AccountServiceError::UsernameTaken),
            Err(e) => Err(AccountServiceError::Repository(e)),
        }
    }

    fn hash_password(&self, password: &str) -> Result<String, AccountServiceError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AccountServiceError::HashingError(e.to_string()))
    }
}
