use crate::error::{ApiError, Result};
use crate::services::account_service::{
    CreateChildRequest, RegisterParentRequest, RegisterStudentRequest,
};
use crate::services::auth_service::LoginRequest;
use crate::services::lock_service::SessionStatus;
use crate::services::quiz_service::SubmitQuizRequest;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};

/// The decoded action envelope. Every operation shares this one shape;
/// fields the current action does not use are simply absent. Numeric
/// fields accept both JSON numbers and form-encoded strings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ActionRequest {
    pub action: String,
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub grade_level: Option<String>,
    pub device_id: Option<String>,
    pub parent_username: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
    #[serde(deserialize_with = "de_opt_i64")]
    pub parent_id: Option<i64>,
    #[serde(deserialize_with = "de_opt_i64")]
    pub student_id: Option<i64>,
    #[serde(deserialize_with = "de_opt_i64")]
    pub score: Option<i64>,
    pub details: Option<Value>,
}

fn de_opt_i64<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrStr {
        Num(i64),
        Str(String),
    }

    match Option::<NumOrStr>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumOrStr::Num(n)) => Ok(Some(n)),
        Some(NumOrStr::Str(s)) if s.trim().is_empty() => Ok(None),
        Some(NumOrStr::Str(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

fn decode_request(body: &Bytes) -> Result<ActionRequest> {
    if let Ok(request) = serde_json::from_slice::<ActionRequest>(body) {
        return Ok(request);
    }
    serde_urlencoded::from_bytes::<ActionRequest>(body)
        .map_err(|_| ApiError::Validation("Request body must be JSON or form-encoded".to_string()))
}

/// CORS preflight answer for the action endpoint.
pub async fn options_handler() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// The single action endpoint. Mirrors the mobile clients' contract: one
/// POST route, a mandatory `action` field, a `status` envelope in every
/// response.
pub async fn api_handler(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>> {
    let request = decode_request(&body)?;

    if request.action.is_empty() {
        return Err(ApiError::Validation("No action provided".to_string()));
    }

    tracing::debug!(action = %request.action, "dispatching");

    match request.action.as_str() {
        "register_student" => {
            let profile = state
                .account_service
                .register_student(RegisterStudentRequest {
                    full_name: request.full_name.unwrap_or_default(),
                    username: request.username.unwrap_or_default(),
                    password: request.password.unwrap_or_default(),
                    grade_level: request.grade_level.unwrap_or_default(),
                    device_id: request.device_id.unwrap_or_default(),
                    parent_username: request.parent_username,
                })
                .await?;
            Ok(Json(json!({ "status": "success", "data": profile })))
        }

        "register_parent" => {
            let profile = state
                .account_service
                .register_parent(RegisterParentRequest {
                    full_name: request.full_name.unwrap_or_default(),
                    username: request.username.unwrap_or_default(),
                    password: request.password.unwrap_or_default(),
                })
                .await?;
            Ok(Json(json!({ "status": "success", "data": profile })))
        }

        "login_student_manual" => {
            let profile = state
                .auth_service
                .login_manual(LoginRequest {
                    username: request.username.unwrap_or_default(),
                    password: request.password.unwrap_or_default(),
                    device_id: request.device_id,
                })
                .await?;
            Ok(Json(json!({ "status": "success", "data": profile })))
        }

        "login_student" => {
            let device_id = request.device_id.unwrap_or_default();
            let profile = state.auth_service.login_by_device(&device_id).await?;
            Ok(Json(json!({ "status": "success", "data": profile })))
        }

        "get_my_children" => {
            let children = state
                .account_service
                .list_children(request.parent_id.unwrap_or(0))
                .await?;
            Ok(Json(json!({ "status": "success", "data": children })))
        }

        "create_child_account" => {
            state
                .account_service
                .create_child_account(CreateChildRequest {
                    parent_id: request.parent_id.unwrap_or(0),
                    full_name: request.full_name.unwrap_or_default(),
                    username: request.username.unwrap_or_default(),
                    password: request.password.unwrap_or_default(),
                    grade_level: request.grade_level.unwrap_or_default(),
                })
                .await?;
            Ok(Json(
                json!({ "status": "success", "message": "Child account created" }),
            ))
        }

        "remote_logout_student" => {
            state
                .auth_service
                .remote_logout(
                    request.parent_id.unwrap_or(0),
                    request.student_id.unwrap_or(0),
                )
                .await?;
            Ok(Json(json!({ "status": "success", "message": "Logged out" })))
        }

        "check_session_status" => {
            let status = state
                .lock_service
                .check_session_status(
                    request.student_id.unwrap_or(0),
                    request.device_id.as_deref().unwrap_or(""),
                )
                .await?;
            match status {
                SessionStatus::Active {
                    request_status,
                    parent_message,
                } => Ok(Json(json!({
                    "status": "active",
                    "request_status": request_status,
                    "parent_message": parent_message,
                }))),
                SessionStatus::LoggedOut => Ok(Json(json!({ "status": "logged_out" }))),
            }
        }

        "request_exit" => {
            let status = state
                .lock_service
                .request_exit(request.student_id.unwrap_or(0))
                .await?;
            Ok(Json(json!({ "status": "success", "request_status": status })))
        }

        "request_unlock" => {
            let status = state
                .lock_service
                .request_unlock(request.student_id.unwrap_or(0))
                .await?;
            Ok(Json(json!({ "status": "success", "request_status": status })))
        }

        "approve_exit" => {
            let status = state
                .lock_service
                .approve_exit(
                    request.parent_id.unwrap_or(0),
                    request.student_id.unwrap_or(0),
                )
                .await?;
            Ok(Json(json!({ "status": "success", "request_status": status })))
        }

        "reject_exit" => {
            let status = state
                .lock_service
                .reject_exit(
                    request.parent_id.unwrap_or(0),
                    request.student_id.unwrap_or(0),
                    request.message.as_deref().unwrap_or(""),
                )
                .await?;
            Ok(Json(json!({ "status": "success", "request_status": status })))
        }

        "approve_unlock" => {
            let status = state
                .lock_service
                .approve_unlock(
                    request.parent_id.unwrap_or(0),
                    request.student_id.unwrap_or(0),
                )
                .await?;
            Ok(Json(json!({ "status": "success", "request_status": status })))
        }

        "reject_unlock" => {
            let status = state
                .lock_service
                .reject_unlock(
                    request.parent_id.unwrap_or(0),
                    request.student_id.unwrap_or(0),
                    request.message.as_deref().unwrap_or(""),
                )
                .await?;
            Ok(Json(json!({ "status": "success", "request_status": status })))
        }

        "remote_unlock" => {
            let status = state
                .lock_service
                .remote_unlock(
                    request.parent_id.unwrap_or(0),
                    request.student_id.unwrap_or(0),
                )
                .await?;
            Ok(Json(json!({ "status": "success", "request_status": status })))
        }

        "acknowledge_alert" => {
            let status = state
                .lock_service
                .acknowledge_alert(request.student_id.unwrap_or(0))
                .await?;
            Ok(Json(json!({ "status": "success", "request_status": status })))
        }

        "get_quiz" => {
            let questions = state
                .quiz_service
                .get_quiz(
                    request.grade_level.as_deref().unwrap_or(""),
                    request.subject.as_deref().unwrap_or(""),
                )
                .await?;
            Ok(Json(json!({ "status": "success", "questions": questions })))
        }

        "submit_quiz" => {
            state
                .quiz_service
                .submit_quiz(SubmitQuizRequest {
                    student_id: request.student_id.unwrap_or(0),
                    score: request.score.unwrap_or(0),
                    details: request.details,
                })
                .await?;
            Ok(Json(json!({ "status": "success" })))
        }

        "check_update" => {
            let update = &state.update_config;
            Ok(Json(json!({
                "status": "success",
                "version": update.version,
                "url": update.url,
                "force": update.force,
            })))
        }

        other => Err(ApiError::Validation(format!("Unknown action: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_json_body() {
        let body = Bytes::from(r#"{"action":"submit_quiz","student_id":3,"score":85}"#);
        let request = decode_request(&body).expect("valid JSON");
        assert_eq!(request.action, "submit_quiz");
        assert_eq!(request.student_id, Some(3));
        assert_eq!(request.score, Some(85));
    }

    #[test]
    fn test_decode_form_body_coerces_numbers() {
        let body = Bytes::from("action=approve_exit&parent_id=1&student_id=2");
        let request = decode_request(&body).expect("valid form body");
        assert_eq!(request.action, "approve_exit");
        assert_eq!(request.parent_id, Some(1));
        assert_eq!(request.student_id, Some(2));
    }

    #[test]
    fn test_decode_json_with_string_ids() {
        let body = Bytes::from(r#"{"action":"approve_exit","parent_id":"1","student_id":"2"}"#);
        let request = decode_request(&body).expect("string ids accepted");
        assert_eq!(request.parent_id, Some(1));
        assert_eq!(request.student_id, Some(2));
    }
}
