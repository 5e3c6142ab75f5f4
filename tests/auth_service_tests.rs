use std::sync::Arc;
use studylock::{
    repositories::{SqliteSessionRepository, SqliteUserRepository},
    services::auth_service::{AuthService, AuthServiceError, LoginRequest},
    test_utils::test_helpers,
};

fn auth_service(pool: &sqlx::SqlitePool) -> AuthService {
    AuthService::new(
        Arc::new(SqliteUserRepository::new(pool.clone())),
        Arc::new(SqliteSessionRepository::new(pool.clone())),
    )
}

#[tokio::test]
async fn test_login_manual_success_binds_device() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = auth_service(&pool);
    test_helpers::insert_test_student(&pool, "s1", "pw", None)
        .await
        .unwrap();

    let profile = service
        .login_manual(LoginRequest {
            username: "s1".to_string(),
            password: "pw".to_string(),
            device_id: Some("dev-X".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(profile.username, "s1");
    assert_eq!(profile.device_id.as_deref(), Some("dev-X"));

    let by_device = service.login_by_device("dev-X").await.unwrap();
    assert_eq!(by_device.id, profile.id);
}

#[tokio::test]
async fn test_login_manual_wrong_password() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = auth_service(&pool);
    test_helpers::insert_test_student(&pool, "s1", "pw", None)
        .await
        .unwrap();

    let result = service
        .login_manual(LoginRequest {
            username: "s1".to_string(),
            password: "wrong".to_string(),
            device_id: None,
        })
        .await;

    assert!(matches!(result, Err(AuthServiceError::WrongPassword)));
}

#[tokio::test]
async fn test_login_manual_unknown_username() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = auth_service(&pool);

    let result = service
        .login_manual(LoginRequest {
            username: "ghost".to_string(),
            password: "pw".to_string(),
            device_id: None,
        })
        .await;

    assert!(matches!(result, Err(AuthServiceError::UnknownUsername)));
}

#[tokio::test]
async fn test_relogin_displaces_previous_device() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = auth_service(&pool);
    test_helpers::insert_test_student(&pool, "s1", "pw", None)
        .await
        .unwrap();

    for device in ["dev-old", "dev-new"] {
        service
            .login_manual(LoginRequest {
                username: "s1".to_string(),
                password: "pw".to_string(),
                device_id: Some(device.to_string()),
            })
            .await
            .unwrap();
    }

    let result = service.login_by_device("dev-old").await;
    assert!(matches!(result, Err(AuthServiceError::DeviceNotFound)));

    let profile = service.login_by_device("dev-new").await.unwrap();
    assert_eq!(profile.username, "s1");
}

#[tokio::test]
async fn test_device_steal_between_students() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = auth_service(&pool);
    test_helpers::insert_test_student(&pool, "s1", "pw", None)
        .await
        .unwrap();
    test_helpers::insert_test_student(&pool, "s2", "pw", None)
        .await
        .unwrap();

    for username in ["s1", "s2"] {
        service
            .login_manual(LoginRequest {
                username: username.to_string(),
                password: "pw".to_string(),
                device_id: Some("dev-shared".to_string()),
            })
            .await
            .unwrap();
    }

    // The device now belongs to the most recent login only
    let profile = service.login_by_device("dev-shared").await.unwrap();
    assert_eq!(profile.username, "s2");
}

#[tokio::test]
async fn test_parent_login_does_not_bind_device() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = auth_service(&pool);
    test_helpers::insert_test_parent(&pool, "p1", "pw1")
        .await
        .unwrap();

    let profile = service
        .login_manual(LoginRequest {
            username: "p1".to_string(),
            password: "pw1".to_string(),
            device_id: Some("dev-parent".to_string()),
        })
        .await
        .unwrap();

    assert!(profile.device_id.is_none());

    let result = service.login_by_device("dev-parent").await;
    assert!(matches!(result, Err(AuthServiceError::DeviceNotFound)));
}

#[tokio::test]
async fn test_remote_logout_clears_binding() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = auth_service(&pool);
    let parent_id = test_helpers::insert_test_parent(&pool, "p1", "pw1")
        .await
        .unwrap();
    let student_id = test_helpers::insert_test_student(&pool, "s1", "pw", Some(parent_id))
        .await
        .unwrap();
    test_helpers::bind_test_device(&pool, student_id, "dev-X")
        .await
        .unwrap();

    service.remote_logout(parent_id, student_id).await.unwrap();

    let result = service.login_by_device("dev-X").await;
    assert!(matches!(result, Err(AuthServiceError::DeviceNotFound)));
}

#[tokio::test]
async fn test_remote_logout_rejects_foreign_student() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = auth_service(&pool);
    let p1 = test_helpers::insert_test_parent(&pool, "p1", "pw1")
        .await
        .unwrap();
    let p2 = test_helpers::insert_test_parent(&pool, "p2", "pw2")
        .await
        .unwrap();
    let student_id = test_helpers::insert_test_student(&pool, "s1", "pw", Some(p1))
        .await
        .unwrap();
    test_helpers::bind_test_device(&pool, student_id, "dev-X")
        .await
        .unwrap();

    let result = service.remote_logout(p2, student_id).await;
    assert!(matches!(result, Err(AuthServiceError::NotYourChild)));

    // The binding survives a rejected logout
    let profile = service.login_by_device("dev-X").await.unwrap();
    assert_eq!(profile.id, student_id);
}
