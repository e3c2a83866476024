mod common;

use axum::http::StatusCode;
use chrono::Utc;
use common::{PASSWORD, spawn_app};
use planyty::domain::UserRole;
use planyty::services::tokens::{Claims, TokenService};
use serde_json::json;

#[tokio::test]
async fn login_returns_token_for_the_same_user() {
    let app = spawn_app().await;
    let user = app.seed_user("alice@example.com", UserRole::Member).await;

    let (status, body) = app.login("Alice@Example.com", PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["user"]["id"], json!(user.id));
    assert!(body["data"]["user"].get("password_hash").is_none());

    let token = body["data"]["token"].as_str().unwrap().to_string();

    let verified = app.shared.auth_service.verify_token(&token).await.unwrap();
    assert_eq!(verified.id, user.id);

    let (status, body) = app.request("GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], json!("alice@example.com"));

    let stored = app.store.users().get_by_id(user.id).await.unwrap().unwrap();
    assert!(stored.last_login.is_some());
}

#[tokio::test]
async fn wrong_password_is_rejected_with_generic_message() {
    let app = spawn_app().await;
    app.seed_user("bob@example.com", UserRole::Member).await;

    let (status, body) = app.login("bob@example.com", "not-the-password").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], json!("Invalid credentials"));

    let (status, body) = app.login("nobody@example.com", PASSWORD).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], json!("Invalid credentials"));
}

#[tokio::test]
async fn inactive_account_cannot_log_in_or_use_old_tokens() {
    let app = spawn_app().await;
    let user = app.seed_user("carol@example.com", UserRole::Member).await;
    let token = app.token_for(&user);

    app.store.users().set_active(user.id, false).await.unwrap();

    let (status, _) = app.login("carol@example.com", PASSWORD).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.request("GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn protected_routes_require_a_valid_bearer_token() {
    let app = spawn_app().await;
    let user = app.seed_user("dave@example.com", UserRole::Member).await;

    let (status, _) = app.request("GET", "/api/workspaces", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .request("GET", "/api/workspaces", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let now = Utc::now().timestamp();
    let expired = TokenService::new(&app.config.auth)
        .encode_claims(&Claims {
            sub: user.id.to_string(),
            iat: now - 7200,
            exp: now - 3600,
            iss: app.config.auth.issuer.clone(),
        })
        .unwrap();
    let (status, _) = app
        .request("GET", "/api/workspaces", Some(&expired), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let mut other = app.config.auth.clone();
    other.jwt_secret = "some-other-secret-0123456789abcdef".to_string();
    let forged = TokenService::new(&other).issue(user.id).unwrap();
    let (status, _) = app
        .request("GET", "/api/workspaces", Some(&forged), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .request("GET", "/api/workspaces", Some(&app.token_for(&user)), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn change_password_requires_current_password() {
    let app = spawn_app().await;
    let user = app.seed_user("erin@example.com", UserRole::Member).await;
    let token = app.token_for(&user);

    let (status, _) = app
        .request(
            "PUT",
            "/api/auth/password",
            Some(&token),
            Some(json!({ "current_password": "wrong-password", "new_password": "brand-new-pass" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .request(
            "PUT",
            "/api/auth/password",
            Some(&token),
            Some(json!({ "current_password": PASSWORD, "new_password": "brand-new-pass" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.login("erin@example.com", PASSWORD).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app.login("erin@example.com", "brand-new-pass").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn profile_update_changes_name() {
    let app = spawn_app().await;
    let user = app.seed_user("frank@example.com", UserRole::Member).await;
    let token = app.token_for(&user);

    let (status, body) = app
        .request(
            "PUT",
            "/api/auth/profile",
            Some(&token),
            Some(json!({ "name": "  Frank Ocean " })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], json!("Frank Ocean"));

    let (status, _) = app
        .request("PUT", "/api/auth/profile", Some(&token), Some(json!({ "name": "  " })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn user_administration_is_admin_only() {
    let app = spawn_app().await;
    let admin = app.seed_user("root@example.com", UserRole::Admin).await;
    let member = app.seed_user("grace@example.com", UserRole::Member).await;

    let (status, _) = app
        .request("GET", "/api/users", Some(&app.token_for(&member)), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin_token = app.token_for(&admin);
    let (status, body) = app.request("GET", "/api/users", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (status, body) = app
        .request(
            "PUT",
            &format!("/api/users/{}/role", member.id),
            Some(&admin_token),
            Some(json!({ "role": "team_lead" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], json!("team_lead"));

    let (status, _) = app
        .request(
            "PUT",
            &format!("/api/users/{}/active", admin.id),
            Some(&admin_token),
            Some(json!({ "is_active": false })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_probes_are_public() {
    let app = spawn_app().await;

    let (status, body) = app.request("GET", "/api/health/live", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], json!("alive"));

    let (status, body) = app.request("GET", "/api/health/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["checks"]["database"], json!(true));
}
