mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{PASSWORD, spawn_app, spawn_app_with};
use planyty::config::TeamResolution;
use planyty::db::repositories::invitation::mark_accepted;
use planyty::domain::{InvitationStatus, UserRole};
use planyty::entities::teams;
use sea_orm::EntityTrait;
use serde_json::json;

#[tokio::test]
async fn initiate_signup_only_for_valid_pending_invitations() {
    let app = spawn_app().await;
    let owner = app.seed_user("owner@example.com", UserRole::TeamLead).await;
    let (workspace, _) = app.seed_workspace(&owner, "Core").await;

    let invitation = app
        .seed_invitation(
            &workspace,
            &owner,
            "new@example.com",
            UserRole::TeamLead,
            Utc::now() + Duration::days(7),
        )
        .await;

    let (status, body) = app
        .request(
            "POST",
            "/api/auth/initiate-signup",
            None,
            Some(json!({ "email": "New@Example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["token"], json!(invitation.token));
    assert_eq!(body["data"]["role"], json!("team_lead"));
    assert_eq!(body["data"]["workspace_id"], json!(workspace.id));

    mark_accepted(&app.store.conn, invitation).await.unwrap();

    let (status, _) = app
        .request(
            "POST",
            "/api/auth/initiate-signup",
            None,
            Some(json!({ "email": "new@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    app.seed_invitation(
        &workspace,
        &owner,
        "late@example.com",
        UserRole::Member,
        Utc::now() - Duration::hours(1),
    )
    .await;

    let (status, _) = app
        .request(
            "POST",
            "/api/auth/initiate-signup",
            None,
            Some(json!({ "email": "late@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .request(
            "POST",
            "/api/auth/initiate-signup",
            None,
            Some(json!({ "email": "stranger@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn initiate_signup_rejects_existing_accounts() {
    let app = spawn_app().await;
    let owner = app.seed_user("owner@example.com", UserRole::TeamLead).await;
    let (workspace, _) = app.seed_workspace(&owner, "Core").await;
    app.seed_pending_invitation(&workspace, &owner, "owner@example.com")
        .await;

    let (status, _) = app
        .request(
            "POST",
            "/api/auth/initiate-signup",
            None,
            Some(json!({ "email": "owner@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn accepting_creates_account_and_membership() {
    let app = spawn_app().await;
    let owner = app.seed_user("owner@example.com", UserRole::TeamLead).await;
    let (workspace, team) = app.seed_workspace(&owner, "Core").await;
    let invitation = app
        .seed_pending_invitation(&workspace, &owner, "joiner@example.com")
        .await;

    let (status, body) = app
        .request("GET", &format!("/api/invitations/{}", invitation.token), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["workspace_name"], json!("Core"));
    assert_eq!(body["data"]["expired"], json!(false));

    let (status, body) = app
        .request(
            "POST",
            &format!("/api/invitations/accept/{}", invitation.token),
            None,
            Some(json!({ "name": "Joiner", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["team_id"], json!(team.id));
    assert_eq!(body["data"]["joined"], json!(true));
    assert_eq!(body["data"]["user"]["role"], json!("member"));

    let token = body["data"]["token"].as_str().unwrap().to_string();
    let (status, body) = app.request("GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], json!("joiner@example.com"));

    let stored = app.store.invitations().get(invitation.id).await.unwrap().unwrap();
    assert_eq!(stored.status, InvitationStatus::Accepted);
    assert!(stored.accepted_at.is_some());

    let (status, _) = app
        .request(
            "POST",
            &format!("/api/invitations/accept/{}", invitation.token),
            None,
            Some(json!({ "name": "Joiner", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn repeated_acceptance_never_duplicates_membership() {
    let app = spawn_app().await;
    let owner = app.seed_user("owner@example.com", UserRole::TeamLead).await;
    let (workspace, team) = app.seed_workspace(&owner, "Core").await;

    let first = app
        .seed_pending_invitation(&workspace, &owner, "twice@example.com")
        .await;
    let second = app
        .seed_pending_invitation(&workspace, &owner, "twice@example.com")
        .await;

    let accepted = app
        .shared
        .invitation_service
        .accept_invitation(&first.token, "Twice", PASSWORD)
        .await
        .unwrap();
    assert!(accepted.joined);

    let again = app
        .shared
        .invitation_service
        .accept_invitation(&second.token, "Twice", PASSWORD)
        .await
        .unwrap();
    assert!(!again.joined);
    assert_eq!(again.user.id, accepted.user.id);

    let count = app.count_memberships(team.id, accepted.user.id).await;
    assert_eq!(count, 1);
}

#[tokio::test]
async fn failed_acceptance_leaves_no_user_behind() {
    let app = spawn_app().await;
    let owner = app.seed_user("owner@example.com", UserRole::TeamLead).await;
    let (workspace, team) = app.seed_workspace(&owner, "Empty").await;
    let invitation = app
        .seed_pending_invitation(&workspace, &owner, "orphan@example.com")
        .await;

    teams::Entity::delete_by_id(team.id)
        .exec(&app.store.conn)
        .await
        .unwrap();

    let (status, _) = app
        .request(
            "POST",
            &format!("/api/invitations/accept/{}", invitation.token),
            None,
            Some(json!({ "name": "Orphan", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let user = app
        .store
        .users()
        .get_by_email("orphan@example.com")
        .await
        .unwrap();
    assert!(user.is_none());

    let stored = app.store.invitations().get(invitation.id).await.unwrap().unwrap();
    assert_eq!(stored.status, InvitationStatus::Pending);
}

#[tokio::test]
async fn expired_invitation_acceptance_follows_config() {
    let lenient = spawn_app().await;
    let owner = lenient.seed_user("owner@example.com", UserRole::TeamLead).await;
    let (workspace, _) = lenient.seed_workspace(&owner, "Core").await;
    let invitation = lenient
        .seed_invitation(
            &workspace,
            &owner,
            "late@example.com",
            UserRole::Member,
            Utc::now() - Duration::hours(1),
        )
        .await;
    let result = lenient
        .shared
        .invitation_service
        .accept_invitation(&invitation.token, "Late", PASSWORD)
        .await;
    assert!(result.is_ok());

    let strict = spawn_app_with(|config| config.invitations.enforce_expiry_on_accept = true).await;
    let owner = strict.seed_user("owner@example.com", UserRole::TeamLead).await;
    let (workspace, _) = strict.seed_workspace(&owner, "Core").await;
    let invitation = strict
        .seed_invitation(
            &workspace,
            &owner,
            "late@example.com",
            UserRole::Member,
            Utc::now() - Duration::hours(1),
        )
        .await;
    let (status, _) = strict
        .request(
            "POST",
            &format!("/api/invitations/accept/{}", invitation.token),
            None,
            Some(json!({ "name": "Late", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(
        strict
            .store
            .users()
            .get_by_email("late@example.com")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn login_promotes_pending_invitations() {
    let app = spawn_app().await;
    let owner = app.seed_user("owner@example.com", UserRole::TeamLead).await;
    let (workspace, team) = app.seed_workspace(&owner, "Core").await;
    let member = app.seed_user("existing@example.com", UserRole::Member).await;
    let invitation = app
        .seed_pending_invitation(&workspace, &owner, "existing@example.com")
        .await;

    let (status, _) = app.login("existing@example.com", PASSWORD).await;
    assert_eq!(status, StatusCode::OK);

    let count = app.count_memberships(team.id, member.id).await;
    assert_eq!(count, 1);

    let stored = app.store.invitations().get(invitation.id).await.unwrap().unwrap();
    assert_eq!(stored.status, InvitationStatus::Accepted);

    let (status, body) = app
        .request("GET", "/api/workspaces", Some(&app.token_for(&member)), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["id"], json!(workspace.id));
}

#[tokio::test]
async fn only_workspace_owner_can_invite() {
    let app = spawn_app().await;
    let owner = app.seed_user("owner@example.com", UserRole::TeamLead).await;
    let member = app.seed_user("member@example.com", UserRole::Member).await;
    let (workspace, team) = app.seed_workspace(&owner, "Core").await;
    app.add_member(&team, &member).await;

    let body = json!({ "workspace_id": workspace.id, "email": "guest@example.com", "role": "member" });

    let (status, _) = app
        .request("POST", "/api/invitations", Some(&app.token_for(&member)), Some(body.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let owner_token = app.token_for(&owner);
    let (status, created) = app
        .request("POST", "/api/invitations", Some(&owner_token), Some(body.clone()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(created["data"].get("token").is_none());
    assert_eq!(created["data"]["status"], json!("pending"));

    let (status, resent) = app
        .request("POST", "/api/invitations", Some(&owner_token), Some(body))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resent["data"]["id"], created["data"]["id"]);

    let (status, _) = app
        .request(
            "POST",
            "/api/invitations",
            Some(&owner_token),
            Some(json!({ "workspace_id": workspace.id, "email": "member@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .request(
            "POST",
            "/api/invitations",
            Some(&owner_token),
            Some(json!({ "workspace_id": workspace.id, "email": "boss@example.com", "role": "admin" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, listed) = app
        .request(
            "GET",
            &format!("/api/workspaces/{}/invitations", workspace.id),
            Some(&owner_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);

    let id = created["data"]["id"].as_i64().unwrap();
    let (status, _) = app
        .request("DELETE", &format!("/api/invitations/{id}"), Some(&owner_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn existing_account_must_present_its_password_to_accept() {
    let app = spawn_app().await;
    let owner = app.seed_user("owner@example.com", UserRole::TeamLead).await;
    let (alpha, _) = app.seed_workspace(&owner, "Alpha").await;
    let (beta, beta_team) = app.seed_workspace(&owner, "Beta").await;
    let invitee = app.seed_user("invitee@example.com", UserRole::Member).await;

    app.seed_pending_invitation(&alpha, &owner, "invitee@example.com")
        .await;
    let other = app
        .seed_pending_invitation(&beta, &owner, "invitee@example.com")
        .await;
    let uri = format!("/api/invitations/accept/{}", other.token);

    let (status, body) = app.request("POST", &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["data"].get("token").is_none());

    let (status, _) = app
        .request(
            "POST",
            &uri,
            None,
            Some(json!({ "name": "Anyone", "password": "not-the-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert_eq!(app.count_memberships(beta_team.id, invitee.id).await, 0);
    let stored = app.store.invitations().get(other.id).await.unwrap().unwrap();
    assert_eq!(stored.status, InvitationStatus::Pending);

    let (status, body) = app
        .request("POST", &uri, None, Some(json!({ "password": PASSWORD })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["id"], json!(invitee.id));
    assert_eq!(body["data"]["team_id"], json!(beta_team.id));
}

#[tokio::test]
async fn inactive_account_cannot_accept_invitations() {
    let app = spawn_app().await;
    let owner = app.seed_user("owner@example.com", UserRole::TeamLead).await;
    let (workspace, team) = app.seed_workspace(&owner, "Core").await;
    let dormant = app.seed_user("dormant@example.com", UserRole::Member).await;
    let invitation = app
        .seed_pending_invitation(&workspace, &owner, "dormant@example.com")
        .await;

    app.store.users().set_active(dormant.id, false).await.unwrap();

    let (status, _) = app
        .request(
            "POST",
            &format!("/api/invitations/accept/{}", invitation.token),
            None,
            Some(json!({ "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(app.count_memberships(team.id, dormant.id).await, 0);
}

#[tokio::test]
async fn single_team_resolution_rejects_workspaces_with_several_teams() {
    let app = spawn_app_with(|config| config.invitations.team_resolution = TeamResolution::Single).await;
    let owner = app.seed_user("owner@example.com", UserRole::TeamLead).await;
    let (workspace, _) = app.seed_workspace(&owner, "Core").await;
    app.seed_team(&workspace, &owner, "Design").await;
    let invitation = app
        .seed_pending_invitation(&workspace, &owner, "pick@example.com")
        .await;

    let (status, _) = app
        .request(
            "POST",
            &format!("/api/invitations/accept/{}", invitation.token),
            None,
            Some(json!({ "name": "Pick", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    assert!(
        app.store
            .users()
            .get_by_email("pick@example.com")
            .await
            .unwrap()
            .is_none()
    );
    let stored = app.store.invitations().get(invitation.id).await.unwrap().unwrap();
    assert_eq!(stored.status, InvitationStatus::Pending);
}

#[tokio::test]
async fn first_team_resolution_joins_the_oldest_team() {
    let app = spawn_app().await;
    let owner = app.seed_user("owner@example.com", UserRole::TeamLead).await;
    let (workspace, oldest) = app.seed_workspace(&owner, "Core").await;
    let newer = app.seed_team(&workspace, &owner, "Design").await;
    let invitation = app
        .seed_pending_invitation(&workspace, &owner, "pick@example.com")
        .await;

    let accepted = app
        .shared
        .invitation_service
        .accept_invitation(&invitation.token, "Pick", PASSWORD)
        .await
        .unwrap();

    assert_eq!(accepted.team_id, oldest.id);
    assert_eq!(app.count_memberships(oldest.id, accepted.user.id).await, 1);
    assert_eq!(app.count_memberships(newer.id, accepted.user.id).await, 0);
}

#[tokio::test]
async fn login_sync_keeps_invitations_without_a_team_pending() {
    let app = spawn_app().await;
    let owner = app.seed_user("owner@example.com", UserRole::TeamLead).await;
    let (empty, empty_team) = app.seed_workspace(&owner, "Empty").await;
    let (core, core_team) = app.seed_workspace(&owner, "Core").await;
    let member = app.seed_user("existing@example.com", UserRole::Member).await;

    let stranded = app
        .seed_pending_invitation(&empty, &owner, "existing@example.com")
        .await;
    let usable = app
        .seed_pending_invitation(&core, &owner, "existing@example.com")
        .await;

    teams::Entity::delete_by_id(empty_team.id)
        .exec(&app.store.conn)
        .await
        .unwrap();

    let (status, _) = app.login("existing@example.com", PASSWORD).await;
    assert_eq!(status, StatusCode::OK);

    let stored = app.store.invitations().get(stranded.id).await.unwrap().unwrap();
    assert_eq!(stored.status, InvitationStatus::Pending);

    let stored = app.store.invitations().get(usable.id).await.unwrap().unwrap();
    assert_eq!(stored.status, InvitationStatus::Accepted);
    assert_eq!(app.count_memberships(core_team.id, member.id).await, 1);
}

#[tokio::test]
async fn login_sync_skips_expired_invitations_when_expiry_is_enforced() {
    let app =
        spawn_app_with(|config| config.invitations.enforce_expiry_on_accept = true).await;
    let owner = app.seed_user("owner@example.com", UserRole::TeamLead).await;
    let (workspace, team) = app.seed_workspace(&owner, "Core").await;
    let member = app.seed_user("existing@example.com", UserRole::Member).await;
    let invitation = app
        .seed_invitation(
            &workspace,
            &owner,
            "existing@example.com",
            UserRole::Member,
            Utc::now() - Duration::hours(1),
        )
        .await;

    let (status, _) = app.login("existing@example.com", PASSWORD).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(app.count_memberships(team.id, member.id).await, 0);
    let stored = app.store.invitations().get(invitation.id).await.unwrap().unwrap();
    assert_eq!(stored.status, InvitationStatus::Pending);
}
