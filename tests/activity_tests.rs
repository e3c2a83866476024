mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::spawn_app;
use planyty::domain::UserRole;
use planyty::domain::events::ActivityEvent;
use planyty::services::scheduler::prune;
use serde_json::{Value, json};

/// Activity rows are written by the background listener; poll until they land.
async fn wait_for_activity(app: &common::TestApp, workspace_id: i32, token: &str, count: usize) -> Value {
    let uri = format!("/api/workspaces/{workspace_id}/activity");
    for _ in 0..100 {
        let (status, body) = app.request("GET", &uri, Some(token), None).await;
        assert_eq!(status, StatusCode::OK);
        if body["data"]["items"].as_array().map_or(0, Vec::len) >= count {
            return body;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    panic!("activity for workspace {workspace_id} never reached {count} entries");
}

#[tokio::test]
async fn workspace_activity_is_recorded_and_paginated() {
    let app = spawn_app().await;
    let lead = app.seed_user("lead@example.com", UserRole::TeamLead).await;
    let token = app.token_for(&lead);

    let (status, created) = app
        .request("POST", "/api/workspaces", Some(&token), Some(json!({ "name": "Ops" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    let workspace_id = i32::try_from(created["data"]["workspace"]["id"].as_i64().unwrap()).unwrap();

    let (status, _) = app
        .request(
            "POST",
            "/api/invitations",
            Some(&token),
            Some(json!({ "workspace_id": workspace_id, "email": "guest@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let body = wait_for_activity(&app, workspace_id, &token, 2).await;
    let items = body["data"]["items"].as_array().unwrap();
    let types: Vec<&str> = items
        .iter()
        .filter_map(|item| item["event_type"].as_str())
        .collect();
    assert!(types.contains(&"WorkspaceCreated"));
    assert!(types.contains(&"InvitationSent"));

    let invitation = items
        .iter()
        .find(|item| item["event_type"] == json!("InvitationSent"))
        .unwrap();
    assert_eq!(invitation["details"]["payload"]["email"], json!("guest@example.com"));
    assert!(invitation["details"]["payload"].get("token").is_none());
    assert_eq!(invitation["actor_id"], json!(lead.id));

    let (status, page) = app
        .request(
            "GET",
            &format!("/api/workspaces/{workspace_id}/activity?page=1&page_size=1"),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["data"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(page["data"]["total_pages"], json!(2));

    let (status, _) = app
        .request(
            "GET",
            &format!("/api/workspaces/{workspace_id}/activity?page_size=500"),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .request(
            "GET",
            &format!(
                "/api/workspaces/{workspace_id}/activity?page={}&page_size=100",
                u64::MAX
            ),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, beyond) = app
        .request(
            "GET",
            &format!("/api/workspaces/{workspace_id}/activity?page=50&page_size=100"),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(beyond["data"]["items"], json!([]));
    assert_eq!(beyond["data"]["total_pages"], json!(1));
}

#[tokio::test]
async fn handled_events_count_by_type() {
    let app = spawn_app().await;
    let user = app.seed_user("someone@example.com", UserRole::Member).await;

    app.shared
        .notifications
        .handle_event(ActivityEvent::UserLoggedIn { user_id: user.id })
        .await;

    let count = app
        .store
        .activity()
        .count_by_type("UserLoggedIn")
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn maintenance_prunes_stale_rows() {
    let app = spawn_app().await;
    let owner = app.seed_user("owner@example.com", UserRole::TeamLead).await;
    let (workspace, _) = app.seed_workspace(&owner, "Core").await;

    let stale = app
        .seed_invitation(
            &workspace,
            &owner,
            "stale@example.com",
            UserRole::Member,
            Utc::now() - Duration::days(45),
        )
        .await;
    let recent = app
        .seed_invitation(
            &workspace,
            &owner,
            "recent@example.com",
            UserRole::Member,
            Utc::now() - Duration::days(1),
        )
        .await;

    app.store
        .activity()
        .add("WorkspaceCreated", Some(owner.id), Some(workspace.id), "old entry", None)
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;

    let mut maintenance = app.config.maintenance.clone();
    maintenance.activity_retention_days = 0;

    let report = prune(&app.store, &maintenance, &app.config.invitations)
        .await
        .unwrap();

    assert_eq!(report.invitations_pruned, 1);
    assert!(report.activity_pruned >= 1);
    assert!(app.store.invitations().get(stale.id).await.unwrap().is_none());
    assert!(app.store.invitations().get(recent.id).await.unwrap().is_some());
}
