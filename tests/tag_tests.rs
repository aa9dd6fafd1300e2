mod common;

use axum::http::{Method, StatusCode};
use common::{TestApp, body_json};
use reactimail::db::services::{TagError, TagService};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn tags_are_listed_by_name_for_their_owner_only() {
    let app = TestApp::new().await;
    let (_, alice) = app.signed_in("alice@example.com").await;
    let (_, bob) = app.signed_in("bob@example.com").await;

    app.create_tag(&alice, "welcome").await;
    app.create_tag(&alice, "newsletter").await;
    app.create_tag(&bob, "billing").await;

    let tags = body_json(app.get("/api/tags", Some(alice.as_str())).await).await;
    let names: Vec<&str> = tags
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["newsletter", "welcome"]);
}

#[tokio::test]
async fn duplicate_name_in_one_account_is_a_conflict() {
    let app = TestApp::new().await;
    let (_, cookie) = app.signed_in("alice@example.com").await;
    app.create_tag(&cookie, "welcome").await;

    let response = app
        .json(Method::POST, "/api/tags", &cookie, json!({ "name": "welcome" }))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(
        body["errors"]["name"][0],
        "A tag with the name 'welcome' already exists."
    );
}

#[tokio::test]
async fn same_name_in_two_accounts_is_fine() {
    let app = TestApp::new().await;
    let (_, alice) = app.signed_in("alice@example.com").await;
    let (_, bob) = app.signed_in("bob@example.com").await;

    app.create_tag(&alice, "welcome").await;
    app.create_tag(&bob, "welcome").await;
}

#[tokio::test]
async fn blank_or_missing_name_is_rejected() {
    let app = TestApp::new().await;
    let (_, cookie) = app.signed_in("alice@example.com").await;

    for body in [json!({ "name": "   " }), json!({})] {
        let response = app.json(Method::POST, "/api/tags", &cookie, body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["errors"]["name"][0], "This field is required.");
    }
}

#[tokio::test]
async fn renaming_to_the_current_name_succeeds() {
    let app = TestApp::new().await;
    let (_, cookie) = app.signed_in("alice@example.com").await;
    let tag = app.create_tag(&cookie, "welcome").await;
    let uri = format!("/api/tags/{}", tag["id"].as_str().unwrap());

    let response = app
        .json(Method::PUT, &uri, &cookie, json!({ "name": "welcome" }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn renaming_onto_another_tag_is_a_conflict() {
    let app = TestApp::new().await;
    let (_, cookie) = app.signed_in("alice@example.com").await;
    app.create_tag(&cookie, "welcome").await;
    let other = app.create_tag(&cookie, "newsletter").await;
    let uri = format!("/api/tags/{}", other["id"].as_str().unwrap());

    let response = app
        .json(Method::PUT, &uri, &cookie, json!({ "name": "welcome" }))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let renamed = app
        .json(Method::PUT, &uri, &cookie, json!({ "name": "offers" }))
        .await;
    assert_eq!(renamed.status(), StatusCode::OK);
    assert_eq!(body_json(renamed).await["name"], "offers");
}

#[tokio::test]
async fn another_accounts_tag_is_not_found() {
    let app = TestApp::new().await;
    let (_, alice) = app.signed_in("alice@example.com").await;
    let (_, bob) = app.signed_in("bob@example.com").await;
    let tag = app.create_tag(&alice, "welcome").await;
    let uri = format!("/api/tags/{}", tag["id"].as_str().unwrap());

    assert_eq!(app.get(&uri, Some(bob.as_str())).await.status(), StatusCode::NOT_FOUND);
    let rename = app
        .json(Method::PUT, &uri, &bob, json!({ "name": "mine" }))
        .await;
    assert_eq!(rename.status(), StatusCode::NOT_FOUND);
    // Invalid bodies do not reveal that the tag exists.
    let blank = app.json(Method::PUT, &uri, &bob, json!({ "name": "" })).await;
    assert_eq!(blank.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.delete(&uri, &bob).await.status(), StatusCode::NOT_FOUND);

    let still_there = body_json(app.get(&uri, Some(alice.as_str())).await).await;
    assert_eq!(still_there["name"], "welcome");
}

#[tokio::test]
async fn malformed_and_unknown_ids_are_not_found() {
    let app = TestApp::new().await;
    let (_, cookie) = app.signed_in("alice@example.com").await;

    let malformed = app.get("/api/tags/not-a-uuid", Some(cookie.as_str())).await;
    assert_eq!(malformed.status(), StatusCode::NOT_FOUND);

    let unknown = app
        .get(&format!("/api/tags/{}", Uuid::new_v4()), Some(cookie.as_str()))
        .await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_tag_keeps_its_templates() {
    let app = TestApp::new().await;
    let (_, cookie) = app.signed_in("alice@example.com").await;
    let tag = app.create_tag(&cookie, "welcome").await;
    let tag_id = tag["id"].as_str().unwrap();

    let template = app
        .json(
            Method::POST,
            "/api/message-templates",
            &cookie,
            json!({ "type": "text", "title": "Hi", "body": "Hello ${name}", "tags": [tag_id] }),
        )
        .await;
    assert_eq!(template.status(), StatusCode::CREATED);
    let template_id = body_json(template).await["id"].as_str().unwrap().to_string();

    let deleted = app.delete(&format!("/api/tags/{tag_id}"), &cookie).await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let detail = body_json(
        app.get(&format!("/api/message-templates/{template_id}"), Some(cookie.as_str()))
            .await,
    )
    .await;
    assert_eq!(detail["tag_names"], "");
    assert!(detail["tags"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn service_scopes_every_operation_to_the_account() {
    let app = TestApp::new().await;
    let alice = app.create_account("alice@example.com").await;
    let bob = app.create_account("bob@example.com").await;

    let tag = TagService::create(&app.db, alice.id, "welcome".to_string())
        .await
        .unwrap();

    assert!(matches!(
        TagService::get_for(&app.db, bob.id, tag.id).await,
        Err(TagError::NotFound(_))
    ));
    assert!(matches!(
        TagService::rename(&app.db, bob.id, tag.id, "x".to_string()).await,
        Err(TagError::NotFound(_))
    ));
    assert!(matches!(
        TagService::delete(&app.db, bob.id, tag.id).await,
        Err(TagError::NotFound(_))
    ));
    assert!(TagService::list_for(&app.db, bob.id).await.unwrap().is_empty());
    assert!(matches!(
        TagService::create(&app.db, alice.id, "welcome".to_string()).await,
        Err(TagError::DuplicateName(name)) if name == "welcome"
    ));
}
