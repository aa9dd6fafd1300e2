mod common;

use axum::http::{Method, StatusCode};
use common::{TestApp, body_json};
use reactimail::db::enums::MessageTemplateType;
use reactimail::db::services::{MessageTemplateError, MessageTemplateInput, MessageTemplateService};
use serde_json::{Value, json};
use uuid::Uuid;

async fn create_template(app: &TestApp, cookie: &str, body: Value) -> Value {
    let response = app
        .json(Method::POST, "/api/message-templates", cookie, body)
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

fn id_of(value: &Value) -> &str {
    value["id"].as_str().unwrap()
}

#[tokio::test]
async fn created_template_carries_derived_fields() {
    let app = TestApp::new().await;
    let (account, cookie) = app.signed_in("alice@example.com").await;
    let welcome = app.create_tag(&cookie, "welcome").await;
    let newsletter = app.create_tag(&cookie, "newsletter").await;

    let template = create_template(
        &app,
        &cookie,
        json!({
            "type": "html",
            "title": "Order confirmation",
            "body": "Hello ${first_name}, your order ${order_id} is confirmed!\r\nyour member id is ${member_id}. Bye ${first_name}",
            "tags": [id_of(&welcome), id_of(&newsletter)],
        }),
    )
    .await;

    assert_eq!(template["type"], "html");
    assert_eq!(template["account_id"], account.id);
    assert_eq!(
        template["body_parameters"],
        json!(["first_name", "member_id", "order_id"])
    );
    assert_eq!(template["tag_names"], "newsletter,welcome");
    assert_eq!(template["tags"][0]["name"], "newsletter");
}

#[tokio::test]
async fn body_without_placeholders_has_no_parameters() {
    let app = TestApp::new().await;
    let (_, cookie) = app.signed_in("alice@example.com").await;

    let template = create_template(
        &app,
        &cookie,
        json!({ "type": "text", "title": "Plain", "body": "Hello, welcome to our service!" }),
    )
    .await;
    assert_eq!(template["body_parameters"], json!([]));
    assert_eq!(template["tag_names"], "");
}

#[tokio::test]
async fn malformed_placeholder_is_rejected_and_nothing_is_stored() {
    let app = TestApp::new().await;
    let (_, cookie) = app.signed_in("alice@example.com").await;

    let response = app
        .json(
            Method::POST,
            "/api/message-templates",
            &cookie,
            json!({ "type": "text", "title": "Broken", "body": "Invalid body ${missing_curly" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(
        body["errors"]["body"][0],
        "Template syntax error: Invalid placeholder in string: line 1, col 14"
    );

    let list = body_json(app.get("/api/message-templates", Some(cookie.as_str())).await).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn update_with_malformed_body_keeps_the_old_one() {
    let app = TestApp::new().await;
    let (_, cookie) = app.signed_in("alice@example.com").await;
    let template = create_template(
        &app,
        &cookie,
        json!({ "type": "text", "title": "Hi", "body": "Dear ${last_name}" }),
    )
    .await;
    let uri = format!("/api/message-templates/{}", id_of(&template));

    let response = app
        .json(
            Method::PUT,
            &uri,
            &cookie,
            json!({ "type": "text", "title": "Hi", "body": "Dear ${" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let stored = body_json(app.get(&uri, Some(cookie.as_str())).await).await;
    assert_eq!(stored["body"], "Dear ${last_name}");
    assert_eq!(stored["body_parameters"], json!(["last_name"]));
}

#[tokio::test]
async fn update_replaces_fields_and_tags() {
    let app = TestApp::new().await;
    let (_, cookie) = app.signed_in("alice@example.com").await;
    let welcome = app.create_tag(&cookie, "welcome").await;
    let billing = app.create_tag(&cookie, "billing").await;
    let template = create_template(
        &app,
        &cookie,
        json!({ "type": "text", "title": "Hi", "body": "Dear ${a}", "tags": [id_of(&welcome)] }),
    )
    .await;
    let uri = format!("/api/message-templates/{}", id_of(&template));

    let response = app
        .json(
            Method::PUT,
            &uri,
            &cookie,
            json!({ "type": "html", "title": "Invoice", "body": "Pay ${amount} by ${date}", "tags": [id_of(&billing)] }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["type"], "html");
    assert_eq!(updated["title"], "Invoice");
    assert_eq!(updated["body_parameters"], json!(["amount", "date"]));
    assert_eq!(updated["tag_names"], "billing");
}

#[tokio::test]
async fn another_accounts_tag_cannot_be_attached() {
    let app = TestApp::new().await;
    let (_, alice) = app.signed_in("alice@example.com").await;
    let (_, bob) = app.signed_in("bob@example.com").await;
    let foreign = app.create_tag(&bob, "secret").await;

    let response = app
        .json(
            Method::POST,
            "/api/message-templates",
            &alice,
            json!({ "type": "text", "title": "Hi", "body": "x", "tags": [id_of(&foreign)] }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(
        body["errors"]["tags"][0],
        format!(
            "Select a valid choice. {} is not one of the available choices.",
            id_of(&foreign)
        )
    );
}

#[tokio::test]
async fn invalid_form_reports_each_field() {
    let app = TestApp::new().await;
    let (_, cookie) = app.signed_in("alice@example.com").await;

    let response = app
        .json(
            Method::POST,
            "/api/message-templates",
            &cookie,
            json!({ "type": "sms", "title": "", "body": "" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let errors = &body_json(response).await["errors"];
    assert_eq!(
        errors["type"][0],
        "Select a valid choice. sms is not one of the available choices."
    );
    assert_eq!(errors["title"][0], "This field is required.");
    assert_eq!(errors["body"][0], "This field is required.");
}

#[tokio::test]
async fn templates_are_private_to_their_account() {
    let app = TestApp::new().await;
    let (_, alice) = app.signed_in("alice@example.com").await;
    let (_, bob) = app.signed_in("bob@example.com").await;
    let template = create_template(
        &app,
        &alice,
        json!({ "type": "text", "title": "Mine", "body": "Hi ${name}" }),
    )
    .await;
    let uri = format!("/api/message-templates/{}", id_of(&template));

    let list = body_json(app.get("/api/message-templates", Some(bob.as_str())).await).await;
    assert!(list.as_array().unwrap().is_empty());
    assert_eq!(app.get(&uri, Some(bob.as_str())).await.status(), StatusCode::NOT_FOUND);
    let update = app
        .json(
            Method::PUT,
            &uri,
            &bob,
            json!({ "type": "text", "title": "Stolen", "body": "x" }),
        )
        .await;
    assert_eq!(update.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.delete(&uri, &bob).await.status(), StatusCode::NOT_FOUND);

    assert_eq!(app.get(&uri, Some(alice.as_str())).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn list_is_ordered_by_title() {
    let app = TestApp::new().await;
    let (_, cookie) = app.signed_in("alice@example.com").await;
    for title in ["Welcome", "Invoice", "Reminder"] {
        create_template(
            &app,
            &cookie,
            json!({ "type": "text", "title": title, "body": "x" }),
        )
        .await;
    }

    let list = body_json(app.get("/api/message-templates", Some(cookie.as_str())).await).await;
    let titles: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["Invoice", "Reminder", "Welcome"]);
}

#[tokio::test]
async fn delete_removes_the_template() {
    let app = TestApp::new().await;
    let (_, cookie) = app.signed_in("alice@example.com").await;
    let template = create_template(
        &app,
        &cookie,
        json!({ "type": "text", "title": "Bye", "body": "x" }),
    )
    .await;
    let uri = format!("/api/message-templates/{}", id_of(&template));

    assert_eq!(app.delete(&uri, &cookie).await.status(), StatusCode::NO_CONTENT);
    assert_eq!(app.get(&uri, Some(cookie.as_str())).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        app.get("/api/message-templates/garbage", Some(cookie.as_str()))
            .await
            .status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn service_rejects_unknown_ids_for_foreign_accounts() {
    let app = TestApp::new().await;
    let alice = app.create_account("alice@example.com").await;
    let bob = app.create_account("bob@example.com").await;

    let input = MessageTemplateInput {
        kind: MessageTemplateType::Text,
        title: "Hi".to_string(),
        body: "Dear ${name}".to_string(),
        tag_ids: Vec::new(),
    };
    let created = MessageTemplateService::create(&app.db, alice.id, input.clone())
        .await
        .unwrap();
    assert_eq!(created.body_parameters, vec!["name"]);
    assert_eq!(created.to_string(), "Hi");

    assert!(matches!(
        MessageTemplateService::update(&app.db, bob.id, created.id, input).await,
        Err(MessageTemplateError::NotFound(_))
    ));
    assert!(matches!(
        MessageTemplateService::get_for(&app.db, alice.id, Uuid::new_v4()).await,
        Err(MessageTemplateError::NotFound(_))
    ));
}
