//! Integration tests for the list endpoints.

use axum::http::{Method, StatusCode};
use serde_json::json;

mod common;
use common::{TestApp, list_body};

#[tokio::test]
async fn test_list_lifecycle() {
    let app = TestApp::new();

    let (status, created) = app
        .send(Method::POST, "/mailchimp/lists", Some(list_body()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["mail_chimp_id"], "mc-1");
    assert_eq!(created["name"], "New list");
    assert_eq!(created["contact"]["country"], "US");
    let list_id = created["list_id"].as_str().unwrap().to_string();
    let uri = format!("/mailchimp/lists/{list_id}");

    let (status, shown) = app.send(Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(shown, created);

    let (status, updated) = app
        .send(Method::PUT, &uri, Some(json!({ "name": "Renamed" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Renamed");
    assert_eq!(updated["permission_reminder"], created["permission_reminder"]);

    let (status, body) = app.send(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));

    let (status, body) = app.send(Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({ "message": format!("MailChimpList[{list_id}] not found") })
    );
}

#[tokio::test]
async fn test_invalid_list_reports_field_errors() {
    let app = TestApp::new();
    let mut body = list_body();
    body["contact"]["country"] = json!("USA");
    body["campaign_defaults"]["from_email"] = json!("not-an-email");

    let (status, response) = app.send(Method::POST, "/mailchimp/lists", Some(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["message"], "Invalid data given");
    assert_eq!(
        response["errors"]["contact.country"],
        json!(["The contact country must be 2 characters."])
    );
    assert_eq!(
        response["errors"]["campaign_defaults.from_email"],
        json!(["The campaign defaults from email must be a valid email address."])
    );
}

#[tokio::test]
async fn test_empty_body_reports_required_fields() {
    let app = TestApp::new();

    let (status, response) = app.send(Method::POST, "/mailchimp/lists", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response["errors"]["name"],
        json!(["The name field is required."])
    );
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = TestApp::new();

    let (status, response) = app
        .send_raw(Method::POST, "/mailchimp/lists", "{\"name\":".into())
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["message"].as_str().unwrap().starts_with("Malformed JSON body"));
}

#[tokio::test]
async fn test_remote_failure_is_bad_request() {
    let app = TestApp::new();
    app.remote.fail_with("API Key Invalid");

    let (status, response) = app
        .send(Method::POST, "/mailchimp/lists", Some(list_body()))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response, json!({ "message": "API Key Invalid" }));
}

#[tokio::test]
async fn test_unknown_list_update_is_not_found() {
    let app = TestApp::new();

    let (status, response) = app
        .send(
            Method::PUT,
            "/mailchimp/lists/missing",
            Some(json!({ "name": "x" })),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(response["message"], "MailChimpList[missing] not found");
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();

    let (status, response) = app.send(Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["status"], "ok");
}
