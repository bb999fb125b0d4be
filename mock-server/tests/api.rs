use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with_token, UNIQUE_MESSAGE};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn get_request(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

// --- collections ---

#[tokio::test]
async fn list_articles_echoes_query() {
    let resp = app()
        .oneshot(get_request("/api/articles?populate[0]=cover&locale=fr"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["meta"]["query"], "populate[0]=cover&locale=fr");
    assert_eq!(body["meta"]["pagination"]["total"], 2);
}

#[tokio::test]
async fn get_article_by_id() {
    let resp = app().oneshot(get_request("/api/articles/2")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["data"]["slug"], "aiguille-du-midi");
}

#[tokio::test]
async fn unknown_collection_is_404_envelope() {
    let resp = app().oneshot(get_request("/api/nope")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["data"], Value::Null);
    assert_eq!(body["error"]["name"], "NotFoundError");
    assert_eq!(body["error"]["message"], "Not Found");
}

#[tokio::test]
async fn unknown_entry_is_404() {
    let resp = app().oneshot(get_request("/api/articles/99")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- subscriptions ---

#[tokio::test]
async fn create_subscriber_returns_entry() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/newsletter-subs",
            r#"{"data":{"email":"a@b.com","source":"homepage","consent":true}}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["data"]["id"], 1);
    assert_eq!(body["data"]["attributes"]["email"], "a@b.com");
    assert_eq!(body["data"]["attributes"]["consent"], true);
}

#[tokio::test]
async fn create_subscriber_without_data_is_400() {
    let resp = app()
        .oneshot(json_request("POST", "/api/newsletter-subs", r#"{"email":"a@b.com"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["name"], "ValidationError");
}

#[tokio::test]
async fn create_subscriber_with_bad_consent_is_400() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/newsletter-subs",
            r#"{"data":{"email":"a@b.com","consent":"yes"}}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["details"]["errors"][0]["path"], json!(["consent"]));
}

#[tokio::test]
async fn token_is_enforced_when_configured() {
    let resp = app_with_token(Some("s3cret"))
        .oneshot(get_request("/api/articles"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app_with_token(Some("s3cret"))
        .oneshot(
            Request::builder()
                .uri("/api/articles")
                .header(http::header::AUTHORIZATION, "Bearer s3cret")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

// --- unique email lifecycle ---

#[tokio::test]
async fn duplicate_email_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();
    let payload = r#"{"data":{"email":"dup@example.com","source":"footer","consent":true}}"#;

    // first signup
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/api/newsletter-subs", payload))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // second signup with the same email
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/api/newsletter-subs", payload))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["name"], "ValidationError");
    assert_eq!(body["error"]["message"], UNIQUE_MESSAGE);

    // only one stored
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request("/api/newsletter-subs"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["attributes"]["source"], "footer");
}
