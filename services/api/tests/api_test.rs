use std::{sync::Arc, time::Duration};

use api_lib::{
    adapters::{InMemoryDb, StubDocumentAnalyzer},
    config::Config,
    web::{router, state::AppState},
};
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;

const BOUNDARY: &str = "study-assistant-boundary";

fn app() -> Router {
    let config = Config {
        analysis_delay: Duration::ZERO,
        ..Config::default()
    };
    let state = AppState::new(
        Arc::new(InMemoryDb::new()),
        Arc::new(StubDocumentAnalyzer::new(config.analysis_delay)),
        Arc::new(config),
    );
    router(Arc::new(state)).expect("router")
}

async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Option<String>, JsonValue) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or_default().to_string());
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            JsonValue::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, cookie, body)
}

fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: JsonValue) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

fn empty_request(method: &str, uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).expect("request")
}

fn upload_request(cookie: &str, files: &[(&str, &str)]) -> Request<Body> {
    let mut body = String::new();
    for (name, content_type) in files {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\nContent-Type: {content_type}\r\n\r\n%PDF-1.4 sample\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));

    Request::builder()
        .method("POST")
        .uri("/documents")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(header::COOKIE, cookie)
        .body(Body::from(body))
        .expect("request")
}

async fn signup(app: &Router, email: &str) -> String {
    let (status, cookie, body) = call(
        app,
        json_request(
            "POST",
            "/auth/signup",
            None,
            json!({ "email": email, "password": "correct horse" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    cookie.expect("session cookie")
}

fn plan_payload(title: &str) -> JsonValue {
    json!({
        "title": title,
        "description": "Prepare for the midterm",
        "start_date": "2024-01-01T00:00:00Z",
        "end_date": "2024-01-31T00:00:00Z",
        "schedule": {
            "2024-01-01": [{ "topics": ["Algebra"], "duration": 60, "resources": [] }]
        }
    })
}

fn text_field_request(cookie: &str) -> Request<Body> {
    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\njust some text, not a pdf\r\n--{BOUNDARY}--\r\n"
    );
    Request::builder()
        .method("POST")
        .uri("/documents")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(header::COOKIE, cookie)
        .body(Body::from(body))
        .expect("request")
}

#[tokio::test]
async fn health_is_public() {
    let app = app();
    let (status, _, body) = call(&app, empty_request("GET", "/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn protected_routes_require_a_live_session() {
    let app = app();
    let (status, _, _) = call(&app, empty_request("GET", "/plans", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = call(
        &app,
        empty_request("GET", "/documents", Some("session=not-a-session")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let cookie = signup(&app, "logout@example.com").await;
    let (status, _, _) = call(&app, empty_request("GET", "/plans", Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, cleared, _) =
        call(&app, empty_request("POST", "/auth/logout", Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cleared.as_deref(), Some("session="));

    let (status, _, _) = call(&app, empty_request("GET", "/plans", Some(&cookie))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn signup_and_login_rules() {
    let app = app();
    signup(&app, "Student@Example.com").await;

    let (status, _, _) = call(
        &app,
        json_request(
            "POST",
            "/auth/signup",
            None,
            json!({ "email": "student@example.com", "password": "another pass" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _, _) = call(
        &app,
        json_request(
            "POST",
            "/auth/signup",
            None,
            json!({ "email": "short@example.com", "password": "abc" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = call(
        &app,
        json_request(
            "POST",
            "/auth/login",
            None,
            json!({ "email": "student@example.com", "password": "wrong horse" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, cookie, body) = call(
        &app,
        json_request(
            "POST",
            "/auth/login",
            None,
            json!({ "email": "student@example.com", "password": "correct horse" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "student@example.com");
    assert!(cookie.is_some_and(|c| c.starts_with("session=")));
}

#[tokio::test]
async fn plan_schedule_round_trips() {
    let app = app();
    let cookie = signup(&app, "planner@example.com").await;

    let (status, _, created) = call(
        &app,
        json_request("POST", "/plans", Some(&cookie), plan_payload("Maths")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["scheduled_days"], 1);
    assert_eq!(created["session_count"], 1);
    assert_eq!(created["total_minutes"], 60.0);

    let (status, _, listed) = call(&app, empty_request("GET", "/plans", Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
    let plans = listed.as_array().expect("array");
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0]["id"], created["id"]);
    assert_eq!(plans[0]["title"], "Maths");
    assert_eq!(
        plans[0]["schedule"],
        json!({
            "2024-01-01": [{ "topics": ["Algebra"], "duration": 60.0, "resources": [] }]
        })
    );

    let id = created["id"].as_str().expect("id");
    let (status, _, fetched) = call(
        &app,
        empty_request("GET", &format!("/plans/{id}"), Some(&cookie)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["schedule"], plans[0]["schedule"]);
}

#[tokio::test]
async fn plans_list_newest_first_and_stay_private() {
    let app = app();
    let alice = signup(&app, "alice@example.com").await;
    let bob = signup(&app, "bob@example.com").await;

    for title in ["First", "Second"] {
        let (status, _, _) = call(
            &app,
            json_request("POST", "/plans", Some(&alice), plan_payload(title)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, _, listed) = call(&app, empty_request("GET", "/plans", Some(&alice))).await;
    let titles: Vec<&str> = listed
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|p| p["title"].as_str())
        .collect();
    assert_eq!(titles, vec!["Second", "First"]);

    let (_, _, others) = call(&app, empty_request("GET", "/plans", Some(&bob))).await;
    assert_eq!(others, json!([]));

    let id = listed[0]["id"].as_str().expect("id").to_string();
    let (status, _, _) = call(
        &app,
        empty_request("GET", &format!("/plans/{id}"), Some(&bob)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn blank_titles_are_rejected() {
    let app = app();
    let cookie = signup(&app, "blank@example.com").await;

    let (status, _, _) = call(
        &app,
        json_request("POST", "/plans", Some(&cookie), plan_payload("  ")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, _, listed) = call(&app, empty_request("GET", "/plans", Some(&cookie))).await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn fractional_durations_round_trip_and_negative_ones_are_rejected() {
    let app = app();
    let cookie = signup(&app, "durations@example.com").await;

    let mut payload = plan_payload("Long sessions");
    payload["schedule"]["2024-01-01"][0]["duration"] = json!(90.5);
    let (status, _, created) =
        call(&app, json_request("POST", "/plans", Some(&cookie), payload)).await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["total_minutes"], 90.5);

    let uri = format!("/plans/{}", created["id"].as_str().expect("id"));
    let (_, _, fetched) = call(&app, empty_request("GET", &uri, Some(&cookie))).await;
    assert_eq!(fetched["schedule"]["2024-01-01"][0]["duration"], 90.5);

    let mut payload = plan_payload("Backwards");
    payload["schedule"]["2024-01-01"][0]["duration"] = json!(-30);
    let (status, _, _) = call(&app, json_request("POST", "/plans", Some(&cookie), payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, _, listed) = call(&app, empty_request("GET", "/plans", Some(&cookie))).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn deleting_a_plan_is_idempotent() {
    let app = app();
    let cookie = signup(&app, "delete@example.com").await;
    let (_, _, created) = call(
        &app,
        json_request("POST", "/plans", Some(&cookie), plan_payload("Temporary")),
    )
    .await;
    let uri = format!("/plans/{}", created["id"].as_str().expect("id"));

    for _ in 0..2 {
        let (status, _, _) = call(&app, empty_request("DELETE", &uri, Some(&cookie))).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    let (status, _, _) = call(&app, empty_request("GET", &uri, Some(&cookie))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn pdf_uploads_are_analyzed_and_listed() {
    let app = app();
    let cookie = signup(&app, "reader@example.com").await;

    let (status, _, document) = call(
        &app,
        upload_request(&cookie, &[("chapter1.pdf", "application/pdf")]),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{document}");
    assert_eq!(document["title"], "chapter1.pdf");
    assert_eq!(document["key_points"].as_array().map(Vec::len), Some(3));
    assert_eq!(document["mcqs"][0]["type"], "multiple_choice");
    assert_eq!(document["mcqs"][1]["type"], "fill_in_blank");

    let (status, _, listed) = call(&app, empty_request("GET", "/documents", Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed[0]["id"], document["id"]);

    let uri = format!("/documents/{}", document["id"].as_str().expect("id"));
    let (status, _, fetched) = call(&app, empty_request("GET", &uri, Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["summary"], document["summary"]);

    let stranger = signup(&app, "stranger@example.com").await;
    let (status, _, _) = call(&app, empty_request("GET", &uri, Some(&stranger))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn only_a_single_pdf_is_accepted() {
    let app = app();
    let cookie = signup(&app, "picky@example.com").await;

    let (status, _, _) = call(&app, upload_request(&cookie, &[("notes.txt", "text/plain")])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = call(
        &app,
        upload_request(
            &cookie,
            &[("a.pdf", "application/pdf"), ("b.pdf", "application/pdf")],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = call(&app, upload_request(&cookie, &[])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, body) = call(&app, text_field_request(&cookie)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let (_, _, listed) = call(&app, empty_request("GET", "/documents", Some(&cookie))).await;
    assert_eq!(listed, json!([]));
}
