use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use tajroyals_api::app;
use tajroyals_api::auth::{generate_jwt, AppRole, Claims};

const BOUNDARY: &str = "clubtestboundary";

fn multipart_fields(fields: &[(&str, &str)]) -> String {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
            BOUNDARY, name, value
        ));
    }
    body.push_str(&format!("--{}--\r\n", BOUNDARY));
    body
}

async fn post_multipart(path: &str, fields: &[(&str, &str)]) -> (StatusCode, Value) {
    let claims = Claims::for_member(Uuid::new_v4(), "admin".to_string(), AppRole::Admin);
    let token = generate_jwt(&claims).unwrap();

    let request = Request::builder()
        .uri(path)
        .method("POST")
        .header("authorization", format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_fields(fields)))
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

// These uploads carry text fields but no file part; the handlers must read
// the fields and then reject cleanly before touching storage or the database.

#[tokio::test]
async fn hero_upload_without_file_is_a_bad_request() {
    let (status, body) =
        post_multipart("/api/admin/hero", &[("alt_text", "Sunday ride")]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing file part");
}

#[tokio::test]
async fn gallery_photo_upload_without_file_is_a_bad_request() {
    let album_id = Uuid::new_v4();
    let path = format!("/api/admin/gallery/albums/{}/photos", album_id);
    let (status, body) = post_multipart(&path, &[("caption", "Pit stop")]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing file part");
}

#[tokio::test]
async fn announcement_without_required_fields_is_a_bad_request() {
    let (status, body) =
        post_multipart("/api/admin/announcements", &[("title", "Monsoon ride")]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing field: description");
}
