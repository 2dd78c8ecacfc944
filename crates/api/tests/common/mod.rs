#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use hippolens_api::config::ServerConfig;
use hippolens_api::router::build_app_router;
use hippolens_api::state::AppState;
use hippolens_core::dataset::Dataset;

/// Origin used by CORS tests.
pub const TEST_ORIGIN: &str = "http://localhost:3000";

/// Test application plus the temporary dataset backing it. Keep the
/// `TempDir` alive for as long as the router is used.
pub struct TestApp {
    pub router: Router,
    pub dir: TempDir,
}

/// Build a test `ServerConfig` rooted at `root`.
pub fn test_config(root: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec![TEST_ORIGIN.to_string()],
        request_timeout_secs: 30,
        dataset_dir: root.join("dataset"),
        client_dir: root.join("client"),
        max_file_bytes: 4096,
        max_folder_files: 5,
    }
}

/// Build the full application over a fresh fixture dataset.
pub fn build_test_app() -> TestApp {
    build_test_app_with(|_| {})
}

/// Like [`build_test_app`], letting the caller tweak the config first.
pub fn build_test_app_with(adjust: impl FnOnce(&mut ServerConfig)) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    adjust(&mut config);
    write_fixture_dataset(&config.dataset_dir);
    write_fixture_client(&config.client_dir);

    let dataset = Dataset::load(&config.dataset_dir).unwrap();
    let state = AppState {
        dataset: Arc::new(dataset),
        config: Arc::new(config.clone()),
    };

    TestApp {
        router: build_app_router(state, &config),
        dir,
    }
}

fn polygon(xs: &[f64], ys: &[f64]) -> Value {
    json!({
        "shape_attributes": {
            "name": "polygon",
            "all_points_x": xs,
            "all_points_y": ys,
        },
        "region_attributes": { "class": "hippocampus" }
    })
}

/// Patient 7: slides 9, 10, 11 in the test split. Slide 9 has no regions,
/// slide 10 one polygon, slide 11 only a rectangle.
/// Patient 8: slide 3 in the train split with two regions.
/// Patient 9: slide 1 on disk in the train split with no record.
fn write_fixture_dataset(root: &Path) {
    std::fs::create_dir_all(root.join("images/test")).unwrap();
    std::fs::create_dir_all(root.join("images/train")).unwrap();

    let test = json!({
        "image_7_9.jpg1000": {
            "filename": "image_7_9.jpg",
            "size": 1000,
            "regions": [],
            "file_attributes": {}
        },
        "image_7_10.jpg1001": {
            "filename": "image_7_10.jpg",
            "size": 1001,
            "regions": [polygon(&[0.0, 10.0, 10.0, 0.0], &[0.0, 0.0, 10.0, 10.0])],
            "file_attributes": {}
        },
        "image_7_11.jpg1002": {
            "filename": "image_7_11.jpg",
            "size": 1002,
            "regions": [{
                "shape_attributes": { "name": "rect", "x": 1, "y": 1, "width": 4, "height": 4 },
                "region_attributes": {}
            }],
            "file_attributes": {}
        }
    });
    let train = json!({
        "image_8_3.jpg2000": {
            "filename": "image_8_3.jpg",
            "size": 2000,
            "regions": [
                polygon(&[100.0, 140.0, 120.0], &[50.0, 60.0, 90.0]),
                polygon(&[200.0, 230.0, 215.0], &[40.0, 44.0, 70.0])
            ],
            "file_attributes": {}
        }
    });
    std::fs::write(root.join("test.json"), test.to_string()).unwrap();
    std::fs::write(root.join("train.json"), train.to_string()).unwrap();

    for name in ["image_7_9.jpg", "image_7_10.jpg", "image_7_11.jpg"] {
        std::fs::write(root.join("images/test").join(name), b"\xff\xd8test").unwrap();
    }
    for name in ["image_8_3.jpg", "image_9_1.jpg"] {
        std::fs::write(root.join("images/train").join(name), b"\xff\xd8train").unwrap();
    }
}

fn write_fixture_client(root: &Path) {
    std::fs::create_dir_all(root).unwrap();
    std::fs::write(
        root.join("index.html"),
        "<!doctype html><title>HippoLens</title>",
    )
    .unwrap();
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

const BOUNDARY: &str = "hippolens-test-boundary";

/// Encode `files` as a `multipart/form-data` body, each under `field`.
pub fn multipart_body(field: &str, files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (filename, data) in files {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: image/jpeg\r\n\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// POST a multipart body.
pub async fn post_multipart(app: Router, uri: &str, body: Vec<u8>) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// POST files under `field` to `uri`.
pub async fn upload(
    app: Router,
    uri: &str,
    field: &str,
    files: &[(&str, &[u8])],
) -> Response<Body> {
    post_multipart(app, uri, multipart_body(field, files)).await
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
