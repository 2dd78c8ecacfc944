//! Integration tests for `POST /api/upload-folder`.

mod common;

use axum::body::Body;
use axum::http::{Response, StatusCode};
use axum::Router;
use common::{body_json, upload};

const JPEG: &[u8] = b"\xff\xd8\xff\xe0fake";

async fn upload_folder(app: Router, names: &[&str]) -> Response<Body> {
    let files: Vec<(&str, &[u8])> = names.iter().map(|name| (*name, JPEG)).collect();
    upload(app, "/api/upload-folder", "images", &files).await
}

// ---------------------------------------------------------------------------
// Test: three slides of one patient, only slide 10 has a polygon
// ---------------------------------------------------------------------------

#[tokio::test]
async fn folder_with_single_detection_reports_range() {
    let app = common::build_test_app();
    let response = upload_folder(
        app.router,
        &["image_7_11.jpg", "image_7_9.jpg", "image_7_10.jpg"],
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert_eq!(json["success"], true);
    assert_eq!(json["totalImages"], 3);
    assert!(
        json.get("invalidImages").is_none(),
        "invalidImages should be omitted when empty"
    );

    let patients = json["patients"].as_array().unwrap();
    assert_eq!(patients.len(), 1);
    let patient = &patients[0];
    assert_eq!(patient["patientId"], 7);
    // Slide 9 has an empty region list and is left out.
    assert_eq!(patient["totalSlides"], 2);
    assert_eq!(patient["firstSlideWithHippocampus"], 10);
    assert_eq!(patient["lastSlideWithHippocampus"], 10);
    assert_eq!(patient["slidesWithHippocampusCount"], 1);

    let order: Vec<u64> = patient["slides"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["slideNumber"].as_u64().unwrap())
        .collect();
    assert_eq!(order, vec![10, 11]);

    let slide_10 = &patient["slides"][0];
    assert_eq!(slide_10["hasHippocampus"], true);
    assert_eq!(slide_10["regionCount"], 1);
    assert_eq!(slide_10["imagePath"], "/api/images/test/image_7_10.jpg");
    assert_eq!(
        slide_10["coordinates"][0]["boundingBox"]["width"].as_f64(),
        Some(10.0)
    );
    assert_eq!(patient["slides"][1]["hasHippocampus"], false);
    assert_eq!(
        json["message"],
        "Processed 2 of 3 slide(s) across 1 patient(s)"
    );
}

// ---------------------------------------------------------------------------
// Test: patient whose regions are all non-polygon has a null range
// ---------------------------------------------------------------------------

#[tokio::test]
async fn patient_without_regions_has_null_range() {
    let app = common::build_test_app();
    let response = upload_folder(app.router, &["image_7_11.jpg"]).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let patient = &json["patients"][0];
    assert_eq!(patient["patientId"], 7);
    assert_eq!(patient["totalSlides"], 1);
    assert!(patient["firstSlideWithHippocampus"].is_null());
    assert!(patient["lastSlideWithHippocampus"].is_null());
    assert_eq!(patient["slidesWithHippocampusCount"], 0);
}

// ---------------------------------------------------------------------------
// Test: matched slides without annotated regions are dropped, not invalid
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unannotated_slides_are_dropped_silently() {
    let app = common::build_test_app();
    let response = upload_folder(app.router, &["image_7_9.jpg", "image_9_1.jpg"]).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["totalImages"], 2);
    assert!(json.get("invalidImages").is_none());
    assert_eq!(json["patients"].as_array().unwrap().len(), 0);
}

// ---------------------------------------------------------------------------
// Test: mixed upload groups patients and lists invalid files
// ---------------------------------------------------------------------------

#[tokio::test]
async fn mixed_folder_groups_patients_and_reports_invalid() {
    let app = common::build_test_app();
    let response = upload_folder(
        app.router,
        &["image_8_3.jpg", "scan.jpg", "image_7_10.jpg", "image_4_4.jpg"],
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["totalImages"], 4);

    let ids: Vec<u64> = json["patients"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["patientId"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![7, 8]);
    assert_eq!(json["patients"][1]["slides"][0]["regionCount"], 2);

    let invalid = json["invalidImages"].as_array().unwrap();
    assert_eq!(invalid.len(), 2);
    assert_eq!(invalid[0]["filename"], "scan.jpg");
    assert_eq!(invalid[0]["code"], "INVALID_FILENAME_PATTERN");
    assert_eq!(invalid[1]["filename"], "image_4_4.jpg");
    assert_eq!(invalid[1]["reason"], "Image not found in dataset");
    assert_eq!(
        json["message"],
        "Processed 2 of 4 slide(s) across 2 patient(s)"
    );
}

// ---------------------------------------------------------------------------
// Test: more files than the configured limit returns 400 TOO_MANY_FILES
// ---------------------------------------------------------------------------

#[tokio::test]
async fn folder_over_limit_returns_400() {
    let app = common::build_test_app();
    let names: Vec<String> = (1..=6).map(|n| format!("image_7_{n}.jpg")).collect();
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    let response = upload_folder(app.router, &names).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "TOO_MANY_FILES");
}

// ---------------------------------------------------------------------------
// Test: no `images` fields returns 400 NO_FILE_PROVIDED
// ---------------------------------------------------------------------------

#[tokio::test]
async fn folder_without_files_returns_400() {
    let app = common::build_test_app();
    let response = upload(
        app.router,
        "/api/upload-folder",
        "image",
        &[("image_7_10.jpg", JPEG)],
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "NO_FILE_PROVIDED");
}
