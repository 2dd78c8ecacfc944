//! Handlers for single-image and folder uploads.
//!
//! Uploaded bytes are only counted against the size limit, never stored:
//! results come from the dataset, keyed by the uploaded filename.

use axum::extract::multipart::Field;
use axum::extract::{Multipart, State};
use axum::Json;
use hippolens_core::aggregate::PatientAggregate;
use hippolens_core::analysis::{analyze_folder, analyze_image, InvalidImage};
use hippolens_core::coordinates::RegionCoordinates;
use hippolens_core::dataset::AnnotationRecord;
use hippolens_core::error::CoreError;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Multipart field carrying the single-image upload.
pub const IMAGE_FIELD: &str = "image";

/// Multipart field carrying each file of a folder upload.
pub const FOLDER_FIELD: &str = "images";

/// Response for `POST /api/upload`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    success: bool,
    filename: String,
    image_path: String,
    segmentation: AnnotationRecord,
    coordinates: Vec<RegionCoordinates>,
    patient_id: Option<u64>,
    slide_number: Option<u64>,
    message: &'static str,
}

/// Response for `POST /api/upload-folder`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderUploadResponse {
    success: bool,
    total_images: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    invalid_images: Vec<InvalidImage>,
    patients: Vec<PatientAggregate>,
    message: String,
}

// ── Single image ─────────────────────────────────────────────────────

/// POST /api/upload
///
/// Match the uploaded `image` field against the dataset and return its
/// segmentation with derived coordinates.
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let mut uploaded: Option<String> = None;

    while let Some(field) = next_field(&mut multipart).await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let size = check_field_size(field, &filename, state.config.max_file_bytes).await?;
        tracing::debug!(filename = %filename, size, "File received");
        uploaded = Some(filename);
        break;
    }

    let uploaded = uploaded.ok_or(CoreError::NoFileProvided)?;

    let analysis = analyze_image(&state.dataset, &uploaded).inspect_err(|e| {
        tracing::info!(uploaded = %uploaded, error = %e, "Upload did not resolve");
    })?;

    tracing::info!(
        uploaded = %uploaded,
        matched = %analysis.filename,
        strategy = %analysis.match_kind,
        regions = analysis.coordinates.len(),
        "Image matched",
    );

    Ok(Json(UploadResponse {
        success: true,
        filename: analysis.filename,
        image_path: analysis.image_path,
        segmentation: analysis.segmentation,
        coordinates: analysis.coordinates,
        patient_id: analysis.patient_id,
        slide_number: analysis.slide_number,
        message: "Image processed successfully",
    }))
}

// ── Folder ───────────────────────────────────────────────────────────

/// POST /api/upload-folder
///
/// Resolve every `images` field, group the slides by patient and report
/// the files that could not be placed.
pub async fn upload_folder(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<FolderUploadResponse>> {
    let limit = state.config.max_folder_files;
    let mut filenames: Vec<String> = Vec::new();

    while let Some(field) = next_field(&mut multipart).await? {
        if field.name() != Some(FOLDER_FIELD) {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        if filenames.len() == limit {
            return Err(CoreError::TooManyFiles {
                count: limit + 1,
                limit,
            }
            .into());
        }
        let size = check_field_size(field, &filename, state.config.max_file_bytes).await?;
        tracing::debug!(filename = %filename, size, "File received");
        filenames.push(filename);
    }

    if filenames.is_empty() {
        return Err(CoreError::NoFileProvided.into());
    }

    let analysis = analyze_folder(&state.dataset, filenames.iter().map(String::as_str));
    let processed = analysis.processed_slides();

    tracing::info!(
        total = analysis.total_images,
        processed,
        invalid = analysis.invalid_images.len(),
        patients = analysis.patients.len(),
        "Folder analysed",
    );

    let message = format!(
        "Processed {processed} of {} slide(s) across {} patient(s)",
        analysis.total_images,
        analysis.patients.len(),
    );

    Ok(Json(FolderUploadResponse {
        success: true,
        total_images: analysis.total_images,
        invalid_images: analysis.invalid_images,
        patients: analysis.patients,
        message,
    }))
}

// ── Multipart helpers ────────────────────────────────────────────────

async fn next_field<'a>(multipart: &'a mut Multipart) -> AppResult<Option<Field<'a>>> {
    multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))
}

/// Drain a file field, failing once it exceeds `limit` bytes.
async fn check_field_size(mut field: Field<'_>, filename: &str, limit: usize) -> AppResult<usize> {
    let mut size = 0usize;
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        size += chunk.len();
        if size > limit {
            return Err(CoreError::FileTooLarge {
                filename: filename.to_string(),
                size,
                limit,
            }
            .into());
        }
    }
    Ok(size)
}
