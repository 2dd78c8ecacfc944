//! Upload analysis pipeline: match, look up, extract, aggregate.
//!
//! Handlers hand in uploaded filenames; everything here is synchronous and
//! reads the dataset without mutating it.

use serde::{Deserialize, Serialize};

use crate::aggregate::{aggregate_patients, PatientAggregate, SlideResult};
use crate::coordinates::{extract_coordinates, RegionCoordinates};
use crate::dataset::{AnnotationRecord, Dataset};
use crate::error::CoreError;
use crate::matcher::{find_match, MatchKind};
use crate::naming::{is_supported_upload, parse_slide_filename};

/// Result of analysing one uploaded image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAnalysis {
    /// Matched dataset filename.
    pub filename: String,
    pub match_kind: MatchKind,
    pub image_path: String,
    /// The record as stored in the dataset.
    pub segmentation: AnnotationRecord,
    pub coordinates: Vec<RegionCoordinates>,
    pub patient_id: Option<u64>,
    pub slide_number: Option<u64>,
}

/// Analyse a single uploaded image.
///
/// Patient and slide numbers come from the matched filename, falling back
/// to the uploaded one.
pub fn analyze_image(dataset: &Dataset, uploaded: &str) -> Result<ImageAnalysis, CoreError> {
    if !is_supported_upload(uploaded) {
        return Err(CoreError::UnsupportedFileType {
            filename: uploaded.to_string(),
        });
    }

    let matched = find_match(dataset, uploaded).ok_or_else(|| CoreError::NotInDataset {
        filename: uploaded.to_string(),
    })?;

    let (_, record) = dataset.find_record(&matched.filename).ok_or_else(|| {
        CoreError::AnnotationMissing {
            filename: matched.filename.clone(),
        }
    })?;

    let slide = parse_slide_filename(&matched.filename).or_else(|| parse_slide_filename(uploaded));

    Ok(ImageAnalysis {
        image_path: dataset.image_path(&matched.filename),
        coordinates: extract_coordinates(record),
        segmentation: record.clone(),
        patient_id: slide.map(|s| s.patient_id),
        slide_number: slide.map(|s| s.slide_number),
        match_kind: matched.kind,
        filename: matched.filename,
    })
}

/// An uploaded file that could not be placed on a patient timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidImage {
    pub filename: String,
    pub reason: String,
    /// Machine-readable error code, see [`CoreError::code`].
    pub code: String,
}

impl InvalidImage {
    fn from_error(filename: &str, err: &CoreError) -> Self {
        let reason = match err {
            CoreError::InvalidFilenamePattern { .. } => {
                "Filename does not match image_{patientId}_{slideNumber} pattern".to_string()
            }
            CoreError::UnsupportedFileType { .. } => "Unsupported file type".to_string(),
            CoreError::NotInDataset { .. } => "Image not found in dataset".to_string(),
            other => other.to_string(),
        };
        Self {
            filename: filename.to_string(),
            reason,
            code: err.code().to_string(),
        }
    }
}

/// Result of analysing a folder of slides.
#[derive(Debug, Clone, PartialEq)]
pub struct FolderAnalysis {
    pub total_images: usize,
    pub patients: Vec<PatientAggregate>,
    pub invalid_images: Vec<InvalidImage>,
}

impl FolderAnalysis {
    /// Number of files that ended up on a patient timeline.
    pub fn processed_slides(&self) -> usize {
        self.patients.iter().map(|p| p.total_slides).sum()
    }
}

/// Analyse a folder upload, one file at a time in upload order.
///
/// Files that resolve to the dataset but have no annotated region (no
/// record, or an empty region list) are dropped without being reported.
/// Records whose regions all fail extraction still count as slides
/// without hippocampus.
pub fn analyze_folder<'a, I>(dataset: &Dataset, uploaded: I) -> FolderAnalysis
where
    I: IntoIterator<Item = &'a str>,
{
    let mut total_images = 0;
    let mut slides = Vec::new();
    let mut invalid_images = Vec::new();

    for name in uploaded {
        total_images += 1;
        match analyze_slide(dataset, name) {
            Ok(Some(entry)) => slides.push(entry),
            Ok(None) => {}
            Err(err) => invalid_images.push(InvalidImage::from_error(name, &err)),
        }
    }

    FolderAnalysis {
        total_images,
        patients: aggregate_patients(slides),
        invalid_images,
    }
}

/// `Ok(None)` for a matched file without annotated regions.
fn analyze_slide(
    dataset: &Dataset,
    uploaded: &str,
) -> Result<Option<(u64, SlideResult)>, CoreError> {
    let slide = parse_slide_filename(uploaded).ok_or_else(|| CoreError::InvalidFilenamePattern {
        filename: uploaded.to_string(),
    })?;

    if !is_supported_upload(uploaded) {
        return Err(CoreError::UnsupportedFileType {
            filename: uploaded.to_string(),
        });
    }

    let matched = find_match(dataset, uploaded).ok_or_else(|| CoreError::NotInDataset {
        filename: uploaded.to_string(),
    })?;

    let Some((_, record)) = dataset.find_record(&matched.filename) else {
        return Ok(None);
    };
    if record.regions.is_empty() {
        return Ok(None);
    }

    let coordinates = extract_coordinates(record);
    let image_path = dataset.image_path(&matched.filename);
    Ok(Some((
        slide.patient_id,
        SlideResult::new(slide.slide_number, matched.filename, image_path, coordinates),
    )))
}
