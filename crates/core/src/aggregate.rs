//! Per-patient rollup of slide results from a folder upload.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::coordinates::RegionCoordinates;

/// Outcome for one uploaded slide that resolved to the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideResult {
    pub slide_number: u64,
    /// Matched dataset filename.
    pub filename: String,
    pub image_path: String,
    pub has_hippocampus: bool,
    pub coordinates: Vec<RegionCoordinates>,
    pub region_count: usize,
}

impl SlideResult {
    pub fn new(
        slide_number: u64,
        filename: String,
        image_path: String,
        coordinates: Vec<RegionCoordinates>,
    ) -> Self {
        Self {
            slide_number,
            filename,
            image_path,
            has_hippocampus: !coordinates.is_empty(),
            region_count: coordinates.len(),
            coordinates,
        }
    }
}

/// All slides of one patient, ordered by slide number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientAggregate {
    pub patient_id: u64,
    pub total_slides: usize,
    pub first_slide_with_hippocampus: Option<u64>,
    pub last_slide_with_hippocampus: Option<u64>,
    pub slides_with_hippocampus_count: usize,
    pub slides: Vec<SlideResult>,
}

impl PatientAggregate {
    /// Sort `slides` and compute the detection range.
    pub fn from_slides(patient_id: u64, mut slides: Vec<SlideResult>) -> Self {
        slides.sort_by_key(|slide| slide.slide_number);

        let detected: Vec<u64> = slides
            .iter()
            .filter(|slide| slide.has_hippocampus)
            .map(|slide| slide.slide_number)
            .collect();

        Self {
            patient_id,
            total_slides: slides.len(),
            first_slide_with_hippocampus: detected.first().copied(),
            last_slide_with_hippocampus: detected.last().copied(),
            slides_with_hippocampus_count: detected.len(),
            slides,
        }
    }
}

/// Group `(patientId, slide)` pairs into aggregates ordered by patient ID.
///
/// Slides with equal numbers keep their upload order.
pub fn aggregate_patients<I>(slides: I) -> Vec<PatientAggregate>
where
    I: IntoIterator<Item = (u64, SlideResult)>,
{
    let mut by_patient: BTreeMap<u64, Vec<SlideResult>> = BTreeMap::new();
    for (patient_id, slide) in slides {
        by_patient.entry(patient_id).or_default().push(slide);
    }

    by_patient
        .into_iter()
        .map(|(patient_id, slides)| PatientAggregate::from_slides(patient_id, slides))
        .collect()
}
