//! Slide filename convention and upload file-type rules.
//!
//! Slides are named `image_{patientId}_{slideNumber}.{ext}`, e.g.
//! `image_7_10.jpg` is slide 10 of patient 7.

use std::sync::LazyLock;

use regex::Regex;

/// Upload extensions accepted by both upload endpoints.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "dcm", "nii", "nii.gz"];

static SLIDE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^image_(\d+)_(\d+)").expect("valid regex"));

/// Patient and slide parsed from a slide filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideName {
    pub patient_id: u64,
    pub slide_number: u64,
}

/// Parse `image_{patientId}_{slideNumber}` from the start of the file name.
///
/// Directory components are ignored. Returns `None` when the name does not
/// follow the convention or a number does not fit in a `u64`.
///
/// ```
/// use hippolens_core::naming::{parse_slide_filename, SlideName};
///
/// assert_eq!(
///     parse_slide_filename("IMAGE_7_10.jpg"),
///     Some(SlideName { patient_id: 7, slide_number: 10 })
/// );
/// assert_eq!(parse_slide_filename("scan_7_10.jpg"), None);
/// ```
pub fn parse_slide_filename(filename: &str) -> Option<SlideName> {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let caps = SLIDE_NAME_RE.captures(name)?;
    Some(SlideName {
        patient_id: caps[1].parse().ok()?,
        slide_number: caps[2].parse().ok()?,
    })
}

/// Whether `filename` carries one of [`SUPPORTED_EXTENSIONS`].
pub fn is_supported_upload(filename: &str) -> bool {
    let lower = filename.to_lowercase();
    SUPPORTED_EXTENSIONS
        .iter()
        .any(|ext| lower.len() > ext.len() + 1 && lower.ends_with(&format!(".{ext}")))
}
