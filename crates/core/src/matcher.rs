//! Resolve an uploaded filename to a dataset filename.
//!
//! Matching is a cascade of pure strategies tried most-specific first; the
//! first one that produces a name wins, so an exact hit is never shadowed
//! by a looser heuristic.

use crate::dataset::{Dataset, Split};

/// Which strategy produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// An image file with the normalized name exists in a split folder.
    ImageFile,
    /// Case-insensitive equality with a known filename.
    Exact,
    /// Equal names once the extension is dropped.
    BaseName,
    /// Either name contains the other. Can pick unrelated files when the
    /// uploaded base name is short.
    Substring,
}

impl MatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ImageFile => "image_file",
            Self::Exact => "exact",
            Self::BaseName => "base_name",
            Self::Substring => "substring",
        }
    }
}

impl std::fmt::Display for MatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved dataset filename and the strategy that found it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetMatch {
    pub filename: String,
    pub kind: MatchKind,
}

/// Normalized views of an uploaded filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadName {
    /// Final path component, lower-cased.
    pub normalized: String,
    /// `normalized` without its extension.
    pub base: String,
}

impl UploadName {
    pub fn parse(raw: &str) -> Self {
        let normalized = file_component(raw).to_lowercase();
        let base = strip_extension(&normalized).to_string();
        Self { normalized, base }
    }
}

type Strategy = fn(&Dataset, &UploadName) -> Option<String>;

/// The cascade, in priority order.
const CASCADE: &[(MatchKind, Strategy)] = &[
    (MatchKind::ImageFile, match_image_file),
    (MatchKind::Exact, match_exact),
    (MatchKind::BaseName, match_base_name),
    (MatchKind::Substring, match_substring),
];

/// Find the dataset filename for an uploaded filename.
pub fn find_match(dataset: &Dataset, uploaded: &str) -> Option<DatasetMatch> {
    let upload = UploadName::parse(uploaded);
    if upload.normalized.is_empty() {
        return None;
    }

    CASCADE.iter().find_map(|(kind, strategy)| {
        strategy(dataset, &upload).map(|filename| DatasetMatch {
            filename,
            kind: *kind,
        })
    })
}

// ── Strategies ───────────────────────────────────────────────────────

fn match_image_file(dataset: &Dataset, upload: &UploadName) -> Option<String> {
    Split::ALL
        .into_iter()
        .any(|split| dataset.has_image(split, &upload.normalized))
        .then(|| upload.normalized.clone())
}

fn match_exact(dataset: &Dataset, upload: &UploadName) -> Option<String> {
    dataset
        .known_filenames()
        .find(|known| known.to_lowercase() == upload.normalized)
        .map(str::to_string)
}

fn match_base_name(dataset: &Dataset, upload: &UploadName) -> Option<String> {
    dataset
        .known_filenames()
        .find(|known| strip_jpg(&file_component(known).to_lowercase()) == upload.base)
        .map(str::to_string)
}

fn match_substring(dataset: &Dataset, upload: &UploadName) -> Option<String> {
    if upload.base.is_empty() {
        return None;
    }
    dataset
        .known_filenames()
        .find(|known| {
            let lower = known.to_lowercase();
            let known_base = strip_jpg(file_component(&lower));
            lower.contains(&upload.base)
                || (!known_base.is_empty() && upload.base.contains(known_base))
        })
        .map(str::to_string)
}

// ── Name helpers ─────────────────────────────────────────────────────

/// Last path component, accepting both separators.
fn file_component(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

/// Drop the final `.ext`. A leading dot is part of the name, not an
/// extension.
fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    }
}

fn strip_jpg(name: &str) -> &str {
    match name.strip_suffix(".jpg") {
        Some(stem) if !stem.is_empty() => stem,
        _ => name,
    }
}
