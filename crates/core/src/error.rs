use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("No file uploaded")]
    NoFileProvided,

    #[error("Unsupported file type: {filename}")]
    UnsupportedFileType { filename: String },

    #[error("Image not found in dataset: {filename}")]
    NotInDataset { filename: String },

    #[error("Segmentation data not found for {filename}")]
    AnnotationMissing { filename: String },

    #[error("Filename does not match image_{{patientId}}_{{slideNumber}}: {filename}")]
    InvalidFilenamePattern { filename: String },

    #[error("Too many files: {count} (limit {limit})")]
    TooManyFiles { count: usize, limit: usize },

    #[error("File too large: {filename} ({size} bytes, limit {limit})")]
    FileTooLarge {
        filename: String,
        size: usize,
        limit: usize,
    },

    #[error("Failed to load dataset table {path}: {reason}")]
    Dataset { path: PathBuf, reason: String },
}

impl CoreError {
    /// Stable machine-readable code reported in the `error` field of API
    /// error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoFileProvided => "NO_FILE_PROVIDED",
            Self::UnsupportedFileType { .. } => "UNSUPPORTED_FILE_TYPE",
            Self::NotInDataset { .. } => "NOT_IN_DATASET",
            Self::AnnotationMissing { .. } => "ANNOTATION_MISSING",
            Self::InvalidFilenamePattern { .. } => "INVALID_FILENAME_PATTERN",
            Self::TooManyFiles { .. } => "TOO_MANY_FILES",
            Self::FileTooLarge { .. } => "FILE_TOO_LARGE",
            Self::Dataset { .. } => "SERVER_ERROR",
        }
    }
}
