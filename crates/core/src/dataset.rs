//! Annotation dataset snapshot.
//!
//! The dataset is two VIA-style JSON lookup tables (`test.json` and
//! `train.json`) mapping record keys to annotation records, plus the image
//! directories `images/test/` and `images/train/`. Everything is read once
//! at startup into an immutable [`Dataset`]; request handlers only ever
//! borrow it.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use indexmap::{IndexMap, IndexSet};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;

// ── Constants ────────────────────────────────────────────────────────

/// File name of the test-split lookup table inside the dataset root.
pub const TEST_TABLE: &str = "test.json";

/// File name of the train-split lookup table inside the dataset root.
pub const TRAIN_TABLE: &str = "train.json";

/// Directory holding the split image folders inside the dataset root.
pub const IMAGES_DIR: &str = "images";

/// URL prefix the image directory is mounted under.
pub const IMAGE_URL_PREFIX: &str = "/api/images";

/// Shape name of the only region type the extractor understands.
pub const POLYGON_SHAPE: &str = "polygon";

/// Record filenames sometimes carry the VIA size suffix (`foo.jpg12345`).
static SIZE_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.jpg\d+$").expect("valid regex"));

// ── Types ────────────────────────────────────────────────────────────

/// Which half of the dataset a record or image belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Split {
    Test,
    Train,
}

impl Split {
    /// Lookup order used everywhere: test before train.
    pub const ALL: [Split; 2] = [Split::Test, Split::Train];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Test => "test",
            Self::Train => "train",
        }
    }

    fn table_file(&self) -> &'static str {
        match self {
            Self::Test => TEST_TABLE,
            Self::Train => TRAIN_TABLE,
        }
    }
}

impl std::fmt::Display for Split {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One annotated image as stored in the lookup tables.
///
/// Fields not modelled here are kept in `extra` so the record can be
/// returned to clients verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    #[serde(default)]
    pub filename: String,
    /// VIA writes the byte size as a number; older exports use a string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Value>,
    #[serde(default)]
    pub regions: Vec<Region>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One segmented area of a record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Region {
    #[serde(default)]
    pub shape_attributes: ShapeAttributes,
    #[serde(default)]
    pub region_attributes: RegionAttributes,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Geometry of a region. Only polygons carry point arrays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapeAttributes {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_points_x: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_points_y: Option<Vec<f64>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Region {
    /// Build a polygon region. Mostly useful for fixtures.
    pub fn polygon(xs: Vec<f64>, ys: Vec<f64>, class: &str) -> Self {
        Self {
            shape_attributes: ShapeAttributes {
                name: POLYGON_SHAPE.to_string(),
                all_points_x: Some(xs),
                all_points_y: Some(ys),
                extra: Map::new(),
            },
            region_attributes: RegionAttributes {
                class: Some(class.to_string()),
                extra: Map::new(),
            },
            extra: Map::new(),
        }
    }
}

/// Record key to record, in file order.
pub type AnnotationTable = IndexMap<String, AnnotationRecord>;

/// Immutable snapshot of both lookup tables and both image listings.
#[derive(Debug, Default)]
pub struct Dataset {
    test: AnnotationTable,
    train: AnnotationTable,
    known_filenames: IndexSet<String>,
    test_images: HashSet<String>,
    train_images: HashSet<String>,
    missing_tables: Vec<PathBuf>,
    skipped_entries: usize,
}

impl Dataset {
    /// Build a snapshot from in-memory tables with empty image listings.
    pub fn new(test: AnnotationTable, train: AnnotationTable) -> Self {
        let mut dataset = Self {
            test,
            train,
            ..Self::default()
        };
        dataset.index_filenames();
        dataset
    }

    /// Register image files present on disk for a split.
    pub fn with_images<I, S>(mut self, split: Split, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let listing = match split {
            Split::Test => &mut self.test_images,
            Split::Train => &mut self.train_images,
        };
        listing.extend(names.into_iter().map(Into::into));
        self
    }

    /// Load the dataset rooted at `root`.
    ///
    /// A missing table is recorded (see [`Dataset::missing_tables`]) and
    /// treated as empty; an unreadable or malformed table is an error.
    /// Table entries that are not annotation records are skipped and
    /// counted.
    pub fn load(root: &Path) -> Result<Self, CoreError> {
        let mut missing_tables = Vec::new();
        let mut skipped_entries = 0;
        let mut tables = Vec::with_capacity(2);

        for split in Split::ALL {
            let path = root.join(split.table_file());
            match read_table(&path)? {
                Some((table, skipped)) => {
                    skipped_entries += skipped;
                    tables.push(table);
                }
                None => {
                    missing_tables.push(path);
                    tables.push(AnnotationTable::new());
                }
            }
        }

        let train = tables.pop().unwrap_or_default();
        let test = tables.pop().unwrap_or_default();

        let images_root = root.join(IMAGES_DIR);
        let mut dataset = Self::new(test, train)
            .with_images(Split::Test, list_images(&images_root.join(Split::Test.as_str()))?)
            .with_images(Split::Train, list_images(&images_root.join(Split::Train.as_str()))?);
        dataset.missing_tables = missing_tables;
        dataset.skipped_entries = skipped_entries;
        Ok(dataset)
    }

    fn index_filenames(&mut self) {
        self.known_filenames.clear();
        for record in self.test.values().chain(self.train.values()) {
            if record.filename.is_empty() {
                continue;
            }
            self.known_filenames.insert(record.filename.clone());
            let base = SIZE_SUFFIX_RE.replace(&record.filename, "");
            self.known_filenames.insert(base.into_owned());
        }
    }

    /// Number of distinct known filenames (including size-stripped forms).
    pub fn len(&self) -> usize {
        self.known_filenames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known_filenames.is_empty()
    }

    /// Number of annotation records across both tables.
    pub fn record_count(&self) -> usize {
        self.test.len() + self.train.len()
    }

    /// Known filenames in load order (test records first).
    pub fn known_filenames(&self) -> impl Iterator<Item = &str> {
        self.known_filenames.iter().map(String::as_str)
    }

    /// Whether an image file with exactly this name exists for `split`.
    pub fn has_image(&self, split: Split, name: &str) -> bool {
        match split {
            Split::Test => self.test_images.contains(name),
            Split::Train => self.train_images.contains(name),
        }
    }

    pub fn missing_tables(&self) -> &[PathBuf] {
        &self.missing_tables
    }

    pub fn skipped_entries(&self) -> usize {
        self.skipped_entries
    }

    fn table(&self, split: Split) -> &AnnotationTable {
        match split {
            Split::Test => &self.test,
            Split::Train => &self.train,
        }
    }

    /// Find the annotation record for a matched filename.
    ///
    /// Tables are searched test first, in key order. A record matches when
    /// its filename equals `filename` case-insensitively, or when its key
    /// contains `filename` with `.jpg` removed. The key check is loose:
    /// `image_7_1.jpg` also hits an earlier `image_7_10.jpg…` key.
    pub fn find_record(&self, filename: &str) -> Option<(Split, &AnnotationRecord)> {
        let normalized = filename.to_lowercase();
        let stem = normalized.replacen(".jpg", "", 1);

        Split::ALL.into_iter().find_map(|split| {
            self.table(split)
                .iter()
                .find(|(key, record)| {
                    (!record.filename.is_empty() && record.filename.to_lowercase() == normalized)
                        || (!stem.is_empty() && key.to_lowercase().contains(&stem))
                })
                .map(|(_, record)| (split, record))
        })
    }

    /// Public URL of a matched image. Falls back to the test folder when
    /// the file is on neither listing.
    pub fn image_path(&self, filename: &str) -> String {
        let split = Split::ALL
            .into_iter()
            .find(|split| self.has_image(*split, filename))
            .unwrap_or(Split::Test);
        format!("{IMAGE_URL_PREFIX}/{split}/{filename}")
    }
}

// ── Loading helpers ──────────────────────────────────────────────────

/// Read one table. `Ok(None)` when the file does not exist.
fn read_table(path: &Path) -> Result<Option<(AnnotationTable, usize)>, CoreError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(CoreError::Dataset {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
        }
    };

    let raw: IndexMap<String, Value> =
        serde_json::from_str(&content).map_err(|e| CoreError::Dataset {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let mut table = AnnotationTable::with_capacity(raw.len());
    let mut skipped = 0;
    for (key, value) in raw {
        match serde_json::from_value::<AnnotationRecord>(value) {
            Ok(record) => {
                table.insert(key, record);
            }
            Err(_) => skipped += 1,
        }
    }
    Ok(Some((table, skipped)))
}

/// List regular file names in `dir`. A missing directory is empty.
fn list_images(dir: &Path) -> Result<Vec<String>, CoreError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(CoreError::Dataset {
                path: dir.to_path_buf(),
                reason: e.to_string(),
            })
        }
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| CoreError::Dataset {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })?;
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        if is_file {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(names)
}
