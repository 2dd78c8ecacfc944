//! Derive point lists, bounding boxes and centers from polygon regions.

use serde::{Deserialize, Serialize};

use crate::dataset::{AnnotationRecord, Region, POLYGON_SHAPE};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Axis-aligned box around a polygon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    /// Midpoint of the box.
    pub fn center(&self) -> Point {
        Point {
            x: (self.min_x + self.max_x) / 2.0,
            y: (self.min_y + self.max_y) / 2.0,
        }
    }
}

/// Geometry of one polygon region, ready for drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionCoordinates {
    /// Position of the source region in the record's region list.
    pub region_index: usize,
    #[serde(rename = "coordinates")]
    pub points: Vec<Point>,
    pub bounding_box: BoundingBox,
    pub center: Point,
}

/// Extract coordinates for every usable polygon region of `record`.
///
/// Regions that are not polygons, or whose point arrays are missing or
/// empty, are skipped.
pub fn extract_coordinates(record: &AnnotationRecord) -> Vec<RegionCoordinates> {
    record
        .regions
        .iter()
        .enumerate()
        .filter_map(|(index, region)| region_coordinates(index, region))
        .collect()
}

fn region_coordinates(region_index: usize, region: &Region) -> Option<RegionCoordinates> {
    let shape = &region.shape_attributes;
    if shape.name != POLYGON_SHAPE {
        return None;
    }
    let xs = shape.all_points_x.as_deref()?;
    let ys = shape.all_points_y.as_deref()?;

    let points: Vec<Point> = xs
        .iter()
        .zip(ys)
        .map(|(&x, &y)| Point { x, y })
        .collect();
    let bounding_box = bounding_box(&points)?;

    Some(RegionCoordinates {
        region_index,
        center: bounding_box.center(),
        points,
        bounding_box,
    })
}

/// `None` for an empty point list.
pub fn bounding_box(points: &[Point]) -> Option<BoundingBox> {
    let first = points.first()?;
    let (mut min_x, mut max_x, mut min_y, mut max_y) = (first.x, first.x, first.y, first.y);
    for p in &points[1..] {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }
    Some(BoundingBox {
        min_x,
        max_x,
        min_y,
        max_y,
        width: max_x - min_x,
        height: max_y - min_y,
    })
}
