//! Editor object wire format
//!
//! A level is a flat list of objects. Floors are polygons (`polyfloor`),
//! walls and cliffs are two-point segments with thickness or depth, and
//! markers (`spawn-off`, `spawn-def`, `objective`) are axis-aligned
//! rectangles anchored at their top-left corner. Absent fields are omitted
//! from the JSON rather than serialized as null.

use serde::{Deserialize, Serialize};

/// Object type discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectKind {
    SpawnOff,
    SpawnDef,
    Objective,
    Polyfloor,
    Polywall,
    Polycliff,
    /// Anything the editor sends that this service does not act on.
    #[serde(other)]
    Unknown,
}

impl ObjectKind {
    /// Types that count as floor area for rasterization.
    pub fn is_floor_like(self) -> bool {
        matches!(
            self,
            ObjectKind::Polyfloor | ObjectKind::SpawnOff | ObjectKind::SpawnDef | ObjectKind::Objective
        )
    }
}

/// Polygon vertex. `z` is carried for floors that declare one, otherwise
/// omitted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointXY {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}

impl PointXY {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    pub fn with_z(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z: Some(z) }
    }
}

/// One editor object. A single struct covers every kind; which optional
/// fields are present depends on the kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeometryObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(rename = "type")]
    pub kind: ObjectKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<PointXY>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_size: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl GeometryObject {
    /// Empty object of the given kind; callers fill in what applies.
    pub fn new(kind: ObjectKind) -> Self {
        Self {
            id: None,
            kind,
            category: None,
            floor: None,
            color: None,
            points: None,
            x: None,
            y: None,
            width: None,
            height: None,
            floor_height: None,
            thickness: None,
            depth: None,
            from_height: None,
            fixed_size: None,
            min_size: None,
            closed: None,
            label: None,
        }
    }

    /// Floor height, treating absent as ground level.
    pub fn floor_height_or_zero(&self) -> f64 {
        self.floor_height.unwrap_or(0.0)
    }

    pub fn points(&self) -> &[PointXY] {
        self.points.as_deref().unwrap_or(&[])
    }
}
