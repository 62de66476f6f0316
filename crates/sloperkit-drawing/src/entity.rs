//! Drawing entities
//!
//! Tagged union over the vector primitives the pipeline understands. The
//! wire shape follows the upstream parser's JSON: a `type` tag plus
//! per-type fields. Parsers disagree on field names for anchors and
//! insertion points, so those variants deserialize through wire structs
//! that resolve each field from a fixed priority order.

use serde::{Deserialize, Serialize};
use sloperkit_core::Point;
use thiserror::Error;

/// Raised when a wire entity is missing a field the variant cannot exist
/// without; ingestion downgrades the entity to [`Entity::Unsupported`].
#[derive(Error, Debug)]
#[error("{0}")]
pub struct WireError(String);

/// A drawing entity in model coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Entity {
    #[serde(rename = "LINE")]
    Line(LineEntity),
    #[serde(rename = "CIRCLE")]
    Circle(CircleEntity),
    #[serde(rename = "ARC")]
    Arc(ArcEntity),
    #[serde(rename = "POLYLINE")]
    Polyline(PolylineEntity),
    #[serde(rename = "LWPOLYLINE")]
    LwPolyline(PolylineEntity),
    #[serde(rename = "SPLINE")]
    Spline(SplineEntity),
    #[serde(rename = "TEXT")]
    Text(TextEntity),
    #[serde(rename = "INSERT")]
    Insert(InsertEntity),
    /// Any entity type the pipeline does not render. Kept as a placeholder
    /// so entity indices stay stable.
    #[serde(other)]
    Unsupported,
}

impl Entity {
    /// The wire tag for this entity.
    pub fn type_name(&self) -> &'static str {
        match self {
            Entity::Line(_) => "LINE",
            Entity::Circle(_) => "CIRCLE",
            Entity::Arc(_) => "ARC",
            Entity::Polyline(_) => "POLYLINE",
            Entity::LwPolyline(_) => "LWPOLYLINE",
            Entity::Spline(_) => "SPLINE",
            Entity::Text(_) => "TEXT",
            Entity::Insert(_) => "INSERT",
            Entity::Unsupported => "UNSUPPORTED",
        }
    }

    /// True for entities that render as geometry (everything drawable
    /// except text, which the association engine owns).
    pub fn is_geometry(&self) -> bool {
        !matches!(self, Entity::Text(_) | Entity::Unsupported)
    }

    pub fn as_text(&self) -> Option<&TextEntity> {
        match self {
            Entity::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_insert(&self) -> Option<&InsertEntity> {
        match self {
            Entity::Insert(i) => Some(i),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "LineWire")]
pub struct LineEntity {
    #[serde(rename = "startPoint")]
    pub p1: Point,
    #[serde(rename = "endPoint")]
    pub p2: Point,
}

/// Endpoints come from `startPoint`/`endPoint` when present, else from the
/// first two `vertices`.
#[derive(Deserialize)]
struct LineWire {
    #[serde(rename = "startPoint")]
    start_point: Option<Point>,
    #[serde(rename = "endPoint")]
    end_point: Option<Point>,
    #[serde(default)]
    vertices: Vec<Point>,
}

impl TryFrom<LineWire> for LineEntity {
    type Error = WireError;

    fn try_from(w: LineWire) -> Result<Self, WireError> {
        let p1 = w
            .start_point
            .or_else(|| w.vertices.first().copied())
            .ok_or_else(|| WireError("LINE without a start point".into()))?;
        let p2 = w
            .end_point
            .or_else(|| w.vertices.get(1).copied())
            .ok_or_else(|| WireError("LINE without an end point".into()))?;
        Ok(Self { p1, p2 })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircleEntity {
    pub center: Point,
    pub radius: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArcEntity {
    pub center: Point,
    pub radius: f64,
    /// Degrees, math convention (counter-clockwise from +X).
    #[serde(rename = "startAngle", default)]
    pub start_angle: f64,
    #[serde(rename = "endAngle", default)]
    pub end_angle: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "PolylineWire")]
pub struct PolylineEntity {
    pub vertices: Vec<Point>,
    pub closed: bool,
}

/// Some parsers flag closure as `closed`, others as `shape`.
#[derive(Deserialize)]
struct PolylineWire {
    #[serde(default)]
    vertices: Vec<Point>,
    closed: Option<bool>,
    shape: Option<bool>,
}

impl From<PolylineWire> for PolylineEntity {
    fn from(w: PolylineWire) -> Self {
        Self {
            vertices: w.vertices,
            closed: w.closed.or(w.shape).unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplineEntity {
    #[serde(rename = "controlPoints", default)]
    pub control_points: Vec<Point>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "TextWire")]
pub struct TextEntity {
    #[serde(rename = "startPoint")]
    pub anchor: Point,
    pub text: String,
    /// Degrees, math convention.
    pub rotation: f64,
    #[serde(rename = "textWidth", skip_serializing_if = "Option::is_none")]
    pub text_width: Option<f64>,
    #[serde(rename = "textHeight", skip_serializing_if = "Option::is_none")]
    pub text_height: Option<f64>,
}

/// Anchor priority: `startPoint`, `position`, `insert`. Rotation priority:
/// `rotation`, `angle`. A text with no anchor cannot be placed.
#[derive(Deserialize)]
struct TextWire {
    #[serde(rename = "startPoint")]
    start_point: Option<Point>,
    position: Option<Point>,
    insert: Option<Point>,
    #[serde(default)]
    text: String,
    rotation: Option<f64>,
    angle: Option<f64>,
    #[serde(rename = "textWidth")]
    text_width: Option<f64>,
    #[serde(rename = "textHeight")]
    text_height: Option<f64>,
}

impl TryFrom<TextWire> for TextEntity {
    type Error = WireError;

    fn try_from(w: TextWire) -> Result<Self, WireError> {
        let anchor = w
            .start_point
            .or(w.position)
            .or(w.insert)
            .ok_or_else(|| WireError("TEXT without an anchor point".into()))?;
        Ok(Self {
            anchor,
            text: w.text,
            rotation: w.rotation.or(w.angle).unwrap_or(0.0),
            text_width: w.text_width,
            text_height: w.text_height,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "InsertWire")]
pub struct InsertEntity {
    #[serde(rename = "name")]
    pub block_name: String,
    #[serde(rename = "insert")]
    pub insert_point: Point,
    #[serde(rename = "xScale")]
    pub scale_x: f64,
    #[serde(rename = "yScale")]
    pub scale_y: f64,
    /// Degrees, math convention.
    pub rotation: f64,
}

/// Insertion-point priority: `insert`, `position`, `insertPoint`,
/// `basePoint`, else the origin. Scales accept both `xScale`/`scaleX`
/// spellings; rotation falls back to `angle`.
#[derive(Deserialize)]
struct InsertWire {
    name: Option<String>,
    insert: Option<Point>,
    position: Option<Point>,
    #[serde(rename = "insertPoint")]
    insert_point: Option<Point>,
    #[serde(rename = "basePoint")]
    base_point: Option<Point>,
    #[serde(rename = "xScale")]
    x_scale: Option<f64>,
    #[serde(rename = "scaleX")]
    scale_x: Option<f64>,
    #[serde(rename = "yScale")]
    y_scale: Option<f64>,
    #[serde(rename = "scaleY")]
    scale_y: Option<f64>,
    rotation: Option<f64>,
    angle: Option<f64>,
}

impl TryFrom<InsertWire> for InsertEntity {
    type Error = WireError;

    fn try_from(w: InsertWire) -> Result<Self, WireError> {
        let block_name = w
            .name
            .filter(|n| !n.is_empty())
            .ok_or_else(|| WireError("INSERT without a block name".into()))?;
        Ok(Self {
            block_name,
            insert_point: w
                .insert
                .or(w.position)
                .or(w.insert_point)
                .or(w.base_point)
                .unwrap_or_default(),
            scale_x: w.x_scale.or(w.scale_x).unwrap_or(1.0),
            scale_y: w.y_scale.or(w.scale_y).unwrap_or(1.0),
            rotation: w.rotation.or(w.angle).unwrap_or(0.0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_from_vertices_fallback() {
        let e: Entity = serde_json::from_str(
            r#"{"type":"LINE","vertices":[{"x":0,"y":0},{"x":10,"y":5}]}"#,
        )
        .unwrap();
        let Entity::Line(line) = e else {
            panic!("expected LINE");
        };
        assert_eq!(line.p2.x, 10.0);
    }

    #[test]
    fn insert_point_priority_prefers_insert() {
        let e: Entity = serde_json::from_str(
            r#"{"type":"INSERT","name":"B","position":{"x":9,"y":9},"insert":{"x":1,"y":2}}"#,
        )
        .unwrap();
        let Entity::Insert(ins) = e else {
            panic!("expected INSERT");
        };
        assert_eq!(ins.insert_point, Point::new(1.0, 2.0));
        assert_eq!(ins.scale_x, 1.0);
        assert_eq!(ins.rotation, 0.0);
    }

    #[test]
    fn text_anchor_fallback_to_position() {
        let e: Entity = serde_json::from_str(
            r#"{"type":"TEXT","position":{"x":3,"y":4},"text":"Size: M","angle":90}"#,
        )
        .unwrap();
        let Entity::Text(t) = e else {
            panic!("expected TEXT");
        };
        assert_eq!(t.anchor, Point::new(3.0, 4.0));
        assert_eq!(t.rotation, 90.0);
        assert!(t.text_width.is_none());
    }

    #[test]
    fn polyline_shape_flag_means_closed() {
        let e: Entity = serde_json::from_str(
            r#"{"type":"LWPOLYLINE","vertices":[{"x":0,"y":0}],"shape":true}"#,
        )
        .unwrap();
        let Entity::LwPolyline(p) = e else {
            panic!("expected LWPOLYLINE");
        };
        assert!(p.closed);
    }

    #[test]
    fn unknown_type_is_unsupported() {
        let e: Entity = serde_json::from_str(r#"{"type":"DIMENSION","junk":true}"#).unwrap();
        assert!(matches!(e, Entity::Unsupported));
    }
}
