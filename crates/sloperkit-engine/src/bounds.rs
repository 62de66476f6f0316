//! Bounds calculator
//!
//! Computes a padded axis-aligned bounding box for any entity. Boxes are
//! inflated by half the stroke width (converted to model millimeters) on
//! every side so stroked rendering is never clipped. `None` means "not
//! renderable", never an error.
//!
//! Approximations are deliberate: arcs use the full-circle envelope and
//! splines use the control-point hull.

use crate::transform::{flatten_insert, release_block_guard, resolve_block_guarded};
use sloperkit_core::{half_stroke_mm, BoundingBox, Point, RenderConfig};
use sloperkit_drawing::{Drawing, Entity};
use std::collections::HashSet;

/// Bounds defaults for unsized text labels, model millimeters.
const TEXT_WIDTH_DEFAULT: f64 = 50.0;
const TEXT_HEIGHT_DEFAULT: f64 = 20.0;

/// Computes the padded bounding box of one entity, recursing through
/// INSERT references. Missing or degenerate geometry yields `None`; the
/// caller skips the entity.
pub fn entity_bounds(
    entity: &Entity,
    config: &RenderConfig,
    drawing: &Drawing,
) -> Option<BoundingBox> {
    let mut visited = HashSet::new();
    bounds_guarded(entity, config, drawing, &mut visited)
}

fn bounds_guarded(
    entity: &Entity,
    config: &RenderConfig,
    drawing: &Drawing,
    visited: &mut HashSet<String>,
) -> Option<BoundingBox> {
    let half_stroke = half_stroke_mm(config.stroke_width_px, config.dpi);

    let raw = match entity {
        Entity::Line(line) => {
            let mut bb = BoundingBox::empty();
            bb.include(line.p1);
            bb.include(line.p2);
            bb
        }
        Entity::Circle(c) => circle_envelope(c.center, c.radius),
        // Full-circle envelope, not the swept arc.
        Entity::Arc(a) => circle_envelope(a.center, a.radius),
        Entity::Polyline(p) | Entity::LwPolyline(p) => points_box(&p.vertices)?,
        Entity::Spline(s) => points_box(&s.control_points)?,
        Entity::Text(t) => {
            let mut bb = BoundingBox::empty();
            bb.include(t.anchor);
            bb.include(Point::new(
                t.anchor.x + t.text_width.unwrap_or(TEXT_WIDTH_DEFAULT),
                t.anchor.y + t.text_height.unwrap_or(TEXT_HEIGHT_DEFAULT),
            ));
            bb
        }
        Entity::Insert(insert) => {
            let block = resolve_block_guarded(insert, drawing, visited)?;
            let mut bb = BoundingBox::empty();
            for child in flatten_insert(insert, block) {
                if let Some(child_bb) = bounds_guarded(&child, config, drawing, visited) {
                    bb.union(&child_bb);
                }
            }
            release_block_guard(insert, visited);
            if !bb.is_valid() {
                return None;
            }
            // Children are already inflated.
            return Some(bb);
        }
        Entity::Unsupported => return None,
    };

    Some(raw.inflated(half_stroke))
}

fn circle_envelope(center: Point, radius: f64) -> BoundingBox {
    BoundingBox::new(
        center.x - radius,
        center.y - radius,
        center.x + radius,
        center.y + radius,
    )
}

fn points_box(points: &[Point]) -> Option<BoundingBox> {
    if points.is_empty() {
        return None;
    }
    let mut bb = BoundingBox::empty();
    for p in points {
        bb.include(*p);
    }
    Some(bb)
}

/// Union of every geometric (non-text) entity's box; the canvas for the
/// full-drawing render and the manifest dimensions.
pub fn drawing_bounds(drawing: &Drawing, config: &RenderConfig) -> Option<BoundingBox> {
    let mut bb = BoundingBox::empty();
    for entity in &drawing.entities {
        if !entity.is_geometry() {
            continue;
        }
        if let Some(entity_bb) = entity_bounds(entity, config, drawing) {
            bb.union(&entity_bb);
        }
    }
    bb.is_valid().then_some(bb)
}

/// Model extents used by the association thresholds: the maximum
/// single-entity box width and height, floored at 1.0.
pub fn model_extents(boxes: &[BoundingBox]) -> (f64, f64) {
    let mut width = 1.0f64;
    let mut height = 1.0f64;
    for bb in boxes {
        width = width.max(bb.width());
        height = height.max(bb.height());
    }
    (width, height)
}
