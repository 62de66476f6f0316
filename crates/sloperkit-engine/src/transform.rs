//! Geometry transforms
//!
//! Flattens block instantiations (INSERT) into world-space entity copies
//! and rotates entity copies for piece canonicalization. All transforms
//! clone; the source drawing is never mutated.

use sloperkit_core::Point;
use sloperkit_drawing::{Block, Drawing, Entity, InsertEntity};
use std::collections::HashSet;
use tracing::warn;

const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

/// Transform order for every child coordinate. Not commutative; the order
/// is fixed: recenter on the block base point, scale, rotate about the
/// origin, translate to the insertion point.
fn map_point(p: Point, base: Point, insert: &InsertEntity) -> Point {
    let p = Point::new(
        (p.x - base.x) * insert.scale_x,
        (p.y - base.y) * insert.scale_y,
    );
    let p = if insert.rotation != 0.0 {
        p.rotated_around(ORIGIN, insert.rotation)
    } else {
        p
    };
    Point::new(p.x + insert.insert_point.x, p.y + insert.insert_point.y)
}

/// Radius-valued fields scale uniformly by the larger axis factor.
fn map_radius(r: f64, insert: &InsertEntity) -> f64 {
    r * insert.scale_x.max(insert.scale_y)
}

/// Angle-valued fields accumulate the insertion rotation.
fn map_angle(a: f64, insert: &InsertEntity) -> f64 {
    (a + insert.rotation).rem_euclid(360.0)
}

/// Produces world-space copies of a block's direct children for one
/// INSERT. Nested INSERT children are not expanded here; their placement
/// parameters are composed so that recursive consumers (bounds, raster)
/// resolve them against the same drawing.
pub fn flatten_insert(insert: &InsertEntity, block: &Block) -> Vec<Entity> {
    let base = block.base_point;
    block
        .entities
        .iter()
        .filter_map(|child| flatten_child(child, base, insert))
        .collect()
}

fn flatten_child(child: &Entity, base: Point, insert: &InsertEntity) -> Option<Entity> {
    let mapped = match child {
        Entity::Line(line) => Entity::Line(sloperkit_drawing::LineEntity {
            p1: map_point(line.p1, base, insert),
            p2: map_point(line.p2, base, insert),
        }),
        Entity::Circle(c) => Entity::Circle(sloperkit_drawing::CircleEntity {
            center: map_point(c.center, base, insert),
            radius: map_radius(c.radius, insert),
        }),
        Entity::Arc(a) => Entity::Arc(sloperkit_drawing::ArcEntity {
            center: map_point(a.center, base, insert),
            radius: map_radius(a.radius, insert),
            start_angle: map_angle(a.start_angle, insert),
            end_angle: map_angle(a.end_angle, insert),
        }),
        Entity::Polyline(p) => Entity::Polyline(map_polyline(p, base, insert)),
        Entity::LwPolyline(p) => Entity::LwPolyline(map_polyline(p, base, insert)),
        Entity::Spline(s) => Entity::Spline(sloperkit_drawing::SplineEntity {
            control_points: s
                .control_points
                .iter()
                .map(|p| map_point(*p, base, insert))
                .collect(),
        }),
        Entity::Text(t) => Entity::Text(sloperkit_drawing::TextEntity {
            anchor: map_point(t.anchor, base, insert),
            text: t.text.clone(),
            rotation: map_angle(t.rotation, insert),
            text_width: t.text_width,
            text_height: t.text_height,
        }),
        Entity::Insert(nested) => Entity::Insert(InsertEntity {
            block_name: nested.block_name.clone(),
            insert_point: map_point(nested.insert_point, base, insert),
            scale_x: nested.scale_x * insert.scale_x,
            scale_y: nested.scale_y * insert.scale_y,
            rotation: map_angle(nested.rotation, insert),
        }),
        Entity::Unsupported => return None,
    };
    Some(mapped)
}

fn map_polyline(
    p: &sloperkit_drawing::PolylineEntity,
    base: Point,
    insert: &InsertEntity,
) -> sloperkit_drawing::PolylineEntity {
    sloperkit_drawing::PolylineEntity {
        vertices: p
            .vertices
            .iter()
            .map(|v| map_point(*v, base, insert))
            .collect(),
        closed: p.closed,
    }
}

/// Resolves an INSERT's block with cycle protection.
///
/// A block name already on the recursion path is treated exactly like an
/// unresolved reference: the INSERT contributes nothing.
pub(crate) fn resolve_block_guarded<'a>(
    insert: &InsertEntity,
    drawing: &'a Drawing,
    visited: &mut HashSet<String>,
) -> Option<&'a Block> {
    let key = insert.block_name.to_ascii_lowercase();
    if visited.contains(&key) {
        warn!(
            "Cyclic block reference through '{}'; treating as unresolved",
            insert.block_name
        );
        return None;
    }
    let block = drawing.resolve_block(&insert.block_name)?;
    visited.insert(key);
    Some(block)
}

pub(crate) fn release_block_guard(insert: &InsertEntity, visited: &mut HashSet<String>) {
    visited.remove(&insert.block_name.to_ascii_lowercase());
}

/// Rotates an entity copy about `center` by `angle_deg` degrees
/// (counter-clockwise, math convention).
///
/// Point fields rotate; angle fields (arc sweep limits, text rotation)
/// accumulate. An INSERT rotates its insertion point and accumulates its
/// rotation, which is equivalent to rotating every flattened child.
pub fn rotate_entity(entity: &Entity, center: Point, angle_deg: f64) -> Entity {
    let rot = |p: &Point| p.rotated_around(center, angle_deg);
    match entity {
        Entity::Line(line) => Entity::Line(sloperkit_drawing::LineEntity {
            p1: rot(&line.p1),
            p2: rot(&line.p2),
        }),
        Entity::Circle(c) => Entity::Circle(sloperkit_drawing::CircleEntity {
            center: rot(&c.center),
            radius: c.radius,
        }),
        Entity::Arc(a) => Entity::Arc(sloperkit_drawing::ArcEntity {
            center: rot(&a.center),
            radius: a.radius,
            start_angle: (a.start_angle + angle_deg).rem_euclid(360.0),
            end_angle: (a.end_angle + angle_deg).rem_euclid(360.0),
        }),
        Entity::Polyline(p) => Entity::Polyline(sloperkit_drawing::PolylineEntity {
            vertices: p.vertices.iter().map(|v| rot(v)).collect(),
            closed: p.closed,
        }),
        Entity::LwPolyline(p) => Entity::LwPolyline(sloperkit_drawing::PolylineEntity {
            vertices: p.vertices.iter().map(|v| rot(v)).collect(),
            closed: p.closed,
        }),
        Entity::Spline(s) => Entity::Spline(sloperkit_drawing::SplineEntity {
            control_points: s.control_points.iter().map(|p| rot(p)).collect(),
        }),
        Entity::Text(t) => Entity::Text(sloperkit_drawing::TextEntity {
            anchor: rot(&t.anchor),
            text: t.text.clone(),
            rotation: (t.rotation + angle_deg).rem_euclid(360.0),
            text_width: t.text_width,
            text_height: t.text_height,
        }),
        Entity::Insert(ins) => Entity::Insert(InsertEntity {
            block_name: ins.block_name.clone(),
            insert_point: rot(&ins.insert_point),
            scale_x: ins.scale_x,
            scale_y: ins.scale_y,
            rotation: (ins.rotation + angle_deg).rem_euclid(360.0),
        }),
        Entity::Unsupported => Entity::Unsupported,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sloperkit_drawing::{LineEntity, PolylineEntity};

    fn unit_insert(name: &str, at: Point) -> InsertEntity {
        InsertEntity {
            block_name: name.to_string(),
            insert_point: at,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
        }
    }

    #[test]
    fn identity_insert_is_pure_translation() {
        let block = Block {
            name: "b".into(),
            base_point: Point::default(),
            entities: vec![Entity::Line(LineEntity {
                p1: Point::new(0.0, 0.0),
                p2: Point::new(10.0, 0.0),
            })],
        };
        let insert = unit_insert("b", Point::new(5.0, 7.0));
        let flat = flatten_insert(&insert, &block);
        let Entity::Line(line) = &flat[0] else {
            panic!("expected LINE");
        };
        assert_eq!(line.p1, Point::new(5.0, 7.0));
        assert_eq!(line.p2, Point::new(15.0, 7.0));
    }

    #[test]
    fn scale_then_rotate_then_translate_order() {
        let block = Block {
            name: "b".into(),
            base_point: Point::new(1.0, 0.0),
            entities: vec![Entity::Polyline(PolylineEntity {
                vertices: vec![Point::new(2.0, 0.0)],
                closed: false,
            })],
        };
        // (2,0) - base -> (1,0); scale (2,3) -> (2,0); rotate 90 -> (0,2);
        // translate (10,10) -> (10,12).
        let insert = InsertEntity {
            block_name: "b".into(),
            insert_point: Point::new(10.0, 10.0),
            scale_x: 2.0,
            scale_y: 3.0,
            rotation: 90.0,
        };
        let flat = flatten_insert(&insert, &block);
        let Entity::Polyline(p) = &flat[0] else {
            panic!("expected POLYLINE");
        };
        assert!((p.vertices[0].x - 10.0).abs() < 1e-9);
        assert!((p.vertices[0].y - 12.0).abs() < 1e-9);
    }

    #[test]
    fn radius_scales_by_larger_axis() {
        let block = Block {
            name: "b".into(),
            base_point: Point::default(),
            entities: vec![Entity::Circle(sloperkit_drawing::CircleEntity {
                center: Point::default(),
                radius: 2.0,
            })],
        };
        let insert = InsertEntity {
            block_name: "b".into(),
            insert_point: Point::default(),
            scale_x: 2.0,
            scale_y: 5.0,
            rotation: 0.0,
        };
        let flat = flatten_insert(&insert, &block);
        let Entity::Circle(c) = &flat[0] else {
            panic!("expected CIRCLE");
        };
        assert_eq!(c.radius, 10.0);
    }

    #[test]
    fn nested_insert_composes_placement() {
        let block = Block {
            name: "outer".into(),
            base_point: Point::default(),
            entities: vec![Entity::Insert(unit_insert("inner", Point::new(1.0, 0.0)))],
        };
        let insert = InsertEntity {
            block_name: "outer".into(),
            insert_point: Point::new(0.0, 10.0),
            scale_x: 2.0,
            scale_y: 2.0,
            rotation: 90.0,
        };
        let flat = flatten_insert(&insert, &block);
        let Entity::Insert(nested) = &flat[0] else {
            panic!("expected INSERT");
        };
        // (1,0) scaled -> (2,0); rotated 90 -> (0,2); translated -> (0,12).
        assert!((nested.insert_point.x).abs() < 1e-9);
        assert!((nested.insert_point.y - 12.0).abs() < 1e-9);
        assert_eq!(nested.scale_x, 2.0);
        assert_eq!(nested.rotation, 90.0);
    }

    #[test]
    fn text_rotation_accumulates() {
        let block = Block {
            name: "b".into(),
            base_point: Point::default(),
            entities: vec![Entity::Text(sloperkit_drawing::TextEntity {
                anchor: Point::default(),
                text: "Size: M".into(),
                rotation: 30.0,
                text_width: None,
                text_height: None,
            })],
        };
        let mut insert = unit_insert("b", Point::default());
        insert.rotation = 45.0;
        let flat = flatten_insert(&insert, &block);
        let Entity::Text(t) = &flat[0] else {
            panic!("expected TEXT");
        };
        assert_eq!(t.rotation, 75.0);
    }

    #[test]
    fn rotate_entity_arc_shifts_angles() {
        let arc = Entity::Arc(sloperkit_drawing::ArcEntity {
            center: Point::new(1.0, 0.0),
            radius: 1.0,
            start_angle: 350.0,
            end_angle: 10.0,
        });
        let rotated = rotate_entity(&arc, Point::default(), 20.0);
        let Entity::Arc(a) = rotated else {
            panic!("expected ARC");
        };
        assert_eq!(a.start_angle, 10.0);
        assert_eq!(a.end_angle, 30.0);
        assert!((a.center.x - 20f64.to_radians().cos()).abs() < 1e-9);
    }
}
