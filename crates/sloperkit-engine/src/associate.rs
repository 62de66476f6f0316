//! Text-association engine
//!
//! Matches loose TEXT entities to the geometric entity they describe and
//! derives each entity's canonical de-rotation angle from its claimed
//! labels.
//!
//! Matching is multi-criteria: containment, padded-box overlap, edge and
//! center distance, a per-type priority, and an area weight that keeps
//! huge background shapes from swallowing every label. Candidate scoring
//! is read-only and runs in parallel; claiming is a single sequential pass
//! in text-index order so first-claim-wins stays deterministic.

use crate::bounds::entity_bounds;
use crate::transform::flatten_insert;
use rayon::prelude::*;
use sloperkit_core::{half_stroke_mm, BoundingBox, Point, RenderConfig};
use sloperkit_drawing::{Drawing, Entity};
use std::collections::HashMap;
use tracing::debug;

/// Association padding for labels without explicit metrics, model
/// millimeters on both axes.
const TEXT_PAD_DEFAULT: f64 = 20.0;
/// Base proximity threshold, model millimeters.
const NEAR_DISTANCE_MM: f64 = 20.0;

/// A text bound to exactly one geometric entity.
#[derive(Debug, Clone)]
pub struct ClaimedText {
    pub raw: String,
    /// Label rotation as clockwise degrees from north, in `(-180, 180]`.
    pub rotation_north: f64,
    /// Index of the owning entity in the drawing's entity list.
    pub source_entity_index: usize,
}

/// Geometry the matcher scores against: one entry per renderable
/// non-text entity, in drawing order.
#[derive(Debug, Clone)]
pub struct GeometryInfo {
    pub index: usize,
    pub bounds: BoundingBox,
    pub priority: f64,
    pub area: f64,
}

/// Output of the association pass.
#[derive(Debug, Default)]
pub struct AssociationResult {
    /// Claimed texts keyed by owning entity index.
    pub claims: HashMap<usize, Vec<ClaimedText>>,
}

impl AssociationResult {
    pub fn texts_for(&self, entity_index: usize) -> &[ClaimedText] {
        self.claims
            .get(&entity_index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The de-rotation angle for an entity: the circular mean of its
    /// claimed labels' north angles, 0 without claims.
    pub fn rotation_for(&self, entity_index: usize) -> f64 {
        let texts = self.texts_for(entity_index);
        if texts.is_empty() {
            return 0.0;
        }
        circular_mean_deg(&texts.iter().map(|t| t.rotation_north).collect::<Vec<_>>())
    }
}

/// Converts a math-convention angle (counter-clockwise degrees from +X)
/// to clockwise degrees from north, folded into `(-180, 180]`.
pub fn math_to_north(math_angle: f64) -> f64 {
    normalize_north(math_angle % 360.0 - 90.0)
}

fn normalize_north(angle: f64) -> f64 {
    let mut r = angle % 360.0;
    while r > 180.0 {
        r -= 360.0;
    }
    while r <= -180.0 {
        r += 360.0;
    }
    r
}

/// Mean of a set of angles via unit-vector averaging, immune to
/// wraparound near the ±180° seam.
pub fn circular_mean_deg(angles: &[f64]) -> f64 {
    if angles.is_empty() {
        return 0.0;
    }
    let (sx, sy) = angles.iter().fold((0.0f64, 0.0f64), |(sx, sy), a| {
        let r = a.to_radians();
        (sx + r.cos(), sy + r.sin())
    });
    normalize_north(sy.atan2(sx).to_degrees())
}

/// Matching priority per entity type; lower wins. Closed outlines are the
/// likeliest label owners, splines the least likely.
pub fn type_priority(entity: &Entity) -> f64 {
    match entity {
        Entity::Polyline(_) | Entity::LwPolyline(_) => 1.0,
        Entity::Insert(_) => 2.0,
        Entity::Circle(_) | Entity::Arc(_) => 3.0,
        Entity::Line(_) => 4.0,
        Entity::Spline(_) => 5.0,
        _ => 10.0,
    }
}

/// A loose text prepared for matching.
#[derive(Debug, Clone)]
struct TextObservation {
    entity_index: usize,
    center: Point,
    bounds: BoundingBox,
    rotation_north: f64,
    raw: String,
}

/// Associates loose texts with geometry and pre-binds block texts to
/// their INSERT.
///
/// `geometry` must be in drawing order; `model_extents` is the maximum
/// single-entity box width/height used for the dynamic thresholds.
pub fn associate(
    drawing: &Drawing,
    geometry: &[GeometryInfo],
    model_extents: (f64, f64),
    config: &RenderConfig,
) -> AssociationResult {
    let mut result = AssociationResult::default();

    // Step 1: texts living inside an instanced block are already owned by
    // that INSERT; they bypass open matching entirely.
    for info in geometry {
        let Some(insert) = drawing.entities.get(info.index).and_then(Entity::as_insert) else {
            continue;
        };
        let Some(block) = drawing.resolve_block(&insert.block_name) else {
            continue;
        };
        for child in flatten_insert(insert, block) {
            if let Entity::Text(text) = child {
                result
                    .claims
                    .entry(info.index)
                    .or_default()
                    .push(ClaimedText {
                        raw: text.text,
                        rotation_north: math_to_north(text.rotation),
                        source_entity_index: info.index,
                    });
            }
        }
    }

    let texts = collect_loose_texts(drawing, config);
    if texts.is_empty() {
        return result;
    }

    let (model_w, model_h) = model_extents;
    let model_area = model_w * model_h;

    // Steps 2-4: score every text against every entity. Read-only, so
    // the texts fan out across the thread pool.
    let best: Vec<Option<usize>> = texts
        .par_iter()
        .map(|t| best_candidate(t, geometry, model_w, model_h, model_area))
        .collect();

    // Step 5: claims resolve sequentially in text order, so each text
    // claims exactly one entity and the outcome is deterministic.
    for (text, best_pos) in texts.iter().zip(&best) {
        let Some(pos) = best_pos else {
            debug!("Text '{}' matched no entity within range", text.raw);
            continue;
        };
        let owner = geometry[*pos].index;
        result.claims.entry(owner).or_default().push(ClaimedText {
            raw: text.raw.clone(),
            rotation_north: text.rotation_north,
            source_entity_index: text.entity_index,
        });
    }

    result
}

fn collect_loose_texts(drawing: &Drawing, config: &RenderConfig) -> Vec<TextObservation> {
    let half_stroke = half_stroke_mm(config.stroke_width_px, config.dpi);
    drawing
        .entities
        .iter()
        .enumerate()
        .filter_map(|(i, entity)| {
            let text = entity.as_text()?;
            let bounds = BoundingBox::new(
                text.anchor.x - half_stroke,
                text.anchor.y - half_stroke,
                text.anchor.x + text.text_width.unwrap_or(TEXT_PAD_DEFAULT) + half_stroke,
                text.anchor.y + text.text_height.unwrap_or(TEXT_PAD_DEFAULT) + half_stroke,
            );
            Some(TextObservation {
                entity_index: i,
                center: bounds.center(),
                bounds,
                rotation_north: math_to_north(text.rotation),
                raw: text.text.clone(),
            })
        })
        .collect()
}

/// Returns the position (in `geometry`) of the lowest-scoring qualifying
/// candidate; score ties break to the earlier entity.
fn best_candidate(
    text: &TextObservation,
    geometry: &[GeometryInfo],
    model_w: f64,
    model_h: f64,
    model_area: f64,
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (pos, info) in geometry.iter().enumerate() {
        let overlap = text.bounds.intersection_area(&info.bounds);
        let edge_dist = if info.bounds.contains(text.center) {
            0.0
        } else {
            info.bounds.edge_distance(text.center)
        };
        let entity_size = info.bounds.width().max(info.bounds.height());
        let max_dist = NEAR_DISTANCE_MM
            .max(model_w.min(model_h) * 0.05)
            .max(entity_size * 0.1);
        if overlap <= 0.0 && edge_dist > max_dist {
            continue;
        }

        let center_dist = text.center.distance_to(&info.bounds.center());
        let area_weight = info.area / model_area;
        let score = if overlap > 0.0 {
            center_dist * info.priority * (1.0 + area_weight) / (overlap + 1.0)
        } else {
            edge_dist * info.priority * (1.0 + area_weight)
        };

        match best {
            Some((_, best_score)) if score >= best_score => {}
            _ => best = Some((pos, score)),
        }
    }
    best.map(|(pos, _)| pos)
}

/// Builds the matcher's geometry table from a drawing, in entity order.
pub fn geometry_infos(drawing: &Drawing, config: &RenderConfig) -> Vec<GeometryInfo> {
    drawing
        .entities
        .par_iter()
        .enumerate()
        .filter(|(_, e)| e.is_geometry())
        .filter_map(|(i, e)| {
            let bounds = entity_bounds(e, config, drawing)?;
            Some(GeometryInfo {
                index: i,
                bounds,
                priority: type_priority(e),
                area: bounds.area(),
            })
        })
        .collect()
}
