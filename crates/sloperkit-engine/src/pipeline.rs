//! Pipeline orchestration
//!
//! The single pass over a drawing: measure every renderable entity,
//! associate loose labels, derive each piece's upright orientation, and
//! rasterize. Bounds and rendering fan out across the thread pool; the
//! global extents are settled before association starts.

use crate::associate::{associate, geometry_infos, ClaimedText};
use crate::bounds::model_extents;
use crate::raster::{render_drawing, render_entity, PieceImage};
use crate::transform::rotate_entity;
use rayon::prelude::*;
use sloperkit_core::{BoundingBox, Point, RenderConfig};
use sloperkit_drawing::Drawing;
use tracing::{debug, info};

/// One rendered pattern piece.
#[derive(Debug, Clone)]
pub struct PieceResult {
    /// Index of the source entity in the drawing.
    pub entity_index: usize,
    /// Wire tag of the source entity.
    pub entity_type: &'static str,
    /// Padded model-space bounds of the un-rotated entity.
    pub bounds_model: BoundingBox,
    /// Label-derived de-rotation, clockwise degrees from north.
    pub rotation_applied: f64,
    /// Labels owned by this piece.
    pub claimed_texts: Vec<ClaimedText>,
    /// The rasterized piece; `None` when the canvas degenerated.
    pub image: Option<PieceImage>,
}

/// Everything one render request produces.
#[derive(Debug, Default)]
pub struct PipelineOutput {
    pub pieces: Vec<PieceResult>,
    /// All geometry on one canvas; sizes the exported manifest.
    pub overall: Option<PieceImage>,
}

/// Runs the full pipeline over a drawing.
pub fn run_pipeline(drawing: &Drawing, config: &RenderConfig) -> PipelineOutput {
    let geometry = geometry_infos(drawing, config);
    if geometry.is_empty() {
        info!("Drawing has no renderable geometry");
        return PipelineOutput::default();
    }

    let boxes: Vec<_> = geometry.iter().map(|g| g.bounds).collect();
    let extents = model_extents(&boxes);

    let association = associate(drawing, &geometry, extents, config);
    let overall = render_drawing(drawing, config);

    let pieces: Vec<PieceResult> = geometry
        .par_iter()
        .map(|info| {
            let entity = &drawing.entities[info.index];
            let rotation_applied = association.rotation_for(info.index);

            let image = if rotation_applied != 0.0 {
                let upright = rotate_entity(
                    entity,
                    Point::default(),
                    -rotation_applied + config.global_rotation_offset,
                );
                render_entity(&upright, config, drawing)
            } else {
                render_entity(entity, config, drawing)
            };

            PieceResult {
                entity_index: info.index,
                entity_type: entity.type_name(),
                bounds_model: info.bounds,
                rotation_applied,
                claimed_texts: association.texts_for(info.index).to_vec(),
                image,
            }
        })
        .collect();

    debug!(
        "Pipeline rendered {} of {} pieces",
        pieces.iter().filter(|p| p.image.is_some()).count(),
        pieces.len()
    );

    PipelineOutput { pieces, overall }
}
