//! Canvas rasterizer
//!
//! Draws one entity (or a whole drawing) into a pixel buffer sized from
//! its bounding box, using tiny-skia for path stroking and rusttype for
//! text labels. Model space is Y-up; the canvas is Y-down, so the vertical
//! axis flips at the mapping boundary.

use crate::bounds::{drawing_bounds, entity_bounds};
use crate::fonts;
use crate::transform::{flatten_insert, release_block_guard, resolve_block_guarded};
use rusttype::{point as rt_point, Scale};
use sloperkit_core::{mm_to_px, BoundingBox, Error, RenderConfig, Result};
use sloperkit_drawing::{ArcEntity, Drawing, Entity, PolylineEntity, TextEntity};
use std::collections::HashSet;
use std::io::Cursor;
use tiny_skia::{Color, Paint, PathBuilder, Pixmap, Stroke, Transform};
use tracing::warn;

/// Minimum label font size in pixels.
const MIN_FONT_SIZE: f64 = 12.0;
/// Font-size fallback for labels without an explicit height, model units.
const FONT_HEIGHT_DEFAULT: f64 = 5.0;
/// Maximum arc flattening step, degrees.
const ARC_STEP_DEG: f64 = 5.0;

/// A rendered piece: straight (un-premultiplied) RGBA pixels plus the
/// piece's placement in drawing pixel space.
#[derive(Debug, Clone)]
pub struct PieceImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
    /// Pixel position of the piece's model-space minimum corner, rounded
    /// to 3 decimals.
    pub position_px: (f64, f64),
    /// Canvas size in pixels before integer rounding, rounded to 3
    /// decimals.
    pub size_px: (f64, f64),
}

impl PieceImage {
    /// Encodes the buffer as PNG.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let buffer =
            image::RgbaImage::from_raw(self.width, self.height, self.rgba.clone()).ok_or_else(
                || Error::ImageEncode {
                    reason: "pixel buffer does not match image dimensions".into(),
                },
            )?;
        let mut bytes = Vec::new();
        buffer
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .map_err(|e| Error::ImageEncode {
                reason: e.to_string(),
            })?;
        Ok(bytes)
    }
}

/// Model-to-canvas coordinate map: `px = (x - min_x) * scale`,
/// `py = (max_y - y) * scale`.
#[derive(Debug, Clone, Copy)]
struct CanvasMap {
    bounds: BoundingBox,
    scale: f64,
}

impl CanvasMap {
    fn to_px(&self, x: f64, y: f64) -> (f32, f32) {
        (
            ((x - self.bounds.min_x) * self.scale) as f32,
            ((self.bounds.max_y - y) * self.scale) as f32,
        )
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Renders one entity onto a canvas sized from its own bounds. Degenerate
/// bounds are skipped with a warning.
pub fn render_entity(
    entity: &Entity,
    config: &RenderConfig,
    drawing: &Drawing,
) -> Option<PieceImage> {
    let bounds = entity_bounds(entity, config, drawing)?;
    render_onto_bounds(std::slice::from_ref(entity), bounds, config, drawing)
}

/// Renders every geometric entity of the drawing onto one canvas sized
/// from the global bounds.
pub fn render_drawing(drawing: &Drawing, config: &RenderConfig) -> Option<PieceImage> {
    let bounds = drawing_bounds(drawing, config)?;
    let geometry: Vec<Entity> = drawing
        .entities
        .iter()
        .filter(|e| e.is_geometry())
        .cloned()
        .collect();
    render_onto_bounds(&geometry, bounds, config, drawing)
}

fn render_onto_bounds(
    entities: &[Entity],
    bounds: BoundingBox,
    config: &RenderConfig,
    drawing: &Drawing,
) -> Option<PieceImage> {
    let width_mm = bounds.width();
    let height_mm = bounds.height();
    if width_mm == 0.0 || height_mm == 0.0 {
        warn!(
            "Skipping degenerate canvas ({} x {} mm)",
            width_mm, height_mm
        );
        return None;
    }

    let width_px = mm_to_px(width_mm, config.dpi);
    let height_px = mm_to_px(height_mm, config.dpi);
    let scale = width_px / width_mm;

    let pixel_w = (width_px.round() as u32).max(1);
    let pixel_h = (height_px.round() as u32).max(1);
    let Some(mut pixmap) = Pixmap::new(pixel_w, pixel_h) else {
        warn!("Could not allocate a {}x{} canvas", pixel_w, pixel_h);
        return None;
    };

    let map = CanvasMap { bounds, scale };
    let mut visited = HashSet::new();
    for entity in entities {
        draw_entity(&mut pixmap, entity, &map, config, drawing, &mut visited);
    }

    Some(PieceImage {
        width: pixel_w,
        height: pixel_h,
        rgba: unpremultiply(pixmap.data()),
        position_px: (
            round3(mm_to_px(bounds.min_x, config.dpi)),
            round3(mm_to_px(bounds.min_y, config.dpi)),
        ),
        size_px: (round3(width_px), round3(height_px)),
    })
}

fn stroke_paint() -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(Color::from_rgba8(0, 0, 0, 255));
    paint.anti_alias = true;
    paint
}

fn draw_entity(
    pixmap: &mut Pixmap,
    entity: &Entity,
    map: &CanvasMap,
    config: &RenderConfig,
    drawing: &Drawing,
    visited: &mut HashSet<String>,
) {
    let paint = stroke_paint();
    let stroke = Stroke {
        width: config.stroke_width_px as f32,
        ..Stroke::default()
    };
    let stroke_path = |pixmap: &mut Pixmap, pb: PathBuilder| {
        if let Some(path) = pb.finish() {
            pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }
    };

    match entity {
        Entity::Line(line) => {
            let mut pb = PathBuilder::new();
            let (x1, y1) = map.to_px(line.p1.x, line.p1.y);
            let (x2, y2) = map.to_px(line.p2.x, line.p2.y);
            pb.move_to(x1, y1);
            pb.line_to(x2, y2);
            stroke_path(pixmap, pb);
        }
        Entity::Circle(c) => {
            let (cx, cy) = map.to_px(c.center.x, c.center.y);
            if let Some(path) =
                PathBuilder::from_circle(cx, cy, (c.radius * map.scale) as f32)
            {
                pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
            }
        }
        Entity::Arc(arc) => {
            if let Some(pb) = arc_path(arc, map) {
                stroke_path(pixmap, pb);
            }
        }
        Entity::Polyline(p) | Entity::LwPolyline(p) => {
            if let Some(pb) = rounded_polyline_path(p, map, config) {
                stroke_path(pixmap, pb);
            }
        }
        Entity::Spline(s) => {
            if s.control_points.len() < 2 {
                return;
            }
            let mut pb = PathBuilder::new();
            let (x0, y0) = map.to_px(s.control_points[0].x, s.control_points[0].y);
            pb.move_to(x0, y0);
            for p in &s.control_points[1..] {
                let (x, y) = map.to_px(p.x, p.y);
                pb.line_to(x, y);
            }
            stroke_path(pixmap, pb);
        }
        Entity::Text(t) => draw_text(pixmap, t, map),
        Entity::Insert(insert) => {
            let Some(block) = resolve_block_guarded(insert, drawing, visited) else {
                return;
            };
            for child in flatten_insert(insert, block) {
                // Text children belong to the association engine; drawing
                // them here would duplicate the label.
                if matches!(child, Entity::Text(_)) {
                    continue;
                }
                draw_entity(pixmap, &child, map, config, drawing, visited);
            }
            release_block_guard(insert, visited);
        }
        Entity::Unsupported => {}
    }
}

/// Flattens the swept arc into line segments, sweeping counter-clockwise
/// in model space from the start angle to the end angle (normalized above
/// the start by a full turn). The Y-flipping map keeps the visual sense
/// consistent with the model.
fn arc_path(arc: &ArcEntity, map: &CanvasMap) -> Option<PathBuilder> {
    let start = arc.start_angle;
    let mut end = arc.end_angle;
    if end <= start {
        end += 360.0;
    }
    let sweep = end - start;
    let steps = ((sweep / ARC_STEP_DEG).ceil() as usize).max(8);

    let mut pb = PathBuilder::new();
    for i in 0..=steps {
        let angle = (start + sweep * i as f64 / steps as f64).to_radians();
        let x = arc.center.x + arc.radius * angle.cos();
        let y = arc.center.y + arc.radius * angle.sin();
        let (px, py) = map.to_px(x, y);
        if i == 0 {
            pb.move_to(px, py);
        } else {
            pb.line_to(px, py);
        }
    }
    Some(pb)
}

/// Builds the polyline path with corner rounding at interior vertices:
/// tangent points at `min(fillet, half adjacent segment)` along each
/// neighbor direction, blended through the vertex with a quadratic curve.
fn rounded_polyline_path(
    polyline: &PolylineEntity,
    map: &CanvasMap,
    config: &RenderConfig,
) -> Option<PathBuilder> {
    if polyline.vertices.len() < 2 {
        return None;
    }
    let pts: Vec<(f32, f32)> = polyline
        .vertices
        .iter()
        .map(|v| map.to_px(v.x, v.y))
        .collect();
    let fillet = (config.corner_fillet_radius * map.scale) as f32;

    let mut pb = PathBuilder::new();
    pb.move_to(pts[0].0, pts[0].1);
    for i in 1..pts.len() - 1 {
        let p0 = pts[i - 1];
        let p1 = pts[i];
        let p2 = pts[i + 1];
        let v0 = (p0.0 - p1.0, p0.1 - p1.1);
        let v1 = (p2.0 - p1.0, p2.1 - p1.1);
        let len0 = (v0.0 * v0.0 + v0.1 * v0.1).sqrt();
        let len1 = (v1.0 * v1.0 + v1.1 * v1.1).sqrt();
        if len0 == 0.0 || len1 == 0.0 {
            pb.line_to(p1.0, p1.1);
            continue;
        }
        let r0 = fillet.min(len0 / 2.0);
        let r1 = fillet.min(len1 / 2.0);
        let pa = (p1.0 + v0.0 / len0 * r0, p1.1 + v0.1 / len0 * r0);
        let pb_point = (p1.0 + v1.0 / len1 * r1, p1.1 + v1.1 / len1 * r1);
        pb.line_to(pa.0, pa.1);
        pb.quad_to(p1.0, p1.1, pb_point.0, pb_point.1);
    }
    let last = pts[pts.len() - 1];
    pb.line_to(last.0, last.1);
    if polyline.closed {
        pb.close();
    }
    Some(pb)
}

/// Rasterizes a label at its anchor, middle baseline, rotated about the
/// anchor by the negated label rotation (canvas space is Y-down).
fn draw_text(pixmap: &mut Pixmap, text: &TextEntity, map: &CanvasMap) {
    let Some(font) = fonts::label_font() else {
        return;
    };
    if text.text.is_empty() {
        return;
    }

    let font_size = MIN_FONT_SIZE.max(text.text_height.unwrap_or(FONT_HEIGHT_DEFAULT) * map.scale);
    let scale = Scale::uniform(font_size as f32);
    let v_metrics = font.v_metrics(scale);
    // Middle baseline: the em box is vertically centered on the anchor.
    let baseline = (v_metrics.ascent + v_metrics.descent) / 2.0;
    let (anchor_x, anchor_y) = map.to_px(text.anchor.x, text.anchor.y);

    let rad = (-text.rotation).to_radians() as f32;
    let (sin_r, cos_r) = rad.sin_cos();
    let width = pixmap.width() as i32;
    let height = pixmap.height() as i32;

    for glyph in font.layout(&text.text, scale, rt_point(0.0, baseline)) {
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, coverage| {
                let lx = (bb.min.x + gx as i32) as f32;
                let ly = (bb.min.y + gy as i32) as f32;
                let (px, py) = if text.rotation != 0.0 {
                    (
                        anchor_x + lx * cos_r - ly * sin_r,
                        anchor_y + lx * sin_r + ly * cos_r,
                    )
                } else {
                    (anchor_x + lx, anchor_y + ly)
                };
                let px = px.round() as i32;
                let py = py.round() as i32;
                if px < 0 || px >= width || py < 0 || py >= height {
                    return;
                }
                let alpha = (coverage * 255.0) as u8;
                let idx = ((py * width + px) * 4) as usize;
                let data = pixmap.data_mut();
                if alpha > data[idx + 3] {
                    // Premultiplied black.
                    data[idx] = 0;
                    data[idx + 1] = 0;
                    data[idx + 2] = 0;
                    data[idx + 3] = alpha;
                }
            });
        }
    }
}

/// tiny-skia stores premultiplied alpha; PNG wants straight RGBA.
fn unpremultiply(data: &[u8]) -> Vec<u8> {
    let mut out = data.to_vec();
    for px in out.chunks_exact_mut(4) {
        let a = px[3] as u32;
        if a > 0 && a < 255 {
            px[0] = ((px[0] as u32 * 255 + a / 2) / a).min(255) as u8;
            px[1] = ((px[1] as u32 * 255 + a / 2) / a).min(255) as u8;
            px[2] = ((px[2] as u32 * 255 + a / 2) / a).min(255) as u8;
        }
    }
    out
}
