//! # SloperKit Engine
//!
//! The geometry/rasterization/association core. It turns an ingested
//! [`Drawing`](sloperkit_drawing::Drawing) into rendered pattern pieces:
//!
//! - **transform** — INSERT flattening into world space and per-variant
//!   entity rotation.
//! - **bounds** — padded axis-aligned bounding boxes, per entity and for
//!   the whole drawing.
//! - **raster** — tiny-skia rasterization of one entity (or the whole
//!   drawing) into a pixel buffer sized from its bounds.
//! - **associate** — matching loose text labels to the shape they
//!   describe and deriving each piece's upright orientation.
//! - **pipeline** — the orchestrated single pass over a drawing.
//!
//! Every stage is best-effort: entities that cannot be measured or drawn
//! are skipped, never fatal.

pub mod associate;
pub mod bounds;
pub mod fonts;
pub mod pipeline;
pub mod raster;
pub mod transform;

pub use associate::{associate, circular_mean_deg, math_to_north, AssociationResult, ClaimedText};
pub use bounds::{drawing_bounds, entity_bounds, model_extents};
pub use pipeline::{run_pipeline, PieceResult, PipelineOutput};
pub use raster::{render_drawing, render_entity, PieceImage};
pub use transform::{flatten_insert, rotate_entity};
