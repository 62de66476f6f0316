//! # SloperKit Drawing
//!
//! The immutable drawing data model and its ingestion boundary.
//!
//! A drawing arrives as the JSON a format parser produced from the raw CAD
//! file: a flat entity list plus named block definitions. Ingestion is
//! fault-tolerant per entity — an entity that cannot be understood becomes
//! an [`Entity::Unsupported`] placeholder (keeping indices stable) and is
//! skipped by every downstream stage. Only a malformed document is fatal.

pub mod drawing;
pub mod encoding;
pub mod entity;

pub use drawing::{Block, Drawing};
pub use entity::{
    ArcEntity, CircleEntity, Entity, InsertEntity, LineEntity, PolylineEntity, SplineEntity,
    TextEntity,
};
