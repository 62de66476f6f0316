//! # SloperKit Core
//!
//! Core types, traits, and utilities shared by every SloperKit layer:
//! planar geometry value types, model/pixel unit conversion, the render
//! configuration, and the error taxonomy.

pub mod config;
pub mod error;
pub mod geometry;
pub mod units;

pub use config::RenderConfig;
pub use error::{Error, Result};
pub use geometry::{BoundingBox, Point};
pub use units::{half_stroke_mm, mm_to_px, px_to_mm, DEFAULT_DPI};
