//! # SloperKit Export
//!
//! Projects rendered pattern pieces into the exported sloper manifest:
//! parses claimed label strings into `label: value` pairs, derives the
//! piece and garment names, and emits the manifest JSON shape consumed by
//! the layout UI and upload collaborators.

pub mod labels;
pub mod manifest;

pub use labels::{normalize_label_key, parse_label, LabelMap};
pub use manifest::{assemble, CutPiece, FileInfo, PixelPosition, PixelSize, SloperManifest};
