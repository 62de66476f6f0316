//! # SloperKit
//!
//! Garment pattern (sloper) digitization: turns a parsed CAD drawing into
//! rasterized pattern-piece images plus a layout manifest.
//!
//! ## Architecture
//!
//! SloperKit is organized as a workspace with one crate per layer:
//!
//! 1. **sloperkit-core** - Shared geometry types, units, configuration,
//!    and the error taxonomy
//! 2. **sloperkit-drawing** - The drawing data model and the ingestion
//!    boundary for parser output (with codepage detection)
//! 3. **sloperkit-engine** - Block flattening, bounds, rasterization, and
//!    text association
//! 4. **sloperkit-export** - Manifest assembly and image export
//! 5. **sloperkit** - The CLI binary that ties the layers together

pub use sloperkit_core::{BoundingBox, Error, Point, RenderConfig, Result};
pub use sloperkit_drawing::{Drawing, Entity};
pub use sloperkit_engine::{run_pipeline, PieceResult, PipelineOutput};
pub use sloperkit_export::{assemble, SloperManifest};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with console output, `RUST_LOG` environment
/// variable support, and INFO as the default level.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    Ok(())
}
