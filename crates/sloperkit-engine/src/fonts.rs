//! Label font lookup
//!
//! Resolves one sans-serif face from the system font database and caches
//! it for the process lifetime. On a host with no usable font, text
//! simply does not rasterize; geometry is unaffected.

use fontdb::{Database, Family, Query, Source, Stretch, Style, Weight};
use rusttype::Font;
use std::fs;
use std::sync::OnceLock;
use tracing::warn;

fn db() -> &'static Database {
    static DB: OnceLock<Database> = OnceLock::new();
    DB.get_or_init(|| {
        let mut db = Database::new();
        db.load_system_fonts();
        db
    })
}

/// The label face, or `None` when no system font could be loaded.
pub fn label_font() -> Option<&'static Font<'static>> {
    static FONT: OnceLock<Option<Font<'static>>> = OnceLock::new();
    FONT.get_or_init(|| {
        let loaded = load_sans();
        if loaded.is_none() {
            warn!("No usable system font found; text labels will not rasterize");
        }
        loaded
    })
    .as_ref()
}

fn load_sans() -> Option<Font<'static>> {
    let query = Query {
        families: &[Family::SansSerif, Family::Serif, Family::Monospace],
        weight: Weight::NORMAL,
        stretch: Stretch::Normal,
        style: Style::Normal,
    };
    let id = db().query(&query)?;
    let face = db().face(id)?;
    match &face.source {
        Source::File(path) => Font::try_from_vec(fs::read(path).ok()?),
        Source::SharedFile(path, _) => Font::try_from_vec(fs::read(path).ok()?),
        Source::Binary(bytes) => Font::try_from_vec(bytes.as_ref().as_ref().to_vec()),
    }
}
