//! Sloper manifest assembly
//!
//! Projects the pipeline's pieces into the exported manifest. No geometry
//! happens here; everything degrades gracefully — a piece without labels
//! still exports, just with placeholder metadata.

use crate::labels::label_map;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sloperkit_engine::{PieceResult, PipelineOutput};
use tracing::warn;

/// Piece-name prefix the upstream CAD templates attach.
const PIECE_NAME_PREFIX: &str = "boke_";
/// Fallback piece name when no label names the piece.
const UNKNOWN_PIECE: &str = "unknown piece";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SloperManifest {
    pub file_info: FileInfo,
    pub cut: Vec<CutPiece>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileInfo {
    pub sloper_name: String,
    pub size: String,
    pub update_time: String,
    pub sloper_type: i32,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CutPiece {
    pub name: String,
    pub size: PixelSize,
    pub position: PixelPosition,
    pub rotation: f64,
    pub zoom: f64,
    pub url: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PixelSize {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PixelPosition {
    pub x: f64,
    pub y: f64,
}

/// Builds the manifest for one render request.
///
/// `file_name` is the uploaded file's name; the extension is stripped for
/// `sloper_name`. Pieces without an image are excluded from `cut` (they
/// were already logged by the renderer).
pub fn assemble(file_name: &str, output: &PipelineOutput) -> SloperManifest {
    let sloper_name = match file_name.rfind('.') {
        Some(dot) if dot > 0 => &file_name[..dot],
        _ => file_name,
    };

    let size = output
        .pieces
        .iter()
        .find_map(|piece| {
            let labels = label_map(piece.claimed_texts.iter().map(|t| t.raw.as_str()));
            labels.get("size").filter(|v| !v.is_empty()).cloned()
        })
        .unwrap_or_default();

    let (width, height) = output
        .overall
        .as_ref()
        .map(|o| o.size_px)
        .unwrap_or((0.0, 0.0));

    let cut = output
        .pieces
        .iter()
        .filter_map(|piece| cut_piece(piece))
        .collect();

    SloperManifest {
        file_info: FileInfo {
            sloper_name: sloper_name.to_string(),
            size,
            update_time: Utc::now().to_rfc3339(),
            sloper_type: 0,
            width,
            height,
        },
        cut,
    }
}

fn cut_piece(piece: &PieceResult) -> Option<CutPiece> {
    let image = piece.image.as_ref()?;
    let labels = label_map(piece.claimed_texts.iter().map(|t| t.raw.as_str()));

    let name = labels
        .get("piecename")
        .map(|value| {
            value
                .strip_prefix(PIECE_NAME_PREFIX)
                .unwrap_or(value)
                .to_string()
        })
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| UNKNOWN_PIECE.to_string());

    let url = match image.to_png() {
        Ok(png) => format!("data:image/png;base64,{}", BASE64.encode(png)),
        Err(err) => {
            warn!(
                "Could not encode piece {} image: {}",
                piece.entity_index, err
            );
            String::new()
        }
    };

    Some(CutPiece {
        name,
        size: PixelSize {
            width: image.size_px.0,
            height: image.size_px.1,
        },
        position: PixelPosition {
            x: image.position_px.0,
            y: image.position_px.1,
        },
        rotation: piece.rotation_applied,
        zoom: 1.0,
        url,
    })
}
