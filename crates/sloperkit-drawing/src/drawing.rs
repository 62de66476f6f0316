//! The drawing document
//!
//! A [`Drawing`] is parsed once per uploaded file and never mutated; every
//! downstream transform clones entities into new values. Entity ingestion
//! is lenient: a malformed entity degrades to [`Entity::Unsupported`] so
//! one bad record never aborts the document and indices stay stable.

use crate::encoding;
use crate::entity::Entity;
use serde::Deserialize;
use sloperkit_core::{Error, Point, Result};
use std::collections::HashMap;
use tracing::debug;

/// A named, reusable entity group instanced via INSERT.
#[derive(Debug, Clone)]
pub struct Block {
    pub name: String,
    pub base_point: Point,
    pub entities: Vec<Entity>,
}

/// A parsed drawing: the flat entity list plus block definitions.
#[derive(Debug, Clone, Default)]
pub struct Drawing {
    pub entities: Vec<Entity>,
    pub blocks: HashMap<String, Block>,
}

#[derive(Deserialize)]
struct DrawingWire {
    #[serde(default)]
    entities: Vec<serde_json::Value>,
    #[serde(default)]
    blocks: HashMap<String, BlockWire>,
}

/// Base-point priority: `basePoint`, `position`, `insert`, else the origin.
#[derive(Deserialize)]
struct BlockWire {
    name: Option<String>,
    #[serde(rename = "basePoint")]
    base_point: Option<Point>,
    position: Option<Point>,
    insert: Option<Point>,
    #[serde(default)]
    entities: Vec<serde_json::Value>,
}

fn convert_entities(values: Vec<serde_json::Value>, context: &str) -> Vec<Entity> {
    values
        .into_iter()
        .enumerate()
        .map(|(i, value)| match serde_json::from_value::<Entity>(value) {
            Ok(entity) => entity,
            Err(err) => {
                debug!("Skipping malformed entity {} in {}: {}", i, context, err);
                Entity::Unsupported
            }
        })
        .collect()
}

impl Drawing {
    /// Parses the JSON a drawing-format parser produced.
    ///
    /// A document that is not valid JSON or lacks the expected shape is the
    /// one fatal condition; individual entities degrade instead of failing.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let wire: DrawingWire =
            serde_json::from_str(json).map_err(|e| Error::parse(e.to_string()))?;

        let entities = convert_entities(wire.entities, "drawing");
        let blocks = wire
            .blocks
            .into_iter()
            .map(|(key, raw)| {
                let name = raw.name.unwrap_or_else(|| key.clone());
                let block = Block {
                    base_point: raw
                        .base_point
                        .or(raw.position)
                        .or(raw.insert)
                        .unwrap_or_default(),
                    entities: convert_entities(raw.entities, &format!("block {name}")),
                    name,
                };
                (key, block)
            })
            .collect();

        Ok(Self { entities, blocks })
    }

    /// Parses raw bytes, re-decoding through the detected codepage first.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self> {
        let text = encoding::decode(bytes);
        Self::from_json_str(&text)
    }

    /// Looks up a block definition for an INSERT.
    ///
    /// Resolution order: exact name, then case-insensitive name, then a
    /// scan of every known definition for a same-named block that actually
    /// has entities. Returns `None` for unresolved or empty blocks — the
    /// INSERT then contributes nothing.
    pub fn resolve_block(&self, name: &str) -> Option<&Block> {
        let direct = self.blocks.get(name).or_else(|| {
            self.blocks
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, block)| block)
        });

        match direct {
            Some(block) if !block.entities.is_empty() => Some(block),
            _ => self
                .blocks
                .values()
                .find(|b| b.name.eq_ignore_ascii_case(name) && !b.entities.is_empty())
                .or(direct),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "entities": [
            {"type": "LINE", "startPoint": {"x": 0, "y": 0}, "endPoint": {"x": 100, "y": 0}},
            {"type": "DIMENSION", "whatever": 1},
            {"type": "INSERT", "name": "piece", "insert": {"x": 10, "y": 10}}
        ],
        "blocks": {
            "piece": {
                "name": "piece",
                "basePoint": {"x": 0, "y": 0},
                "entities": [
                    {"type": "CIRCLE", "center": {"x": 5, "y": 5}, "radius": 2}
                ]
            }
        }
    }"#;

    #[test]
    fn parses_sample_document() {
        let drawing = Drawing::from_json_str(SAMPLE).unwrap();
        assert_eq!(drawing.entities.len(), 3);
        assert!(matches!(drawing.entities[0], Entity::Line(_)));
        assert!(matches!(drawing.entities[1], Entity::Unsupported));
        assert!(matches!(drawing.entities[2], Entity::Insert(_)));
        assert_eq!(drawing.blocks.len(), 1);
    }

    #[test]
    fn malformed_entity_keeps_index_stable() {
        let json = r#"{"entities": [{"type": "CIRCLE"}, {"type": "LINE",
            "startPoint": {"x": 0, "y": 0}, "endPoint": {"x": 1, "y": 1}}]}"#;
        let drawing = Drawing::from_json_str(json).unwrap();
        assert!(matches!(drawing.entities[0], Entity::Unsupported));
        assert!(matches!(drawing.entities[1], Entity::Line(_)));
    }

    #[test]
    fn invalid_document_is_fatal() {
        assert!(Drawing::from_json_str("not json").is_err());
    }

    #[test]
    fn block_lookup_is_case_insensitive() {
        let drawing = Drawing::from_json_str(SAMPLE).unwrap();
        assert!(drawing.resolve_block("piece").is_some());
        assert!(drawing.resolve_block("PIECE").is_some());
        assert!(drawing.resolve_block("missing").is_none());
    }

    #[test]
    fn empty_block_falls_back_to_populated_namesake() {
        let json = r#"{
            "entities": [],
            "blocks": {
                "a": {"name": "shared", "entities": []},
                "b": {"name": "shared", "entities": [
                    {"type": "LINE", "startPoint": {"x": 0, "y": 0}, "endPoint": {"x": 1, "y": 0}}
                ]}
            }
        }"#;
        let drawing = Drawing::from_json_str(json).unwrap();
        let block = drawing.resolve_block("shared").unwrap();
        assert_eq!(block.entities.len(), 1);
    }
}
