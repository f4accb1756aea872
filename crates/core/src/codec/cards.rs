//! Card-board document (version 7).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::CodecError;
use crate::model::card::DEFAULT_CARD_DESCRIPTION;
use crate::model::{Card, Direction, NodeKind, Timeline};

pub const CARDS_DOCUMENT_VERSION: u32 = 7;
pub const CARDS_STORAGE_KEY: &str = "geotracer_tikkingen_cards_v7";

/// Title given to a restored timeline whose stored title is blank.
pub const FALLBACK_TIMELINE_TITLE: &str = "Tijdlijn";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardsDocument {
    #[serde(default)]
    pub version: u32,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub updated_at: i64,
    #[serde(default)]
    pub timelines: Vec<TimelineRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineRecord {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub nodes: Vec<CardRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardRecord {
    #[serde(rename = "type", default)]
    pub kind: NodeKind,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
}

pub fn serialize_cards(timelines: &[Timeline], now: DateTime<Utc>) -> CardsDocument {
    CardsDocument {
        version: CARDS_DOCUMENT_VERSION,
        updated_at: now.timestamp_millis(),
        timelines: timelines
            .iter()
            .map(|tl| TimelineRecord {
                title: tl.title.trim().to_string(),
                nodes: tl
                    .cards()
                    .iter()
                    .map(|card| CardRecord {
                        kind: card.kind,
                        direction: card.direction,
                        title: Some(card.title.trim().to_string()),
                        desc: Some(card.description.trim().to_string()),
                    })
                    .collect(),
            })
            .collect(),
    }
}

/// Rebuild timelines. Missing card fields take the defaults a new card
/// would get at that position.
pub fn deserialize_cards(doc: &CardsDocument) -> Vec<Timeline> {
    doc.timelines
        .iter()
        .map(|rec| {
            let title = if rec.title.trim().is_empty() {
                FALLBACK_TIMELINE_TITLE.to_string()
            } else {
                rec.title.clone()
            };
            let cards = rec
                .nodes
                .iter()
                .enumerate()
                .map(|(i, node)| Card {
                    kind: node.kind,
                    direction: node.direction,
                    title: node.title.clone().unwrap_or_else(|| format!("Tikking {}", i + 1)),
                    description: node
                        .desc
                        .clone()
                        .unwrap_or_else(|| DEFAULT_CARD_DESCRIPTION.to_string()),
                })
                .collect();
            Timeline::with_cards(title, cards)
        })
        .collect()
}

pub fn cards_to_json(doc: &CardsDocument) -> Result<String, CodecError> {
    Ok(serde_json::to_string(doc)?)
}

pub fn cards_from_json(json: &str) -> Result<CardsDocument, CodecError> {
    if json.trim().is_empty() {
        return Err(CodecError::Empty);
    }
    Ok(serde_json::from_str(json)?)
}
