// src/config.rs
use crate::error::ClientError;
use crate::lesson_data::RenderContext;
use crate::score_boxes::ScoreBoxOptions;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Id of the `<script type="application/json">` element carrying the page configuration.
pub const CONFIG_ELEMENT_ID: &str = "elab-client-config";

/// Page-supplied settings. Every field has a default so templates only
/// need to provide what differs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub site_prefix: String,
    /// Placeholders: `{task}`, `{section}`, `{type}`, `{media}`
    pub feedback_url: String,
    /// Placeholder: `{submission}`
    pub explain_url: String,
    pub container_id: String,
    pub editor_source_id: String,
    pub blur_delay_ms: u32,
    pub csrf_token: Option<String>,
    pub log_level: String,
    pub youtube_embed_base: String,
    pub context: Option<RenderContext>,
    pub score_boxes: Option<ScoreBoxOptions>,
    pub scores: Option<HashMap<String, f64>>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            site_prefix: String::new(),
            feedback_url: String::from("/feedback/{task}/{section}/{type}/{media}/"),
            explain_url: String::from("/lab/submission/{submission}/explain/"),
            container_id: String::from("assignment-body"),
            editor_source_id: String::from("id_source"),
            blur_delay_ms: 1000,
            csrf_token: None,
            log_level: String::from("info"),
            youtube_embed_base: String::from("https://www.youtube.com/embed/"),
            context: None,
            score_boxes: None,
            scores: None,
        }
    }
}

impl ClientConfig {
    pub fn from_json(json: &str) -> Result<Self, ClientError> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(json)?)
    }

    /// Read the configuration blob from the page. A missing blob yields the defaults.
    pub fn load() -> Result<Self, ClientError> {
        let blob = gloo_utils::document()
            .get_element_by_id(CONFIG_ELEMENT_ID)
            .and_then(|el| el.text_content())
            .unwrap_or_default();
        Self::from_json(&blob)
    }

    pub fn log_level(&self) -> log::Level {
        log::Level::from_str(&self.log_level).unwrap_or(log::Level::Info)
    }
}
