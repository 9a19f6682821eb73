// src/lesson_data.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Element name of the declarative embed markers produced by the lesson renderer.
pub const EMBED_TAG: &str = "elab-embed";

/// Markup produced by a media renderer for the player part of a widget.
///
/// Tags and attribute names are fixed by the renderers themselves, never
/// taken from lesson content.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: &'static str,
    pub attrs: Vec<(&'static str, String)>,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MediaIdentity(String);

/// Placeholder for one feedback dialog. `upgraded` flips to true exactly once,
/// when the binding pass turns the slot into a live modal.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogSlot {
    pub identity: MediaIdentity,
    pub media_type: String,
    pub media: String,
    pub upgraded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedMarker {
    pub media_type: String,
    pub media: String,
}

/// Identifies the lesson instance every feedback record belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderContext {
    pub task_id: u64,
    #[serde(default)]
    pub section_id: Option<String>,
}

impl Node {
    pub fn text(content: impl Into<String>) -> Self {
        Node::Text(content.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }
}

impl Element {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.attrs.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Node::Element(el)
    }
}

impl MediaIdentity {
    pub fn new(media_type: &str, media: &str) -> Self {
        Self(format!("{}-{}", media_type, media))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MediaIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl DialogSlot {
    pub fn new(marker: &EmbedMarker) -> Self {
        Self {
            identity: marker.identity(),
            media_type: marker.media_type.clone(),
            media: marker.media.clone(),
            upgraded: false,
        }
    }
}

impl EmbedMarker {
    /// Builds a marker from its `type` and `media` attributes; `None` when
    /// either one is missing or blank.
    pub fn from_attributes(media_type: Option<&str>, media: Option<&str>) -> Option<Self> {
        let media_type = media_type.map(str::trim).filter(|t| !t.is_empty())?;
        let media = media.map(str::trim).filter(|m| !m.is_empty())?;
        Some(Self {
            media_type: media_type.to_string(),
            media: media.to_string(),
        })
    }

    pub fn identity(&self) -> MediaIdentity {
        MediaIdentity::new(&self.media_type, &self.media)
    }
}

impl RenderContext {
    pub fn new(task_id: u64, section_id: Option<String>) -> Self {
        Self {
            task_id,
            section_id,
        }
    }

    /// Path segment used by the backend for the lab-in-section id.
    pub fn section_segment(&self) -> &str {
        self.section_id.as_deref().unwrap_or("none")
    }
}
