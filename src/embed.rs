// src/embed.rs
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::lesson_data::*;
use std::collections::HashMap;

pub const UNSUPPORTED_TEXT: &str = "Unsupported media type";
pub const RENDER_FAILED_TEXT: &str = "Unable to display media";

/// Produces the player subtree for one media kind.
pub trait MediaRenderer {
    fn render(&self, media: &str) -> Result<Node, ClientError>;
}

pub struct YoutubeRenderer {
    embed_base: String,
}

impl YoutubeRenderer {
    pub fn new(embed_base: impl Into<String>) -> Self {
        Self {
            embed_base: embed_base.into(),
        }
    }
}

impl MediaRenderer for YoutubeRenderer {
    fn render(&self, media: &str) -> Result<Node, ClientError> {
        let valid = media
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(ClientError::InvalidMedia(media.to_string()));
        }

        let frame = Element::new("iframe")
            .with_attr("width", "560")
            .with_attr("height", "315")
            .with_attr("src", format!("{}{}", self.embed_base, media))
            .with_attr("frameborder", "0")
            .with_attr("sandbox", "allow-scripts allow-same-origin allow-presentation")
            .with_attr("allowfullscreen", "");
        Ok(Element::new("div")
            .with_attr("class", "embedded-media")
            .with_child(frame.into())
            .into())
    }
}

/// Maps a marker `type` to the renderer for that kind of media.
#[derive(Default)]
pub struct MediaRegistry {
    renderers: HashMap<String, Box<dyn MediaRenderer>>,
}

impl MediaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults(config: &ClientConfig) -> Self {
        let mut registry = Self::new();
        registry.register("youtube", YoutubeRenderer::new(config.youtube_embed_base.clone()));
        registry
    }

    pub fn register(&mut self, media_type: &str, renderer: impl MediaRenderer + 'static) {
        self.renderers
            .insert(media_type.to_string(), Box::new(renderer));
    }

    pub fn get(&self, media_type: &str) -> Option<&dyn MediaRenderer> {
        self.renderers.get(media_type).map(|r| r.as_ref())
    }
}

/// What one marker is replaced with.
#[derive(Debug, Clone, PartialEq)]
pub enum Widget {
    /// Player plus feedback trigger. A repeated identity does not own a
    /// dialog; its trigger opens the one placed for the first occurrence.
    Media {
        marker: EmbedMarker,
        player: Node,
        owns_dialog: bool,
    },
    Unsupported,
    Failed,
}

impl Widget {
    /// Class and visible text of the placeholder shown instead of media.
    pub fn fallback(&self) -> Option<(&'static str, &'static str)> {
        match self {
            Widget::Media { .. } => None,
            Widget::Unsupported => Some(("embed-unsupported", UNSUPPORTED_TEXT)),
            Widget::Failed => Some(("embed-error", RENDER_FAILED_TEXT)),
        }
    }
}

/// The container markers live in. The host owns its DOM; the scanner only
/// asks it to swap markers for widgets and to upgrade dialog containers.
pub trait EmbedHost {
    type Marker;

    /// Markers still present in the container, in document order.
    fn pending_markers(&self) -> Vec<Self::Marker>;

    fn marker_attribute(&self, marker: &Self::Marker, name: &str) -> Option<String>;

    /// Replace `marker` with the widget subtree. When the widget owns a
    /// dialog, an empty dialog container is placed right after it.
    fn place(&mut self, marker: Self::Marker, widget: &Widget) -> Result<(), ClientError>;

    /// Turn the dialog container for `slot` into a live modal and route
    /// trigger clicks for its identity to it.
    fn upgrade(&mut self, slot: &DialogSlot) -> Result<(), ClientError>;
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanReport {
    pub rendered: usize,
    pub unsupported: usize,
    pub failed: usize,
}

/// Replaces every pending `elab-embed` marker with media, trigger and dialog container.
pub struct EmbedScanner<'a> {
    registry: &'a MediaRegistry,
    report: ScanReport,
}

impl<'a> EmbedScanner<'a> {
    pub fn new(registry: &'a MediaRegistry) -> Self {
        Self {
            registry,
            report: ScanReport::default(),
        }
    }

    /// `dialogs` holds the slots placed by earlier scans; new ones are appended.
    pub fn scan<H: EmbedHost>(mut self, host: &mut H, dialogs: &mut Vec<DialogSlot>) -> ScanReport {
        for pending in host.pending_markers() {
            let marker = EmbedMarker::from_attributes(
                host.marker_attribute(&pending, "type").as_deref(),
                host.marker_attribute(&pending, "media").as_deref(),
            );
            let widget = self.widget_for(marker, dialogs);

            if let Err(e) = host.place(pending, &widget) {
                log::warn!("Could not place embed widget: {}", e);
                self.report.failed += 1;
                continue;
            }

            match widget {
                Widget::Media {
                    marker,
                    owns_dialog,
                    ..
                } => {
                    self.report.rendered += 1;
                    if owns_dialog {
                        dialogs.push(DialogSlot::new(&marker));
                    }
                }
                Widget::Unsupported => self.report.unsupported += 1,
                Widget::Failed => self.report.failed += 1,
            }
        }
        self.report
    }

    fn widget_for(&self, marker: Option<EmbedMarker>, dialogs: &[DialogSlot]) -> Widget {
        let Some(marker) = marker else {
            log::warn!("Embed marker without type/media attributes");
            return Widget::Unsupported;
        };

        let Some(renderer) = self.registry.get(&marker.media_type) else {
            log::warn!("Unsupported media type: {}", marker.media_type);
            return Widget::Unsupported;
        };

        let player = match renderer.render(&marker.media) {
            Ok(node) => node,
            Err(e) => {
                log::warn!("Failed to render {}: {}", marker.identity(), e);
                return Widget::Failed;
            }
        };

        let identity = marker.identity();
        let owns_dialog = !dialogs.iter().any(|slot| slot.identity == identity);
        if !owns_dialog {
            log::warn!("Media {} embedded more than once; sharing its feedback dialog", identity);
        }
        Widget::Media {
            marker,
            player,
            owns_dialog,
        }
    }
}

/// Click bindings from feedback triggers to their dialogs, one per identity.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DialogBindings {
    bound: HashMap<MediaIdentity, usize>,
}

impl DialogBindings {
    pub fn is_bound(&self, identity: &MediaIdentity) -> bool {
        self.binding_count(identity) > 0
    }

    pub fn binding_count(&self, identity: &MediaIdentity) -> usize {
        self.bound.get(identity).copied().unwrap_or(0)
    }

    fn bind(&mut self, identity: &MediaIdentity) {
        *self.bound.entry(identity.clone()).or_insert(0) += 1;
    }
}

/// Upgrade every dialog slot that is not live yet and bind its trigger.
/// Returns the number of newly upgraded dialogs. A slot whose upgrade fails
/// stays pending for the next pass.
pub fn bind_dialogs<H: EmbedHost>(
    slots: &mut [DialogSlot],
    bindings: &mut DialogBindings,
    host: &mut H,
) -> usize {
    let mut upgraded = 0;
    for slot in slots.iter_mut().filter(|slot| !slot.upgraded) {
        match host.upgrade(slot) {
            Ok(()) => {
                slot.upgraded = true;
                bindings.bind(&slot.identity);
                upgraded += 1;
            }
            Err(e) => log::warn!("Feedback dialog for {} not bound: {}", slot.identity, e),
        }
    }
    upgraded
}

/// Per-page embed state: the registry plus every dialog placed so far.
pub struct EmbedPage {
    registry: MediaRegistry,
    dialogs: Vec<DialogSlot>,
    bindings: DialogBindings,
}

impl EmbedPage {
    pub fn new(registry: MediaRegistry) -> Self {
        Self {
            registry,
            dialogs: Vec::new(),
            bindings: DialogBindings::default(),
        }
    }

    /// Scan for markers, then bind dialogs. Safe to repeat after the host
    /// has added content.
    pub fn render_pass<H: EmbedHost>(&mut self, host: &mut H) -> ScanReport {
        let report = EmbedScanner::new(&self.registry).scan(host, &mut self.dialogs);
        let upgraded = bind_dialogs(&mut self.dialogs, &mut self.bindings, host);
        log::debug!(
            "Render pass: {} media, {} unsupported, {} failed, {} dialogs bound",
            report.rendered,
            report.unsupported,
            report.failed,
            upgraded
        );
        report
    }

    pub fn bindings(&self) -> &DialogBindings {
        &self.bindings
    }

    pub fn dialog_count(&self) -> usize {
        self.dialogs.len()
    }
}
