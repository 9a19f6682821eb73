// src/lesson_dom.rs
//
// The live lesson container. The page template owns its DOM; this module only
// swaps embed markers for widget roots and adds or removes score inputs.

use crate::components::embed_widget::{EmbedWidget, EmbedWidgetProps};
use crate::components::feedback_dialog::{FeedbackDialog, FeedbackDialogMsg, FeedbackDialogProps};
use crate::config::ClientConfig;
use crate::embed::{EmbedHost, EmbedPage, MediaRegistry, ScanReport, Widget};
use crate::error::ClientError;
use crate::lesson_data::{DialogSlot, MediaIdentity, RenderContext, EMBED_TAG};
use crate::score_boxes::{self, ScoreBoxOptions, ScoreSurface, PLACEHOLDER_SELECTOR, SCORE_BOX_CLASS};
use gloo_utils::document;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, HtmlInputElement};
use yew::{AppHandle, Callback};

type DialogHandles = Rc<RefCell<HashMap<MediaIdentity, AppHandle<FeedbackDialog>>>>;

pub struct LessonContainer {
    root: Element,
    config: Rc<ClientConfig>,
    context: RenderContext,
    // Placed dialog containers waiting for the binding pass
    dialog_hosts: HashMap<MediaIdentity, Element>,
    dialogs: DialogHandles,
    open_dialog: Callback<MediaIdentity>,
}

impl LessonContainer {
    pub fn new(root: Element, config: Rc<ClientConfig>, context: RenderContext) -> Self {
        let dialogs: DialogHandles = Rc::default();
        let open_dialog = {
            let dialogs = Rc::clone(&dialogs);
            Callback::from(move |identity: MediaIdentity| match dialogs.borrow().get(&identity) {
                Some(dialog) => dialog.send_message(FeedbackDialogMsg::Open),
                None => log::warn!("No feedback dialog bound for {}", identity),
            })
        };

        Self {
            root,
            config,
            context,
            dialog_hosts: HashMap::new(),
            dialogs,
            open_dialog,
        }
    }
}

impl EmbedHost for LessonContainer {
    type Marker = Element;

    fn pending_markers(&self) -> Vec<Element> {
        select_all(&self.root, EMBED_TAG)
    }

    fn marker_attribute(&self, marker: &Element, name: &str) -> Option<String> {
        marker.get_attribute(name)
    }

    fn place(&mut self, marker: Element, widget: &Widget) -> Result<(), ClientError> {
        let host = create_element("div")?;

        let Widget::Media {
            marker: embed,
            player,
            owns_dialog,
        } = widget
        else {
            if let Some((class, text)) = widget.fallback() {
                host.set_class_name(class);
                host.set_text_content(Some(text));
            }
            return marker.replace_with_with_node_1(&host).map_err(dom_error);
        };

        host.set_class_name("embed-widget");
        marker.replace_with_with_node_1(&host).map_err(dom_error)?;

        let identity = embed.identity();
        if *owns_dialog {
            let dialog_host = create_element("div")?;
            dialog_host.set_class_name("feedback-dialog-host");
            host.after_with_node_1(&dialog_host).map_err(dom_error)?;
            self.dialog_hosts.insert(identity.clone(), dialog_host);
        }

        let props = EmbedWidgetProps {
            identity,
            player: player.clone(),
            on_feedback: self.open_dialog.clone(),
        };
        yew::Renderer::<EmbedWidget>::with_root_and_props(host, props).render();
        Ok(())
    }

    fn upgrade(&mut self, slot: &DialogSlot) -> Result<(), ClientError> {
        let host = self
            .dialog_hosts
            .remove(&slot.identity)
            .ok_or_else(|| ClientError::MissingElement(format!("feedback dialog for {}", slot.identity)))?;

        let props = FeedbackDialogProps {
            config: self.config.clone(),
            context: self.context.clone(),
            media_type: slot.media_type.clone().into(),
            media: slot.media.clone().into(),
        };
        let dialog = yew::Renderer::<FeedbackDialog>::with_root_and_props(host, props).render();
        self.dialogs.borrow_mut().insert(slot.identity.clone(), dialog);
        Ok(())
    }
}

impl ScoreSurface for LessonContainer {
    type Handle = Element;

    fn placeholders(&self) -> Vec<(Element, String)> {
        select_all(&self.root, PLACEHOLDER_SELECTOR)
            .into_iter()
            .filter_map(|el| {
                let name = el.get_attribute("name")?;
                Some((el, name))
            })
            .collect()
    }

    fn box_after(&self, placeholder: &Element) -> Option<String> {
        let next = placeholder.next_element_sibling()?;
        if next.matches(&score_box_selector()).unwrap_or(false) {
            next.get_attribute("name")
        } else {
            None
        }
    }

    fn insert_box_after(
        &mut self,
        placeholder: &Element,
        attrs: &[(&'static str, String)],
    ) -> Result<(), ClientError> {
        let input = create_element("input")?;
        for (name, value) in attrs {
            input.set_attribute(name, value).map_err(dom_error)?;
        }
        placeholder.after_with_node_1(&input).map_err(dom_error)
    }

    fn boxes(&self) -> Vec<(Element, String)> {
        select_all(&self.root, &score_box_selector())
            .into_iter()
            .filter_map(|el| {
                let name = el.get_attribute("name")?;
                Some((el, name))
            })
            .collect()
    }

    fn set_box(&mut self, score_box: &Element, value: &str, size: usize) {
        if let Some(input) = score_box.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        }
        if let Err(e) = score_box.set_attribute("size", &size.to_string()) {
            log::warn!("Could not resize score box: {:?}", e);
        }
    }

    fn remove_box(&mut self, score_box: Element) {
        score_box.remove();
    }
}

/// Embed and score-box state for the lesson rendered on this page.
pub struct LessonSession {
    page: EmbedPage,
    container: LessonContainer,
}

impl LessonSession {
    /// Attach to the configured lesson container and run the first render pass.
    pub fn mount(config: Rc<ClientConfig>, context: RenderContext) -> Result<Self, ClientError> {
        let root = document()
            .get_element_by_id(&config.container_id)
            .ok_or_else(|| ClientError::MissingElement(config.container_id.clone()))?;

        let page = EmbedPage::new(MediaRegistry::with_defaults(&config));
        let container = LessonContainer::new(root, config.clone(), context);
        let mut session = Self { page, container };

        let report = session.render_pass();
        log::info!(
            "Rendered {} embedded media with {} feedback dialogs ({} unsupported, {} failed)",
            report.rendered,
            session.page.dialog_count(),
            report.unsupported,
            report.failed
        );

        if let Some(options) = config.score_boxes {
            session.attach_score_boxes(options);
            if let Some(scores) = &config.scores {
                session.update_scores(scores);
            }
        }
        Ok(session)
    }

    /// Picks up markers added to the container since the last pass.
    pub fn render_pass(&mut self) -> ScanReport {
        self.page.render_pass(&mut self.container)
    }

    pub fn attach_score_boxes(&mut self, options: ScoreBoxOptions) {
        let added = score_boxes::attach(&mut self.container, options);
        log::debug!("Added {} score boxes", added);
    }

    pub fn update_scores(&mut self, scores: &HashMap<String, f64>) {
        score_boxes::update(&mut self.container, scores);
    }

    pub fn clear_score_boxes(&mut self) {
        score_boxes::clear(&mut self.container);
    }
}

fn score_box_selector() -> String {
    format!("input.{}", SCORE_BOX_CLASS)
}

fn select_all(root: &Element, selector: &str) -> Vec<Element> {
    match root.query_selector_all(selector) {
        Ok(list) => (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect(),
        Err(e) => {
            log::warn!("Query {:?} failed: {:?}", selector, e);
            Vec::new()
        }
    }
}

fn create_element(tag: &str) -> Result<Element, ClientError> {
    document().create_element(tag).map_err(dom_error)
}

pub fn dom_error(err: JsValue) -> ClientError {
    ClientError::Dom(format!("{:?}", err))
}
