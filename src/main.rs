// src/main.rs
mod api;
mod components;
mod config;
mod embed;
mod error;
mod explanation;
mod feedback;
mod lesson_data;
mod lesson_dom;
mod markup_editor;
mod score_boxes;
mod utils;

use components::result_explanation::{ResultExplanation, ResultExplanationProps};
use components::task_editor::{TaskEditor, TaskEditorProps};
use config::ClientConfig;
use error::ClientError;
use explanation::ExplanationSource;
use gloo_utils::document;
use lesson_data::RenderContext;
use lesson_dom::{dom_error, LessonSession};
use score_boxes::ScoreBoxOptions;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlTextAreaElement};

thread_local! {
    static CONFIG: RefCell<Rc<ClientConfig>> = RefCell::new(Rc::new(ClientConfig::default()));
    static LESSON: RefCell<Option<LessonSession>> = RefCell::new(None);
}

fn config() -> Rc<ClientConfig> {
    CONFIG.with(|config| config.borrow().clone())
}

fn with_lesson(action: &str, f: impl FnOnce(&mut LessonSession)) {
    LESSON.with(|lesson| match lesson.borrow_mut().as_mut() {
        Some(session) => f(session),
        None => log::warn!("Cannot {}: lesson components have not been rendered", action),
    });
}

/// Render embeds, feedback dialogs and score boxes into the lesson container.
/// A second call only rescans.
fn mount_lesson(config: Rc<ClientConfig>, context: RenderContext) -> Result<(), ClientError> {
    let mounted = LESSON.with(|lesson| lesson.borrow().is_some());
    if mounted {
        log::info!("Lesson components already rendered; rescanning instead");
        with_lesson("rescan embeds", |session| {
            session.render_pass();
        });
        return Ok(());
    }

    let session = LessonSession::mount(config, context)?;
    LESSON.with(|lesson| *lesson.borrow_mut() = Some(session));
    Ok(())
}

/// Swap the plain lesson source textarea for the tag-wrapping editor.
fn mount_task_editor(config: &ClientConfig) -> Result<(), ClientError> {
    let source = document()
        .get_element_by_id(&config.editor_source_id)
        .and_then(|el| el.dyn_into::<HtmlTextAreaElement>().ok())
        .ok_or_else(|| ClientError::MissingElement(config.editor_source_id.clone()))?;

    let host = document().create_element("div").map_err(dom_error)?;
    host.set_id("task_editor");
    host.set_attribute("style", "display: inline-block;")
        .map_err(dom_error)?;
    source.replace_with_with_node_1(&host).map_err(dom_error)?;

    let props = TaskEditorProps {
        id: source.id().into(),
        name: source.name().into(),
        initial: source.value().into(),
        rows: source.rows(),
        cols: source.cols(),
        blur_delay_ms: config.blur_delay_ms,
    };
    yew::Renderer::<TaskEditor>::with_root_and_props(host, props).render();
    Ok(())
}

#[wasm_bindgen]
pub fn render_components(task_id: u32, labinsec_id: Option<String>) {
    let context = RenderContext::new(task_id as u64, labinsec_id);
    if let Err(e) = mount_lesson(config(), context) {
        log::error!("Failed to render lesson components: {}", e);
    }
}

/// Render markers the page added to the lesson container since the last pass.
#[wasm_bindgen]
pub fn rescan_embeds() {
    with_lesson("rescan embeds", |session| {
        let report = session.render_pass();
        log::debug!("Rescan rendered {} new media", report.rendered);
    });
}

#[wasm_bindgen]
pub fn create_manual_score_boxes(read_only: bool) {
    with_lesson("create score boxes", |session| {
        session.attach_score_boxes(ScoreBoxOptions { read_only })
    });
}

/// `scores` is a plain object mapping placeholder names to numbers; `null` blanks every box.
#[wasm_bindgen]
pub fn update_manual_score_boxes(scores: JsValue) {
    let json = js_sys::JSON::stringify(&scores)
        .map(String::from)
        .unwrap_or_default();
    match serde_json::from_str::<Option<HashMap<String, f64>>>(&json) {
        Ok(scores) => with_lesson("update score boxes", |session| {
            session.update_scores(&scores.unwrap_or_default())
        }),
        Err(e) => log::warn!("Ignoring malformed scores: {}", e),
    }
}

#[wasm_bindgen]
pub fn remove_manual_score_boxes() {
    with_lesson("remove score boxes", LessonSession::clear_score_boxes);
}

/// Show a result explanation right after `element`. A number is a submission id
/// to fetch; a string is already-rendered content.
#[wasm_bindgen]
pub fn show_result_explanation(element: Element, submission: JsValue) {
    let Some(source) = ExplanationSource::from_js_parts(submission.as_f64(), submission.as_string())
    else {
        log::warn!("Unsupported submission reference: {:?}", submission);
        return;
    };

    let host = match document().create_element("div") {
        Ok(host) => host,
        Err(e) => {
            log::error!("Could not create explanation host: {:?}", e);
            return;
        }
    };
    if let Err(e) = element.after_with_node_1(&host) {
        log::error!("Could not place explanation dialog: {:?}", e);
        return;
    }

    let props = ResultExplanationProps {
        source,
        config: config(),
    };
    yew::Renderer::<ResultExplanation>::with_root_and_props(host, props).render();
}

fn main() {
    let loaded = ClientConfig::load();
    let level = loaded.as_ref().map(|c| c.log_level()).unwrap_or(log::Level::Info);
    wasm_logger::init(wasm_logger::Config::new(level));

    let config = Rc::new(loaded.unwrap_or_else(|e| {
        log::warn!("Using default client configuration: {}", e);
        ClientConfig::default()
    }));
    CONFIG.with(|current| *current.borrow_mut() = config.clone());

    if let Some(context) = config.context.clone() {
        if let Err(e) = mount_lesson(config.clone(), context) {
            log::error!("Failed to render lesson components: {}", e);
        }
    }

    match mount_task_editor(&config) {
        Ok(()) => log::info!("Task editor ready"),
        Err(ClientError::MissingElement(_)) => log::debug!("No lesson source on this page"),
        Err(e) => log::error!("Failed to set up task editor: {}", e),
    }
}
