// src/components/feedback_dialog.rs
use crate::api;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::feedback::{FeedbackEndpoint, FeedbackForm, FeedbackRecord, MAX_RATING, MIN_RATING};
use crate::lesson_data::RenderContext;
use crate::utils::csrf_token;
use gloo::utils::document;
use gloo_events::EventListener;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlSelectElement, HtmlTextAreaElement, KeyboardEvent};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct FeedbackDialogProps {
    pub config: Rc<ClientConfig>,
    pub context: RenderContext,
    pub media_type: AttrValue,
    pub media: AttrValue,
}

pub enum FeedbackDialogMsg {
    Loaded(Result<Option<FeedbackRecord>, ClientError>),
    SetComments(String),
    SetRating(i64),
    Save,
    Saved(Result<(), ClientError>),
    Open,
    Close,
}

/// Rating + comment form for one embedded media item.
///
/// Mounted once per identity next to the first widget showing that media and
/// opened by its triggers. It stays mounted while closed, so edits made
/// before a cancel are still there on the next open.
pub struct FeedbackDialog {
    endpoint: FeedbackEndpoint,
    form: FeedbackForm,
    loaded: bool,
    open: bool,
    escape_listener: Option<EventListener>,
}

impl Component for FeedbackDialog {
    type Message = FeedbackDialogMsg;
    type Properties = FeedbackDialogProps;

    fn create(ctx: &Context<Self>) -> Self {
        let props = ctx.props();
        let endpoint = FeedbackEndpoint::new(&props.config, &props.context, &props.media_type, &props.media);

        let url = endpoint.url.clone();
        ctx.link().send_future(async move {
            FeedbackDialogMsg::Loaded(api::fetch_feedback(&url).await)
        });

        Self {
            endpoint,
            form: FeedbackForm::default(),
            loaded: false,
            open: false,
            escape_listener: None,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            FeedbackDialogMsg::Loaded(result) => {
                self.loaded = true;
                match result {
                    Ok(Some(record)) => self.form.apply(record),
                    Ok(None) => log::debug!("No feedback stored yet for {}", self.endpoint.identity),
                    Err(e) => log::warn!("Failed to load feedback for {}: {}", self.endpoint.identity, e),
                }
                true
            }
            FeedbackDialogMsg::SetComments(comments) => {
                self.form.comments = comments;
                false
            }
            FeedbackDialogMsg::SetRating(rating) => {
                self.form.set_rating(rating);
                true
            }
            FeedbackDialogMsg::Save => {
                let submission = self.endpoint.submission(&self.form);
                let token = csrf_token(&ctx.props().config);
                let link = ctx.link().clone();
                spawn_local(async move {
                    let result = api::store_feedback(&submission, token.as_deref()).await;
                    link.send_message(FeedbackDialogMsg::Saved(result));
                });
                false
            }
            FeedbackDialogMsg::Saved(result) => {
                match result {
                    Ok(()) => log::info!("Feedback saved for {}", self.endpoint.identity),
                    Err(e) => log::warn!("Failed to save feedback for {}: {}", self.endpoint.identity, e),
                }
                false
            }
            FeedbackDialogMsg::Open => !std::mem::replace(&mut self.open, true),
            FeedbackDialogMsg::Close => std::mem::replace(&mut self.open, false),
        }
    }

    fn rendered(&mut self, ctx: &Context<Self>, _first_render: bool) {
        // Escape closes the dialog, but only while it is open
        if self.open && self.escape_listener.is_none() {
            let link = ctx.link().clone();
            self.escape_listener = Some(EventListener::new(&document(), "keydown", move |event| {
                if let Some(key) = event.dyn_ref::<KeyboardEvent>() {
                    if key.key() == "Escape" {
                        link.send_message(FeedbackDialogMsg::Close);
                    }
                }
            }));
        } else if !self.open {
            self.escape_listener = None;
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let props = ctx.props();
        let id = self.endpoint.identity.to_string();

        let oninput = ctx.link().callback(|e: InputEvent| {
            let area: HtmlTextAreaElement = e.target_unchecked_into();
            FeedbackDialogMsg::SetComments(area.value())
        });
        let onchange = ctx.link().batch_callback(|e: Event| {
            let select = e.target_dyn_into::<HtmlSelectElement>()?;
            select.value().parse::<i64>().ok().map(FeedbackDialogMsg::SetRating)
        });
        // Saving is its own message; the Save button just chains it with closing
        let on_save = ctx
            .link()
            .batch_callback(|_: MouseEvent| vec![FeedbackDialogMsg::Save, FeedbackDialogMsg::Close]);
        let on_cancel = ctx.link().callback(|_: MouseEvent| FeedbackDialogMsg::Close);

        html! {
            <div
                class={classes!("feedback-dialog", self.open.then_some("open"))}
                id={id}
                media-type={props.media_type.clone()}
                media-id={props.media.clone()}
                hidden={!self.open}
            >
                <div class="modal-backdrop"></div>
                <div class="modal" role="dialog" aria-modal="true">
                    <div class="modal-title">{"Feedback"}</div>
                    <p style="font-weight:bold">{"Comments / Suggestions:"}</p>
                    <textarea
                        class="feedback-comments"
                        rows="3"
                        style="width:100%"
                        value={self.form.comments.clone()}
                        {oninput}
                    />
                    <p style="font-weight:bold">{"Rating:"}</p>
                    <p>
                        <select class="feedback-rating" name="rating" autocomplete="off" {onchange}>
                            {for (MIN_RATING..=MAX_RATING).map(|value| html! {
                                <option value={value.to_string()} selected={self.form.rating == value}>
                                    {value.to_string()}
                                </option>
                            })}
                        </select>
                        { self.render_stars(ctx) }
                    </p>
                    { if !self.loaded {
                        html! { <p class="feedback-loading">{"Loading previous feedback..."}</p> }
                    } else {
                        html! {}
                    } }
                    <div class="modal-buttons">
                        <button type="button" onclick={on_save}>{"Save"}</button>
                        <button type="button" onclick={on_cancel}>{"Cancel"}</button>
                    </div>
                </div>
            </div>
        }
    }
}

impl FeedbackDialog {
    fn render_stars(&self, ctx: &Context<Self>) -> Html {
        html! {
            <span class="feedback-stars">
                {for (MIN_RATING..=MAX_RATING).map(|value| {
                    let onclick = ctx
                        .link()
                        .callback(move |_: MouseEvent| FeedbackDialogMsg::SetRating(value as i64));
                    let star = if value <= self.form.rating { "\u{2605}" } else { "\u{2606}" };
                    html! {
                        <span class="star" title={format!("{} / {}", value, MAX_RATING)} {onclick}>
                            {star}
                        </span>
                    }
                })}
            </span>
        }
    }
}
