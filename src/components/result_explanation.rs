// src/components/result_explanation.rs
use crate::api;
use crate::config::ClientConfig;
use crate::explanation::ExplanationSource;
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct ResultExplanationProps {
    pub source: ExplanationSource,
    pub config: Rc<ClientConfig>,
}

#[function_component(ResultExplanation)]
pub fn result_explanation(props: &ResultExplanationProps) -> Html {
    let open = use_state(|| true);
    let content = use_state(|| match &props.source {
        ExplanationSource::Rendered(html) => Some(AttrValue::from(html.clone())),
        ExplanationSource::Submission(_) => None,
    });

    // ------ FETCH SUBMISSION EXPLANATION ------
    {
        let content = content.clone();
        let url = props.source.url(&props.config);
        use_effect_with(url, move |url| {
            if let Some(url) = url.clone() {
                spawn_local(async move {
                    match api::fetch_explanation(&url).await {
                        Ok(html) => content.set(Some(AttrValue::from(html))),
                        Err(e) => log::warn!("Failed to load result explanation: {}", e),
                    }
                });
            }
            || ()
        });
    }

    let on_close = {
        let open = open.clone();
        Callback::from(move |_: MouseEvent| open.set(false))
    };

    // The modal only appears once there is something to show
    let Some(html) = (*content).clone() else {
        return html! {};
    };
    if !*open {
        return html! {};
    }

    html! {
        <div class="result-explain-dialog" id={props.source.dialog_id()}>
            <div class="modal-backdrop"></div>
            <div class="modal" role="dialog" aria-modal="true" style="width: 600px; height: 500px; overflow: auto;">
                <div class="modal-title">{"Result Explanation"}</div>
                <div class="modal-content">{ Html::from_html_unchecked(html) }</div>
                <div class="modal-buttons">
                    <button type="button" onclick={on_close}>{"Close"}</button>
                </div>
            </div>
        </div>
    }
}
