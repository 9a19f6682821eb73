// src/components/embed_widget.rs
use crate::lesson_data::{MediaIdentity, Node};
use yew::prelude::*;
use yew::virtual_dom::VTag;

#[derive(Properties, PartialEq)]
pub struct EmbedWidgetProps {
    pub identity: MediaIdentity,
    pub player: Node,
    /// Opens the feedback dialog bound to the identity.
    pub on_feedback: Callback<MediaIdentity>,
}

/// Player and feedback trigger that replace one embed marker.
#[function_component(EmbedWidget)]
pub fn embed_widget(props: &EmbedWidgetProps) -> Html {
    let onclick = {
        let identity = props.identity.clone();
        props
            .on_feedback
            .reform(move |_: MouseEvent| identity.clone())
    };

    html! {
        <>
            { player_html(&props.player) }
            <div>
                <button type="button" class="feedback-button" id={props.identity.to_string()} {onclick}>
                    {"Feedback"}
                </button>
            </div>
        </>
    }
}

fn player_html(node: &Node) -> Html {
    match node {
        Node::Text(text) => html! { {text.clone()} },
        Node::Element(el) => {
            let mut tag = VTag::new(el.tag);
            for (name, value) in &el.attrs {
                tag.add_attribute(*name, value.clone());
            }
            tag.add_children(el.children.iter().map(player_html));
            tag.into()
        }
    }
}
