// src/components/task_editor.rs
use crate::markup_editor::{GlooTimer, MarkupEditor, SelectionRange, TextBuffer, COMMANDS};
use web_sys::HtmlTextAreaElement;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct TaskEditorProps {
    pub id: AttrValue,
    pub name: AttrValue,
    pub initial: AttrValue,
    #[prop_or(20)]
    pub rows: u32,
    #[prop_or(80)]
    pub cols: u32,
    #[prop_or(1000)]
    pub blur_delay_ms: u32,
}

pub enum TaskEditorMsg {
    Focused,
    Blurred,
    Command(&'static str),
}

/// Lesson source textarea with a row of tag-wrapping buttons.
pub struct TaskEditor {
    source: NodeRef,
    editor: MarkupEditor<GlooTimer>,
}

impl Component for TaskEditor {
    type Message = TaskEditorMsg;
    type Properties = TaskEditorProps;

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            source: NodeRef::default(),
            editor: MarkupEditor::new(GlooTimer),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            TaskEditorMsg::Focused => {
                if self.editor.focus().has_pending_unfocus() {
                    log::debug!("Source refocused before the deferred blur applied");
                }
                self.editor.focus().mark_focused()
            }
            TaskEditorMsg::Blurred => {
                self.editor
                    .focus()
                    .schedule_unfocus(ctx.props().blur_delay_ms)
            }
            TaskEditorMsg::Command(name) => {
                let area = self.source.cast::<HtmlTextAreaElement>();
                let buffer = area.as_ref().map(read_buffer);
                if let (Some(area), Some(edit)) = (area, self.editor.invoke(name, buffer.as_ref())) {
                    area.set_value(&edit.text);
                    // Selection and scroll only stick once the new value is in place
                    let caret = area
                        .set_selection_start(Some(edit.caret))
                        .and_then(|_| area.set_selection_end(Some(edit.caret)));
                    if let Err(e) = caret {
                        log::warn!("Could not restore the caret after {}: {:?}", name, e);
                    }
                    area.set_scroll_top(edit.scroll_top);
                    if let Err(e) = area.focus() {
                        log::warn!("Could not refocus the source editor: {:?}", e);
                    }
                }
            }
        }
        false
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let props = ctx.props();
        let onfocus = ctx.link().callback(|_: FocusEvent| TaskEditorMsg::Focused);
        let onblur = ctx.link().callback(|_: FocusEvent| TaskEditorMsg::Blurred);

        html! {
            <>
                <div id="id_editor_button_list">
                    {for COMMANDS.iter().enumerate().map(|(index, command)| {
                        let name = command.name;
                        let onclick = ctx.link().callback(move |e: MouseEvent| {
                            e.prevent_default();
                            TaskEditorMsg::Command(name)
                        });
                        html! {
                            <button
                                id={format!("id_editor_button{}", index + 1)}
                                class="task-editor-button"
                                {onclick}
                            >
                                {name}
                            </button>
                        }
                    })}
                </div>
                <textarea
                    ref={self.source.clone()}
                    id={props.id.clone()}
                    name={props.name.clone()}
                    rows={props.rows.to_string()}
                    cols={props.cols.to_string()}
                    value={props.initial.clone()}
                    {onfocus}
                    {onblur}
                />
            </>
        }
    }
}

fn read_buffer(area: &HtmlTextAreaElement) -> TextBuffer {
    let start = area.selection_start().ok().flatten().unwrap_or(0);
    let end = area.selection_end().ok().flatten().unwrap_or(start);
    TextBuffer {
        text: area.value(),
        selection: SelectionRange::new(start, end),
        scroll_top: area.scroll_top(),
    }
}
