// src/markup_editor.rs
//
// Selection-based tag wrapping for the lesson source textarea. Offsets are in
// UTF-16 code units because that is what the browser reports for textarea
// selections; splicing converts them to byte offsets.

use gloo::timers::callback::Timeout;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Wrap exactly the selected characters.
    Selection,
    /// Wrap every full line the selection touches.
    Lines,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorCommand {
    pub name: &'static str,
    pub start_tag: &'static str,
    pub end_tag: &'static str,
    pub scope: Scope,
}

pub const COMMANDS: &[EditorCommand] = &[
    EditorCommand {
        name: "blank",
        start_tag: "{{",
        end_tag: "}}",
        scope: Scope::Selection,
    },
    EditorCommand {
        name: "b",
        start_tag: "**",
        end_tag: "**",
        scope: Scope::Selection,
    },
    EditorCommand {
        name: "c",
        start_tag: "`",
        end_tag: "`",
        scope: Scope::Selection,
    },
    EditorCommand {
        name: "::code",
        start_tag: "::elab:begincode\n",
        end_tag: "\n::elab:endcode",
        scope: Scope::Lines,
    },
    EditorCommand {
        name: "::test",
        start_tag: "::elab:begintest\n",
        end_tag: "\n::elab:endtest",
        scope: Scope::Lines,
    },
];

pub fn find_command(name: &str) -> Option<&'static EditorCommand> {
    COMMANDS.iter().find(|command| command.name == name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionRange {
    pub start: u32,
    pub end: u32,
}

impl SelectionRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Order the bounds and keep both inside `len`.
    pub fn normalize(self, len: u32) -> Self {
        let (start, end) = if self.start <= self.end {
            (self.start, self.end)
        } else {
            (self.end, self.start)
        };
        Self {
            start: start.min(len),
            end: end.min(len),
        }
    }
}

/// Snapshot of the textarea at the moment a command fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBuffer {
    pub text: String,
    pub selection: SelectionRange,
    pub scroll_top: i32,
}

/// Result of a splice: new content, caret position, scroll position to restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub text: String,
    pub caret: u32,
    pub scroll_top: i32,
}

impl EditorCommand {
    pub fn apply(&self, buffer: &TextBuffer) -> Option<Edit> {
        match self.scope {
            Scope::Selection => wrap_selection_with(buffer, self.start_tag, self.end_tag),
            Scope::Lines => wrap_selected_lines_with(buffer, self.start_tag, self.end_tag),
        }
    }
}

pub fn wrap_selection_with(buffer: &TextBuffer, start_tag: &str, end_tag: &str) -> Option<Edit> {
    let range = buffer.selection.normalize(utf16_len(&buffer.text));
    if range.is_empty() {
        return None;
    }
    Some(wrap_at(buffer, range, start_tag, end_tag))
}

pub fn wrap_selected_lines_with(
    buffer: &TextBuffer,
    start_tag: &str,
    end_tag: &str,
) -> Option<Edit> {
    let range = buffer.selection.normalize(utf16_len(&buffer.text));
    if range.is_empty() {
        return None;
    }
    let lines = expand_to_lines(&buffer.text, range);
    Some(wrap_at(buffer, lines, start_tag, end_tag))
}

/// Grow `range` to the enclosing line boundaries; the last line ends at buffer end.
pub fn expand_to_lines(text: &str, range: SelectionRange) -> SelectionRange {
    let start = byte_offset(text, range.start);
    let end = byte_offset(text, range.end);
    let line_start = text[..start].rfind('\n').map_or(0, |i| i + 1);
    let line_end = text[end..].find('\n').map_or(text.len(), |i| end + i);
    SelectionRange::new(utf16_len(&text[..line_start]), utf16_len(&text[..line_end]))
}

fn wrap_at(buffer: &TextBuffer, range: SelectionRange, start_tag: &str, end_tag: &str) -> Edit {
    let text = &buffer.text;
    let start = byte_offset(text, range.start);
    let end = byte_offset(text, range.end);

    let mut wrapped = String::with_capacity(text.len() + start_tag.len() + end_tag.len());
    wrapped.push_str(&text[..start]);
    wrapped.push_str(start_tag);
    wrapped.push_str(&text[start..end]);
    wrapped.push_str(end_tag);
    wrapped.push_str(&text[end..]);

    Edit {
        text: wrapped,
        caret: range.end + utf16_len(start_tag) + utf16_len(end_tag),
        scroll_top: buffer.scroll_top,
    }
}

fn utf16_len(text: &str) -> u32 {
    text.encode_utf16().count() as u32
}

/// Byte index of a UTF-16 offset, rounded up to the next char boundary.
fn byte_offset(text: &str, utf16: u32) -> usize {
    let mut units = 0;
    for (idx, ch) in text.char_indices() {
        if units >= utf16 {
            return idx;
        }
        units += ch.len_utf16() as u32;
    }
    text.len()
}

/// Runs a deferred task; dropping the returned handle cancels it.
pub trait TimerBackend {
    type Handle;

    fn defer(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Self::Handle;
}

pub struct GlooTimer;

impl TimerBackend for GlooTimer {
    type Handle = Timeout;

    fn defer(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Timeout {
        Timeout::new(delay_ms, task)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusState {
    Focused,
    Unfocused,
}

struct FocusInner<H> {
    state: FocusState,
    generation: u64,
    pending: Option<u64>,
    // Kept only so dropping it cancels the timer
    handle: Option<H>,
}

/// Tracks whether the source buffer holds focus from the user's point of view.
///
/// A blur is applied late: clicking a command button steals focus before the
/// click handler runs, and the handler must still see the buffer as focused.
pub struct FocusTracker<T: TimerBackend> {
    timer: T,
    inner: Rc<RefCell<FocusInner<T::Handle>>>,
}

impl<T: TimerBackend> FocusTracker<T>
where
    T::Handle: 'static,
{
    pub fn new(timer: T) -> Self {
        Self {
            timer,
            inner: Rc::new(RefCell::new(FocusInner {
                state: FocusState::Unfocused,
                generation: 0,
                pending: None,
                handle: None,
            })),
        }
    }

    pub fn is_focused(&self) -> bool {
        self.inner.borrow().state == FocusState::Focused
    }

    pub fn has_pending_unfocus(&self) -> bool {
        self.inner.borrow().pending.is_some()
    }

    pub fn mark_focused(&self) {
        self.cancel_pending_unfocus();
        self.inner.borrow_mut().state = FocusState::Focused;
    }

    pub fn schedule_unfocus(&self, delay_ms: u32) {
        let generation = {
            let mut inner = self.inner.borrow_mut();
            inner.generation += 1;
            inner.pending = Some(inner.generation);
            inner.generation
        };

        let weak: Weak<RefCell<FocusInner<T::Handle>>> = Rc::downgrade(&self.inner);
        let handle = self.timer.defer(
            delay_ms,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    let mut inner = inner.borrow_mut();
                    if inner.pending == Some(generation) {
                        inner.pending = None;
                        inner.state = FocusState::Unfocused;
                    }
                }
            }),
        );

        // The previous handle (if any) is dropped here, cancelling its timer
        let previous = self.inner.borrow_mut().handle.replace(handle);
        drop(previous);
    }

    pub fn cancel_pending_unfocus(&self) {
        let handle = {
            let mut inner = self.inner.borrow_mut();
            inner.pending = None;
            inner.handle.take()
        };
        drop(handle);
    }
}

/// Command dispatch gated on buffer focus.
pub struct MarkupEditor<T: TimerBackend> {
    focus: FocusTracker<T>,
}

impl<T: TimerBackend> MarkupEditor<T>
where
    T::Handle: 'static,
{
    pub fn new(timer: T) -> Self {
        Self {
            focus: FocusTracker::new(timer),
        }
    }

    pub fn focus(&self) -> &FocusTracker<T> {
        &self.focus
    }

    /// Run the named command against the buffer. `None` means nothing was done:
    /// unknown command, missing buffer, buffer not focused, or empty selection.
    pub fn invoke(&self, name: &str, buffer: Option<&TextBuffer>) -> Option<Edit> {
        if !self.focus.is_focused() {
            log::debug!("Ignoring editor command {}: source not focused", name);
            return None;
        }
        let command = find_command(name)?;
        let edit = command.apply(buffer?)?;
        // The splice refocuses the buffer, so a blur queued by the button click is stale
        self.focus.mark_focused();
        Some(edit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Slots = Rc<RefCell<Vec<Option<Box<dyn FnOnce()>>>>>;

    #[derive(Clone, Default)]
    struct ManualTimer {
        slots: Slots,
    }

    struct ManualHandle {
        slots: Weak<RefCell<Vec<Option<Box<dyn FnOnce()>>>>>,
        index: usize,
    }

    impl Drop for ManualHandle {
        fn drop(&mut self) {
            if let Some(slots) = self.slots.upgrade() {
                if let Ok(mut slots) = slots.try_borrow_mut() {
                    slots[self.index] = None;
                }
            }
        }
    }

    impl TimerBackend for ManualTimer {
        type Handle = ManualHandle;

        fn defer(&self, _delay_ms: u32, task: Box<dyn FnOnce()>) -> ManualHandle {
            let mut slots = self.slots.borrow_mut();
            slots.push(Some(task));
            ManualHandle {
                slots: Rc::downgrade(&self.slots),
                index: slots.len() - 1,
            }
        }
    }

    impl ManualTimer {
        fn fire_all(&self) {
            let due: Vec<_> = self
                .slots
                .borrow_mut()
                .iter_mut()
                .filter_map(Option::take)
                .collect();
            for task in due {
                task();
            }
        }

        fn pending(&self) -> usize {
            self.slots.borrow().iter().filter(|s| s.is_some()).count()
        }
    }

    fn buffer(text: &str, start: u32, end: u32) -> TextBuffer {
        TextBuffer {
            text: text.to_string(),
            selection: SelectionRange::new(start, end),
            scroll_top: 120,
        }
    }

    #[test]
    fn test_wrap_selection() {
        let edit = wrap_selection_with(&buffer("print x here", 6, 7), "{{", "}}").unwrap();
        assert_eq!(edit.text, "print {{x}} here");
        assert_eq!(edit.caret, 11);
        assert_eq!(edit.scroll_top, 120);
    }

    #[test]
    fn test_empty_selection_is_noop() {
        assert!(wrap_selection_with(&buffer("abc", 1, 1), "**", "**").is_none());
        assert!(wrap_selected_lines_with(&buffer("abc", 3, 3), "<", ">").is_none());
    }

    #[test]
    fn test_wrap_then_unwrap_restores_content() {
        let samples = [
            ("hello world", 0, 5),
            ("hello world", 6, 11),
            ("naïve café ☕ text", 2, 12),
            ("emoji 😀 inside", 5, 9),
        ];
        for (text, start, end) in samples {
            for command in COMMANDS.iter().filter(|c| c.scope == Scope::Selection) {
                let edit = command.apply(&buffer(text, start, end)).unwrap();
                let units: Vec<u16> = edit.text.encode_utf16().collect();
                let open = command.start_tag.encode_utf16().count();
                let close = command.end_tag.encode_utf16().count();
                let (s, e) = (start as usize, end as usize);
                let mut restored: Vec<u16> = units[..s].to_vec();
                restored.extend_from_slice(&units[s + open..e + open]);
                restored.extend_from_slice(&units[e + open + close..]);
                assert_eq!(String::from_utf16(&restored).unwrap(), text);
            }
        }
    }

    #[test]
    fn test_caret_lands_after_end_tag_with_multibyte_text() {
        let text = "é bold";
        let edit = find_command("b").unwrap().apply(&buffer(text, 2, 6)).unwrap();
        assert_eq!(edit.text, "é **bold**");
        assert_eq!(edit.caret, 10);
    }

    #[test]
    fn test_line_wrap_expands_to_full_lines() {
        let text = "first\nsecond line\nthird";
        let edit = find_command("::code")
            .unwrap()
            .apply(&buffer(text, 8, 10))
            .unwrap();
        assert_eq!(
            edit.text,
            "first\n::elab:begincode\nsecond line\n::elab:endcode\nthird"
        );
    }

    #[test]
    fn test_line_wrap_on_last_line_stops_at_buffer_end() {
        let text = "first\nlast line";
        let range = expand_to_lines(text, SelectionRange::new(7, 9));
        assert_eq!(range, SelectionRange::new(6, 15));

        let edit = find_command("::test")
            .unwrap()
            .apply(&buffer(text, 7, 9))
            .unwrap();
        assert_eq!(edit.text, "first\n::elab:begintest\nlast line\n::elab:endtest");
        assert_eq!(edit.caret, 15 + 17 + 15);
    }

    #[test]
    fn test_line_wrap_spanning_lines() {
        let range = expand_to_lines("a\nbb\ncc\nd", SelectionRange::new(3, 6));
        assert_eq!(range, SelectionRange::new(2, 7));
    }

    #[test]
    fn test_out_of_range_selection_is_clamped() {
        let edit = wrap_selection_with(&buffer("abc", 1, 99), "`", "`").unwrap();
        assert_eq!(edit.text, "a`bc`");
        let reversed = wrap_selection_with(&buffer("abc", 2, 0), "`", "`").unwrap();
        assert_eq!(reversed.text, "`ab`c");
    }

    #[test]
    fn test_command_table() {
        let names: Vec<_> = COMMANDS.iter().map(|c| c.name).collect();
        assert_eq!(names, ["blank", "b", "c", "::code", "::test"]);
        assert!(find_command("italic").is_none());
    }

    #[test]
    fn test_blur_is_deferred() {
        let timer = ManualTimer::default();
        let focus = FocusTracker::new(timer.clone());
        focus.mark_focused();
        focus.schedule_unfocus(1000);

        assert!(focus.is_focused());
        assert!(focus.has_pending_unfocus());
        timer.fire_all();
        assert!(!focus.is_focused());
        assert!(!focus.has_pending_unfocus());
    }

    #[test]
    fn test_cancelled_unfocus_never_applies() {
        let timer = ManualTimer::default();
        let focus = FocusTracker::new(timer.clone());
        focus.mark_focused();
        focus.schedule_unfocus(1000);
        focus.cancel_pending_unfocus();

        assert_eq!(timer.pending(), 0);
        timer.fire_all();
        assert!(focus.is_focused());
    }

    #[test]
    fn test_refocus_discards_pending_unfocus() {
        let timer = ManualTimer::default();
        let focus = FocusTracker::new(timer.clone());
        focus.mark_focused();
        focus.schedule_unfocus(1000);
        focus.mark_focused();
        timer.fire_all();
        assert!(focus.is_focused());
    }

    #[test]
    fn test_button_click_after_blur_still_runs_command() {
        let timer = ManualTimer::default();
        let editor = MarkupEditor::new(timer.clone());
        editor.focus().mark_focused();
        // Clicking the button blurs the textarea first
        editor.focus().schedule_unfocus(1000);

        let edit = editor.invoke("b", Some(&buffer("make bold", 5, 9))).unwrap();
        assert_eq!(edit.text, "make **bold**");
        assert!(!editor.focus().has_pending_unfocus());

        timer.fire_all();
        assert!(editor.focus().is_focused());
    }

    #[test]
    fn test_commands_need_focus_and_buffer() {
        let timer = ManualTimer::default();
        let editor = MarkupEditor::new(timer.clone());
        assert!(editor.invoke("b", Some(&buffer("abc", 0, 3))).is_none());

        editor.focus().mark_focused();
        assert!(editor.invoke("b", None).is_none());
        assert!(editor.invoke("unknown", Some(&buffer("abc", 0, 3))).is_none());

        editor.focus().schedule_unfocus(1000);
        timer.fire_all();
        assert!(editor.invoke("b", Some(&buffer("abc", 0, 3))).is_none());
    }
}
