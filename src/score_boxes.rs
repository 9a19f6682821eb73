// src/score_boxes.rs
use crate::error::ClientError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const PLACEHOLDER_SELECTOR: &str = ".textblank[name]";
pub const SCORE_BOX_CLASS: &str = "scorebox";
const SCORE_PREFIX: &str = "score_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreBoxOptions {
    pub read_only: bool,
}

/// The part of the lesson container that holds answer placeholders.
pub trait ScoreSurface {
    type Handle;

    /// Manual-answer placeholders with their `name`, in document order.
    fn placeholders(&self) -> Vec<(Self::Handle, String)>;

    /// Name of the score box directly following `placeholder`, if there is one.
    fn box_after(&self, placeholder: &Self::Handle) -> Option<String>;

    fn insert_box_after(
        &mut self,
        placeholder: &Self::Handle,
        attrs: &[(&'static str, String)],
    ) -> Result<(), ClientError>;

    /// Every score box with its `name`.
    fn boxes(&self) -> Vec<(Self::Handle, String)>;

    fn set_box(&mut self, score_box: &Self::Handle, value: &str, size: usize);

    fn remove_box(&mut self, score_box: Self::Handle);
}

pub fn score_box_name(placeholder: &str) -> String {
    format!("{}{}", SCORE_PREFIX, placeholder)
}

pub fn score_box_attributes(placeholder: &str, options: ScoreBoxOptions) -> Vec<(&'static str, String)> {
    let mut attrs = vec![
        ("type", "text".to_string()),
        ("size", "1".to_string()),
        ("class", SCORE_BOX_CLASS.to_string()),
        ("name", score_box_name(placeholder)),
    ];
    if options.read_only {
        attrs.push(("readonly", String::new()));
    }
    attrs
}

/// Value and width for the box named `box_name`; blank when `scores` has no entry.
pub fn score_display(box_name: &str, scores: &HashMap<String, f64>) -> (String, usize) {
    let score = box_name
        .strip_prefix(SCORE_PREFIX)
        .and_then(|placeholder| scores.get(placeholder));
    match score {
        Some(score) => {
            let value = score.to_string();
            let size = value.chars().count().max(1);
            (value, size)
        }
        None => (String::new(), 1),
    }
}

/// Insert one score input right after every placeholder that lacks one.
pub fn attach<S: ScoreSurface>(surface: &mut S, options: ScoreBoxOptions) -> usize {
    let mut inserted = 0;
    for (placeholder, name) in surface.placeholders() {
        let wanted = score_box_name(&name);
        if surface.box_after(&placeholder).as_deref() == Some(wanted.as_str()) {
            continue;
        }
        match surface.insert_box_after(&placeholder, &score_box_attributes(&name, options)) {
            Ok(()) => inserted += 1,
            Err(e) => log::warn!("Could not add score box for {}: {}", name, e),
        }
    }
    inserted
}

/// Set each score box from `scores` (keyed by placeholder name); others are blanked.
pub fn update<S: ScoreSurface>(surface: &mut S, scores: &HashMap<String, f64>) {
    for (score_box, name) in surface.boxes() {
        let (value, size) = score_display(&name, scores);
        surface.set_box(&score_box, &value, size);
    }
}

pub fn clear<S: ScoreSurface>(surface: &mut S) {
    for (score_box, _) in surface.boxes() {
        surface.remove_box(score_box);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Item {
        Placeholder(&'static str),
        Score {
            attrs: Vec<(&'static str, String)>,
            value: String,
            size: usize,
        },
    }

    /// Lesson container stand-in; handles are stable ids, as DOM nodes are.
    #[derive(Default)]
    struct FakeSurface {
        items: Vec<(usize, Item)>,
        next_id: usize,
    }

    impl FakeSurface {
        fn with_placeholders(names: &[&'static str]) -> Self {
            let mut surface = Self::default();
            for &name in names {
                surface.push(Item::Placeholder(name));
            }
            surface
        }

        fn push(&mut self, item: Item) {
            self.items.push((self.next_id, item));
            self.next_id += 1;
        }

        fn position(&self, handle: usize) -> Option<usize> {
            self.items.iter().position(|(id, _)| *id == handle)
        }

        fn attr(attrs: &[(&'static str, String)], name: &str) -> Option<String> {
            attrs
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.clone())
        }

        fn score_boxes(&self) -> Vec<(Vec<(&'static str, String)>, String, usize)> {
            self.items
                .iter()
                .filter_map(|(_, item)| match item {
                    Item::Score { attrs, value, size } => Some((attrs.clone(), value.clone(), *size)),
                    _ => None,
                })
                .collect()
        }
    }

    impl ScoreSurface for FakeSurface {
        type Handle = usize;

        fn placeholders(&self) -> Vec<(usize, String)> {
            self.items
                .iter()
                .filter_map(|(id, item)| match item {
                    Item::Placeholder(name) => Some((*id, name.to_string())),
                    _ => None,
                })
                .collect()
        }

        fn box_after(&self, placeholder: &usize) -> Option<String> {
            let index = self.position(*placeholder)?;
            match &self.items.get(index + 1)?.1 {
                Item::Score { attrs, .. } => Self::attr(attrs, "name"),
                _ => None,
            }
        }

        fn insert_box_after(
            &mut self,
            placeholder: &usize,
            attrs: &[(&'static str, String)],
        ) -> Result<(), ClientError> {
            let index = self
                .position(*placeholder)
                .ok_or_else(|| ClientError::MissingElement(placeholder.to_string()))?;
            let item = Item::Score {
                attrs: attrs.to_vec(),
                value: String::new(),
                size: 1,
            };
            self.items.insert(index + 1, (self.next_id, item));
            self.next_id += 1;
            Ok(())
        }

        fn boxes(&self) -> Vec<(usize, String)> {
            self.items
                .iter()
                .filter_map(|(id, item)| match item {
                    Item::Score { attrs, .. } => Some((*id, Self::attr(attrs, "name")?)),
                    _ => None,
                })
                .collect()
        }

        fn set_box(&mut self, score_box: &usize, new_value: &str, new_size: usize) {
            let Some(index) = self.position(*score_box) else { return };
            if let Item::Score { value, size, .. } = &mut self.items[index].1 {
                *value = new_value.to_string();
                *size = new_size;
            }
        }

        fn remove_box(&mut self, score_box: usize) {
            self.items.retain(|(id, _)| *id != score_box);
        }
    }

    #[test]
    fn test_attach_inserts_after_each_placeholder() {
        let mut surface = FakeSurface::with_placeholders(&["q1", "q2"]);
        assert_eq!(attach(&mut surface, ScoreBoxOptions::default()), 2);

        let order: Vec<String> = surface
            .items
            .iter()
            .map(|(_, item)| match item {
                Item::Placeholder(name) => name.to_string(),
                Item::Score { attrs, .. } => FakeSurface::attr(attrs, "name").unwrap_or_default(),
            })
            .collect();
        assert_eq!(order, vec!["q1", "score_q1", "q2", "score_q2"]);

        let (attrs, _, _) = &surface.score_boxes()[0];
        assert_eq!(FakeSurface::attr(attrs, "type").as_deref(), Some("text"));
        assert_eq!(FakeSurface::attr(attrs, "size").as_deref(), Some("1"));
        assert_eq!(FakeSurface::attr(attrs, "class").as_deref(), Some("scorebox"));
        assert_eq!(FakeSurface::attr(attrs, "readonly"), None);
    }

    #[test]
    fn test_attach_is_idempotent_and_honours_read_only() {
        let options = ScoreBoxOptions { read_only: true };
        let mut surface = FakeSurface::with_placeholders(&["q1", "q2"]);
        attach(&mut surface, options);
        assert_eq!(attach(&mut surface, options), 0);

        let boxes = surface.score_boxes();
        assert_eq!(boxes.len(), 2);
        assert!(boxes
            .iter()
            .all(|(attrs, _, _)| FakeSurface::attr(attrs, "readonly").as_deref() == Some("")));
    }

    #[test]
    fn test_update_sets_known_and_blanks_unknown() {
        let mut surface = FakeSurface::with_placeholders(&["q1", "q2"]);
        attach(&mut surface, ScoreBoxOptions::default());
        update(&mut surface, &HashMap::from([("q2".to_string(), 3.5)]));
        update(&mut surface, &HashMap::from([("q1".to_string(), 7.0)]));

        let values: Vec<(String, usize)> = surface
            .score_boxes()
            .into_iter()
            .map(|(_, value, size)| (value, size))
            .collect();
        assert_eq!(values, vec![("7".to_string(), 1), (String::new(), 1)]);
    }

    #[test]
    fn test_display_sizes_to_value_length() {
        let scores = HashMap::from([("q1".to_string(), 12.25)]);
        assert_eq!(score_display("score_q1", &scores), ("12.25".to_string(), 5));
        assert_eq!(score_display("score_q9", &scores), (String::new(), 1));
        assert_eq!(score_display("q1", &scores), (String::new(), 1));
    }

    #[test]
    fn test_clear_removes_all_boxes() {
        let mut surface = FakeSurface::with_placeholders(&["q1", "q2"]);
        attach(&mut surface, ScoreBoxOptions::default());
        clear(&mut surface);
        clear(&mut surface);

        assert!(surface.boxes().is_empty());
        assert_eq!(surface.placeholders().len(), 2);
        assert_eq!(surface.items.len(), 2);
    }
}
