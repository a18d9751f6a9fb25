// Document port - the rendered page the controllers bind to by element id
use crate::domain::plant::ImageUpload;
use serde::Serialize;
use std::collections::BTreeMap;

/// A detached element built by a controller and inserted into a container
/// (alert banners, table rows, list items).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Node {
    pub tag: String,
    pub classes: Vec<String>,
    pub text: String,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    pub fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = self.text.clone();
        for child in &self.children {
            out.push_str(&child.text_content());
        }
        out
    }
}

/// Centered placeholder text painted directly on a chart canvas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanvasMessage {
    pub text: String,
    pub color: &'static str,
}

impl CanvasMessage {
    pub const MUTED: &'static str = "#6c757d";
    pub const DANGER: &'static str = "#dc3545";

    pub fn muted(text: &str) -> Self {
        Self {
            text: text.to_string(),
            color: Self::MUTED,
        }
    }

    pub fn failure(text: &str) -> Self {
        Self {
            text: text.to_string(),
            color: Self::DANGER,
        }
    }
}

/// Element-level operations on the page. Every operation addressed to an
/// id that does not resolve is a no-op (or `None`/`false` for queries).
pub trait Document: Send + Sync {
    fn exists(&self, id: &str) -> bool;

    fn text(&self, id: &str) -> Option<String>;
    fn set_text(&self, id: &str, text: &str);

    fn has_class(&self, id: &str, class: &str) -> bool;
    fn add_class(&self, id: &str, class: &str);
    fn remove_class(&self, id: &str, class: &str);

    fn attribute(&self, id: &str, name: &str) -> Option<String>;
    fn set_attribute(&self, id: &str, name: &str, value: &str);

    /// Form control value.
    fn value(&self, id: &str) -> Option<String>;
    fn set_value(&self, id: &str, value: &str);
    fn is_checked(&self, id: &str) -> bool;
    fn set_checked(&self, id: &str, checked: bool);
    fn set_disabled(&self, id: &str, disabled: bool);

    /// `style.display`: whether the element takes part in layout.
    fn set_displayed(&self, id: &str, displayed: bool);
    /// `style.visibility`: whether the element is painted.
    fn set_visible(&self, id: &str, visible: bool);

    fn children(&self, id: &str) -> Vec<Node>;
    fn replace_children(&self, id: &str, children: Vec<Node>);
    fn append_child(&self, id: &str, child: Node);

    /// Ids of all elements whose id starts with `prefix`, in document order.
    fn ids_with_prefix(&self, prefix: &str) -> Vec<String>;

    /// Clears the canvas and paints a centered message.
    fn draw_canvas_message(&self, canvas_id: &str, message: &CanvasMessage);

    fn selected_file(&self, input_id: &str) -> Option<ImageUpload>;

    /// Blocking yes/no confirmation.
    fn confirm(&self, message: &str) -> bool;
}

/// Shows or hides a Bootstrap-style loader/element through the `d-none`
/// utility class.
pub fn set_shown(document: &dyn Document, id: &str, shown: bool) {
    if shown {
        document.remove_class(id, "d-none");
    } else {
        document.add_class(id, "d-none");
    }
}

/// Moves the `active` class to `target` within `group`.
pub fn activate_exclusive(document: &dyn Document, group: &[String], target: &str) {
    for id in group {
        if id != target && document.has_class(id, "active") {
            document.remove_class(id, "active");
        }
    }
    if !document.has_class(target, "active") {
        document.add_class(target, "active");
    }
}

/// Title-cases a snake_case backend token ("fast_growth" -> "Fast Growth").
pub fn humanize(token: &str) -> String {
    token
        .replace('_', " ")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
