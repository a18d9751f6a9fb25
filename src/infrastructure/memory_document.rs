// In-memory document - element tree keyed by id, used by the headless host and tests
use crate::application::document::{CanvasMessage, Document, Node};
use crate::domain::plant::ImageUpload;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, Serialize)]
pub struct Element {
    pub id: String,
    pub text: String,
    pub classes: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    pub value: String,
    pub checked: bool,
    pub disabled: bool,
    pub displayed: bool,
    pub visible: bool,
    pub children: Vec<Node>,
    pub canvas_message: Option<CanvasMessage>,
    #[serde(skip)]
    file: Option<ImageUpload>,
    /// Container whose inserted children created this element.
    #[serde(skip)]
    owner: Option<String>,
}

impl Element {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            text: String::new(),
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            value: String::new(),
            checked: false,
            disabled: false,
            displayed: true,
            visible: true,
            children: Vec::new(),
            canvas_message: None,
            file: None,
            owner: None,
        }
    }

    fn mounted(id: &str, node: &Node, owner: &str) -> Self {
        let mut element = Self::new(id);
        element.text = node.text.clone();
        element.classes = node.classes.clone();
        element.attributes = node.attributes.clone();
        element.children = node.children.clone();
        element.owner = Some(owner.to_string());
        element
    }
}

#[derive(Default)]
struct State {
    order: Vec<String>,
    elements: HashMap<String, Element>,
    writes: usize,
    confirm_answer: bool,
    confirmations: Vec<String>,
}

impl State {
    /// Inserted nodes carrying an `id` attribute become addressable.
    fn mount(&mut self, owner: &str, nodes: &[Node]) {
        for node in nodes {
            if let Some(id) = node.attributes.get("id") {
                if !self.elements.contains_key(id) {
                    self.order.push(id.clone());
                }
                self.elements.insert(id.clone(), Element::mounted(id, node, owner));
            }
            self.mount(owner, &node.children);
        }
    }

    fn unmount(&mut self, owner: &str) {
        let elements = &mut self.elements;
        elements.retain(|_, e| e.owner.as_deref() != Some(owner));
        self.order.retain(|id| elements.contains_key(id));
    }
}

/// Scaffolding methods (`add*`, `attach_file`) build the page and do not
/// count as writes. Every `Document` mutation on an existing element does.
#[derive(Default)]
pub struct MemoryDocument {
    state: Mutex<State>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn scaffold(&self, id: &str, f: impl FnOnce(&mut Element)) {
        let mut state = self.state();
        if !state.elements.contains_key(id) {
            state.order.push(id.to_string());
            state.elements.insert(id.to_string(), Element::new(id));
        }
        if let Some(element) = state.elements.get_mut(id) {
            f(element);
        }
    }

    /// Applies a mutation to an existing element and counts it.
    fn mutate(&self, id: &str, f: impl FnOnce(&mut Element)) {
        let mut state = self.state();
        if let Some(element) = state.elements.get_mut(id) {
            f(element);
            state.writes += 1;
        }
    }

    fn read<R>(&self, id: &str, f: impl FnOnce(&Element) -> R) -> Option<R> {
        self.state().elements.get(id).map(f)
    }

    pub fn add(&self, id: &str) {
        self.scaffold(id, |_| {});
    }

    pub fn add_with_text(&self, id: &str, text: &str) {
        self.scaffold(id, |e| e.text = text.to_string());
    }

    pub fn add_with_class(&self, id: &str, class: &str) {
        self.scaffold(id, |e| {
            if !e.classes.iter().any(|c| c == class) {
                e.classes.push(class.to_string());
            }
        });
    }

    pub fn add_input(&self, id: &str, value: &str) {
        self.scaffold(id, |e| e.value = value.to_string());
    }

    pub fn add_checkbox(&self, id: &str, checked: bool) {
        self.scaffold(id, |e| e.checked = checked);
    }

    pub fn add_attribute(&self, id: &str, name: &str, value: &str) {
        self.scaffold(id, |e| {
            e.attributes.insert(name.to_string(), value.to_string());
        });
    }

    /// Starts an element with `style.display = none`.
    pub fn add_hidden(&self, id: &str) {
        self.scaffold(id, |e| e.displayed = false);
    }

    pub fn attach_file(&self, input_id: &str, file: ImageUpload) {
        self.scaffold(input_id, |e| e.file = Some(file));
    }

    /// Answer given to every later `confirm` prompt.
    pub fn answer_confirm(&self, answer: bool) {
        self.state().confirm_answer = answer;
    }

    pub fn confirmations(&self) -> Vec<String> {
        self.state().confirmations.clone()
    }

    pub fn writes(&self) -> usize {
        self.state().writes
    }

    pub fn is_disabled(&self, id: &str) -> bool {
        self.read(id, |e| e.disabled).unwrap_or(false)
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.read(id, |e| e.visible).unwrap_or(false)
    }

    pub fn is_displayed(&self, id: &str) -> bool {
        self.read(id, |e| e.displayed).unwrap_or(false)
    }

    pub fn canvas_message(&self, canvas_id: &str) -> Option<CanvasMessage> {
        self.read(canvas_id, |e| e.canvas_message.clone()).flatten()
    }

    pub fn element(&self, id: &str) -> Option<Element> {
        self.read(id, Element::clone)
    }

    /// Every element in document order.
    pub fn elements(&self) -> Vec<Element> {
        let state = self.state();
        state
            .order
            .iter()
            .filter_map(|id| state.elements.get(id).cloned())
            .collect()
    }
}

impl Document for MemoryDocument {
    fn exists(&self, id: &str) -> bool {
        self.state().elements.contains_key(id)
    }

    fn text(&self, id: &str) -> Option<String> {
        self.read(id, |e| e.text.clone())
    }

    fn set_text(&self, id: &str, text: &str) {
        self.mutate(id, |e| e.text = text.to_string());
    }

    fn has_class(&self, id: &str, class: &str) -> bool {
        self.read(id, |e| e.classes.iter().any(|c| c == class))
            .unwrap_or(false)
    }

    fn add_class(&self, id: &str, class: &str) {
        self.mutate(id, |e| {
            if !e.classes.iter().any(|c| c == class) {
                e.classes.push(class.to_string());
            }
        });
    }

    fn remove_class(&self, id: &str, class: &str) {
        self.mutate(id, |e| e.classes.retain(|c| c != class));
    }

    fn attribute(&self, id: &str, name: &str) -> Option<String> {
        self.read(id, |e| {
            if name == "class" {
                Some(e.classes.join(" "))
            } else {
                e.attributes.get(name).cloned()
            }
        })
        .flatten()
    }

    fn set_attribute(&self, id: &str, name: &str, value: &str) {
        self.mutate(id, |e| {
            if name == "class" {
                e.classes = value.split_whitespace().map(str::to_string).collect();
            } else {
                e.attributes.insert(name.to_string(), value.to_string());
            }
        });
    }

    fn value(&self, id: &str) -> Option<String> {
        self.read(id, |e| e.value.clone())
    }

    fn set_value(&self, id: &str, value: &str) {
        self.mutate(id, |e| e.value = value.to_string());
    }

    fn is_checked(&self, id: &str) -> bool {
        self.read(id, |e| e.checked).unwrap_or(false)
    }

    fn set_checked(&self, id: &str, checked: bool) {
        self.mutate(id, |e| e.checked = checked);
    }

    fn set_disabled(&self, id: &str, disabled: bool) {
        self.mutate(id, |e| e.disabled = disabled);
    }

    fn set_displayed(&self, id: &str, displayed: bool) {
        self.mutate(id, |e| e.displayed = displayed);
    }

    fn set_visible(&self, id: &str, visible: bool) {
        self.mutate(id, |e| e.visible = visible);
    }

    fn children(&self, id: &str) -> Vec<Node> {
        self.read(id, |e| e.children.clone()).unwrap_or_default()
    }

    fn replace_children(&self, id: &str, children: Vec<Node>) {
        let mut state = self.state();
        if !state.elements.contains_key(id) {
            return;
        }
        state.unmount(id);
        state.mount(id, &children);
        if let Some(element) = state.elements.get_mut(id) {
            element.children = children;
            state.writes += 1;
        }
    }

    fn append_child(&self, id: &str, child: Node) {
        let mut state = self.state();
        if !state.elements.contains_key(id) {
            return;
        }
        state.mount(id, std::slice::from_ref(&child));
        if let Some(element) = state.elements.get_mut(id) {
            element.children.push(child);
            state.writes += 1;
        }
    }

    fn ids_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.state()
            .order
            .iter()
            .filter(|id| id.starts_with(prefix))
            .cloned()
            .collect()
    }

    fn draw_canvas_message(&self, canvas_id: &str, message: &CanvasMessage) {
        self.mutate(canvas_id, |e| e.canvas_message = Some(message.clone()));
    }

    fn selected_file(&self, input_id: &str) -> Option<ImageUpload> {
        self.read(input_id, |e| e.file.clone()).flatten()
    }

    fn confirm(&self, message: &str) -> bool {
        let mut state = self.state();
        state.confirmations.push(message.to_string());
        state.confirm_answer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_ids_are_noops() {
        let document = MemoryDocument::new();
        document.set_text("nope", "x");
        document.add_class("nope", "active");
        assert_eq!(document.text("nope"), None);
        assert!(!document.has_class("nope", "active"));
        assert_eq!(document.writes(), 0);
    }

    #[test]
    fn test_scaffolding_is_not_counted() {
        let document = MemoryDocument::new();
        document.add_with_text("temp-d1", "--");
        document.add_with_class("device-card-d1", "card");
        assert_eq!(document.writes(), 0);

        document.set_text("temp-d1", "21.4");
        assert_eq!(document.writes(), 1);
    }

    #[test]
    fn test_class_attribute_mirrors_class_list() {
        let document = MemoryDocument::new();
        document.add_with_class("status-icon-d1", "bi");
        document.set_attribute("status-icon-d1", "class", "bi bi-wifi");
        assert!(document.has_class("status-icon-d1", "bi-wifi"));
        assert_eq!(
            document.attribute("status-icon-d1", "class").as_deref(),
            Some("bi bi-wifi")
        );
    }

    #[test]
    fn test_prefix_lookup_keeps_document_order() {
        let document = MemoryDocument::new();
        document.add("history-chart-b");
        document.add("chart-loader-b");
        document.add("history-chart-a");
        assert_eq!(
            document.ids_with_prefix("history-chart-"),
            vec!["history-chart-b", "history-chart-a"]
        );
    }

    #[test]
    fn test_inserted_nodes_with_ids_are_addressable() {
        let document = MemoryDocument::new();
        document.add("plant-list");
        document.replace_children(
            "plant-list",
            vec![Node::new("a").attr("id", "plant-item-p1").class("list-group-item").text("Ficus")],
        );
        assert!(document.exists("plant-item-p1"));
        document.add_class("plant-item-p1", "active");
        assert!(document.has_class("plant-item-p1", "active"));

        document.replace_children("plant-list", Vec::new());
        assert!(!document.exists("plant-item-p1"));
    }

    #[test]
    fn test_confirm_records_prompt() {
        let document = MemoryDocument::new();
        assert!(!document.confirm("Delete?"));
        document.answer_confirm(true);
        assert!(document.confirm("Really?"));
        assert_eq!(document.confirmations(), vec!["Delete?", "Really?"]);
    }
}
