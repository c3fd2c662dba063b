//! Output backends
//!
//! Wrappers describe their output through the [`Emitter`] trait. What a
//! container is (an element, a group in a path builder, a line of text) is
//! up to the backend.

use std::collections::BTreeMap;

/// A backend that builds output for a layout pass
pub trait Emitter {
    /// Handle to an output node
    type Node: Clone;

    /// Create a detached container for a node of the given kind
    fn create_container(&mut self, kind: &str) -> Self::Node;

    /// Create a detached text node
    fn create_text(&mut self, text: &str) -> Self::Node;

    /// Append `child` to `parent`
    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node);

    /// Set one style property
    fn set_style(&mut self, node: &Self::Node, name: &str, value: &str);

    /// Set an attribute (replacing any previous value)
    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str);

    /// Whether an attribute is already set
    fn has_attribute(&self, node: &Self::Node, name: &str) -> bool;

    /// Add one or more space-separated classes
    fn add_class(&mut self, node: &Self::Node, class: &str);

    /// Create a container and append it to `parent`
    fn append_container(&mut self, parent: &Self::Node, kind: &str) -> Self::Node {
        let node = self.create_container(kind);
        self.append_child(parent, &node);
        node
    }
}

/// Handle to a node of a [`MarkupEmitter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkupHandle(usize);

/// An element built by a [`MarkupEmitter`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkupElement {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub styles: Vec<(String, String)>,
    pub classes: Vec<String>,
    pub children: Vec<MarkupHandle>,
}

impl MarkupElement {
    pub fn style(&self, name: &str) -> Option<&str> {
        self.styles
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum MarkupNode {
    Element(MarkupElement),
    Text(String),
}

/// Builds an in-memory element tree and serializes it as markup.
///
/// Container kinds become tag names with a prefix (`mx-mi`, `mx-over`, ...).
/// The `style` attribute and `set_style` share one property list.
#[derive(Debug, Clone)]
pub struct MarkupEmitter {
    prefix: String,
    nodes: Vec<MarkupNode>,
}

impl Default for MarkupEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkupEmitter {
    pub fn new() -> Self {
        Self::with_prefix("mx-")
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            nodes: Vec::new(),
        }
    }

    /// The element behind a handle (None for text nodes)
    pub fn element(&self, node: MarkupHandle) -> Option<&MarkupElement> {
        match self.nodes.get(node.0) {
            Some(MarkupNode::Element(element)) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, node: MarkupHandle) -> Option<&mut MarkupElement> {
        match self.nodes.get_mut(node.0) {
            Some(MarkupNode::Element(element)) => Some(element),
            _ => None,
        }
    }

    /// Text of a text node
    pub fn text(&self, node: MarkupHandle) -> Option<&str> {
        match self.nodes.get(node.0) {
            Some(MarkupNode::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Concatenated text below a node
    pub fn text_content(&self, node: MarkupHandle) -> String {
        match self.nodes.get(node.0) {
            Some(MarkupNode::Text(text)) => text.clone(),
            Some(MarkupNode::Element(element)) => element
                .children
                .iter()
                .map(|child| self.text_content(*child))
                .collect(),
            None => String::new(),
        }
    }

    /// Pre-order search for elements with the given (unprefixed) kind
    pub fn find_all(&self, root: MarkupHandle, kind: &str) -> Vec<MarkupHandle> {
        let tag = format!("{}{}", self.prefix, kind);
        let mut found = Vec::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if let Some(element) = self.element(node) {
                if element.tag == tag {
                    found.push(node);
                }
                stack.extend(element.children.iter().rev().copied());
            }
        }
        found
    }

    /// Serialize a node and its descendants
    pub fn to_markup(&self, node: MarkupHandle) -> String {
        let mut out = String::new();
        self.write_node(node, &mut out);
        out
    }

    fn write_node(&self, node: MarkupHandle, out: &mut String) {
        match self.nodes.get(node.0) {
            Some(MarkupNode::Text(text)) => out.push_str(&escape(text)),
            Some(MarkupNode::Element(element)) => {
                out.push('<');
                out.push_str(&element.tag);
                if !element.classes.is_empty() {
                    out.push_str(&format!(" class=\"{}\"", escape(&element.classes.join(" "))));
                }
                for (name, value) in &element.attributes {
                    out.push_str(&format!(" {}=\"{}\"", name, escape(value)));
                }
                if !element.styles.is_empty() {
                    let css = element
                        .styles
                        .iter()
                        .map(|(key, value)| format!("{key}: {value};"))
                        .collect::<Vec<_>>()
                        .join(" ");
                    out.push_str(&format!(" style=\"{}\"", escape(&css)));
                }
                out.push('>');
                for child in &element.children {
                    self.write_node(*child, out);
                }
                out.push_str(&format!("</{}>", element.tag));
            }
            None => {}
        }
    }

    fn push(&mut self, node: MarkupNode) -> MarkupHandle {
        self.nodes.push(node);
        MarkupHandle(self.nodes.len() - 1)
    }
}

impl Emitter for MarkupEmitter {
    type Node = MarkupHandle;

    fn create_container(&mut self, kind: &str) -> MarkupHandle {
        let tag = format!("{}{}", self.prefix, kind);
        self.push(MarkupNode::Element(MarkupElement {
            tag,
            ..MarkupElement::default()
        }))
    }

    fn create_text(&mut self, text: &str) -> MarkupHandle {
        self.push(MarkupNode::Text(text.to_string()))
    }

    fn append_child(&mut self, parent: &MarkupHandle, child: &MarkupHandle) {
        if let Some(element) = self.element_mut(*parent) {
            element.children.push(*child);
        }
    }

    fn set_style(&mut self, node: &MarkupHandle, name: &str, value: &str) {
        if let Some(element) = self.element_mut(*node) {
            match element.styles.iter_mut().find(|(key, _)| key == name) {
                Some(entry) => entry.1 = value.to_string(),
                None => element.styles.push((name.to_string(), value.to_string())),
            }
        }
    }

    fn set_attribute(&mut self, node: &MarkupHandle, name: &str, value: &str) {
        if name == "style" {
            for (key, value) in crate::Styles::parse(value).iter() {
                self.set_style(node, key, value);
            }
            return;
        }
        if let Some(element) = self.element_mut(*node) {
            element.attributes.insert(name.to_string(), value.to_string());
        }
    }

    fn has_attribute(&self, node: &MarkupHandle, name: &str) -> bool {
        self.element(*node)
            .map(|element| {
                element.attributes.contains_key(name)
                    || (name == "style" && !element.styles.is_empty())
                    || (name == "class" && !element.classes.is_empty())
            })
            .unwrap_or(false)
    }

    fn add_class(&mut self, node: &MarkupHandle, class: &str) {
        if let Some(element) = self.element_mut(*node) {
            for name in class.split_whitespace() {
                if !element.classes.iter().any(|c| c == name) {
                    element.classes.push(name.to_string());
                }
            }
        }
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markup_serialization() {
        let mut emitter = MarkupEmitter::new();
        let root = emitter.create_container("math");
        let mi = emitter.append_container(&root, "mi");
        emitter.add_class(&mi, "mx-italic mx-bold");
        emitter.set_style(&mi, "font-size", "70.7%");
        let text = emitter.create_text("x<y");
        emitter.append_child(&mi, &text);
        emitter.set_attribute(&root, "data-semantic-id", "0");

        assert_eq!(
            emitter.to_markup(root),
            "<mx-math data-semantic-id=\"0\"><mx-mi class=\"mx-italic mx-bold\" \
             style=\"font-size: 70.7%;\">x&lt;y</mx-mi></mx-math>"
        );
    }

    #[test]
    fn test_style_attribute_merges_with_styles() {
        let mut emitter = MarkupEmitter::new();
        let node = emitter.create_container("mrow");
        emitter.set_attribute(&node, "style", "color: red; border: none");
        emitter.set_style(&node, "color", "blue");
        let element = emitter.element(node).unwrap();
        assert_eq!(element.style("color"), Some("blue"));
        assert_eq!(element.style("border"), Some("none"));
        assert!(emitter.has_attribute(&node, "style"));
    }

    #[test]
    fn test_find_all_and_text_content() {
        let mut emitter = MarkupEmitter::with_prefix("");
        let root = emitter.create_container("mrow");
        for text in ["a", "b"] {
            let mi = emitter.append_container(&root, "mi");
            let leaf = emitter.create_text(text);
            emitter.append_child(&mi, &leaf);
        }
        assert_eq!(emitter.find_all(root, "mi").len(), 2);
        assert_eq!(emitter.text_content(root), "ab");
    }
}
