//! In-memory XML element tree and its text serialization.
//!
//! The builder assembles an [`Element`] tree; [`Element::to_xml`] writes it
//! with 2-space indentation, attributes in insertion order, and text-only
//! elements kept on one line.

use indexmap::IndexMap;

/// An XML element with ordered attributes, optional text, and children.
///
/// Mixed content is not supported: an element carries either text or
/// children, never both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attrs: IndexMap<String, String>,
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Element with text content only.
    pub fn with_text(name: impl Into<String>, text: impl ToString) -> Self {
        Self {
            name: name.into(),
            text: Some(text.to_string()),
            ..Default::default()
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.attrs.insert(name.into(), value.to_string());
        self
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl ToString) {
        self.attrs.insert(name.into(), value.to_string());
    }

    /// Append `child` and return a handle to it for further nesting.
    pub fn push(&mut self, child: Element) -> &mut Element {
        let idx = self.children.len();
        self.children.push(child);
        &mut self.children[idx]
    }

    /// Append a text-only child element.
    pub fn push_text(&mut self, name: impl Into<String>, text: impl ToString) -> &mut Element {
        self.push(Element::with_text(name, text))
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// First direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All direct children with the given name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Serialize this element (without any prologue).
    pub fn to_xml(&self) -> String {
        let mut out = String::with_capacity(4096);
        write_element(&mut out, self, 0);
        out
    }
}

fn indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str("  ");
    }
}

fn write_element(out: &mut String, el: &Element, level: usize) {
    debug_assert!(
        el.text.is_none() || el.children.is_empty(),
        "<{}> has both text and children",
        el.name
    );
    indent(out, level);
    out.push('<');
    out.push_str(&el.name);
    for (name, value) in &el.attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&html_escape::encode_double_quoted_attribute(value));
        out.push('"');
    }

    match &el.text {
        Some(text) if !text.is_empty() => {
            out.push('>');
            out.push_str(&html_escape::encode_text(text));
            out.push_str(&format!("</{}>\n", el.name));
        }
        _ if el.children.is_empty() => out.push_str("/>\n"),
        _ => {
            out.push_str(">\n");
            for child in &el.children {
                write_element(out, child, level + 1);
            }
            indent(out, level);
            out.push_str(&format!("</{}>\n", el.name));
        }
    }
}
