//! A small, owned, XML-library-agnostic element tree.
//!
//! The core modules (extractor, serializer, translators) only ever see
//! [`Element`]. Nothing outside [`crate::xml_io`] is allowed to know that
//! the underlying wire format is XML.

/// One node of the tree. Attribute order is preserved since L5X consumers
/// sometimes care about it even though this crate does not guarantee
/// byte-identical round-trips (see SPEC_FULL §4.6).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    pub text: Option<String>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            text: None,
        }
    }

    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut e = Self::new(name);
        e.text = Some(text.into());
        e
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn push_child(&mut self, child: Element) {
        self.children.push(child);
    }

    pub fn get_attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Direct children whose name matches, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// First direct child whose name matches.
    pub fn child_named(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Recursive search for all descendants with the given name (document order).
    pub fn find_all<'a>(&'a self, name: &'a str) -> Vec<&'a Element> {
        let mut out = Vec::new();
        self.find_all_into(name, &mut out);
        out
    }

    fn find_all_into<'a>(&'a self, name: &str, out: &mut Vec<&'a Element>) {
        for c in &self.children {
            if c.name == name {
                out.push(c);
            }
            c.find_all_into(name, out);
        }
    }

    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_roundtrips_attrs_and_children() {
        let el = Element::new("Tag")
            .attr("Name", "Foo")
            .attr("DataType", "DINT")
            .child(Element::with_text("Data", "0"));
        assert_eq!(el.get_attr("Name"), Some("Foo"));
        assert_eq!(el.child_named("Data").unwrap().text_or_empty(), "0");
    }

    #[test]
    fn find_all_is_recursive_and_ordered() {
        let el = Element::new("Root")
            .child(Element::new("Tags").child(Element::new("Tag").attr("Name", "A")))
            .child(Element::new("Tags").child(Element::new("Tag").attr("Name", "B")));
        let tags = el.find_all("Tag");
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].get_attr("Name"), Some("A"));
        assert_eq!(tags[1].get_attr("Name"), Some("B"));
    }
}
