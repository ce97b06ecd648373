//! Read-only view over an externally parsed DOM
//!
//! The engine only navigates the tree; it never owns or mutates nodes. Any
//! HTML parser can be plugged in by implementing [`DomNode`] for its element
//! handle. An implementation for `scraper::ElementRef` is provided.

use scraper::ElementRef;

/// A child of an element, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomChild<N> {
    Element(N),
    Text(String),
}

/// Element handle of a borrowed DOM tree
pub trait DomNode: Clone + PartialEq {
    /// Lowercase tag name
    fn tag_name(&self) -> &str;

    fn attribute(&self, name: &str) -> Option<&str>;

    fn parent_element(&self) -> Option<Self>;

    fn child_nodes(&self) -> Vec<DomChild<Self>>;

    /// Text of the direct text children only
    fn own_text(&self) -> String {
        let parts: Vec<String> = self
            .child_nodes()
            .into_iter()
            .filter_map(|child| match child {
                DomChild::Text(text) => Some(text),
                DomChild::Element(_) => None,
            })
            .collect();
        normalize_whitespace(&parts.join(" "))
    }

    /// Whitespace-normalized text of the whole subtree
    fn text_content(&self) -> String {
        let mut parts = Vec::new();
        collect_text(self, &mut parts);
        normalize_whitespace(&parts.join(" "))
    }

    /// Whether `self` encloses `other`; an element does not enclose itself
    fn is_ancestor_of(&self, other: &Self) -> bool {
        let mut current = other.parent_element();
        while let Some(node) = current {
            if node == *self {
                return true;
            }
            current = node.parent_element();
        }
        false
    }

    fn has_tag(&self, tag: &str) -> bool {
        self.tag_name().eq_ignore_ascii_case(tag)
    }

    /// `self` and every element below it, in document order
    fn descendants(&self) -> Vec<Self> {
        let mut out = Vec::new();
        collect_elements(self, &mut out);
        out
    }
}

fn collect_elements<N: DomNode>(node: &N, out: &mut Vec<N>) {
    out.push(node.clone());
    for child in node.child_nodes() {
        if let DomChild::Element(element) = child {
            collect_elements(&element, out);
        }
    }
}

fn collect_text<N: DomNode>(node: &N, parts: &mut Vec<String>) {
    for child in node.child_nodes() {
        match child {
            DomChild::Text(text) => parts.push(text),
            DomChild::Element(element) => {
                if !is_non_content_tag(element.tag_name()) {
                    collect_text(&element, parts);
                }
            }
        }
    }
}

/// Tags whose text is never page content
pub fn is_non_content_tag(tag: &str) -> bool {
    matches!(
        tag.to_ascii_lowercase().as_str(),
        "script" | "style" | "noscript" | "template" | "head" | "title"
    )
}

/// Collapse runs of whitespace (including non-breaking spaces) to one space
pub fn normalize_whitespace(text: &str) -> String {
    text.split(|c: char| c.is_whitespace() || c == '\u{a0}')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

impl DomNode for ElementRef<'_> {
    fn tag_name(&self) -> &str {
        self.value().name()
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.value().attr(name)
    }

    fn parent_element(&self) -> Option<Self> {
        self.parent().and_then(ElementRef::wrap)
    }

    fn child_nodes(&self) -> Vec<DomChild<Self>> {
        self.children()
            .filter_map(|child| {
                if let Some(element) = ElementRef::wrap(child) {
                    Some(DomChild::Element(element))
                } else {
                    child.value().as_text().map(|text| {
                        let text: &str = text;
                        DomChild::Text(text.to_string())
                    })
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn first<'a>(html: &'a Html, selector: &str) -> ElementRef<'a> {
        html.select(&Selector::parse(selector).unwrap()).next().unwrap()
    }

    #[test]
    fn test_own_text_excludes_nested_elements() {
        let html = Html::parse_fragment("<p>Ana <b>Ruiz</b> López</p>");
        let p = first(&html, "p");
        assert_eq!(p.own_text(), "Ana López");
        assert_eq!(p.text_content(), "Ana Ruiz López");
    }

    #[test]
    fn test_text_content_skips_scripts() {
        let html = Html::parse_fragment("<div>Luis<script>var x = 1;</script> Gómez</div>");
        assert_eq!(first(&html, "div").text_content(), "Luis Gómez");
    }

    #[test]
    fn test_ancestry() {
        let html = Html::parse_fragment("<div><ul><li><span>x</span></li></ul></div>");
        let div = first(&html, "div");
        let span = first(&html, "span");
        assert!(div.is_ancestor_of(&span));
        assert!(!span.is_ancestor_of(&div));
        assert!(!div.is_ancestor_of(&div));
        assert!(span.parent_element().unwrap().has_tag("LI"));
    }

    #[test]
    fn test_descendants_in_document_order() {
        let html = Html::parse_fragment("<ul><li><a>1</a></li><li>2</li></ul>");
        let tags: Vec<String> = first(&html, "ul")
            .descendants()
            .iter()
            .map(|e| e.tag_name().to_string())
            .collect();
        assert_eq!(tags, vec!["ul", "li", "a", "li"]);
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  Ana\u{a0}\u{a0}María\n\tRuiz "), "Ana María Ruiz");
    }
}
