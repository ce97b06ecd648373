//! Document flattener
//!
//! Walks the DOM last-child-first in post-order and keeps the two kinds of
//! leaves the heuristics care about: non-blank text and elements whose
//! `href` carries an e-mail address. The walk runs backwards so that the
//! bottom-up scans of the record parsers see "the name just before this
//! e-mail" naturally; the stored sequence is kept in document order and can
//! be traversed either way as often as needed.

use once_cell::sync::Lazy;
use regex::Regex;

use super::dom::{DomChild, DomNode, is_non_content_tag, normalize_whitespace};

/// An e-mail address anywhere in a string
pub static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid e-mail regex")
});

/// An e-mail address at the very start of a string
static LEADING_EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid e-mail regex")
});

/// The e-mail address a string starts with, if any
pub fn leading_email(text: &str) -> Option<&str> {
    LEADING_EMAIL_PATTERN
        .find(text.trim_start())
        .map(|m| m.as_str().trim_end_matches('.'))
}

/// The e-mail address of a `mailto:` href, without query parameters
pub fn mailto_address(href: &str) -> Option<&str> {
    let href = href.trim();
    let scheme = href.get(..7)?;
    if !scheme.eq_ignore_ascii_case("mailto:") {
        return None;
    }
    let target = href[7..].split('?').next().unwrap_or_default();
    EMAIL_PATTERN
        .find(target)
        .map(|m| m.as_str().trim_end_matches('.'))
}

/// Addresses compare case-insensitively
pub fn same_address(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// A leaf surfaced by the flattener
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Leaf<N> {
    /// Normalized text of one text node, with the element holding it
    Text { parent: N, text: String },
    /// Element whose `href` carries an e-mail address
    EmailLink { element: N, address: String },
}

impl<N> Leaf<N> {
    /// Element the leaf belongs to
    pub const fn element(&self) -> &N {
        match self {
            Self::Text { parent, .. } => parent,
            Self::EmailLink { element, .. } => element,
        }
    }

    /// E-mail carried by the leaf, either as link target or as leading text
    pub fn email(&self) -> Option<&str> {
        match self {
            Self::Text { text, .. } => leading_email(text),
            Self::EmailLink { address, .. } => Some(address),
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text { text, .. } => Some(text),
            Self::EmailLink { .. } => None,
        }
    }
}

/// Flattened leaves of one subtree, in document order
#[derive(Debug, Clone)]
pub struct FlatDocument<N> {
    leaves: Vec<Leaf<N>>,
}

impl<N: DomNode> FlatDocument<N> {
    /// Every node is visited once, so each leaf appears exactly once even
    /// when two text nodes of one element carry the same text
    pub fn flatten(root: &N) -> Self {
        let mut leaves = Vec::new();
        walk_reverse(root, &mut leaves);
        leaves.reverse();
        Self { leaves }
    }

    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// First to last
    pub fn iter(&self) -> std::slice::Iter<'_, Leaf<N>> {
        self.leaves.iter()
    }

    /// Last to first
    pub fn iter_rev(&self) -> std::iter::Rev<std::slice::Iter<'_, Leaf<N>>> {
        self.leaves.iter().rev()
    }

    /// Text leaves only, first to last
    pub fn texts(&self) -> impl Iterator<Item = (&N, &str)> {
        self.leaves.iter().filter_map(|leaf| match leaf {
            Leaf::Text { parent, text } => Some((parent, text.as_str())),
            Leaf::EmailLink { .. } => None,
        })
    }
}

/// Post-order, last child first; emits leaves in reverse document order
fn walk_reverse<N: DomNode>(node: &N, out: &mut Vec<Leaf<N>>) {
    if is_non_content_tag(node.tag_name()) {
        return;
    }

    for child in node.child_nodes().into_iter().rev() {
        match child {
            DomChild::Element(element) => walk_reverse(&element, out),
            DomChild::Text(text) => {
                let text = normalize_whitespace(&text);
                if !text.is_empty() {
                    out.push(Leaf::Text {
                        parent: node.clone(),
                        text,
                    });
                }
            }
        }
    }

    if let Some(address) = node.attribute("href").and_then(mailto_or_plain_email) {
        out.push(Leaf::EmailLink {
            element: node.clone(),
            address,
        });
    }
}

/// Hrefs such as `mailto:a@b.org` or a bare `a@b.org`
fn mailto_or_plain_email(href: &str) -> Option<String> {
    mailto_address(href)
        .or_else(|| leading_email(href).filter(|email| email.len() == href.trim().len()))
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn texts(html: &Html) -> Vec<String> {
        FlatDocument::flatten(&html.root_element())
            .texts()
            .map(|(_, text)| text.to_string())
            .collect()
    }

    #[test]
    fn test_leaves_in_document_order() {
        let html = Html::parse_fragment(
            "<div><p>Ana Ruiz</p><p>Profesora <b>titular</b></p>\n  <p> </p></div>",
        );
        assert_eq!(texts(&html), vec!["Ana Ruiz", "Profesora", "titular"]);
    }

    #[test]
    fn test_repeated_text_in_one_element_is_kept() {
        let html = Html::parse_fragment("<p>Ana Ruiz<br>Profesora<br>Ana Ruiz</p>");
        assert_eq!(texts(&html), vec!["Ana Ruiz", "Profesora", "Ana Ruiz"]);
    }

    #[test]
    fn test_email_links_precede_their_text() {
        let html = Html::parse_fragment(
            r#"<p>Luis Gómez <a href="mailto:lgomez@uni.es?subject=Hola">escribir</a></p>"#,
        );
        let doc = FlatDocument::flatten(&html.root_element());
        let leaves: Vec<_> = doc.iter().collect();
        assert_eq!(leaves.len(), 3);
        assert_eq!(leaves[0].text(), Some("Luis Gómez"));
        assert_eq!(leaves[1].email(), Some("lgomez@uni.es"));
        assert_eq!(leaves[2].text(), Some("escribir"));

        let rev: Vec<_> = doc.iter_rev().filter_map(Leaf::text).collect();
        assert_eq!(rev, vec!["escribir", "Luis Gómez"]);
    }

    #[test]
    fn test_scripts_and_styles_are_skipped() {
        let html = Html::parse_fragment(
            "<div><style>p { color: red }</style><script>alert('x')</script>Eva Sanz</div>",
        );
        assert_eq!(texts(&html), vec!["Eva Sanz"]);
    }

    #[test]
    fn test_detail_links_are_not_email_leaves() {
        let html = Html::parse_fragment(r#"<a href="/staff/eva">Eva Sanz</a>"#);
        let doc = FlatDocument::flatten(&html.root_element());
        assert!(doc.iter().all(|leaf| matches!(leaf, Leaf::Text { .. })));
    }

    #[test]
    fn test_email_helpers() {
        assert_eq!(leading_email("  ana@uni.es (despacho 3)"), Some("ana@uni.es"));
        assert_eq!(leading_email("Correo: ana@uni.es"), None);
        assert_eq!(mailto_address("MAILTO:ana@uni.es?cc=b@uni.es"), Some("ana@uni.es"));
        assert_eq!(mailto_address("/staff/ana"), None);
        assert!(same_address("Ana@Uni.es", "ana@uni.es"));
    }
}
