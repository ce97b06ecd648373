//! Lexicon-based detection of name-bearing text

use tracing::debug;

use super::dom::DomNode;
use super::flattener::FlatDocument;
use crate::domain::Lexicon;

/// A text span that may hold a person's name, with the element holding it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameCandidate<N> {
    pub node: N,
    pub text: String,
}

#[derive(Debug, Clone, Copy)]
pub struct NameDetector<'a> {
    lexicon: &'a Lexicon,
}

impl<'a> NameDetector<'a> {
    pub const fn new(lexicon: &'a Lexicon) -> Self {
        Self { lexicon }
    }

    /// True when any whitespace-separated token is a known first or last name
    pub fn is_name(&self, fragment: &str) -> bool {
        fragment
            .split_whitespace()
            .any(|token| self.lexicon.is_first_name(token) || self.lexicon.is_last_name(token))
    }

    /// Name-bearing text leaves of a flattened document, first to last
    pub fn candidates<N: DomNode>(&self, document: &FlatDocument<N>) -> Vec<NameCandidate<N>> {
        let candidates: Vec<NameCandidate<N>> = document
            .texts()
            .filter(|(_, text)| self.is_name(text))
            .map(|(node, text)| NameCandidate {
                node: node.clone(),
                text: text.to_string(),
            })
            .collect();
        debug!(
            "Detected {} name candidates among {} leaves",
            candidates.len(),
            document.len()
        );
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn lexicon() -> Lexicon {
        Lexicon::builder()
            .first_names(["Ana", "José"])
            .last_names(["Ruiz", "Núñez"])
            .general_words(["departamento", "de", "física"])
            .build()
            .unwrap()
    }

    #[test]
    fn test_is_name_matches_any_token() {
        let lexicon = lexicon();
        let detector = NameDetector::new(&lexicon);
        assert!(detector.is_name("Dr. JOSE Pérez"));
        assert!(detector.is_name("Laura Nunez"));
        assert!(!detector.is_name("Departamento de Física"));
        assert!(!detector.is_name(""));
    }

    #[test]
    fn test_no_candidates_without_names() {
        let lexicon = lexicon();
        let html = Html::parse_fragment("<ul><li>Departamento de Física</li><li>Secretaría</li></ul>");
        let doc = FlatDocument::flatten(&html.root_element());
        assert!(NameDetector::new(&lexicon).candidates(&doc).is_empty());
    }

    #[test]
    fn test_candidates_keep_their_element() {
        let lexicon = lexicon();
        let html = Html::parse_fragment("<table><tr><td>Ana Ruiz</td><td>Física</td></tr></table>");
        let doc = FlatDocument::flatten(&html.root_element());
        let candidates = NameDetector::new(&lexicon).candidates(&doc);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].text, "Ana Ruiz");
        assert_eq!(candidates[0].node.tag_name(), "td");
    }
}
