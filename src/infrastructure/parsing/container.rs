//! Container resolution and container histograms
//!
//! Every name candidate is attached to the nearest structurally meaningful
//! ancestor: a table row, a list item, a paragraph or a division. Candidates
//! sharing a container are grouped; the per-kind counts of those groups feed
//! the page classifier.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::dom::DomNode;
use super::name_detector::NameCandidate;
use crate::domain::ContainerKind;

/// A resolved structural container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container<N> {
    pub kind: ContainerKind,
    pub element: N,
}

/// Candidates sharing one scope element
///
/// `kind` is `None` for orphans: candidates with no row, list, paragraph or
/// division above them. Their scope is the element holding the text and they
/// do not take part in the histogram.
#[derive(Debug, Clone)]
pub struct ContainerGroup<N> {
    pub kind: Option<ContainerKind>,
    pub element: N,
    pub candidates: Vec<NameCandidate<N>>,
}

impl<N: DomNode> ContainerGroup<N> {
    pub fn text(&self) -> String {
        self.element.text_content()
    }
}

/// Map a block tag to its container kind
fn block_kind<N: DomNode>(element: &N) -> Option<ContainerKind> {
    match element.tag_name().to_ascii_lowercase().as_str() {
        "p" => Some(ContainerKind::Paragraph),
        "div" => Some(ContainerKind::Division),
        "li" => {
            let ordered = element.parent_element().is_some_and(|parent| parent.has_tag("ol"));
            Some(if ordered {
                ContainerKind::OrderedList
            } else {
                ContainerKind::List
            })
        }
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ContainerResolver;

impl ContainerResolver {
    pub const fn new() -> Self {
        Self
    }

    /// Nearest container of `node`, `node` itself included
    ///
    /// When both a row and a block are found and one encloses the other, the
    /// enclosing one wins; otherwise the row wins.
    pub fn resolve<N: DomNode>(&self, node: &N) -> Option<Container<N>> {
        let mut row: Option<N> = None;
        let mut block: Option<Container<N>> = None;
        let mut current = Some(node.clone());

        while let Some(element) = current {
            let tag = element.tag_name().to_ascii_lowercase();
            if matches!(tag.as_str(), "body" | "html") {
                break;
            }
            if row.is_none() && tag == "tr" {
                row = Some(element.clone());
            } else if block.is_none() {
                if let Some(kind) = block_kind(&element) {
                    block = Some(Container {
                        kind,
                        element: element.clone(),
                    });
                }
            }
            if row.is_some() && block.is_some() {
                break;
            }
            current = element.parent_element();
        }

        match (row, block) {
            (Some(row), Some(block)) => {
                if block.element.is_ancestor_of(&row) {
                    Some(block)
                } else {
                    Some(Container {
                        kind: ContainerKind::Row,
                        element: row,
                    })
                }
            }
            (Some(row), None) => Some(Container {
                kind: ContainerKind::Row,
                element: row,
            }),
            (None, block) => block,
        }
    }

    /// Group candidates by container, ordered by first appearance
    pub fn group<N: DomNode>(&self, candidates: Vec<NameCandidate<N>>) -> Vec<ContainerGroup<N>> {
        let mut groups: Vec<ContainerGroup<N>> = Vec::new();
        for candidate in candidates {
            let (kind, element) = match self.resolve(&candidate.node) {
                Some(container) => (Some(container.kind), container.element),
                None => (None, candidate.node.clone()),
            };
            match groups.iter_mut().find(|group| group.element == element) {
                Some(group) => group.candidates.push(candidate),
                None => groups.push(ContainerGroup {
                    kind,
                    element,
                    candidates: vec![candidate],
                }),
            }
        }
        debug!("Resolved {} container groups", groups.len());
        groups
    }
}

/// Per-kind counts of containers and of the names inside them
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerHistogram {
    pub rows: usize,
    pub lists: usize,
    pub ordered_lists: usize,
    pub paragraphs: usize,
    pub divisions: usize,
    pub names_in_rows: usize,
    pub names_in_lists: usize,
    pub names_in_ordered_lists: usize,
    pub names_in_paragraphs: usize,
    pub names_in_divisions: usize,
    /// Every candidate, orphans included
    pub total_names: usize,
}

impl ContainerHistogram {
    pub fn from_groups<N>(groups: &[ContainerGroup<N>]) -> Self {
        let mut histogram = Self::default();
        for group in groups {
            let names = group.candidates.len();
            histogram.total_names += names;
            let Some(kind) = group.kind else { continue };
            let (containers, names_in) = histogram.slots_mut(kind);
            *containers += 1;
            *names_in += names;
        }
        histogram
    }

    fn slots_mut(&mut self, kind: ContainerKind) -> (&mut usize, &mut usize) {
        match kind {
            ContainerKind::Row => (&mut self.rows, &mut self.names_in_rows),
            ContainerKind::List => (&mut self.lists, &mut self.names_in_lists),
            ContainerKind::OrderedList => (&mut self.ordered_lists, &mut self.names_in_ordered_lists),
            ContainerKind::Paragraph => (&mut self.paragraphs, &mut self.names_in_paragraphs),
            ContainerKind::Division => (&mut self.divisions, &mut self.names_in_divisions),
        }
    }

    /// Number of distinct containers of a kind
    pub const fn containers(&self, kind: ContainerKind) -> usize {
        match kind {
            ContainerKind::Row => self.rows,
            ContainerKind::List => self.lists,
            ContainerKind::OrderedList => self.ordered_lists,
            ContainerKind::Paragraph => self.paragraphs,
            ContainerKind::Division => self.divisions,
        }
    }

    pub const fn names_in(&self, kind: ContainerKind) -> usize {
        match kind {
            ContainerKind::Row => self.names_in_rows,
            ContainerKind::List => self.names_in_lists,
            ContainerKind::OrderedList => self.names_in_ordered_lists,
            ContainerKind::Paragraph => self.names_in_paragraphs,
            ContainerKind::Division => self.names_in_divisions,
        }
    }

    pub const fn names_outside(&self, kind: ContainerKind) -> usize {
        self.total_names.saturating_sub(self.names_in(kind))
    }

    /// Containers of a kind per name; 1.0 means one name per container
    pub fn names_per(&self, kind: ContainerKind) -> f64 {
        if self.total_names == 0 {
            return 0.0;
        }
        self.containers(kind) as f64 / self.total_names as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{ElementRef, Html, Selector};

    fn resolve_first<'a>(html: &'a Html, selector: &str) -> Option<Container<ElementRef<'a>>> {
        let node = html.select(&Selector::parse(selector).unwrap()).next().unwrap();
        ContainerResolver::new().resolve(&node)
    }

    #[test]
    fn test_row_beats_block_inside_cell() {
        let html = Html::parse_fragment("<table><tr><td><div><span>Ana</span></div></td></tr></table>");
        let container = resolve_first(&html, "span").unwrap();
        assert_eq!(container.kind, ContainerKind::Row);
        assert_eq!(container.element.tag_name(), "tr");
    }

    #[test]
    fn test_block_around_table_encloses_the_row() {
        let html = Html::parse_fragment("<div id=\"staff\"><table><tr><td>Ana</td></tr></table></div>");
        let container = resolve_first(&html, "td").unwrap();
        assert_eq!(container.kind, ContainerKind::Division);
        assert_eq!(container.element.tag_name(), "div");
    }

    #[test]
    fn test_ordered_list_items() {
        let html = Html::parse_fragment("<ol><li><table><tr><td><b>Ana Ruiz</b></td></tr></table></li></ol>");
        let container = resolve_first(&html, "b").unwrap();
        assert_eq!(container.kind, ContainerKind::OrderedList);
        assert_eq!(container.element.tag_name(), "li");

        let html = Html::parse_fragment("<ol><li><b>Ana</b></li></ol>");
        assert_eq!(resolve_first(&html, "b").unwrap().kind, ContainerKind::OrderedList);
    }

    #[test]
    fn test_rows_of_a_bare_table_stay_rows() {
        let html = Html::parse_document("<html><body><table><tr><td>Ana</td></tr></table></body></html>");
        assert_eq!(resolve_first(&html, "td").unwrap().kind, ContainerKind::Row);
    }

    #[test]
    fn test_candidate_is_its_own_container() {
        let html = Html::parse_fragment("<div><p>Ana Ruiz</p></div>");
        let container = resolve_first(&html, "p").unwrap();
        assert_eq!(container.kind, ContainerKind::Paragraph);
        assert_eq!(container.element.tag_name(), "p");
    }

    #[test]
    fn test_no_container_for_bare_text() {
        let html = Html::parse_fragment("<span>Ana</span>");
        assert!(resolve_first(&html, "span").is_none());
    }

    #[test]
    fn test_histogram_counts_distinct_containers() {
        let html = Html::parse_fragment("<ul><li><b>Ana</b> <i>Luis</i></li><li>Eva</li></ul><span>Sol</span>");
        let selector = Selector::parse("b, i, li, span").unwrap();
        let candidates: Vec<_> = html
            .select(&selector)
            .filter(|e| !e.own_text().is_empty())
            .map(|node| NameCandidate {
                text: node.own_text(),
                node,
            })
            .collect();
        assert_eq!(candidates.len(), 4);

        let groups = ContainerResolver::new().group(candidates);
        assert_eq!(groups.len(), 3);
        let histogram = ContainerHistogram::from_groups(&groups);
        assert_eq!(histogram.lists, 2);
        assert_eq!(histogram.names_in_lists, 3);
        assert_eq!(histogram.total_names, 4);
        assert_eq!(histogram.names_outside(ContainerKind::List), 1);
        assert!((histogram.names_per(ContainerKind::List) - 0.5).abs() < f64::EPSILON);
    }
}
