use serde::{Deserialize, Serialize};
use std::fmt;

/// Structural element that encloses a name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    /// `<tr>`
    Row,
    /// `<li>` of an unordered list
    List,
    /// `<li>` of an `<ol>`
    OrderedList,
    /// `<p>`
    Paragraph,
    /// `<div>`
    Division,
}

impl ContainerKind {
    pub const ALL: [Self; 5] = [
        Self::Row,
        Self::List,
        Self::OrderedList,
        Self::Paragraph,
        Self::Division,
    ];
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Row => "row",
            Self::List => "list",
            Self::OrderedList => "ordered_list",
            Self::Paragraph => "paragraph",
            Self::Division => "division",
        };
        f.write_str(label)
    }
}

/// Verdict on the shape of a directory page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PageClassification {
    /// One person per container
    Structured,
    /// Several people share containers
    Unstructured,
    Undetermined,
}

/// Whether names on the page come with their own contact links
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PageContactType {
    HasAssociatedContactInfo,
    NoAssociatedContactInfo,
}
