use serde::{Deserialize, Serialize};
use std::fmt;

/// How a contact link was found relative to a name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContactLinkType {
    /// Element text starts with an e-mail address
    EmailInContent,
    /// `mailto:` href carrying an e-mail address
    EmailInHref,
    /// Any other href, assumed to lead to a personal page
    LinkToDetailPage,
    None,
}

impl ContactLinkType {
    /// Lower value wins when several link kinds share a scope
    pub const fn priority(self) -> u8 {
        match self {
            Self::EmailInContent | Self::EmailInHref => 0,
            Self::LinkToDetailPage => 1,
            Self::None => 2,
        }
    }

    pub const fn is_email(self) -> bool {
        matches!(self, Self::EmailInContent | Self::EmailInHref)
    }
}

impl fmt::Display for ContactLinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::EmailInContent => "EMAIL_IN_CONTENT",
            Self::EmailInHref => "EMAIL_IN_HREF",
            Self::LinkToDetailPage => "LINK_TO_DETAIL_PAGE",
            Self::None => "NONE",
        };
        f.write_str(label)
    }
}

/// A resolved association between a name and an address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactLink {
    pub link_type: ContactLinkType,
    pub address: String,
}

impl ContactLink {
    pub fn new(link_type: ContactLinkType, address: impl Into<String>) -> Self {
        Self {
            link_type,
            address: address.into(),
        }
    }

    pub fn none() -> Self {
        Self::new(ContactLinkType::None, String::new())
    }

    pub const fn is_none(&self) -> bool {
        matches!(self.link_type, ContactLinkType::None)
    }
}

/// Outcome of the contact lookup attached to every record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ContactOutcome {
    Found { link: ContactLink },
    NotFound,
    /// Several distinct addresses competed; left for manual review
    Ambiguous { addresses: Vec<String> },
}

impl ContactOutcome {
    /// The e-mail address, when one was found
    pub fn email(&self) -> Option<&str> {
        match self {
            Self::Found { link } if link.link_type.is_email() => Some(link.address.as_str()),
            _ => None,
        }
    }

    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }
}
