//! Contact link location
//!
//! Finds the e-mail address (or the personal page link) that belongs to a
//! name. The search starts at the name's container and climbs a bounded
//! number of ancestor levels while nothing is found. Several distinct
//! addresses in one scope are reported, never guessed between.

use scraper::Html;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use super::container::ContainerGroup;
use super::dom::DomNode;
use super::flattener::{FlatDocument, leading_email, mailto_address, same_address};
use crate::domain::{ContactLink, ContactLinkType, ContactOutcome, fold};
use crate::infrastructure::config::ExtractionConfig;
use crate::infrastructure::parsing_error::{ExtractionError, ExtractionResult};

/// Fetches the HTML of a personal detail page
///
/// Implementations must fail fast; retries, caching and timeouts belong to
/// the caller.
pub trait DetailPageResolver {
    fn resolve_detail_page(&self, url: &str) -> ExtractionResult<String>;
}

impl<F> DetailPageResolver for F
where
    F: Fn(&str) -> ExtractionResult<String>,
{
    fn resolve_detail_page(&self, url: &str) -> ExtractionResult<String> {
        self(url)
    }
}

/// Resolver for runs that must not leave the page
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDetailPages;

impl DetailPageResolver for NoDetailPages {
    fn resolve_detail_page(&self, url: &str) -> ExtractionResult<String> {
        Err(ExtractionError::detail_page_fetch_failed(
            url,
            "detail page resolution is disabled",
        ))
    }
}

/// A contact link candidate and the element carrying it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundLink<N> {
    pub element: N,
    pub link: ContactLink,
}

/// Aggregate association figures consumed by the page classifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationStats {
    pub total_names: usize,
    /// Elements in the whole page carrying an e-mail address
    pub total_email_elements: usize,
    /// Names whose container led to exactly one contact link
    pub associated: usize,
}

impl AssociationStats {
    pub fn ratio(&self) -> f64 {
        if self.total_names == 0 {
            0.0
        } else {
            self.associated as f64 / self.total_names as f64
        }
    }
}

#[derive(Debug, Clone)]
pub struct ContactLinkLocator {
    max_ancestor_levels: usize,
    base_url: Option<Url>,
}

impl ContactLinkLocator {
    pub const fn new(max_ancestor_levels: usize, base_url: Option<Url>) -> Self {
        Self {
            max_ancestor_levels,
            base_url,
        }
    }

    pub fn from_config(config: &ExtractionConfig) -> ExtractionResult<Self> {
        let base_url = config
            .base_url
            .as_deref()
            .map(|base| {
                Url::parse(base).map_err(|e| {
                    ExtractionError::configuration("base_url", format!("'{base}' is not a URL: {e}"))
                })
            })
            .transpose()?;
        Ok(Self::new(config.max_ancestor_levels, base_url))
    }

    /// Every contact link qualifying element in `scope`, `scope` included
    ///
    /// An element yields at most one link: a `mailto:` href first, then an
    /// own text starting with an address, then any other href.
    pub fn links_in<N: DomNode>(&self, scope: &N) -> Vec<FoundLink<N>> {
        scope
            .descendants()
            .into_iter()
            .filter_map(|element| {
                let link = Self::link_of(&element)?;
                Some(FoundLink { element, link })
            })
            .collect()
    }

    fn link_of<N: DomNode>(element: &N) -> Option<ContactLink> {
        let href = element.attribute("href").map(str::trim);
        if let Some(address) = href.and_then(mailto_address) {
            return Some(ContactLink::new(ContactLinkType::EmailInHref, address));
        }
        if let Some(address) = leading_email(&element.own_text()) {
            return Some(ContactLink::new(ContactLinkType::EmailInContent, address));
        }
        match href {
            Some(href) if !href.is_empty() && !href.starts_with('#') && !is_mailto(href) => Some(
                ContactLink::new(ContactLinkType::LinkToDetailPage, href.to_string()),
            ),
            _ => None,
        }
    }

    /// Number of e-mail carrying elements below `root`
    pub fn count_email_elements<N: DomNode>(&self, root: &N) -> usize {
        self.links_in(root)
            .iter()
            .filter(|found| found.link.link_type.is_email())
            .count()
    }

    /// Best contact link for a name whose container is `scope`
    ///
    /// `hint` is the name text; among several detail page links the one whose
    /// text contains it is preferred.
    pub fn locate<N: DomNode>(&self, scope: &N, hint: &str) -> ExtractionResult<ContactLink> {
        let mut current = Some(scope.clone());
        for level in 0..=self.max_ancestor_levels {
            let Some(element) = current else { break };
            if let Some(link) = self.select(&self.links_in(&element), hint)? {
                debug!("Contact link {} found {} level(s) above container", link.link_type, level);
                return Ok(link);
            }
            current = element.parent_element();
        }
        Err(ExtractionError::no_contact_link(&scope_label(scope)))
    }

    /// Like [`Self::locate`] but never leaves `scope`
    pub fn locate_within<N: DomNode>(&self, scope: &N, hint: &str) -> ExtractionResult<ContactLink> {
        self.select(&self.links_in(scope), hint)?
            .ok_or_else(|| ExtractionError::no_contact_link(&scope_label(scope)))
    }

    fn select<N: DomNode>(
        &self,
        links: &[FoundLink<N>],
        hint: &str,
    ) -> ExtractionResult<Option<ContactLink>> {
        let mut emails: Vec<&ContactLink> = Vec::new();
        for found in links.iter().filter(|found| found.link.link_type.is_email()) {
            if !emails.iter().any(|seen| same_address(&seen.address, &found.link.address)) {
                emails.push(&found.link);
            }
        }
        match emails.as_slice() {
            [single] => return Ok(Some((*single).clone())),
            [] => {}
            several => {
                return Err(ExtractionError::multiple_contact_links(
                    several[0].link_type,
                    several.iter().map(|link| link.address.clone()).collect(),
                ));
            }
        }

        let details: Vec<&FoundLink<N>> = links
            .iter()
            .filter(|found| found.link.link_type == ContactLinkType::LinkToDetailPage)
            .collect();
        let hint = fold(hint);
        let preferred = details
            .iter()
            .find(|found| {
                let text = fold(&found.element.text_content());
                !text.is_empty() && (text.contains(&hint) || hint.contains(&text))
            })
            .or_else(|| details.first());
        Ok(preferred.map(|found| found.link.clone()))
    }

    /// Follow a detail page link to the first e-mail on that page
    ///
    /// E-mail links are returned unchanged. `javascript:` links and fetch
    /// failures end as [`ExtractionError::NoContactLinkFound`].
    pub fn resolve<R>(&self, link: ContactLink, resolver: &R) -> ExtractionResult<ContactLink>
    where
        R: DetailPageResolver + ?Sized,
    {
        if link.link_type != ContactLinkType::LinkToDetailPage {
            return Ok(link);
        }
        if link.address.trim_start().to_ascii_lowercase().starts_with("javascript:") {
            return Err(ExtractionError::no_contact_link(&link.address));
        }

        let url = self.absolute_url(&link.address);
        let body = resolver.resolve_detail_page(&url).map_err(|e| {
            warn!("Detail page {} unavailable: {}", url, e);
            e.collapse_fetch_failure()
        })?;

        let document = Html::parse_document(&body);
        let flat = FlatDocument::flatten(&document.root_element());
        let found = flat.iter().find_map(|leaf| {
            let address = leaf.email()?;
            let link_type = if leaf.text().is_some() {
                ContactLinkType::EmailInContent
            } else {
                ContactLinkType::EmailInHref
            };
            Some(ContactLink::new(link_type, address))
        });
        found.ok_or_else(|| ExtractionError::no_contact_link(&url))
    }

    /// Locate, optionally resolve, and turn failures into an outcome
    pub fn contact_for<N, R>(
        &self,
        scope: &N,
        hint: &str,
        resolver: Option<&R>,
    ) -> ContactOutcome
    where
        N: DomNode,
        R: DetailPageResolver + ?Sized,
    {
        let located = self.locate(scope, hint);
        let resolved = match (located, resolver) {
            (Ok(link), Some(resolver)) => self.resolve(link, resolver),
            (other, _) => other,
        };
        outcome_of(resolved)
    }

    /// Association figures for the classifier; no detail page is fetched
    pub fn association_stats<N: DomNode>(
        &self,
        root: &N,
        groups: &[ContainerGroup<N>],
    ) -> AssociationStats {
        let mut stats = AssociationStats {
            total_email_elements: self.count_email_elements(root),
            ..AssociationStats::default()
        };
        for group in groups {
            let names = group.candidates.len();
            stats.total_names += names;
            let hint = group
                .candidates
                .first()
                .map(|candidate| candidate.text.as_str())
                .unwrap_or_default();
            if self.locate(&group.element, hint).is_ok() {
                stats.associated += names;
            }
        }
        debug!(
            "Association: {}/{} names linked, {} e-mail elements on page",
            stats.associated, stats.total_names, stats.total_email_elements
        );
        stats
    }

    fn absolute_url(&self, href: &str) -> String {
        match &self.base_url {
            Some(base) => base
                .join(href)
                .map_or_else(|_| href.to_string(), |url| url.to_string()),
            None => href.to_string(),
        }
    }
}

/// Map a lookup result to the outcome stored on a record
pub fn outcome_of(result: ExtractionResult<ContactLink>) -> ContactOutcome {
    match result {
        Ok(link) => ContactOutcome::Found { link },
        Err(ExtractionError::MultipleContactLinksOfSameType { addresses, .. }) => {
            warn!("Ambiguous contact links: {}", addresses.join(", "));
            ContactOutcome::Ambiguous { addresses }
        }
        Err(e) => {
            debug!("No contact link: {}", e);
            ContactOutcome::NotFound
        }
    }
}

fn is_mailto(href: &str) -> bool {
    href.get(..7).is_some_and(|scheme| scheme.eq_ignore_ascii_case("mailto:"))
}

fn scope_label<N: DomNode>(scope: &N) -> String {
    let text = scope.text_content();
    let mut label: String = text.chars().take(60).collect();
    if label.len() < text.len() {
        label.push('…');
    }
    format!("<{}> {}", scope.tag_name(), label)
}
