//! Record parser chain
//!
//! Turns a container group into scored records. Containers holding one
//! person go through the single-record strategies in priority order and the
//! first success wins. Containers holding several people (more than one
//! distinct address, or several names on an unstructured page) run every
//! multi-record strategy and keep the result set with the highest total
//! score. A container nothing can make sense of still yields one unparsable
//! record carrying its text.

use tracing::{debug, warn};

use super::container::ContainerGroup;
use super::contact_link::{ContactLinkLocator, DetailPageResolver, outcome_of};
use super::dom::{DomChild, DomNode};
use super::flattener::{FlatDocument, Leaf, same_address};
use super::name_detector::NameDetector;
use super::name_parser::NameTokenParser;
use crate::domain::{
    ContactLink, ContactLinkType, ContactOutcome, ContainerKind, Lexicon, Name, PageClassification,
    Record,
};
use crate::infrastructure::parsing_error::{ExtractionError, ExtractionResult};

/// A name needs at least two of first, last and title for the name-leaf strategy
const COMPLETE_NAME_SCORE: f64 = 0.5;

/// Separators between the fields of a one-line contact entry
const SEGMENT_SEPARATORS: [&str; 7] = [" | ", "|", ";", "•", " - ", " – ", "\t"];

/// Shared collaborators of every strategy
#[derive(Clone, Copy)]
pub struct RecordContext<'a> {
    pub lexicon: &'a Lexicon,
    pub locator: &'a ContactLinkLocator,
    /// `None` keeps detail page links unresolved
    pub resolver: Option<&'a dyn DetailPageResolver>,
}

impl<'a> RecordContext<'a> {
    pub const fn new(
        lexicon: &'a Lexicon,
        locator: &'a ContactLinkLocator,
        resolver: Option<&'a dyn DetailPageResolver>,
    ) -> Self {
        Self {
            lexicon,
            locator,
            resolver,
        }
    }

    fn parser(&self) -> NameTokenParser<'a> {
        NameTokenParser::new(self.lexicon)
    }

    fn detector(&self) -> NameDetector<'a> {
        NameDetector::new(self.lexicon)
    }

    /// Contact of a whole container, climbing ancestors when needed
    fn contact<N: DomNode>(&self, scope: &N, hint: &str) -> ContactOutcome {
        self.locator.contact_for(scope, hint, self.resolver)
    }

    /// Contact found inside `scope` only
    fn local_contact<N: DomNode>(&self, scope: &N, hint: &str) -> ContactOutcome {
        let located = self.locator.locate_within(scope, hint);
        let resolved = match self.resolver {
            Some(resolver) => located.and_then(|link| self.locator.resolve(link, resolver)),
            None => located,
        };
        outcome_of(resolved)
    }

    /// Highest scoring parse among `texts`; ties keep the earliest
    fn best_name<'t, I>(&self, texts: I) -> Option<(Name, &'t str)>
    where
        I: IntoIterator<Item = &'t str>,
    {
        let parser = self.parser();
        let mut best: Option<(Name, &'t str)> = None;
        for text in texts {
            let name = parser.parse(text);
            if best.as_ref().is_none_or(|(current, _)| name.score > current.score) {
                best = Some((name, text));
            }
        }
        best
    }
}

/// Strategies for containers holding one person, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SingleRecordStrategy {
    /// The name-bearing text leaf itself, when it holds a single field
    NameLeaf,
    /// Each cell of a table row, and adjacent cell pairs
    TableCell,
    /// Container text split on field separators
    TextSegments,
    /// `first.last@` local part of the contact address
    EmailLocalPart,
}

impl SingleRecordStrategy {
    pub const CHAIN: [Self; 4] = [
        Self::NameLeaf,
        Self::TableCell,
        Self::TextSegments,
        Self::EmailLocalPart,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::NameLeaf => "name-leaf",
            Self::TableCell => "table-cell",
            Self::TextSegments => "text-segments",
            Self::EmailLocalPart => "email-local-part",
        }
    }

    pub fn try_parse<N: DomNode>(
        self,
        group: &ContainerGroup<N>,
        contact: &ContactOutcome,
        ctx: &RecordContext<'_>,
    ) -> ExtractionResult<Record> {
        let raw = group.text();
        let name = match self {
            Self::NameLeaf => ctx
                .best_name(
                    group
                        .candidates
                        .iter()
                        .map(|candidate| candidate.text.as_str())
                        .filter(|text| split_segments(text).len() == 1),
                )
                .map(|(name, _)| name)
                .filter(|name| name.score > COMPLETE_NAME_SCORE),
            Self::TableCell => Self::table_cells(group, ctx),
            Self::TextSegments => {
                let detector = ctx.detector();
                let segments: Vec<&str> = split_segments(&raw)
                    .into_iter()
                    .filter(|segment| detector.is_name(segment))
                    .collect();
                ctx.best_name(segments).map(|(name, _)| name)
            }
            Self::EmailLocalPart => contact
                .email()
                .and_then(|email| local_part_name(email, ctx)),
        };

        match name.filter(Name::is_valid) {
            Some(name) => Ok(Record::new(name, contact.clone(), raw).with_strategy(self.label())),
            None => Err(ExtractionError::cannot_parse_name(&raw)),
        }
    }

    fn table_cells<N: DomNode>(group: &ContainerGroup<N>, ctx: &RecordContext<'_>) -> Option<Name> {
        if group.kind != Some(ContainerKind::Row) {
            return None;
        }
        let detector = ctx.detector();
        let cells: Vec<String> = element_children(&group.element)
            .into_iter()
            .filter(|cell| cell.has_tag("td") || cell.has_tag("th"))
            .map(|cell| cell.text_content())
            .collect();

        let mut texts: Vec<String> = Vec::new();
        for (index, cell) in cells.iter().enumerate() {
            if !detector.is_name(cell) {
                continue;
            }
            texts.push(cell.clone());
            if let Some(next) = cells.get(index + 1).filter(|next| detector.is_name(next)) {
                texts.push(format!("{cell} {next}"));
            }
        }
        ctx.best_name(texts.iter().map(String::as_str)).map(|(name, _)| name)
    }
}

/// Strategies for containers holding several people
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiRecordStrategy {
    /// Bottom-up: each name takes the address that follows it
    NameThenEmail,
    /// Top-down: each name takes the address that precedes it
    EmailThenName,
    /// Each child element carrying a name is one person
    ChildBlocks,
}

/// Name or address item of a container, in document order
#[derive(Debug, Clone)]
enum Item {
    Name(String),
    Email(ContactLink),
}

impl MultiRecordStrategy {
    pub const ALL: [Self; 3] = [Self::NameThenEmail, Self::EmailThenName, Self::ChildBlocks];

    pub const fn label(self) -> &'static str {
        match self {
            Self::NameThenEmail => "name-then-email",
            Self::EmailThenName => "email-then-name",
            Self::ChildBlocks => "child-blocks",
        }
    }

    pub fn try_parse<N: DomNode>(
        self,
        group: &ContainerGroup<N>,
        ctx: &RecordContext<'_>,
    ) -> ExtractionResult<Vec<Record>> {
        let records = match self {
            Self::NameThenEmail => {
                let mut pending: Option<ContactLink> = None;
                let mut records = Vec::new();
                for item in items_of(&group.element, ctx).into_iter().rev() {
                    match item {
                        Item::Email(link) => pending = Some(link),
                        Item::Name(text) => records.push(self.record(&text, pending.take(), ctx)),
                    }
                }
                records.reverse();
                records
            }
            Self::EmailThenName => {
                let mut pending: Option<ContactLink> = None;
                let mut records = Vec::new();
                for item in items_of(&group.element, ctx) {
                    match item {
                        Item::Email(link) => pending = Some(link),
                        Item::Name(text) => records.push(self.record(&text, pending.take(), ctx)),
                    }
                }
                records
            }
            Self::ChildBlocks => self.child_blocks(group, ctx),
        };

        let total: f64 = records.iter().map(|record| record.score).sum();
        if records.is_empty() || total == 0.0 {
            return Err(ExtractionError::cannot_parse_name(&group.text()));
        }
        Ok(records)
    }

    fn record(self, text: &str, link: Option<ContactLink>, ctx: &RecordContext<'_>) -> Record {
        let contact = link.map_or(ContactOutcome::NotFound, |link| ContactOutcome::Found { link });
        Record::new(ctx.parser().parse(text), contact, text).with_strategy(self.label())
    }

    fn child_blocks<N: DomNode>(self, group: &ContainerGroup<N>, ctx: &RecordContext<'_>) -> Vec<Record> {
        let detector = ctx.detector();
        let mut records = Vec::new();
        for child in element_children(&group.element) {
            let flat = FlatDocument::flatten(&child);
            let names: Vec<&str> = flat
                .texts()
                .map(|(_, text)| text)
                .filter(|text| detector.is_name(text))
                .collect();
            let Some((name, hint)) = ctx.best_name(names) else { continue };
            let contact = ctx.local_contact(&child, hint);
            records.push(Record::new(name, contact, child.text_content()).with_strategy(self.label()));
        }
        records
    }
}

/// Ordered strategy lists applied to every container group
pub struct RecordParserChain<'a> {
    ctx: RecordContext<'a>,
    single: Vec<SingleRecordStrategy>,
    multi: Vec<MultiRecordStrategy>,
}

impl<'a> RecordParserChain<'a> {
    pub fn new(ctx: RecordContext<'a>) -> Self {
        Self {
            ctx,
            single: SingleRecordStrategy::CHAIN.to_vec(),
            multi: MultiRecordStrategy::ALL.to_vec(),
        }
    }

    /// Several people share `group` when it holds more than one distinct
    /// address, or several names on an unstructured page
    pub fn holds_several_records<N: DomNode>(
        &self,
        group: &ContainerGroup<N>,
        classification: PageClassification,
    ) -> bool {
        let mut addresses: Vec<String> = Vec::new();
        for found in self.ctx.locator.links_in(&group.element) {
            if found.link.link_type.is_email()
                && !addresses.iter().any(|seen| same_address(seen, &found.link.address))
            {
                addresses.push(found.link.address);
            }
        }
        addresses.len() > 1
            || (classification == PageClassification::Unstructured && group.candidates.len() > 1)
    }

    /// Records of one container group, never empty
    pub fn parse_group<N: DomNode>(
        &self,
        group: &ContainerGroup<N>,
        classification: PageClassification,
    ) -> Vec<Record> {
        if self.holds_several_records(group, classification) {
            self.parse_multi(group)
        } else {
            vec![self.parse_single(group)]
        }
    }

    fn parse_single<N: DomNode>(&self, group: &ContainerGroup<N>) -> Record {
        let hint = group
            .candidates
            .first()
            .map(|candidate| candidate.text.as_str())
            .unwrap_or_default();
        let contact = self.ctx.contact(&group.element, hint);

        for strategy in &self.single {
            match strategy.try_parse(group, &contact, &self.ctx) {
                Ok(record) => {
                    debug!("Strategy {} parsed '{}'", strategy.label(), record.name.full_name());
                    return record;
                }
                Err(e) => debug!("Strategy {} failed: {}", strategy.label(), e),
            }
        }
        self.fallback(group, contact, self.single.len())
    }

    fn parse_multi<N: DomNode>(&self, group: &ContainerGroup<N>) -> Vec<Record> {
        let mut best: Option<(f64, MultiRecordStrategy, Vec<Record>)> = None;
        for strategy in &self.multi {
            match strategy.try_parse(group, &self.ctx) {
                Ok(records) => {
                    let total: f64 = records.iter().map(|record| record.score).sum();
                    debug!(
                        "Strategy {} produced {} records, total score {:.2}",
                        strategy.label(),
                        records.len(),
                        total
                    );
                    if best.as_ref().is_none_or(|(best_total, _, _)| total > *best_total) {
                        best = Some((total, *strategy, records));
                    }
                }
                Err(e) => debug!("Strategy {} failed: {}", strategy.label(), e),
            }
        }

        match best {
            Some((_, strategy, records)) => {
                debug!("Kept {} for a container of {} names", strategy.label(), group.candidates.len());
                records
            }
            None => {
                let hint = group
                    .candidates
                    .first()
                    .map(|candidate| candidate.text.as_str())
                    .unwrap_or_default();
                let contact = self.ctx.contact(&group.element, hint);
                vec![self.fallback(group, contact, self.multi.len())]
            }
        }
    }

    fn fallback<N: DomNode>(
        &self,
        group: &ContainerGroup<N>,
        contact: ContactOutcome,
        attempted: usize,
    ) -> Record {
        let raw = group.text();
        let error = ExtractionError::cannot_extract_record(&raw, attempted);
        warn!("{}", error);
        Record::unparsable(raw, contact)
    }
}

/// Name and address items of a subtree; repeated adjacent addresses collapse
fn items_of<N: DomNode>(scope: &N, ctx: &RecordContext<'_>) -> Vec<Item> {
    let detector = ctx.detector();
    let mut items: Vec<Item> = Vec::new();
    for leaf in FlatDocument::flatten(scope).iter() {
        if let Some(address) = leaf.email() {
            let repeated = matches!(
                items.last(),
                Some(Item::Email(previous)) if same_address(&previous.address, address)
            );
            if !repeated {
                let link_type = match leaf {
                    Leaf::EmailLink { .. } => ContactLinkType::EmailInHref,
                    Leaf::Text { .. } => ContactLinkType::EmailInContent,
                };
                items.push(Item::Email(ContactLink::new(link_type, address)));
            }
        } else if let Some(text) = leaf.text().filter(|text| detector.is_name(text)) {
            items.push(Item::Name(text.to_string()));
        }
    }
    items
}

fn element_children<N: DomNode>(element: &N) -> Vec<N> {
    element
        .child_nodes()
        .into_iter()
        .filter_map(|child| match child {
            DomChild::Element(element) => Some(element),
            DomChild::Text(_) => None,
        })
        .collect()
}

/// Split one-line entries such as `Ana Ruiz | Profesora | ana@uni.es`
fn split_segments(text: &str) -> Vec<&str> {
    let mut segments = vec![text];
    for separator in SEGMENT_SEPARATORS {
        segments = segments
            .into_iter()
            .flat_map(|segment| segment.split(separator))
            .collect();
    }
    segments
        .into_iter()
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// `ana.ruiz@uni.es` → "ana ruiz" when the lexicon knows a part
fn local_part_name(email: &str, ctx: &RecordContext<'_>) -> Option<Name> {
    let local = email.split('@').next()?;
    let tokens: Vec<&str> = local
        .split(['.', '_', '-'])
        .filter(|token| token.chars().any(char::is_alphabetic))
        .collect();
    let joined = tokens.join(" ");
    if tokens.len() < 2 || !ctx.detector().is_name(&joined) {
        return None;
    }
    Some(ctx.parser().parse(&joined))
}
