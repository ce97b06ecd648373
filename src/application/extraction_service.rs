//! Contact extraction service
//!
//! High-level service running the whole pipeline over one page: encoding
//! check, flattening, name detection, container grouping, classification and
//! record extraction. Per-container failures never abort the page; they come
//! back as unparsable records.

use std::sync::Arc;

use scraper::Html;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::progress::{NoOpProgressObserver, ProgressObserver, ThrottledProgress};
use crate::domain::{Lexicon, PageClassification, PageContactType, Record};
use crate::infrastructure::config::ExtractionConfig;
use crate::infrastructure::parsing::{
    AssociationStats, ContactLinkLocator, ContainerHistogram, ContainerResolver, DetailPageResolver,
    DomNode, FlatDocument, NameDetector, NoDetailPages, PageClassifier, RecordContext,
    RecordParserChain, decode_bytes, validate_charset,
};
use crate::infrastructure::parsing_error::ExtractionResult;

/// Everything learned about one page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub classification: PageClassification,
    pub contact_type: PageContactType,
    pub histogram: ContainerHistogram,
    pub association: AssociationStats,
    /// Records in document order
    pub records: Vec<Record>,
}

impl ExtractionReport {
    /// Records that need manual review
    pub fn unparsable(&self) -> impl Iterator<Item = &Record> {
        self.records.iter().filter(|record| record.unparsable)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Runs the extraction pipeline with a shared lexicon
pub struct ContactExtractionService {
    lexicon: Arc<Lexicon>,
    config: ExtractionConfig,
    locator: ContactLinkLocator,
    classifier: PageClassifier,
    resolver: Box<dyn DetailPageResolver + Send + Sync>,
    progress: Box<dyn ProgressObserver>,
}

impl ContactExtractionService {
    /// Create a service; the configuration is validated here
    pub fn new(lexicon: Arc<Lexicon>, config: ExtractionConfig) -> ExtractionResult<Self> {
        config.validate()?;
        let locator = ContactLinkLocator::from_config(&config)?;
        let classifier = PageClassifier::from_config(&config);
        let step = config.progress_step_percent;
        Ok(Self {
            lexicon,
            config,
            locator,
            classifier,
            resolver: Box::new(NoDetailPages),
            progress: Box::new(ThrottledProgress::new(NoOpProgressObserver, step)),
        })
    }

    /// Use `resolver` to follow detail page links
    #[must_use]
    pub fn with_resolver<R>(mut self, resolver: R) -> Self
    where
        R: DetailPageResolver + Send + Sync + 'static,
    {
        self.resolver = Box::new(resolver);
        self
    }

    /// Report progress to `observer`, throttled to whole-percent steps
    #[must_use]
    pub fn with_progress<O>(mut self, observer: O) -> Self
    where
        O: ProgressObserver + 'static,
    {
        self.progress = Box::new(ThrottledProgress::new(observer, self.config.progress_step_percent));
        self
    }

    pub const fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Parse `html` declared in `encoding` and extract its records
    pub fn extract_from_html(&self, html: &str, encoding: &str) -> ExtractionResult<ExtractionReport> {
        let charset = validate_charset(encoding)?;
        debug!("Parsing {} bytes of HTML declared as {}", html.len(), charset.name());
        let document = Html::parse_document(html);
        self.extract_from_root(&document.root_element())
    }

    /// Decode a raw body declared in `encoding`, then extract
    pub fn extract_from_bytes(&self, body: &[u8], encoding: &str) -> ExtractionResult<ExtractionReport> {
        let charset = validate_charset(encoding)?;
        let html = decode_bytes(body, charset);
        let document = Html::parse_document(&html);
        self.extract_from_root(&document.root_element())
    }

    /// Run the pipeline over any DOM
    pub fn extract_from_root<N: DomNode>(&self, root: &N) -> ExtractionResult<ExtractionReport> {
        let lexicon = self.lexicon.as_ref();
        let flat = FlatDocument::flatten(root);
        let candidates = NameDetector::new(lexicon).candidates(&flat);
        let groups = ContainerResolver::new().group(candidates);

        let histogram = ContainerHistogram::from_groups(&groups);
        let association = self.locator.association_stats(root, &groups);
        let contact_type = self.classifier.contact_type(&association);
        let classification = self.classifier.classify(&histogram, contact_type);

        let resolver: Option<&dyn DetailPageResolver> = if self.config.resolve_detail_pages {
            Some(self.resolver.as_ref())
        } else {
            None
        };
        let chain = RecordParserChain::new(RecordContext::new(lexicon, &self.locator, resolver));

        let total = histogram.total_names;
        let mut processed = 0;
        let mut records = Vec::new();
        for group in &groups {
            records.extend(chain.parse_group(group, classification));
            processed += group.candidates.len();
            self.progress.on_progress(processed, total);
        }

        let unparsable = records.iter().filter(|record| record.unparsable).count();
        info!(
            "Page {:?} ({:?}): {} names in {} containers, {} records ({} unparsable)",
            classification,
            contact_type,
            total,
            groups.len(),
            records.len(),
            unparsable
        );

        Ok(ExtractionReport {
            classification,
            contact_type,
            histogram,
            association,
            records,
        })
    }
}
