//! Page shape classification
//!
//! Decides from container histograms and contact association counts whether
//! a page lists one person per container. The thresholds were tuned against
//! a corpus of real directory pages; the rule order matters on boundary
//! cases and must not change.

use tracing::debug;

use super::container::ContainerHistogram;
use super::contact_link::AssociationStats;
use crate::domain::{ContainerKind, PageClassification, PageContactType};
use crate::infrastructure::config::{ExtractionConfig, defaults};

/// Tolerance-banded comparisons between population counts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToleranceComparator {
    tolerance: f64,
    comparability_divisor: f64,
}

impl Default for ToleranceComparator {
    fn default() -> Self {
        Self::new(defaults::TOLERANCE, defaults::COMPARABILITY_DIVISOR)
    }
}

impl ToleranceComparator {
    pub const fn new(tolerance: f64, comparability_divisor: f64) -> Self {
        Self {
            tolerance,
            comparability_divisor,
        }
    }

    pub const fn comparability_divisor(&self) -> f64 {
        self.comparability_divisor
    }

    /// Both counts exceed a quarter of the larger one
    pub fn comparable(&self, a: usize, b: usize) -> bool {
        let floor = a.max(b) as f64 / self.comparability_divisor;
        a as f64 > floor && b as f64 > floor
    }

    /// `|a - b| / scale` stays under the tolerance; a zero scale needs equality
    pub fn approx_equal(&self, a: usize, b: usize, scale: usize) -> bool {
        if scale == 0 {
            return a == b;
        }
        a.abs_diff(b) as f64 / (scale as f64) < self.tolerance
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageClassifier {
    comparator: ToleranceComparator,
    band_low: f64,
    band_high: f64,
}

impl Default for PageClassifier {
    fn default() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }
}

impl PageClassifier {
    pub const fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            comparator: ToleranceComparator::new(config.tolerance, config.comparability_divisor),
            band_low: config.ratio_band_low,
            band_high: config.ratio_band_high,
        }
    }

    pub const fn comparator(&self) -> &ToleranceComparator {
        &self.comparator
    }

    /// Whether names on the page carry their own contact links
    pub fn contact_type(&self, stats: &AssociationStats) -> PageContactType {
        let AssociationStats {
            total_names: names,
            total_email_elements: emails,
            associated,
        } = *stats;
        let cmp = &self.comparator;
        let divisor = cmp.comparability_divisor();

        let contact_type = if cmp.comparable(associated, emails) {
            PageContactType::HasAssociatedContactInfo
        } else if emails as f64 / divisor > associated as f64 {
            PageContactType::NoAssociatedContactInfo
        } else if cmp.approx_equal(names, emails, names.max(emails)) {
            PageContactType::NoAssociatedContactInfo
        } else if associated as f64 > names as f64 / divisor {
            PageContactType::HasAssociatedContactInfo
        } else {
            PageContactType::NoAssociatedContactInfo
        };
        debug!(
            "Contact type {:?} (names={}, emails={}, associated={})",
            contact_type, names, emails, associated
        );
        contact_type
    }

    /// Page verdict; the first matching rule wins
    pub fn classify(
        &self,
        histogram: &ContainerHistogram,
        contact_type: PageContactType,
    ) -> PageClassification {
        let total = histogram.total_names;
        if total == 0 {
            return PageClassification::Undetermined;
        }
        let cmp = &self.comparator;
        let has_contacts = contact_type == PageContactType::HasAssociatedContactInfo;
        let per_row = histogram.names_per(ContainerKind::Row);
        let per_paragraph = histogram.names_per(ContainerKind::Paragraph);
        let per_division = histogram.names_per(ContainerKind::Division);

        let (rule, verdict) = if cmp.approx_equal(histogram.names_in_rows, total, total)
            && self.in_closed_band(per_row)
            && has_contacts
        {
            (1, PageClassification::Structured)
        } else if cmp.approx_equal(histogram.names_outside(ContainerKind::List), 0, total) {
            (2, PageClassification::Structured)
        } else if cmp.approx_equal(histogram.names_outside(ContainerKind::OrderedList), 0, total) {
            (3, PageClassification::Structured)
        } else if cmp.approx_equal(histogram.rows, total, total) {
            (4, PageClassification::Unstructured)
        } else if cmp.approx_equal(histogram.paragraphs, total, total) || self.in_open_band(per_paragraph) {
            if has_contacts {
                (5, PageClassification::Structured)
            } else {
                (5, PageClassification::Unstructured)
            }
        } else if cmp.approx_equal(histogram.divisions, total, total) || self.in_open_band(per_division) {
            (6, PageClassification::Unstructured)
        } else {
            (7, PageClassification::Undetermined)
        };
        debug!("Page classified {:?} by rule {}: {:?}", verdict, rule, histogram);
        verdict
    }

    /// `(low, high]`
    fn in_closed_band(&self, ratio: f64) -> bool {
        ratio > self.band_low && ratio <= self.band_high
    }

    /// `(low, high)`
    fn in_open_band(&self, ratio: f64) -> bool {
        ratio > self.band_low && ratio < self.band_high
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const HAS: PageContactType = PageContactType::HasAssociatedContactInfo;
    const NO: PageContactType = PageContactType::NoAssociatedContactInfo;

    fn histogram(rows: usize, names_in_rows: usize, total: usize) -> ContainerHistogram {
        ContainerHistogram {
            rows,
            names_in_rows,
            total_names: total,
            ..ContainerHistogram::default()
        }
    }

    #[test]
    fn test_comparable_uses_quarter_of_larger() {
        let cmp = ToleranceComparator::default();
        assert!(cmp.comparable(10, 10));
        assert!(cmp.comparable(3, 10));
        assert!(!cmp.comparable(2, 10));
        assert!(!cmp.comparable(0, 0));
    }

    #[test]
    fn test_approx_equal_fifteen_percent_band() {
        let cmp = ToleranceComparator::default();
        assert!(cmp.approx_equal(86, 100, 100));
        assert!(!cmp.approx_equal(85, 100, 100));
        assert!(cmp.approx_equal(0, 0, 0));
        assert!(!cmp.approx_equal(1, 0, 0));
    }

    #[test]
    fn test_contact_type() {
        let classifier = PageClassifier::default();
        let stats = |names, emails, associated| AssociationStats {
            total_names: names,
            total_email_elements: emails,
            associated,
        };
        assert_eq!(
            classifier.contact_type(&stats(10, 10, 10)),
            PageContactType::HasAssociatedContactInfo
        );
        // one shared address for the whole page
        assert_eq!(
            classifier.contact_type(&stats(10, 40, 2)),
            PageContactType::NoAssociatedContactInfo
        );
        // detail page links only
        assert_eq!(
            classifier.contact_type(&stats(10, 0, 8)),
            PageContactType::HasAssociatedContactInfo
        );
        assert_eq!(
            classifier.contact_type(&stats(10, 0, 0)),
            PageContactType::NoAssociatedContactInfo
        );
    }

    #[test]
    fn test_ten_rows_with_contacts_are_structured() {
        let classifier = PageClassifier::default();
        let verdict = classifier.classify(&histogram(10, 10, 10), PageContactType::HasAssociatedContactInfo);
        assert_eq!(verdict, PageClassification::Structured);
    }

    #[test]
    fn test_rows_without_contacts_are_unstructured() {
        let classifier = PageClassifier::default();
        let verdict = classifier.classify(&histogram(10, 10, 10), PageContactType::NoAssociatedContactInfo);
        assert_eq!(verdict, PageClassification::Unstructured);
    }

    #[test]
    fn test_names_only_in_lists_are_structured() {
        let classifier = PageClassifier::default();
        let histogram = ContainerHistogram {
            lists: 1,
            names_in_lists: 12,
            total_names: 12,
            ..ContainerHistogram::default()
        };
        for contact_type in [
            PageContactType::HasAssociatedContactInfo,
            PageContactType::NoAssociatedContactInfo,
        ] {
            assert_eq!(
                classifier.classify(&histogram, contact_type),
                PageClassification::Structured
            );
        }
    }

    #[test]
    fn test_paragraph_and_division_rules() {
        let classifier = PageClassifier::default();
        let paragraphs = ContainerHistogram {
            paragraphs: 5,
            names_in_paragraphs: 10,
            total_names: 10,
            ..ContainerHistogram::default()
        };
        assert_eq!(
            classifier.classify(&paragraphs, PageContactType::HasAssociatedContactInfo),
            PageClassification::Structured
        );
        assert_eq!(
            classifier.classify(&paragraphs, PageContactType::NoAssociatedContactInfo),
            PageClassification::Unstructured
        );

        let divisions = ContainerHistogram {
            divisions: 4,
            names_in_divisions: 10,
            total_names: 10,
            ..ContainerHistogram::default()
        };
        assert_eq!(
            classifier.classify(&divisions, PageContactType::HasAssociatedContactInfo),
            PageClassification::Unstructured
        );
    }

    #[test]
    fn test_no_names_is_undetermined() {
        let classifier = PageClassifier::default();
        assert_eq!(
            classifier.classify(&ContainerHistogram::default(), PageContactType::HasAssociatedContactInfo),
            PageClassification::Undetermined
        );
        let sparse = ContainerHistogram {
            divisions: 1,
            names_in_divisions: 10,
            total_names: 10,
            ..ContainerHistogram::default()
        };
        assert_eq!(
            classifier.classify(&sparse, PageContactType::NoAssociatedContactInfo),
            PageClassification::Undetermined
        );
    }

    fn shape(rows: usize, names_in_rows: usize, paragraphs: usize, divisions: usize, total: usize) -> ContainerHistogram {
        ContainerHistogram {
            rows,
            names_in_rows,
            paragraphs,
            divisions,
            total_names: total,
            ..ContainerHistogram::default()
        }
    }

    fn ordered_lists(containers: usize, names: usize, total: usize) -> ContainerHistogram {
        ContainerHistogram {
            ordered_lists: containers,
            names_in_ordered_lists: names,
            total_names: total,
            ..ContainerHistogram::default()
        }
    }

    #[rstest]
    // rule 1: row band is (0.3, 1.0]
    #[case::rows_ratio_at_upper_edge(shape(10, 10, 0, 0, 10), HAS, PageClassification::Structured)]
    #[case::rows_ratio_inside_band(shape(4, 10, 0, 0, 10), HAS, PageClassification::Structured)]
    #[case::rows_ratio_at_lower_edge(shape(3, 10, 0, 0, 10), HAS, PageClassification::Undetermined)]
    // rule 3
    #[case::names_only_in_ordered_lists(ordered_lists(3, 10, 10), NO, PageClassification::Structured)]
    #[case::most_names_outside_ordered_lists(ordered_lists(3, 5, 10), NO, PageClassification::Undetermined)]
    // rule 4 is checked before rule 5
    #[case::rows_win_over_paragraphs(shape(10, 5, 10, 0, 10), HAS, PageClassification::Unstructured)]
    // rule 5: paragraph band is (0.3, 1.0)
    #[case::paragraph_ratio_at_lower_edge(shape(0, 0, 3, 0, 10), HAS, PageClassification::Undetermined)]
    #[case::paragraph_ratio_inside_band(shape(0, 0, 4, 0, 10), HAS, PageClassification::Structured)]
    #[case::paragraph_per_name(shape(0, 0, 10, 0, 10), NO, PageClassification::Unstructured)]
    // rule 6: division band is (0.3, 1.0)
    #[case::division_ratio_at_lower_edge(shape(0, 0, 0, 3, 10), HAS, PageClassification::Undetermined)]
    #[case::division_ratio_inside_band(shape(0, 0, 0, 4, 10), HAS, PageClassification::Unstructured)]
    #[case::division_per_name(shape(0, 0, 0, 10, 10), HAS, PageClassification::Unstructured)]
    fn test_rule_boundaries(
        #[case] histogram: ContainerHistogram,
        #[case] contact_type: PageContactType,
        #[case] expected: PageClassification,
    ) {
        assert_eq!(PageClassifier::default().classify(&histogram, contact_type), expected);
    }

    #[test]
    fn test_band_edges() {
        let classifier = PageClassifier::default();
        assert!(classifier.in_closed_band(1.0));
        assert!(!classifier.in_open_band(1.0));
        assert!(!classifier.in_closed_band(0.3));
        assert!(!classifier.in_open_band(0.3));
        assert!(classifier.in_closed_band(0.31));
        assert!(classifier.in_open_band(0.99));
    }

    #[test]
    fn test_contact_type_follows_configured_divisor() {
        let stats = AssociationStats {
            total_names: 10,
            total_email_elements: 9,
            associated: 2,
        };
        // a quarter of 9 exceeds 2
        assert_eq!(PageClassifier::default().contact_type(&stats), NO);

        let config = ExtractionConfig {
            comparability_divisor: 10.0,
            ..ExtractionConfig::default()
        };
        // comparable(2, 9) holds once the floor drops to 0.9
        assert_eq!(PageClassifier::from_config(&config).contact_type(&stats), HAS);

        let sparse = AssociationStats {
            total_names: 40,
            total_email_elements: 0,
            associated: 5,
        };
        assert_eq!(PageClassifier::default().contact_type(&sparse), NO);
        assert_eq!(PageClassifier::from_config(&config).contact_type(&sparse), HAS);
    }
}
