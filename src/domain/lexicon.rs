//! Immutable word lists that drive every text-level heuristic
//!
//! A [`Lexicon`] is built once by the caller and shared read-only by all
//! components. Entries are stored folded (lowercase, diacritics removed) so
//! that "Martínez", "MARTINEZ" and "martinez" all hit the same entry.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::infrastructure::parsing_error::{ExtractionError, ExtractionResult};

/// Lowercase and strip diacritics (á → a, ç → c)
pub fn fold(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Folded token with surrounding punctuation removed, used for name lookups
pub fn name_key(token: &str) -> String {
    fold(token.trim_matches(|c: char| !c.is_alphanumeric()))
}

/// Folded token without trailing dots or commas, used for title/suffix/abbreviation lookups
pub fn marker_key(token: &str) -> String {
    fold(
        token
            .trim_start_matches(|c: char| !c.is_alphanumeric())
            .trim_end_matches(['.', ',', ';', ':']),
    )
}

/// Parse a plain-text word list: one entry per line, `#` starts a comment
pub fn parse_word_list(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.split('#').next().unwrap_or_default().trim())
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Parse `abbreviation=expansion` lines (a tab also works as separator)
pub fn parse_abbreviation_list(text: &str) -> Vec<(String, String)> {
    parse_word_list(text)
        .into_iter()
        .filter_map(|line| {
            let (abbr, expansion) = line.split_once('=').or_else(|| line.split_once('\t'))?;
            let (abbr, expansion) = (abbr.trim(), expansion.trim());
            if abbr.is_empty() || expansion.is_empty() {
                None
            } else {
                Some((abbr.to_string(), expansion.to_string()))
            }
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct Lexicon {
    first_names: HashSet<String>,
    last_names: HashSet<String>,
    general_words: HashSet<String>,
    particles: HashSet<String>,
    titles: HashSet<String>,
    suffixes: HashSet<String>,
    abbreviations: HashMap<String, String>,
    /// Title keys, longest first, for substring extraction
    titles_by_length: Vec<String>,
}

impl Lexicon {
    pub fn builder() -> LexiconBuilder {
        LexiconBuilder::new()
    }

    pub fn is_first_name(&self, token: &str) -> bool {
        Self::matches_name(&self.first_names, token)
    }

    /// Hyphenated surnames match when any part is known
    pub fn is_last_name(&self, token: &str) -> bool {
        Self::matches_name(&self.last_names, token)
    }

    pub fn is_general_word(&self, token: &str) -> bool {
        let key = name_key(token);
        !key.is_empty() && self.general_words.contains(&key)
    }

    pub fn is_particle(&self, token: &str) -> bool {
        let key = name_key(token);
        !key.is_empty() && self.particles.contains(&key)
    }

    pub fn is_title(&self, token: &str) -> bool {
        let key = marker_key(token);
        !key.is_empty() && self.titles.contains(&key)
    }

    pub fn is_suffix(&self, token: &str) -> bool {
        let key = marker_key(token);
        !key.is_empty() && self.suffixes.contains(&key)
    }

    pub fn expand_abbreviation(&self, token: &str) -> Option<&str> {
        self.abbreviations.get(&marker_key(token)).map(String::as_str)
    }

    /// Title keys ordered longest first
    pub fn titles_by_length(&self) -> &[String] {
        &self.titles_by_length
    }

    fn matches_name(set: &HashSet<String>, token: &str) -> bool {
        let key = name_key(token);
        if key.is_empty() {
            return false;
        }
        set.contains(&key)
            || (key.contains('-') && key.split('-').any(|part| !part.is_empty() && set.contains(part)))
    }
}

/// Collects word lists and produces an immutable [`Lexicon`]
#[derive(Debug, Clone, Default)]
pub struct LexiconBuilder {
    first_names: BTreeSet<String>,
    last_names: BTreeSet<String>,
    general_words: BTreeSet<String>,
    particles: BTreeSet<String>,
    titles: BTreeSet<String>,
    suffixes: BTreeSet<String>,
    abbreviations: BTreeMap<String, String>,
}

impl LexiconBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn first_names<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::extend(&mut self.first_names, words, name_key);
        self
    }

    #[must_use]
    pub fn last_names<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::extend(&mut self.last_names, words, name_key);
        self
    }

    #[must_use]
    pub fn general_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::extend(&mut self.general_words, words, name_key);
        self
    }

    /// Grammar particles such as "de", "del", "van"
    #[must_use]
    pub fn particles<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::extend(&mut self.particles, words, name_key);
        self
    }

    #[must_use]
    pub fn titles<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::extend(&mut self.titles, words, marker_key);
        self
    }

    #[must_use]
    pub fn suffixes<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::extend(&mut self.suffixes, words, marker_key);
        self
    }

    #[must_use]
    pub fn abbreviations<I, K, V>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (abbr, expansion) in entries {
            let key = marker_key(abbr.as_ref());
            if !key.is_empty() {
                self.abbreviations.insert(key, expansion.into());
            }
        }
        self
    }

    /// Fails when there is nothing to detect names with
    pub fn build(self) -> ExtractionResult<Lexicon> {
        if self.first_names.is_empty() && self.last_names.is_empty() {
            return Err(ExtractionError::lexicon_unavailable(
                "first_names/last_names",
                "both name lists are empty",
            ));
        }

        let mut titles_by_length: Vec<String> = self.titles.iter().cloned().collect();
        titles_by_length.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));

        Ok(Lexicon {
            first_names: self.first_names.into_iter().collect(),
            last_names: self.last_names.into_iter().collect(),
            general_words: self.general_words.into_iter().collect(),
            particles: self.particles.into_iter().collect(),
            titles: self.titles.into_iter().collect(),
            suffixes: self.suffixes.into_iter().collect(),
            abbreviations: self.abbreviations.into_iter().collect(),
            titles_by_length,
        })
    }

    fn extend<I, S>(set: &mut BTreeSet<String>, words: I, key: fn(&str) -> String)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        set.extend(
            words
                .into_iter()
                .map(|word| key(word.as_ref()))
                .filter(|word| !word.is_empty()),
        );
    }
}
