//! Name token parser
//!
//! Splits a chunk of text into first name, last name, title, suffix and
//! remainder using the lexicon. Two layouts are recognised: `Last, First`
//! when the chunk carries a comma, and `First Last` otherwise. A set of
//! clean-up passes then fixes the usual damage (titles glued to names,
//! parenthesised notes, surnames swallowed by the first name) before
//! abbreviations are expanded and capitalization is normalized.
//!
//! In the `Last, First` layout the last-name part switches to remainder at
//! the first general word that is not its first word and not a known last
//! name. Grammar particles never trigger the switch, so `García de la
//! Fuente` stays one surname.

use tracing::trace;

use crate::domain::{Lexicon, Name, fold};
use crate::infrastructure::parsing_error::{ExtractionError, ExtractionResult};

#[derive(Debug, Default)]
struct Parts {
    first: Vec<String>,
    last: Vec<String>,
    title: Vec<String>,
    suffix: Vec<String>,
    remainder: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct NameTokenParser<'a> {
    lexicon: &'a Lexicon,
}

impl<'a> NameTokenParser<'a> {
    pub const fn new(lexicon: &'a Lexicon) -> Self {
        Self { lexicon }
    }

    /// Parse a raw chunk; an unusable chunk yields a name scored zero
    pub fn parse(&self, raw: &str) -> Name {
        let normalized = normalize(raw);
        let mut parts = match normalized.split_once(',') {
            Some((last, rest)) if !last.trim().is_empty() && !rest.trim().is_empty() => {
                self.split_comma(last, rest)
            }
            _ => self.split_plain(&normalized.replace(',', " ")),
        };

        move_parenthesized(&mut parts);
        self.extract_trapped_titles(&mut parts);
        if parts.last.is_empty() && parts.first.len() >= 2 {
            if let Some(token) = parts.first.pop() {
                parts.last.push(token);
            }
        }

        let name = Name::new(
            self.finish(&parts.first),
            self.finish(&parts.last),
            parts.title.join(" "),
            parts.suffix.join(" "),
            parts.remainder.join(" "),
        );
        trace!("Parsed '{}' as {:?}", raw, name);
        name
    }

    /// Like [`Self::parse`] but a zero score is an error
    pub fn parse_checked(&self, raw: &str) -> ExtractionResult<Name> {
        let name = self.parse(raw);
        if name.is_valid() {
            Ok(name)
        } else {
            Err(ExtractionError::cannot_parse_name(raw))
        }
    }

    /// `Last Names, [Title] First Names[, Suffix or note]`
    fn split_comma(&self, last_part: &str, rest: &str) -> Parts {
        let lexicon = self.lexicon;
        let mut parts = Parts::default();
        let mut segments = rest.split(',');

        for token in segments.next().unwrap_or_default().split_whitespace() {
            if lexicon.is_title(token) {
                parts.title.push(token.to_string());
            } else if lexicon.is_suffix(token) && !parts.first.is_empty() {
                parts.suffix.push(token.to_string());
            } else {
                parts.first.push(token.to_string());
            }
        }
        for token in segments.flat_map(str::split_whitespace) {
            if lexicon.is_suffix(token) {
                parts.suffix.push(token.to_string());
            } else {
                parts.remainder.push(token.to_string());
            }
        }

        let (suffixes, words): (Vec<&str>, Vec<&str>) =
            last_part.split_whitespace().partition(|token| lexicon.is_suffix(token));
        parts.suffix.extend(suffixes.into_iter().map(str::to_string));

        let mut diverting = false;
        for (position, token) in words.into_iter().enumerate() {
            if lexicon.is_title(token) && parts.last.is_empty() {
                parts.title.push(token.to_string());
            } else if diverting {
                parts.remainder.push(token.to_string());
            } else if position > 0
                && lexicon.is_general_word(token)
                && !lexicon.is_last_name(token)
                && !lexicon.is_particle(token)
            {
                diverting = true;
                parts.remainder.push(token.to_string());
            } else {
                parts.last.push(token.to_string());
            }
        }
        parts
    }

    /// `[Title] First Names Last Names [notes]`
    fn split_plain(&self, text: &str) -> Parts {
        let lexicon = self.lexicon;
        let mut parts = Parts::default();
        let mut last_started = false;

        for token in text.split_whitespace() {
            let owned = token.to_string();
            if !last_started && lexicon.is_title(token) {
                parts.title.push(owned);
            } else if !parts.first.is_empty() && lexicon.is_suffix(token) {
                parts.suffix.push(owned);
            } else if parts.first.is_empty() {
                parts.first.push(owned);
            } else if !last_started {
                if lexicon.is_last_name(token) || lexicon.is_particle(token) {
                    last_started = true;
                    parts.last.push(owned);
                } else if lexicon.is_first_name(token) || lexicon.is_general_word(token) {
                    parts.first.push(owned);
                } else {
                    last_started = true;
                    parts.last.push(owned);
                }
            } else if lexicon.is_last_name(token) {
                parts.last.push(owned);
            } else if lexicon.is_particle(token) {
                // particles follow the text they connect
                if parts.remainder.is_empty() {
                    parts.last.push(owned);
                } else {
                    parts.remainder.push(owned);
                }
            } else if lexicon.is_general_word(token) {
                parts.remainder.push(owned);
            } else {
                parts.last.push(owned);
            }
        }
        parts
    }

    /// Move titles out of the first name, whole or glued (`Dra.Ana`)
    fn extract_trapped_titles(&self, parts: &mut Parts) {
        let mut kept = Vec::with_capacity(parts.first.len());
        for token in std::mem::take(&mut parts.first) {
            if self.lexicon.is_title(&token) {
                parts.title.push(token);
                continue;
            }
            match self.split_glued_title(&token) {
                Some((title, rest)) => {
                    parts.title.push(title);
                    kept.push(rest);
                }
                None => kept.push(token),
            }
        }
        parts.first = kept;
    }

    fn split_glued_title(&self, token: &str) -> Option<(String, String)> {
        let folded = fold(token);
        let key = self
            .lexicon
            .titles_by_length()
            .iter()
            .find(|key| folded.starts_with(key.as_str()) && folded.len() > key.len())?;
        let split = token.char_indices().nth(key.chars().count()).map(|(i, _)| i)?;
        let (prefix, rest) = token.split_at(split);
        let name = rest.strip_prefix('.')?.trim_start_matches('.');
        if name.is_empty() {
            return None;
        }
        Some((format!("{prefix}."), name.to_string()))
    }

    /// Expand abbreviations and normalize capitalization
    fn finish(&self, tokens: &[String]) -> String {
        tokens
            .iter()
            .map(|token| {
                let token = self.lexicon.expand_abbreviation(token).unwrap_or(token.as_str());
                if self.lexicon.is_particle(token) {
                    token.to_lowercase()
                } else {
                    capitalize(token)
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Straighten quotes, drop non-breaking spaces, standalone numbers and bare punctuation
fn normalize(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| match c {
            '\u{a0}' | '\u{2007}' | '\u{202f}' => ' ',
            '\u{2018}' | '\u{2019}' | '\u{201a}' | '\u{201b}' | '`' | '\u{b4}' => '\'',
            '\u{201c}' | '\u{201d}' | '\u{201e}' | '\u{201f}' | '\u{ab}' | '\u{bb}' => '"',
            c => c,
        })
        .collect();
    cleaned
        .split_whitespace()
        .filter(|token| token.chars().any(char::is_alphanumeric) && !is_numeric_token(token))
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_numeric_token(token: &str) -> bool {
    token.chars().any(|c| c.is_ascii_digit())
        && token
            .chars()
            .all(|c| c.is_ascii_digit() || "+-./()#:,".contains(c))
}

/// Move `( ... )` spans of first and last into the remainder
fn move_parenthesized(parts: &mut Parts) {
    for field in [&mut parts.first, &mut parts.last] {
        let mut kept = Vec::with_capacity(field.len());
        let mut inside = false;
        for token in std::mem::take(field) {
            if token.starts_with('(') {
                inside = true;
            }
            if inside {
                inside = !token.ends_with(')');
                parts.remainder.push(token);
            } else {
                kept.push(token);
            }
        }
        *field = kept;
    }
}

/// Title-case tokens written all upper or all lower case, per hyphen part
fn capitalize(token: &str) -> String {
    let letters = || token.chars().filter(|c| c.is_alphabetic());
    let uniform = letters().all(char::is_uppercase) || letters().all(char::is_lowercase);
    if !uniform {
        return token.to_string();
    }
    token
        .split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(head) => head.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join("-")
}
