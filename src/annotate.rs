use crate::span::{Annotator, DepLabel, PosTag, Span, Token};
use lazy_static::lazy_static;
use std::collections::{HashMap, HashSet};

lazy_static! {
    static ref DETERMINERS: HashSet<&'static str> = [
        "a", "an", "the", "this", "that", "these", "those", "some", "any",
        "no", "every", "each", "either", "neither", "my", "your", "his",
        "her", "its", "our", "their",
    ]
    .iter()
    .copied()
    .collect();

    static ref PRONOUNS: HashSet<&'static str> = [
        "i", "me", "you", "he", "him", "she", "it", "we", "us", "they", "them",
    ]
    .iter()
    .copied()
    .collect();

    static ref PREPOSITIONS: HashSet<&'static str> = [
        "of", "for", "with", "without", "in", "on", "at", "to", "from",
        "by", "about", "into", "over", "under",
    ]
    .iter()
    .copied()
    .collect();

    static ref CONJUNCTIONS: HashSet<&'static str> = ["and", "or", "but", "nor", "&"].iter().copied().collect();

    static ref NUMBER_WORDS: HashSet<&'static str> = [
        "one", "two", "three", "four", "five", "six", "seven", "eight",
        "nine", "ten", "eleven", "twelve", "dozen", "half",
    ]
    .iter()
    .copied()
    .collect();

    /// Plurals the suffix rules get wrong
    static ref IRREGULAR_PLURALS: HashMap<&'static str, &'static str> = [
        ("loaves", "loaf"),
        ("halves", "half"),
        ("shelves", "shelf"),
        ("calves", "calf"),
        ("wolves", "wolf"),
        ("leaves", "leaf"),
        ("thieves", "thief"),
        ("knives", "knife"),
        ("wives", "wife"),
        ("lives", "life"),
        ("shoes", "shoe"),
        ("cookies", "cookie"),
        ("brownies", "brownie"),
        ("smoothies", "smoothie"),
        ("veggies", "veggie"),
        ("children", "child"),
        ("men", "man"),
        ("women", "woman"),
        ("feet", "foot"),
        ("teeth", "tooth"),
        ("geese", "goose"),
        ("mice", "mouse"),
        ("people", "person"),
    ]
    .iter()
    .copied()
    .collect();
}

const ADJ_SUFFIXES: [&str; 9] = ["ic", "al", "ous", "ful", "less", "ish", "able", "ible", "ive"];

/// Rule-based annotator: whitespace/punctuation tokenization, suffix
/// lemmatization with an irregular table, closed-class POS tagging, and
/// noun-phrase segmentation at punctuation and coordinating conjunctions.
/// A prepositional phrase stays attached to the noun phrase it follows, and
/// each phrase's head is the last content word before its first
/// preposition. The first phrase of a line is the line's root.
#[derive(Default)]
pub struct RuleAnnotator;

impl RuleAnnotator {
    pub fn new() -> Self {
        Self
    }

    fn tokenize(&self, line: &str) -> Vec<(String, PosTag)> {
        let mut out = Vec::new();
        let mut word = String::new();
        for ch in line.chars() {
            if ch.is_alphanumeric() || ch == '-' || ch == '\'' {
                word.push(ch);
            } else {
                if !word.is_empty() {
                    let pos = self.tag(&word);
                    out.push((std::mem::take(&mut word), pos));
                }
                if !ch.is_whitespace() {
                    let pos = if ch == '&' { PosTag::Conj } else { PosTag::Punct };
                    out.push((ch.to_string(), pos));
                }
            }
        }
        if !word.is_empty() {
            let pos = self.tag(&word);
            out.push((word, pos));
        }
        out
    }

    fn tag(&self, word: &str) -> PosTag {
        let lower = word.to_lowercase();
        if word.chars().all(|c| c.is_ascii_digit()) {
            PosTag::Num
        } else if DETERMINERS.contains(lower.as_str()) {
            PosTag::Det
        } else if PRONOUNS.contains(lower.as_str()) {
            PosTag::Pron
        } else if PREPOSITIONS.contains(lower.as_str()) {
            PosTag::Prep
        } else if CONJUNCTIONS.contains(lower.as_str()) {
            PosTag::Conj
        } else if NUMBER_WORDS.contains(lower.as_str()) {
            PosTag::Num
        } else if ADJ_SUFFIXES.iter().any(|s| lower.len() > s.len() + 2 && lower.ends_with(s)) {
            PosTag::Adj
        } else {
            PosTag::Noun
        }
    }

    fn lemma(&self, word: &str) -> String {
        let lower = word.to_lowercase();
        let lower = lower.strip_suffix("'s").unwrap_or(&lower);
        if let Some(&singular) = IRREGULAR_PLURALS.get(lower) {
            return singular.to_string();
        }
        if lower.len() <= 3 || lower.ends_with("ss") || lower.ends_with("us") || lower.ends_with("is") {
            return lower.to_string();
        }
        if lower.len() > 4 && lower.ends_with("ies") {
            return format!("{}y", &lower[..lower.len() - 3]);
        }
        if lower.len() > 4 && lower.ends_with("oes") {
            return lower[..lower.len() - 2].to_string();
        }
        for suffix in ["ches", "shes", "sses", "xes", "zes"] {
            if lower.ends_with(suffix) {
                return lower[..lower.len() - 2].to_string();
            }
        }
        if let Some(stem) = lower.strip_suffix('s') {
            return stem.to_string();
        }
        lower.to_string()
    }

    /// Index of the phrase head: the last content token before the first
    /// preposition, falling back to the last content token anywhere, then
    /// to the last token
    fn head_index(tokens: &[(String, PosTag)]) -> Option<usize> {
        if tokens.is_empty() {
            return None;
        }
        let content = |pos: PosTag| matches!(pos, PosTag::Noun | PosTag::Adj | PosTag::Num);
        let prep_at = tokens
            .iter()
            .position(|(_, pos)| *pos == PosTag::Prep)
            .unwrap_or(tokens.len());
        let before_prep = tokens[..prep_at]
            .iter()
            .rposition(|(_, pos)| content(*pos));
        before_prep
            .or_else(|| tokens.iter().rposition(|(_, pos)| content(*pos)))
            .or(Some(tokens.len() - 1))
    }

    fn build_span(&self, tokens: &[(String, PosTag)], head_dep: DepLabel) -> Span {
        let head = Self::head_index(tokens);
        let toks = tokens
            .iter()
            .enumerate()
            .map(|(i, (text, pos))| {
                let dep = if Some(i) == head { head_dep } else { DepLabel::Mod };
                Token::new(text.clone(), self.lemma(text), *pos, dep)
            })
            .collect();
        Span::from_tokens(toks)
    }
}

impl Annotator for RuleAnnotator {
    fn annotate(&self, line: &str) -> Vec<Span> {
        let tokens = self.tokenize(line);
        let mut spans = Vec::new();
        let mut current: Vec<(String, PosTag)> = Vec::new();
        for (text, pos) in tokens {
            if pos == PosTag::Punct || pos == PosTag::Conj {
                if !current.is_empty() {
                    let dep = if spans.is_empty() { DepLabel::Root } else { DepLabel::Conj };
                    spans.push(self.build_span(&current, dep));
                    current.clear();
                }
            } else {
                current.push((text, pos));
            }
        }
        if !current.is_empty() {
            let dep = if spans.is_empty() { DepLabel::Root } else { DepLabel::Conj };
            spans.push(self.build_span(&current, dep));
        }
        spans
    }

    fn annotate_phrase(&self, text: &str) -> Span {
        let tokens: Vec<(String, PosTag)> = self
            .tokenize(text)
            .into_iter()
            .filter(|(_, pos)| *pos != PosTag::Punct)
            .collect();
        self.build_span(&tokens, DepLabel::Root)
    }
}
