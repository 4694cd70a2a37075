use crate::span::Span;
use lazy_static::lazy_static;
use std::collections::HashSet;

lazy_static! {
    /// Common English function words dropped during span normalization
    pub static ref LINGUISTIC_STOPWORDS: HashSet<&'static str> = [
        "a", "an", "the", "this", "that", "these", "those", "some", "any",
        "all", "both", "each", "every", "few", "many", "much", "more",
        "most", "other", "another", "such", "no", "not", "only", "own",
        "same", "so", "too", "very", "just", "whole", "per", "and", "or",
        "but", "nor", "if", "because", "while", "of", "for", "with",
        "without", "in", "on", "at", "by", "from", "to", "into", "about",
        "against", "between", "through", "during", "before", "after",
        "above", "below", "up", "down", "out", "off", "over", "under",
        "again", "further", "then", "once", "here", "there", "when",
        "where", "why", "how", "what", "which", "who", "whom", "i", "me",
        "my", "mine", "you", "your", "yours", "he", "him", "his", "she",
        "her", "hers", "it", "its", "we", "us", "our", "ours", "they",
        "them", "their", "theirs", "am", "is", "are", "was", "were", "be",
        "been", "being", "do", "does", "did", "doing", "have", "has",
        "had", "having", "will", "would", "shall", "should", "may",
        "might", "must", "can", "could", "get", "got", "make", "made",
        "please", "as", "than", "one", "two", "three", "four", "five",
        "six", "seven", "eight", "nine", "ten", "eleven", "twelve",
    ]
    .iter()
    .copied()
    .collect();

    /// Domain words that carry no signal about which grocery item a phrase
    /// denotes, mostly containers and quantity wrappers. "-PRON-" is the
    /// pronoun lemma some annotators emit in place of the surface form.
    pub static ref DOMAIN_STOPLIST: HashSet<&'static str> = [
        "food", "groceries", "bottle", "frozen", "-PRON-", "bag", "can",
        "kind", "pack", "box", "supply", "kinds", "allergies",
    ]
    .iter()
    .copied()
    .collect();

    /// Tokens emitted verbatim instead of lemmatized; a lemmatizer can
    /// mangle these ("string" as in string cheese is not "strung")
    pub static ref LEMMA_EXCEPTIONS: HashSet<&'static str> = ["string"].iter().copied().collect();
}

fn trim_parens(s: &str) -> &str {
    s.trim_matches(|c| c == '(' || c == ')')
}

/// Canonicalize a raw string: lowercase, trim whitespace, trim enclosing
/// parentheses
pub fn normalize_string(raw: &str) -> String {
    trim_parens(raw.to_lowercase().trim()).to_string()
}

/// Canonicalize a span into a comparable key. Punctuation, whitespace,
/// stopwords, and domain-stoplisted tokens (by text or lemma) are dropped;
/// surviving tokens contribute their lemma, except lemma-exception tokens
/// which contribute their text unlemmatized. Output is lowercased
/// throughout. An empty result means the span carried no signal, and
/// callers must never use it as a key.
pub fn normalize_span(span: &Span) -> String {
    let mut parts: Vec<String> = Vec::new();
    for token in span.tokens() {
        if token.is_punct() || token.is_space() {
            continue;
        }
        let text = token.text.to_lowercase();
        let lemma = token.lemma.to_lowercase();
        if LINGUISTIC_STOPWORDS.contains(text.as_str()) {
            continue;
        }
        if DOMAIN_STOPLIST.contains(text.as_str()) || DOMAIN_STOPLIST.contains(lemma.as_str()) {
            continue;
        }
        if LEMMA_EXCEPTIONS.contains(text.as_str()) {
            parts.push(text);
        } else {
            parts.push(lemma);
        }
    }
    trim_parens(&parts.join(" ")).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::{DepLabel, PosTag, Token};

    fn tok(text: &str, lemma: &str, pos: PosTag) -> Token {
        Token::new(text, lemma, pos, DepLabel::Mod)
    }

    #[test]
    fn test_normalize_string_basic() {
        assert_eq!(normalize_string("  Whole Milk "), "whole milk");
        assert_eq!(normalize_string("(eggs)"), "eggs");
        assert_eq!(normalize_string("((Juice))"), "juice");
    }

    #[test]
    fn test_normalize_string_idempotent() {
        let once = normalize_string("  (Frozen Peas) ");
        assert_eq!(normalize_string(&once), once);
        assert_eq!(normalize_string("fuji apple"), "fuji apple");
    }

    #[test]
    fn test_normalize_span_drops_stopwords_and_punct() {
        let span = Span::from_tokens(vec![
            tok("loaf", "loaf", PosTag::Noun),
            tok("of", "of", PosTag::Prep),
            tok("bread", "bread", PosTag::Noun),
            tok(",", ",", PosTag::Punct),
        ]);
        assert_eq!(normalize_span(&span), "loaf bread");
    }

    #[test]
    fn test_normalize_span_domain_stoplist_by_text_or_lemma() {
        // "bottles" survives the text check but its lemma is stoplisted
        let span = Span::from_tokens(vec![
            tok("bottles", "bottle", PosTag::Noun),
            tok("of", "of", PosTag::Prep),
            tok("milk", "milk", PosTag::Noun),
        ]);
        assert_eq!(normalize_span(&span), "milk");
    }

    #[test]
    fn test_normalize_span_emits_lemmas() {
        let span = Span::from_tokens(vec![
            tok("fuji", "fuji", PosTag::Noun),
            tok("apples", "apple", PosTag::Noun),
        ]);
        assert_eq!(normalize_span(&span), "fuji apple");
    }

    #[test]
    fn test_lemma_exception_emitted_verbatim() {
        let span = Span::from_tokens(vec![
            tok("string", "strung", PosTag::Noun),
            tok("cheese", "cheese", PosTag::Noun),
        ]);
        assert_eq!(normalize_span(&span), "string cheese");
    }

    #[test]
    fn test_mixed_case_tokens_normalize_lowercase() {
        // exception and regular tokens alike come out lowercased
        let span = Span::from_tokens(vec![
            tok("String", "strung", PosTag::Noun),
            tok("Cheese", "Cheese", PosTag::Noun),
        ]);
        assert_eq!(normalize_span(&span), "string cheese");
    }

    #[test]
    fn test_normalize_span_empty_is_no_signal() {
        let span = Span::from_tokens(vec![
            tok("the", "the", PosTag::Det),
            tok("bag", "bag", PosTag::Noun),
        ]);
        assert_eq!(normalize_span(&span), "");
    }

    #[test]
    fn test_normalize_span_trims_joined_parens() {
        let span = Span::from_tokens(vec![tok("(eggs)", "(egg)", PosTag::Noun)]);
        assert_eq!(normalize_span(&span), "egg");
    }
}
