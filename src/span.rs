use serde::{Deserialize, Serialize};

/// Coarse part-of-speech tags, enough to segment noun phrases and filter
/// punctuation and whitespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PosTag {
    Noun,
    Adj,
    Det,
    Pron,
    Prep,
    Conj,
    Num,
    Punct,
    Space,
}

/// Dependency role of a token within its line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepLabel {
    /// Head of the line's first noun phrase
    Root,
    /// Head of a subsequent, conjoined noun phrase
    Conj,
    /// Any non-head token
    Mod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub lemma: String,
    pub pos: PosTag,
    pub dep: DepLabel,
}

impl Token {
    pub fn new(text: impl Into<String>, lemma: impl Into<String>, pos: PosTag, dep: DepLabel) -> Self {
        Self {
            text: text.into(),
            lemma: lemma.into(),
            pos,
            dep,
        }
    }

    pub fn is_punct(&self) -> bool {
        self.pos == PosTag::Punct
    }

    pub fn is_space(&self) -> bool {
        self.pos == PosTag::Space
    }
}

/// An ordered run of tokens covering one noun phrase. Immutable once
/// produced by the annotator; matching never rewrites a span, only reads
/// it and slices sub-spans out of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    text: String,
    tokens: Vec<Token>,
}

impl Span {
    pub fn new(text: impl Into<String>, tokens: Vec<Token>) -> Self {
        Self {
            text: text.into(),
            tokens,
        }
    }

    /// Build a span from tokens alone, reconstructing the surface text
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        let text = tokens
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Self { text, tokens }
    }

    /// Raw surface text of the phrase as it appeared in the input
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// First token carrying the Root dependency label, if any
    pub fn root_token(&self) -> Option<&Token> {
        self.tokens.iter().find(|t| t.dep == DepLabel::Root)
    }

    /// Contiguous sub-span of `n` tokens starting at `start`
    pub fn slice(&self, start: usize, n: usize) -> Span {
        Span::from_tokens(self.tokens[start..start + n].to_vec())
    }

    /// All contiguous sub-spans of length `n`, left to right
    pub fn ngrams(&self, n: usize) -> Vec<Span> {
        if n == 0 || n > self.tokens.len() {
            return Vec::new();
        }
        (0..=self.tokens.len() - n).map(|i| self.slice(i, n)).collect()
    }
}

/// Contract the matching engine has with linguistic annotation. The engine
/// only ever sees spans and tokens; which library or ruleset produced them
/// is not its concern.
pub trait Annotator {
    /// Segment a grocery-list line into noun-phrase spans
    fn annotate(&self, line: &str) -> Vec<Span>;

    /// Annotate a short phrase as a single span without segmentation,
    /// used when indexing taxonomy terms
    fn annotate_phrase(&self, text: &str) -> Span;
}
