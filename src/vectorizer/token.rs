use std::{borrow::Cow, fmt, sync::Arc};

use crate::vectorizer::term::TermFrequency;

/// Half-open byte span `[start, end)` of one token inside a document.
/// Spans never own text; the term is only materialized when it becomes a map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenSpan {
    pub start: usize,
    pub end: usize,
}

impl TokenSpan {
    #[inline]
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    /// Slice of `text` covered by this span.
    /// Panics if either end is off a char boundary of `text`.
    #[inline]
    pub fn as_str<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Tokenization policy
/// Splits a document into a lazy sequence of spans.
/// Implementations must never yield empty spans, and every span must start
/// and end on a char boundary of the text, since spans are sliced directly.
pub trait Tokenizer: Send + Sync {
    fn tokenize<'a>(&self, text: &'a str) -> Box<dyn Iterator<Item = TokenSpan> + 'a>;
}

/// Default tokenizer
/// A token is a maximal run of non-whitespace characters.
/// Runs of whitespace collapse into one break, leading and trailing whitespace is ignored.
///
/// # Examples
/// ```
/// use tf_idf_featurizer::vectorizer::token::WhitespaceTokenizer;
/// let text = " this   is a   document  ";
/// let words: Vec<&str> = WhitespaceTokenizer
///     .spans(text)
///     .map(|span| span.as_str(text))
///     .collect();
/// assert_eq!(words, vec!["this", "is", "a", "document"]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl WhitespaceTokenizer {
    /// Lazy span iterator over `text`
    #[inline]
    pub fn spans<'a>(&self, text: &'a str) -> WhitespaceSpans<'a> {
        WhitespaceSpans { text, pos: 0 }
    }
}

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize<'a>(&self, text: &'a str) -> Box<dyn Iterator<Item = TokenSpan> + 'a> {
        Box::new(self.spans(text))
    }
}

/// Iterator returned by [`WhitespaceTokenizer::spans`]
#[derive(Debug, Clone)]
pub struct WhitespaceSpans<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Iterator for WhitespaceSpans<'a> {
    type Item = TokenSpan;

    fn next(&mut self) -> Option<TokenSpan> {
        let rest = &self.text[self.pos..];
        let start = match rest.find(|c: char| !c.is_whitespace()) {
            Some(offset) => self.pos + offset,
            None => {
                self.pos = self.text.len();
                return None;
            }
        };
        let end = self.text[start..]
            .find(char::is_whitespace)
            .map_or(self.text.len(), |offset| start + offset);
        self.pos = end;
        Some(TokenSpan::new(start, end))
    }
}

impl std::iter::FusedIterator for WhitespaceSpans<'_> {}

/// Per-token normalization applied before a token is counted
pub type StringDecorator = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Lowercasing decorator
pub fn lowercase_decorator() -> StringDecorator {
    Arc::new(|token: &str| token.to_lowercase())
}

/// Tokenizer plus optional decorator.
/// The same analyzer must be used for training and for transform,
/// otherwise terms will not line up with the vocabulary.
#[derive(Clone)]
pub struct TextAnalyzer {
    tokenizer: Arc<dyn Tokenizer>,
    decorator: Option<StringDecorator>,
}

impl Default for TextAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TextAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextAnalyzer")
            .field("decorated", &self.decorator.is_some())
            .finish()
    }
}

impl TextAnalyzer {
    /// Whitespace tokenizer, identity decorator
    pub fn new() -> Self {
        Self {
            tokenizer: Arc::new(WhitespaceTokenizer),
            decorator: None,
        }
    }

    pub fn with_tokenizer<T>(self, tokenizer: T) -> Self
    where
        T: Tokenizer + 'static,
    {
        Self {
            tokenizer: Arc::new(tokenizer),
            ..self
        }
    }

    pub fn with_decorator(self, decorator: StringDecorator) -> Self {
        Self {
            decorator: Some(decorator),
            ..self
        }
    }

    /// Shorthand for `with_decorator(lowercase_decorator())`
    pub fn lowercase(self) -> Self {
        self.with_decorator(lowercase_decorator())
    }

    /// Decorated terms of `text`, in document order.
    /// Without a decorator the terms borrow from `text`.
    pub fn terms<'a>(&'a self, text: &'a str) -> impl Iterator<Item = Cow<'a, str>> + 'a {
        self.tokenizer.tokenize(text).map(move |span| {
            let raw = span.as_str(text);
            match &self.decorator {
                Some(decorate) => Cow::Owned(decorate(raw)),
                None => Cow::Borrowed(raw),
            }
        })
    }

    /// Count the terms of one document.
    /// Terms keep the order of their first occurrence.
    pub fn term_frequency(&self, text: &str) -> TermFrequency {
        let mut freq = TermFrequency::new();
        for term in self.terms(text) {
            freq.add_term(&term);
        }
        freq
    }
}
