/// This crate turns raw text into sparse feature vectors in two phases:
/// training collects vocabulary statistics over a corpus, then a transformer
/// maps each document to term counts or TF-IDF weights over that vocabulary.
pub mod error;
pub mod vectorizer;
pub mod utils;

/// Error type shared by every operation
/// Messages name the offending parameter or map (`minDf`, `indexMap`, `colIndex` ...).
pub use error::{FeaturizerError, Result};

/// Text Analyzer
/// Splits a document into whitespace-separated terms and applies an optional
/// decorator (for example lowercasing) to each of them.
///
/// The same analyzer must be used for training and for transform, since the
/// vocabulary is keyed by decorated terms.
/// Tokenization is pluggable through the `Tokenizer` trait.
pub use vectorizer::token::{TextAnalyzer, Tokenizer, WhitespaceTokenizer};

/// Term Frequency structure
/// Counts the occurrences of each term within a document, keeping the order
/// in which terms first appear.
///
/// Used both for training statistics and for the per-document counts a
/// transformer weights.
pub use vectorizer::term::TermFrequency;

/// Corpus
/// Tracks the number of documents and, for each term, the number of
/// documents it appears in (document frequency).
///
/// It is the base data for IDF and for document-frequency filtering.
/// For per-document statistics, `TermFrequency` is more suitable.
pub use vectorizer::corpus::Corpus;

/// Vocabulary Builder
/// Accumulates term and document frequencies during training and finalizes
/// them into a vocabulary:
/// - terms outside the `[minDf, maxDf]` document-frequency window are dropped
/// - `maxFeatures` keeps the most frequent terms
/// - surviving terms are numbered in lexicographic order, unless an existing
///   vocabulary assigns them an id
pub use vectorizer::vocabulary::VocabularyBuilder;

/// Annotation data and the per-run annotation store
/// `DocumentStatisticsAnnotationData` is the finalized, immutable result of
/// training: each vocabulary term with its document frequency and index, plus
/// the number of training documents.
///
/// `AnnotationMaps` holds the annotations published during a training run,
/// keyed by column index and publisher name. It is passed explicitly to
/// `complete_training` and `create_transformer`.
pub use vectorizer::annotation::{AnnotationMaps, DocumentStatisticsAnnotationData, FrequencyAndIndex};

/// Configuration structs
/// Plain serde structs with defaults. They can be built with `with_*`
/// methods or loaded from JSON/CBOR with camelCase field names.
pub use vectorizer::config::{CountConfig, DocumentStatisticsConfig, TfidfConfig};

/// Estimator protocol
/// Estimators consume batches through `fit`, then `complete_training`
/// finalizes them. `train` drives the loop, honoring early completion and
/// restart requests.
///
/// `PipelineEstimator` chains a statistics stage and a transformer stage that
/// is built from what the first one published.
pub use vectorizer::estimator::{
    train, DocumentStatisticsEstimator, Estimator, FitResult, PipelineEstimator, TrainingState,
    TransformerEstimator,
};

/// Count Vectorizer
/// Maps a document to the occurrence count of each vocabulary term
/// (or 1 per present term in binary mode). Unknown terms are dropped.
///
/// `CountVectorizerEstimator` trains the vocabulary and produces a
/// `CountVectorizerTransformer`.
pub use vectorizer::count::{CountVectorizerEstimator, CountVectorizerEstimatorImpl, CountVectorizerTransformer};

/// TF-IDF Vectorizer
/// Maps a document to `tf * idf` weights over the vocabulary, normalized
/// with the l1 or l2 norm.
///
/// `TfidfVectorizerEstimator` trains the vocabulary and document frequencies
/// and produces a `TfidfVectorizerTransformer`.
///
/// # Engine
/// The TF and IDF formulas live behind the `TfidfEngine` trait.
/// `DefaultTfidfEngine` supports:
/// - raw, binary and sublinear tf
/// - smoothed, raw, or disabled idf
pub use vectorizer::tfidf::{
    DefaultTfidfEngine, TfidfEngine, TfidfVectorizerEstimator, TfidfVectorizerEstimatorImpl,
    TfidfVectorizerTransformer,
};

/// Persisted transformer state
/// `TfidfData` and `CountData` are serializable snapshots of a trained
/// transformer, encoded with CBOR through `to_bytes` / `from_bytes`.
///
/// The analyzer is not stored. Pass it again when restoring.
pub use vectorizer::serde::{CountData, TfidfData};

/// Sparse output vector and norm selection
/// Transformers return `SparseVec` entries as `(index, value)` pairs in
/// first-occurrence order.
pub use utils::math::vector::{Norm, SparseVec};
