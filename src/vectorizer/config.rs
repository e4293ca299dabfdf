//! Construction parameters for the featurizers.
//!
//! All configs are plain serde structs with defaults, so they can be built in
//! code with the `with_*` methods or loaded from JSON/CBOR. Field names use
//! camelCase on the wire (`minDf`, `useIdf`, ...).

use serde::{Deserialize, Serialize};

use crate::{
    error::{FeaturizerError, Result},
    utils::math::vector::Norm,
    vectorizer::annotation::TermIndexMap,
};

/// Parameters of the vocabulary builder / document statistics estimator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DocumentStatisticsConfig {
    /// Fixed term ids. Surviving terms found here keep these ids.
    pub existing_vocabulary: Option<TermIndexMap>,
    /// Keep only this many terms, highest total frequency first
    pub max_features: Option<u32>,
    /// Lower document-frequency bound, fraction of documents
    pub min_df: f32,
    /// Upper document-frequency bound, fraction of documents
    pub max_df: f32,
    /// Stop consuming documents after this many
    pub max_num_training_items: Option<usize>,
}

impl Default for DocumentStatisticsConfig {
    fn default() -> Self {
        Self {
            existing_vocabulary: None,
            max_features: None,
            min_df: 0.0,
            max_df: 1.0,
            max_num_training_items: None,
        }
    }
}

impl DocumentStatisticsConfig {
    pub fn with_existing_vocabulary(self, vocabulary: TermIndexMap) -> Self {
        Self {
            existing_vocabulary: Some(vocabulary),
            ..self
        }
    }

    pub fn with_max_features(self, max_features: u32) -> Self {
        Self {
            max_features: Some(max_features),
            ..self
        }
    }

    pub fn with_document_frequency(self, min_df: f32, max_df: f32) -> Self {
        Self {
            min_df,
            max_df,
            ..self
        }
    }

    pub fn with_max_num_training_items(self, max_items: usize) -> Self {
        Self {
            max_num_training_items: Some(max_items),
            ..self
        }
    }

    /// Check every parameter, failing on the first bad one
    pub fn validate(&self) -> Result<()> {
        if let Some(vocabulary) = &self.existing_vocabulary {
            if vocabulary.is_empty() {
                return Err(FeaturizerError::invalid_argument("existingVocabulary"));
            }
        }
        if self.max_features == Some(0) {
            return Err(FeaturizerError::invalid_argument("maxFeatures"));
        }
        // NaN fails both range checks
        if !(self.min_df >= 0.0 && self.min_df <= 1.0) {
            return Err(FeaturizerError::invalid_argument("minDf"));
        }
        if !(self.max_df >= 0.0 && self.max_df <= 1.0) {
            return Err(FeaturizerError::invalid_argument("maxDf"));
        }
        if self.min_df > self.max_df {
            return Err(FeaturizerError::invalid_argument("minDf > maxDf"));
        }
        if self.max_num_training_items == Some(0) {
            return Err(FeaturizerError::invalid_argument("maxNumTrainingItems"));
        }
        Ok(())
    }

    /// Inclusive document-count bounds for `doc_num` documents.
    /// A term survives iff `min_df * doc_num <= df <= max_df * doc_num`.
    pub fn df_bounds(&self, doc_num: u64) -> (u64, u64) {
        let lower = if self.min_df <= 0.0 {
            0
        } else {
            scale(self.min_df, doc_num).ceil() as u64
        };
        let upper = if self.max_df >= 1.0 {
            doc_num
        } else {
            (scale(self.max_df, doc_num).floor() as u64).min(doc_num)
        };
        (lower, upper)
    }
}

// f32 while the count is exact in it (so `0.1 * 10 == 1`), f64 past 2^24
fn scale(fraction: f32, doc_num: u64) -> f64 {
    const F32_EXACT: u64 = 1 << f32::MANTISSA_DIGITS;
    if doc_num <= F32_EXACT {
        f64::from(fraction * doc_num as f32)
    } else {
        f64::from(fraction) * doc_num as f64
    }
}

/// Parameters of the count vectorizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CountConfig {
    /// Emit 1 for every present term instead of its count
    pub binary: bool,
}

impl CountConfig {
    pub fn with_binary(self, binary: bool) -> Self {
        Self { binary }
    }
}

/// Parameters of the TF-IDF vectorizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TfidfConfig {
    /// tf is 1 for every present term
    pub binary: bool,
    pub norm: Norm,
    pub use_idf: bool,
    /// add one to document frequencies, as if an extra document held every term
    pub smooth_idf: bool,
    /// tf is `1 + ln(count)`
    pub sublinear_tf: bool,
}

impl Default for TfidfConfig {
    fn default() -> Self {
        Self {
            binary: false,
            norm: Norm::L2,
            use_idf: true,
            smooth_idf: true,
            sublinear_tf: false,
        }
    }
}

impl TfidfConfig {
    pub fn with_binary(self, binary: bool) -> Self {
        Self { binary, ..self }
    }

    pub fn with_norm(self, norm: Norm) -> Self {
        Self { norm, ..self }
    }

    /// Norm given by name, `"l1"` or `"l2"`
    pub fn with_norm_str(self, norm: &str) -> Result<Self> {
        Ok(Self {
            norm: norm.parse()?,
            ..self
        })
    }

    pub fn with_use_idf(self, use_idf: bool) -> Self {
        Self { use_idf, ..self }
    }

    pub fn with_smooth_idf(self, smooth_idf: bool) -> Self {
        Self { smooth_idf, ..self }
    }

    pub fn with_sublinear_tf(self, sublinear_tf: bool) -> Self {
        Self {
            sublinear_tf,
            ..self
        }
    }
}
