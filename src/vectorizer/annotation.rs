use std::{collections::HashMap, sync::Arc};

use ahash::RandomState;
use serde::{Deserialize, Serialize};

use crate::error::{FeaturizerError, Result};

/// term -> vocabulary index
pub type TermIndexMap = HashMap<String, u32, RandomState>;
/// term -> document frequency
pub type TermCountMap = HashMap<String, u32, RandomState>;
/// term -> (document frequency, vocabulary index)
pub type FrequencyAndIndexMap = HashMap<String, FrequencyAndIndex, RandomState>;

/// Frequency and vocabulary index of one term.
/// `frequency` is the number of training documents containing the term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrequencyAndIndex {
    pub frequency: u32,
    pub index: u32,
}

impl FrequencyAndIndex {
    #[inline]
    pub fn new(frequency: u32, index: u32) -> Self {
        Self { frequency, index }
    }
}

/// Finalized training statistics of one text column.
/// Immutable once built and shared behind an `Arc` through [`AnnotationMaps`].
/// Transformers copy out the maps they look terms up in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "AnnotationParts")]
pub struct DocumentStatisticsAnnotationData {
    term_frequency_and_index: FrequencyAndIndexMap,
    total_num_documents: u32,
}

/// Unchecked wire form, validated through `new`
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotationParts {
    term_frequency_and_index: FrequencyAndIndexMap,
    total_num_documents: u32,
}

impl TryFrom<AnnotationParts> for DocumentStatisticsAnnotationData {
    type Error = FeaturizerError;

    fn try_from(parts: AnnotationParts) -> Result<Self> {
        Self::new(parts.term_frequency_and_index, parts.total_num_documents)
    }
}

impl DocumentStatisticsAnnotationData {
    /// Both parts must be empty together or non-empty together.
    pub fn new(
        term_frequency_and_index: FrequencyAndIndexMap,
        total_num_documents: u32,
    ) -> Result<Self> {
        if total_num_documents == 0 && !term_frequency_and_index.is_empty() {
            return Err(FeaturizerError::invalid_argument("totalNumDocuments"));
        }
        if total_num_documents > 0 && term_frequency_and_index.is_empty() {
            return Err(FeaturizerError::invalid_argument("termFrequencyAndIndex"));
        }
        Ok(Self {
            term_frequency_and_index,
            total_num_documents,
        })
    }

    #[inline]
    pub fn term_frequency_and_index(&self) -> &FrequencyAndIndexMap {
        &self.term_frequency_and_index
    }

    #[inline]
    pub fn total_num_documents(&self) -> u32 {
        self.total_num_documents
    }

    /// number of vocabulary terms
    #[inline]
    pub fn len(&self) -> usize {
        self.term_frequency_and_index.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.term_frequency_and_index.is_empty()
    }

    #[inline]
    pub fn get(&self, term: &str) -> Option<FrequencyAndIndex> {
        self.term_frequency_and_index.get(term).copied()
    }

    /// Split out the term -> index half
    pub fn index_map(&self) -> TermIndexMap {
        self.term_frequency_and_index
            .iter()
            .map(|(term, entry)| (term.clone(), entry.index))
            .collect()
    }

    /// Split out the term -> document frequency half
    pub fn document_frequency_map(&self) -> TermCountMap {
        self.term_frequency_and_index
            .iter()
            .map(|(term, entry)| (term.clone(), entry.frequency))
            .collect()
    }
}

/// Annotations published during one training run, per input column.
///
/// Estimators write finalized statistics here and downstream estimators read
/// them back by column index and publisher name. The store is handed to
/// `complete_training` and `create_transformer` explicitly; nothing is global.
#[derive(Debug, Clone, Default)]
pub struct AnnotationMaps {
    columns: Vec<HashMap<String, Arc<DocumentStatisticsAnnotationData>>>,
}

impl AnnotationMaps {
    pub fn new(num_columns: usize) -> Self {
        Self {
            columns: vec![HashMap::new(); num_columns],
        }
    }

    #[inline]
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Fails on an out-of-range column, naming `colIndex`
    pub fn check_column(&self, col_index: usize) -> Result<()> {
        if col_index >= self.columns.len() {
            return Err(FeaturizerError::invalid_argument(format!(
                "colIndex: {col_index} is out of range for {} column(s)",
                self.columns.len()
            )));
        }
        Ok(())
    }

    /// Publish `data` for a column. A later publish by the same name replaces it.
    pub fn publish(
        &mut self,
        col_index: usize,
        name: &str,
        data: Arc<DocumentStatisticsAnnotationData>,
    ) -> Result<()> {
        self.check_column(col_index)?;
        self.columns[col_index].insert(name.to_string(), data);
        Ok(())
    }

    pub fn get(&self, col_index: usize, name: &str) -> Result<Arc<DocumentStatisticsAnnotationData>> {
        self.check_column(col_index)?;
        self.columns[col_index]
            .get(name)
            .cloned()
            .ok_or_else(|| {
                FeaturizerError::not_finished(format!(
                    "no annotation from {name} for column {col_index}"
                ))
            })
    }
}
