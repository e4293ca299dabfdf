use rayon::prelude::*;

use crate::{
    error::{FeaturizerError, Result},
    utils::math::vector::SparseVec,
    vectorizer::{
        annotation::{AnnotationMaps, DocumentStatisticsAnnotationData, TermIndexMap},
        config::{CountConfig, DocumentStatisticsConfig},
        estimator::{
            ensure_finished, ensure_training, DocumentStatisticsEstimator, Estimator, FitResult,
            PipelineEstimator, TrainingState, TransformerEstimator,
        },
        token::TextAnalyzer,
    },
};

/// Maps a document to per-term occurrence counts over a fixed vocabulary.
///
/// Entries come out in the order each term first occurs in the document.
/// Terms outside the vocabulary are dropped.
#[derive(Debug, Clone)]
pub struct CountVectorizerTransformer {
    labels: TermIndexMap,
    binary: bool,
    analyzer: TextAnalyzer,
}

impl CountVectorizerTransformer {
    pub fn new(labels: TermIndexMap, config: CountConfig, analyzer: TextAnalyzer) -> Result<Self> {
        if labels.is_empty() {
            return Err(FeaturizerError::invalid_argument("indexMap"));
        }
        Ok(Self {
            labels,
            binary: config.binary,
            analyzer,
        })
    }

    /// Copies the vocabulary out of `data`, so the transformer outlives the
    /// training run and can be persisted on its own.
    pub fn from_annotation(
        data: &DocumentStatisticsAnnotationData,
        config: CountConfig,
        analyzer: TextAnalyzer,
    ) -> Result<Self> {
        Self::new(data.index_map(), config, analyzer)
    }

    #[inline]
    pub fn labels(&self) -> &TermIndexMap {
        &self.labels
    }

    #[inline]
    pub fn binary(&self) -> bool {
        self.binary
    }

    #[inline]
    pub fn analyzer(&self) -> &TextAnalyzer {
        &self.analyzer
    }

    pub fn transform(&self, doc: &str) -> SparseVec<u32> {
        let freq = self.analyzer.term_frequency(doc);
        let mut out = SparseVec::with_capacity(freq.term_num());
        for (term, count) in freq.iter() {
            match self.labels.get(term) {
                Some(&index) => {
                    let value = if self.binary {
                        1
                    } else {
                        u32::try_from(count).unwrap_or(u32::MAX)
                    };
                    out.push(index, value);
                }
                None => log::trace!("dropping unknown term {term:?}"),
            }
        }
        out
    }

    /// Transform documents in parallel, output order follows `docs`
    pub fn transform_batch(&self, docs: &[&str]) -> Vec<SparseVec<u32>> {
        docs.par_iter().map(|doc| self.transform(doc)).collect()
    }
}

/// Tail stage of [`CountVectorizerEstimator`]. Learns nothing itself, it
/// reads the vocabulary published by [`DocumentStatisticsEstimator`].
#[derive(Debug)]
pub struct CountVectorizerEstimatorImpl {
    col_index: usize,
    config: CountConfig,
    analyzer: TextAnalyzer,
    state: TrainingState,
}

impl CountVectorizerEstimatorImpl {
    pub const NAME: &'static str = "CountVectorizerEstimatorImpl";

    pub fn new(
        annotations: &AnnotationMaps,
        col_index: usize,
        config: CountConfig,
        analyzer: TextAnalyzer,
    ) -> Result<Self> {
        annotations.check_column(col_index)?;
        Ok(Self {
            col_index,
            config,
            analyzer,
            state: TrainingState::Training,
        })
    }
}

impl Estimator for CountVectorizerEstimatorImpl {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn state(&self) -> TrainingState {
        self.state
    }

    fn fit(&mut self, _batch: &[&str]) -> Result<FitResult> {
        ensure_training(Self::NAME, self.state)?;
        Ok(FitResult::Complete)
    }

    fn complete_training(&mut self, _annotations: &mut AnnotationMaps) -> Result<()> {
        ensure_training(Self::NAME, self.state)?;
        self.state = TrainingState::Finished;
        Ok(())
    }
}

impl TransformerEstimator for CountVectorizerEstimatorImpl {
    type Transformer = CountVectorizerTransformer;

    fn create_transformer(&self, annotations: &AnnotationMaps) -> Result<CountVectorizerTransformer> {
        ensure_finished(Self::NAME, self.state)?;
        let data = DocumentStatisticsEstimator::get_annotation_data_from(annotations, self.col_index)?;
        CountVectorizerTransformer::from_annotation(&data, self.config, self.analyzer.clone())
    }
}

/// Document statistics followed by count vectorization
pub type CountVectorizerEstimator = PipelineEstimator<DocumentStatisticsEstimator, CountVectorizerEstimatorImpl>;

impl PipelineEstimator<DocumentStatisticsEstimator, CountVectorizerEstimatorImpl> {
    pub const NAME: &'static str = "CountVectorizerEstimator";

    pub fn new(
        annotations: &AnnotationMaps,
        col_index: usize,
        analyzer: TextAnalyzer,
        statistics: DocumentStatisticsConfig,
        config: CountConfig,
    ) -> Result<Self> {
        let head = DocumentStatisticsEstimator::new(annotations, col_index, analyzer.clone(), statistics)?;
        Ok(Self::from_stages(Self::NAME, head, move |annotations: &AnnotationMaps| {
            CountVectorizerEstimatorImpl::new(annotations, col_index, config, analyzer)
        }))
    }
}
