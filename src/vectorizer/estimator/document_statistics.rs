use std::sync::Arc;

use crate::{
    error::{FeaturizerError, Result},
    vectorizer::{
        annotation::{AnnotationMaps, DocumentStatisticsAnnotationData},
        config::DocumentStatisticsConfig,
        estimator::{ensure_training, Estimator, FitResult, TrainingState},
        token::TextAnalyzer,
        vocabulary::VocabularyBuilder,
    },
};

/// Collects vocabulary statistics of one text column.
///
/// Every document is tokenized and decorated by the analyzer, counted, and
/// folded into a [`VocabularyBuilder`]. On completion the finalized
/// [`DocumentStatisticsAnnotationData`] is published under
/// [`DocumentStatisticsEstimator::NAME`] for the column.
#[derive(Debug)]
pub struct DocumentStatisticsEstimator {
    col_index: usize,
    analyzer: TextAnalyzer,
    builder: VocabularyBuilder,
    state: TrainingState,
    num_items: usize,
    data: Option<Arc<DocumentStatisticsAnnotationData>>,
}

impl DocumentStatisticsEstimator {
    pub const NAME: &'static str = "DocumentStatisticsEstimator";

    pub fn new(
        annotations: &AnnotationMaps,
        col_index: usize,
        analyzer: TextAnalyzer,
        config: DocumentStatisticsConfig,
    ) -> Result<Self> {
        annotations.check_column(col_index)?;
        Ok(Self {
            col_index,
            analyzer,
            builder: VocabularyBuilder::new(config)?,
            state: TrainingState::Training,
            num_items: 0,
            data: None,
        })
    }

    #[inline]
    pub fn col_index(&self) -> usize {
        self.col_index
    }

    #[inline]
    pub fn analyzer(&self) -> &TextAnalyzer {
        &self.analyzer
    }

    /// documents consumed so far
    #[inline]
    pub fn num_items(&self) -> usize {
        self.num_items
    }

    /// Annotation produced by this estimator
    pub fn get_annotation_data(&self) -> Result<Arc<DocumentStatisticsAnnotationData>> {
        self.data.clone().ok_or_else(|| {
            FeaturizerError::not_finished(format!("{} has not completed training", Self::NAME))
        })
    }

    /// Annotation published for `col_index` by any instance
    pub fn get_annotation_data_from(
        annotations: &AnnotationMaps,
        col_index: usize,
    ) -> Result<Arc<DocumentStatisticsAnnotationData>> {
        annotations.get(col_index, Self::NAME)
    }

    fn limit_reached(&self) -> bool {
        self.builder
            .config()
            .max_num_training_items
            .is_some_and(|max| self.num_items >= max)
    }
}

impl Estimator for DocumentStatisticsEstimator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn state(&self) -> TrainingState {
        self.state
    }

    fn fit(&mut self, batch: &[&str]) -> Result<FitResult> {
        ensure_training(Self::NAME, self.state)?;
        for doc in batch {
            if self.limit_reached() {
                break;
            }
            let freq = self.analyzer.term_frequency(doc);
            self.builder.add_document(&freq);
            self.num_items += 1;
        }
        if self.limit_reached() {
            log::debug!("{}: training item limit {} reached", Self::NAME, self.num_items);
            return Ok(FitResult::Complete);
        }
        Ok(FitResult::Continue)
    }

    fn complete_training(&mut self, annotations: &mut AnnotationMaps) -> Result<()> {
        ensure_training(Self::NAME, self.state)?;
        let data = Arc::new(self.builder.finalize()?);
        annotations.publish(self.col_index, Self::NAME, Arc::clone(&data))?;
        log::info!(
            "{}: column {} vocabulary of {} term(s) over {} document(s)",
            Self::NAME,
            self.col_index,
            data.len(),
            data.total_num_documents()
        );
        self.data = Some(data);
        self.state = TrainingState::Finished;
        Ok(())
    }
}
