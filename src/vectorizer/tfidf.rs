use std::marker::PhantomData;

use rayon::prelude::*;

use crate::{
    error::{FeaturizerError, Result},
    utils::math::vector::SparseVec,
    vectorizer::{
        annotation::{AnnotationMaps, DocumentStatisticsAnnotationData, TermCountMap, TermIndexMap},
        config::{DocumentStatisticsConfig, TfidfConfig},
        estimator::{
            ensure_finished, ensure_training, DocumentStatisticsEstimator, Estimator, FitResult,
            PipelineEstimator, TrainingState, TransformerEstimator,
        },
        token::TextAnalyzer,
    },
};

/// TF and IDF weighting used by [`TfidfVectorizerTransformer`].
/// The weight of a term is `tf * idf`; normalization happens afterwards.
pub trait TfidfEngine: Send + Sync {
    /// Term weight of a term seen `count` times in the document
    fn tf(count: u32, config: &TfidfConfig) -> f32;
    /// Inverse document frequency of a term found in `document_frequency`
    /// out of `total_num_documents` training documents
    fn idf(total_num_documents: u32, document_frequency: u32, config: &TfidfConfig) -> f32;
}

/// Default engine
/// - tf: `1` when binary, `1 + ln(c)` when sublinear, else `c`
/// - idf: `1 + ln((1 + N) / (1 + df))` smoothed, `1 + ln((1 + N) / df)` otherwise
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTfidfEngine;

impl DefaultTfidfEngine {
    pub fn new() -> Self {
        DefaultTfidfEngine
    }
}

impl TfidfEngine for DefaultTfidfEngine {
    #[inline]
    fn tf(count: u32, config: &TfidfConfig) -> f32 {
        if config.binary {
            1.0
        } else if config.sublinear_tf {
            1.0 + (count as f32).ln()
        } else {
            count as f32
        }
    }

    #[inline]
    fn idf(total_num_documents: u32, document_frequency: u32, config: &TfidfConfig) -> f32 {
        if !config.use_idf {
            return 1.0;
        }
        let n = total_num_documents as f32;
        let df = document_frequency as f32;
        if config.smooth_idf {
            1.0 + ((1.0 + n) / (1.0 + df)).ln()
        } else {
            1.0 + ((1.0 + n) / df).ln()
        }
    }
}

/// Maps a document to normalized TF-IDF weights over a fixed vocabulary.
///
/// Holds the vocabulary, the document frequency of every vocabulary term and
/// the number of training documents. Entries come out in first-occurrence
/// order; call [`SparseVec::sort_by_index`] for index order.
#[derive(Debug, Clone)]
pub struct TfidfVectorizerTransformer<E = DefaultTfidfEngine>
where
    E: TfidfEngine,
{
    labels: TermIndexMap,
    document_freq: TermCountMap,
    total_num_documents: u32,
    config: TfidfConfig,
    analyzer: TextAnalyzer,
    _marker: PhantomData<E>,
}

impl TfidfVectorizerTransformer {
    /// Transformer with the default engine
    pub fn new(
        labels: TermIndexMap,
        document_freq: TermCountMap,
        total_num_documents: u32,
        config: TfidfConfig,
        analyzer: TextAnalyzer,
    ) -> Result<Self> {
        Self::with_engine(labels, document_freq, total_num_documents, config, analyzer)
    }
}

impl<E> TfidfVectorizerTransformer<E>
where
    E: TfidfEngine,
{
    /// Every vocabulary term needs a document frequency.
    pub fn with_engine(
        labels: TermIndexMap,
        document_freq: TermCountMap,
        total_num_documents: u32,
        config: TfidfConfig,
        analyzer: TextAnalyzer,
    ) -> Result<Self> {
        if labels.is_empty() {
            return Err(FeaturizerError::invalid_argument("indexMap"));
        }
        if document_freq.is_empty() {
            return Err(FeaturizerError::invalid_argument("documentFrequency"));
        }
        if let Some(term) = labels.keys().find(|term| !document_freq.contains_key(*term)) {
            return Err(FeaturizerError::invalid_argument(format!(
                "documentFrequency: missing term {term:?}"
            )));
        }
        Ok(Self {
            labels,
            document_freq,
            total_num_documents,
            config,
            analyzer,
            _marker: PhantomData,
        })
    }

    /// Copies the vocabulary and document frequencies out of `data`, so the
    /// transformer outlives the training run and can be persisted on its own.
    pub fn from_annotation(
        data: &DocumentStatisticsAnnotationData,
        config: TfidfConfig,
        analyzer: TextAnalyzer,
    ) -> Result<Self> {
        Self::with_engine(
            data.index_map(),
            data.document_frequency_map(),
            data.total_num_documents(),
            config,
            analyzer,
        )
    }

    #[inline]
    pub fn labels(&self) -> &TermIndexMap {
        &self.labels
    }

    #[inline]
    pub fn document_freq(&self) -> &TermCountMap {
        &self.document_freq
    }

    #[inline]
    pub fn total_num_documents(&self) -> u32 {
        self.total_num_documents
    }

    #[inline]
    pub fn config(&self) -> &TfidfConfig {
        &self.config
    }

    #[inline]
    pub fn analyzer(&self) -> &TextAnalyzer {
        &self.analyzer
    }

    /// Weight and normalize the vocabulary terms of `doc`.
    /// Fails with `EmptyDocument` when no term is in the vocabulary or the
    /// weights have a zero norm.
    pub fn transform(&self, doc: &str) -> Result<SparseVec<f32>> {
        let freq = self.analyzer.term_frequency(doc);
        let mut out = SparseVec::with_capacity(freq.term_num());
        for (term, count) in freq.iter() {
            let Some(&index) = self.labels.get(term) else {
                log::trace!("dropping unknown term {term:?}");
                continue;
            };
            let df = self.document_freq.get(term).copied().ok_or_else(|| {
                FeaturizerError::invalid_argument(format!("documentFrequency: missing term {term:?}"))
            })?;
            let count = u32::try_from(count).unwrap_or(u32::MAX);
            let weight = E::tf(count, &self.config) * E::idf(self.total_num_documents, df, &self.config);
            out.push(index, weight);
        }
        if out.is_empty() {
            return Err(FeaturizerError::EmptyDocument);
        }

        let norm = out.norm(self.config.norm);
        // zero weights (or NaN from a custom engine) leave nothing to normalize
        if !(norm > 0.0) {
            return Err(FeaturizerError::EmptyDocument);
        }
        out.div_scalar(norm);
        Ok(out)
    }

    /// Transform documents in parallel. Each document fails or succeeds on its own.
    pub fn transform_batch(&self, docs: &[&str]) -> Vec<Result<SparseVec<f32>>> {
        docs.par_iter().map(|doc| self.transform(doc)).collect()
    }
}

/// Tail stage of [`TfidfVectorizerEstimator`]. Reads the statistics published
/// by [`DocumentStatisticsEstimator`] for its column.
#[derive(Debug)]
pub struct TfidfVectorizerEstimatorImpl<E = DefaultTfidfEngine>
where
    E: TfidfEngine,
{
    col_index: usize,
    config: TfidfConfig,
    analyzer: TextAnalyzer,
    state: TrainingState,
    _marker: PhantomData<E>,
}

impl<E> TfidfVectorizerEstimatorImpl<E>
where
    E: TfidfEngine,
{
    pub const NAME: &'static str = "TfidfVectorizerEstimatorImpl";

    pub fn new(
        annotations: &AnnotationMaps,
        col_index: usize,
        config: TfidfConfig,
        analyzer: TextAnalyzer,
    ) -> Result<Self> {
        annotations.check_column(col_index)?;
        Ok(Self {
            col_index,
            config,
            analyzer,
            state: TrainingState::Training,
            _marker: PhantomData,
        })
    }
}

impl<E> Estimator for TfidfVectorizerEstimatorImpl<E>
where
    E: TfidfEngine,
{
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

impl<E> TransformerEstimator for TfidfVectorizerEstimatorImpl<E>
where
    E: TfidfEngine,
{
    type Transformer = TfidfVectorizerTransformer<E>;

    fn create_transformer(&self, annotations: &AnnotationMaps) -> Result<TfidfVectorizerTransformer<E>> {
        ensure_finished(Self::NAME, self.state)?;
        let data = DocumentStatisticsEstimator::get_annotation_data_from(annotations, self.col_index)?;
        TfidfVectorizerTransformer::from_annotation(&data, self.config, self.analyzer.clone())
    }
}

/// Document statistics followed by TF-IDF vectorization with the default engine
pub type TfidfVectorizerEstimator = PipelineEstimator<DocumentStatisticsEstimator, TfidfVectorizerEstimatorImpl>;

impl<E> PipelineEstimator<DocumentStatisticsEstimator, TfidfVectorizerEstimatorImpl<E>>
where
    E: TfidfEngine + 'static,
{
    pub const NAME: &'static str = "TfidfVectorizerEstimator";

    pub fn new(
        annotations: &AnnotationMaps,
        col_index: usize,
        analyzer: TextAnalyzer,
        statistics: DocumentStatisticsConfig,
        config: TfidfConfig,
    ) -> Result<Self> {
        let head = DocumentStatisticsEstimator::new(annotations, col_index, analyzer.clone(), statistics)?;
        Ok(Self::from_stages(Self::NAME, head, move |annotations: &AnnotationMaps| {
            TfidfVectorizerEstimatorImpl::new(annotations, col_index, config, analyzer)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{utils::math::vector::Norm, vectorizer::estimator::train};

    const CORPUS: [&str; 4] = [
        "this is the first document",
        "this document is the second document",
        "and this is the third one",
        "is this the first document",
    ];

    fn assert_close(actual: &SparseVec<f32>, expected: &[(u32, f32)]) {
        let mut actual = actual.clone();
        actual.sort_by_index();
        let actual = actual.into_pairs();
        assert_eq!(actual.len(), expected.len(), "{actual:?}");
        for ((ai, av), (ei, ev)) in actual.iter().zip(expected) {
            assert_eq!(ai, ei);
            assert!((av - ev).abs() < 1e-6, "index {ai}: {av} vs {ev}");
        }
    }

    fn trained(config: TfidfConfig) -> TfidfVectorizerTransformer {
        let mut maps = AnnotationMaps::new(1);
        let mut est = TfidfVectorizerEstimator::new(
            &maps,
            0,
            TextAnalyzer::new(),
            DocumentStatisticsConfig::default(),
            config,
        )
        .unwrap();
        train(&mut est, &[CORPUS], &mut maps).unwrap();
        est.create_transformer(&maps).unwrap()
    }

    #[test]
    fn vocabulary_is_lexicographic() {
        let transformer = trained(TfidfConfig::default());
        let mut terms: Vec<(&str, u32)> = transformer.labels().iter().map(|(t, &i)| (t.as_str(), i)).collect();
        terms.sort_by_key(|&(_, i)| i);
        assert_eq!(
            terms,
            vec![
                ("and", 0),
                ("document", 1),
                ("first", 2),
                ("is", 3),
                ("one", 4),
                ("second", 5),
                ("the", 6),
                ("third", 7),
                ("this", 8),
            ]
        );
        assert_eq!(transformer.total_num_documents(), 4);
        assert_eq!(transformer.document_freq().get("document"), Some(&3));
    }

    #[test]
    fn l2_weights() {
        let transformer = trained(TfidfConfig::default());
        assert_close(
            &transformer.transform(CORPUS[0]).unwrap(),
            &[(1, 0.469791), (2, 0.580286), (3, 0.384085), (6, 0.384085), (8, 0.384085)],
        );
        assert_close(
            &transformer.transform(CORPUS[1]).unwrap(),
            &[(1, 0.687624), (3, 0.281089), (5, 0.538648), (6, 0.281089), (8, 0.281089)],
        );
        assert_close(
            &transformer.transform(CORPUS[2]).unwrap(),
            &[
                (0, 0.511849),
                (3, 0.267104),
                (4, 0.511849),
                (6, 0.267104),
                (7, 0.511849),
                (8, 0.267104),
            ],
        );
    }

    #[test]
    fn l1_weights() {
        let transformer = trained(TfidfConfig::default().with_norm(Norm::L1));
        let out = transformer.transform(CORPUS[0]).unwrap();
        assert_close(
            &out,
            &[(1, 0.213315), (2, 0.263487), (3, 0.174399), (6, 0.174399), (8, 0.174399)],
        );
        let sum: f32 = out.values().iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
    }

    #[test]
    fn output_follows_first_occurrence() {
        let transformer = trained(TfidfConfig::default());
        let out = transformer.transform("the first this").unwrap();
        assert_eq!(out.indices(), &[6, 2, 8]);
    }

    #[test]
    fn default_engine_formulas() {
        let config = TfidfConfig::default();
        assert_eq!(DefaultTfidfEngine::tf(3, &config), 3.0);
        assert_eq!(DefaultTfidfEngine::tf(3, &config.with_binary(true)), 1.0);
        assert!((DefaultTfidfEngine::tf(3, &config.with_sublinear_tf(true)) - (1.0 + 3f32.ln())).abs() < 1e-6);
        // binary wins over sublinear
        assert_eq!(DefaultTfidfEngine::tf(3, &config.with_binary(true).with_sublinear_tf(true)), 1.0);

        assert!((DefaultTfidfEngine::idf(4, 3, &config) - (1.0 + (5f32 / 4.0).ln())).abs() < 1e-6);
        let raw = config.with_smooth_idf(false);
        assert!((DefaultTfidfEngine::idf(4, 3, &raw) - (1.0 + (5f32 / 3.0).ln())).abs() < 1e-6);
        assert_eq!(DefaultTfidfEngine::idf(4, 3, &config.with_use_idf(false)), 1.0);
    }

    #[test]
    fn without_idf_weights_are_normalized_counts() {
        let transformer = trained(TfidfConfig::default().with_use_idf(false));
        let out = transformer.transform("document this document").unwrap();
        let expected = 1.0 / 5f32.sqrt();
        assert_close(&out, &[(1, 2.0 * expected), (8, expected)]);
    }

    #[test]
    fn unknown_only_document_is_an_error() {
        let transformer = trained(TfidfConfig::default());
        assert!(matches!(transformer.transform("nothing known"), Err(FeaturizerError::EmptyDocument)));
        assert!(matches!(transformer.transform(""), Err(FeaturizerError::EmptyDocument)));
    }

    #[test]
    fn construction_validates_maps() {
        let labels: TermIndexMap = [("a".to_string(), 0)].into_iter().collect();
        let dfs: TermCountMap = [("a".to_string(), 1)].into_iter().collect();
        let config = TfidfConfig::default();

        let name = |r: Result<TfidfVectorizerTransformer>| match r {
            Err(FeaturizerError::InvalidArgument(name)) => name,
            other => panic!("unexpected {other:?}"),
        };
        assert_eq!(
            name(TfidfVectorizerTransformer::new(TermIndexMap::default(), dfs.clone(), 1, config, TextAnalyzer::new())),
            "indexMap"
        );
        assert_eq!(
            name(TfidfVectorizerTransformer::new(labels.clone(), TermCountMap::default(), 1, config, TextAnalyzer::new())),
            "documentFrequency"
        );
        let other: TermCountMap = [("b".to_string(), 1)].into_iter().collect();
        assert!(name(TfidfVectorizerTransformer::new(labels.clone(), other, 1, config, TextAnalyzer::new()))
            .starts_with("documentFrequency"));
        assert!(TfidfVectorizerTransformer::new(labels, dfs, 1, config, TextAnalyzer::new()).is_ok());
    }

    #[test]
    fn unknown_norm_name_is_rejected() {
        let err = TfidfConfig::default().with_norm_str("max").unwrap_err();
        assert!(err.to_string().contains("norm"));
    }

    #[test]
    fn batch_keeps_per_document_results() {
        let transformer = trained(TfidfConfig::default());
        let docs = ["this is", "unknown words", "the third one"];
        let batch = transformer.transform_batch(&docs);
        assert_eq!(batch.len(), 3);
        assert!(batch[0].is_ok());
        assert!(matches!(batch[1], Err(FeaturizerError::EmptyDocument)));
        assert_eq!(batch[2].as_ref().unwrap(), &transformer.transform(docs[2]).unwrap());
    }

    /// Plain term counts, no idf and no damping
    struct CountEngine;

    impl TfidfEngine for CountEngine {
        fn tf(count: u32, _config: &TfidfConfig) -> f32 {
            count as f32
        }

        fn idf(_total: u32, _df: u32, _config: &TfidfConfig) -> f32 {
            1.0
        }
    }

    /// Every term weighs nothing
    struct ZeroIdfEngine;

    impl TfidfEngine for ZeroIdfEngine {
        fn tf(count: u32, _config: &TfidfConfig) -> f32 {
            count as f32
        }

        fn idf(_total: u32, _df: u32, _config: &TfidfConfig) -> f32 {
            0.0
        }
    }

    #[test]
    fn zero_norm_is_an_error() {
        let labels: TermIndexMap = [("a".to_string(), 0)].into_iter().collect();
        let dfs: TermCountMap = [("a".to_string(), 1)].into_iter().collect();
        for norm in [Norm::L1, Norm::L2] {
            let transformer = TfidfVectorizerTransformer::<ZeroIdfEngine>::with_engine(
                labels.clone(),
                dfs.clone(),
                1,
                TfidfConfig::default().with_norm(norm),
                TextAnalyzer::new(),
            )
            .unwrap();
            assert!(matches!(transformer.transform("a a"), Err(FeaturizerError::EmptyDocument)));
        }
    }

    #[test]
    fn custom_engine_plugs_into_pipeline() {
        let mut maps = AnnotationMaps::new(1);
        let mut est = PipelineEstimator::<DocumentStatisticsEstimator, TfidfVectorizerEstimatorImpl<CountEngine>>::new(
            &maps,
            0,
            TextAnalyzer::new(),
            DocumentStatisticsConfig::default(),
            TfidfConfig::default().with_norm(Norm::L1),
        )
        .unwrap();
        train(&mut est, &[["a b b b"]], &mut maps).unwrap();
        let transformer = est.create_transformer(&maps).unwrap();
        assert_close(&transformer.transform("a b b b").unwrap(), &[(0, 0.25), (1, 0.75)]);
    }
}
