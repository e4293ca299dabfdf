use crate::{
    error::{FeaturizerError, Result},
    vectorizer::{
        annotation::{DocumentStatisticsAnnotationData, FrequencyAndIndex, FrequencyAndIndexMap},
        config::DocumentStatisticsConfig,
        corpus::Corpus,
        term::TermFrequency,
    },
};

/// Accumulates training statistics and turns them into a vocabulary.
///
/// Tracks, over every document fed so far:
/// - total occurrences of each term
/// - number of documents each term appears in
/// - number of documents
///
/// `finalize` applies the document-frequency bounds, the `max_features` cut
/// and index assignment, and never mutates the accumulated counts.
#[derive(Debug, Clone)]
pub struct VocabularyBuilder {
    config: DocumentStatisticsConfig,
    term_frequency: TermFrequency,
    corpus: Corpus,
}

impl VocabularyBuilder {
    /// Validates the config before any document is seen
    pub fn new(config: DocumentStatisticsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            term_frequency: TermFrequency::new(),
            corpus: Corpus::new(),
        })
    }

    #[inline]
    pub fn config(&self) -> &DocumentStatisticsConfig {
        &self.config
    }

    /// Add one document given its term counts
    pub fn add_document(&mut self, doc: &TermFrequency) {
        self.corpus.add_doc(doc);
        self.term_frequency.add_terms_from_freq(doc);
    }

    #[inline]
    pub fn doc_num(&self) -> u64 {
        self.corpus.get_doc_num()
    }

    /// Total occurrences of `term` across training documents
    #[inline]
    pub fn term_frequency(&self, term: &str) -> u64 {
        self.term_frequency.term_count(term)
    }

    /// Number of training documents containing `term`
    #[inline]
    pub fn document_frequency(&self, term: &str) -> u64 {
        self.corpus.get_term_count(term)
    }

    /// Build the annotation data.
    ///
    /// Surviving terms are sorted by term string and numbered by their rank;
    /// a term listed in the existing vocabulary takes that id instead.
    /// The two numberings are not checked against each other.
    pub fn finalize(&self) -> Result<DocumentStatisticsAnnotationData> {
        let doc_num = self.corpus.get_doc_num();
        if doc_num == 0 {
            return Err(FeaturizerError::empty_result(
                "totalNumDocuments: no training documents were processed",
            ));
        }
        let total_num_documents = u32::try_from(doc_num)
            .map_err(|_| FeaturizerError::invalid_argument("totalNumDocuments exceeds u32"))?;

        let (lower, upper) = self.config.df_bounds(doc_num);
        // (term, total frequency, document frequency)
        let mut survivors: Vec<(&str, u64, u64)> = self
            .corpus
            .iter()
            .filter(|&(_, df)| df >= lower && df <= upper)
            .map(|(term, df)| (term, self.term_frequency.term_count(term), df))
            .collect();
        log::debug!(
            "{} of {} terms within document frequency [{}, {}]",
            survivors.len(),
            self.corpus.vocab_size(),
            lower,
            upper
        );

        if let Some(max_features) = self.config.max_features {
            let max_features = max_features as usize;
            if survivors.len() > max_features {
                // hash order is arbitrary, break ties on the term itself
                survivors.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
                survivors.truncate(max_features);
            }
        }

        survivors.sort_unstable_by(|a, b| a.0.cmp(b.0));

        let existing = self.config.existing_vocabulary.as_ref();
        let mut term_frequency_and_index = FrequencyAndIndexMap::default();
        term_frequency_and_index.reserve(survivors.len());
        for (rank, (term, _, df)) in survivors.into_iter().enumerate() {
            let index = match existing.and_then(|vocabulary| vocabulary.get(term)) {
                Some(&index) => index,
                None => u32::try_from(rank)
                    .map_err(|_| FeaturizerError::invalid_argument("vocabulary exceeds u32"))?,
            };
            // df <= doc_num, which fits in u32
            term_frequency_and_index.insert(term.to_string(), FrequencyAndIndex::new(df as u32, index));
        }

        if term_frequency_and_index.is_empty() {
            return Err(FeaturizerError::empty_result(
                "termFrequencyAndIndex: no term survived filtering",
            ));
        }

        DocumentStatisticsAnnotationData::new(term_frequency_and_index, total_num_documents)
    }
}
