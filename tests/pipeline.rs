use tf_idf_featurizer::{
    train, AnnotationMaps, CountConfig, CountVectorizerEstimator, DocumentStatisticsConfig,
    DocumentStatisticsEstimator, Estimator, FeaturizerError, Norm, TextAnalyzer, TfidfConfig, TfidfData,
    TfidfVectorizerEstimator, TfidfVectorizerTransformer, TrainingState, TransformerEstimator,
};

const CORPUS: [&str; 4] = [
    "This is the first document",
    "this document is the SECOND document",
    "And this is the third one",
    "Is this the first document",
];

fn sorted_pairs(vec: &tf_idf_featurizer::SparseVec<f32>) -> Vec<(u32, f32)> {
    let mut vec = vec.clone();
    vec.sort_by_index();
    vec.into_pairs()
}

fn trained_tfidf(annotations: &mut AnnotationMaps, col: usize, config: TfidfConfig) -> TfidfVectorizerTransformer {
    let mut est = TfidfVectorizerEstimator::new(
        annotations,
        col,
        TextAnalyzer::new().lowercase(),
        DocumentStatisticsConfig::default(),
        config,
    )
    .unwrap();
    // two batches, fed in order
    train(&mut est, &[&CORPUS[..2], &CORPUS[2..]], annotations).unwrap();
    assert_eq!(est.state(), TrainingState::Finished);
    est.create_transformer(annotations).unwrap()
}

#[test]
fn tfidf_end_to_end_with_lowercase() {
    let mut annotations = AnnotationMaps::new(1);
    let transformer = trained_tfidf(&mut annotations, 0, TfidfConfig::default());

    let out = transformer.transform("THIS is the first DOCUMENT").unwrap();
    let expected = [(1, 0.469791), (2, 0.580286), (3, 0.384085), (6, 0.384085), (8, 0.384085)];
    assert_eq!(out.len(), expected.len());
    for ((ai, av), (ei, ev)) in sorted_pairs(&out).into_iter().zip(expected) {
        assert_eq!(ai, ei);
        assert!((av - ev).abs() < 1e-6, "index {ai}: {av} vs {ev}");
    }

    let stats = DocumentStatisticsEstimator::get_annotation_data_from(&annotations, 0).unwrap();
    assert_eq!(stats.total_num_documents(), 4);
    assert_eq!(stats.get("second").map(|e| e.frequency), Some(1));
    assert_eq!(stats.get("is").map(|e| e.frequency), Some(4));
}

#[test]
fn columns_are_trained_independently() {
    let mut annotations = AnnotationMaps::new(2);
    let tfidf = trained_tfidf(&mut annotations, 0, TfidfConfig::default());

    let mut count = CountVectorizerEstimator::new(
        &annotations,
        1,
        TextAnalyzer::new(),
        DocumentStatisticsConfig::default(),
        CountConfig::default(),
    )
    .unwrap();
    train(&mut count, &[["x y", "y z"]], &mut annotations).unwrap();
    let count = count.create_transformer(&annotations).unwrap();

    assert_eq!(tfidf.labels().len(), 9);
    assert_eq!(count.labels().len(), 3);
    assert_eq!(count.transform("z z document").into_pairs(), vec![(2, 2)]);
    assert_eq!(
        DocumentStatisticsEstimator::get_annotation_data_from(&annotations, 1)
            .unwrap()
            .total_num_documents(),
        2
    );
}

#[test]
fn persisted_state_transforms_identically() {
    let mut annotations = AnnotationMaps::new(1);
    let transformer = trained_tfidf(
        &mut annotations,
        0,
        TfidfConfig::default().with_norm(Norm::L1).with_sublinear_tf(true),
    );

    let bytes = transformer.to_data().to_bytes().unwrap();
    let restored = TfidfData::from_bytes(&bytes)
        .unwrap()
        .into_transformer(TextAnalyzer::new().lowercase())
        .unwrap();

    assert_eq!(restored.config(), transformer.config());
    for doc in CORPUS {
        assert_eq!(restored.transform(doc).unwrap(), transformer.transform(doc).unwrap());
    }
}

#[test]
fn existing_vocabulary_ids_survive_training() {
    let existing = [("document", 100u32), ("this", 200)]
        .into_iter()
        .map(|(t, i)| (t.to_string(), i))
        .collect();
    let mut annotations = AnnotationMaps::new(1);
    let mut est = CountVectorizerEstimator::new(
        &annotations,
        0,
        TextAnalyzer::new().lowercase(),
        DocumentStatisticsConfig::default()
            .with_existing_vocabulary(existing)
            .with_document_frequency(0.5, 1.0),
        CountConfig::default(),
    )
    .unwrap();
    train(&mut est, &[CORPUS], &mut annotations).unwrap();
    let transformer = est.create_transformer(&annotations).unwrap();

    // survivors (df >= 2): document first is the this
    let labels = transformer.labels();
    assert_eq!(labels.len(), 5);
    assert_eq!(labels.get("document"), Some(&100));
    assert_eq!(labels.get("this"), Some(&200));
    assert_eq!(labels.get("first"), Some(&1));
    assert_eq!(labels.get("is"), Some(&2));
    assert_eq!(labels.get("the"), Some(&3));
}

#[test]
fn invalid_configuration_fails_fast() {
    let annotations = AnnotationMaps::new(1);
    let err = TfidfVectorizerEstimator::new(
        &annotations,
        0,
        TextAnalyzer::new(),
        DocumentStatisticsConfig::default().with_document_frequency(0.9, 0.1),
        TfidfConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, FeaturizerError::InvalidArgument(ref name) if name == "minDf > maxDf"));

    assert!(TfidfConfig::default().with_norm_str("l0").is_err());
}

#[test]
fn empty_corpus_cannot_complete() {
    let mut annotations = AnnotationMaps::new(1);
    let mut est = TfidfVectorizerEstimator::new(
        &annotations,
        0,
        TextAnalyzer::new(),
        DocumentStatisticsConfig::default(),
        TfidfConfig::default(),
    )
    .unwrap();
    let err = train(&mut est, &[["", "   "]], &mut annotations).unwrap_err();
    assert!(matches!(err, FeaturizerError::EmptyResult(_)));
    assert!(matches!(est.create_transformer(&annotations), Err(FeaturizerError::NotFinished(_))));
}
