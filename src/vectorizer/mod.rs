pub mod annotation;
pub mod config;
pub mod corpus;
pub mod count;
pub mod estimator;
pub mod serde;
pub mod term;
pub mod tfidf;
pub mod token;
pub mod vocabulary;

pub use annotation::{AnnotationMaps, DocumentStatisticsAnnotationData, FrequencyAndIndex};
pub use config::{CountConfig, DocumentStatisticsConfig, TfidfConfig};
pub use count::{CountVectorizerEstimator, CountVectorizerEstimatorImpl, CountVectorizerTransformer};
pub use estimator::{
    train, DocumentStatisticsEstimator, Estimator, FitResult, PipelineEstimator, TrainingState,
    TransformerEstimator,
};
pub use tfidf::{
    DefaultTfidfEngine, TfidfEngine, TfidfVectorizerEstimator, TfidfVectorizerEstimatorImpl,
    TfidfVectorizerTransformer,
};
pub use token::TextAnalyzer;
