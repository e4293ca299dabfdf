use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    utils::math::vector::Norm,
    vectorizer::{
        annotation::{TermCountMap, TermIndexMap},
        config::{CountConfig, TfidfConfig},
        count::CountVectorizerTransformer,
        tfidf::{TfidfEngine, TfidfVectorizerTransformer},
        token::TextAnalyzer,
    },
};

/// Serializable state of a [`TfidfVectorizerTransformer`].
///
/// Scalars come first in a fixed order, then the vocabulary and the document
/// frequencies. The maps are ordered by term so encoding is deterministic.
/// The analyzer is not part of the state and has to be supplied again by
/// [`TfidfData::into_transformer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TfidfData {
    pub total_num_documents: u32,
    pub binary: bool,
    pub norm: Norm,
    pub use_idf: bool,
    pub smooth_idf: bool,
    pub sublinear_tf: bool,
    pub labels: BTreeMap<String, u32>,
    pub document_freq: BTreeMap<String, u32>,
}

impl TfidfData {
    pub fn config(&self) -> TfidfConfig {
        TfidfConfig {
            binary: self.binary,
            norm: self.norm,
            use_idf: self.use_idf,
            smooth_idf: self.smooth_idf,
            sublinear_tf: self.sublinear_tf,
        }
    }

    /// CBOR encoding
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_cbor::to_vec(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_cbor::from_slice(bytes)?)
    }

    /// Rebuild a transformer with the default engine. Validation is the
    /// same as for a freshly trained one.
    pub fn into_transformer(self, analyzer: TextAnalyzer) -> Result<TfidfVectorizerTransformer> {
        TfidfVectorizerTransformer::from_data(self, analyzer)
    }
}

impl<E> TfidfVectorizerTransformer<E>
where
    E: TfidfEngine,
{
    pub fn to_data(&self) -> TfidfData {
        let config = self.config();
        TfidfData {
            total_num_documents: self.total_num_documents(),
            binary: config.binary,
            norm: config.norm,
            use_idf: config.use_idf,
            smooth_idf: config.smooth_idf,
            sublinear_tf: config.sublinear_tf,
            labels: sorted(self.labels()),
            document_freq: sorted(self.document_freq()),
        }
    }

    pub fn from_data(data: TfidfData, analyzer: TextAnalyzer) -> Result<Self> {
        let config = data.config();
        Self::with_engine(
            data.labels.into_iter().collect::<TermIndexMap>(),
            data.document_freq.into_iter().collect::<TermCountMap>(),
            data.total_num_documents,
            config,
            analyzer,
        )
    }

    /// Encode the transformer state as CBOR
    pub fn save(&self) -> Result<Vec<u8>> {
        self.to_data().to_bytes()
    }

    pub fn load(bytes: &[u8], analyzer: TextAnalyzer) -> Result<Self> {
        Self::from_data(TfidfData::from_bytes(bytes)?, analyzer)
    }
}

/// Serializable state of a [`CountVectorizerTransformer`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountData {
    pub binary: bool,
    pub labels: BTreeMap<String, u32>,
}

impl CountData {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_cbor::to_vec(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_cbor::from_slice(bytes)?)
    }

    pub fn into_transformer(self, analyzer: TextAnalyzer) -> Result<CountVectorizerTransformer> {
        CountVectorizerTransformer::new(
            self.labels.into_iter().collect(),
            CountConfig { binary: self.binary },
            analyzer,
        )
    }
}

impl CountVectorizerTransformer {
    pub fn to_data(&self) -> CountData {
        CountData {
            binary: self.binary(),
            labels: sorted(self.labels()),
        }
    }

    pub fn save(&self) -> Result<Vec<u8>> {
        self.to_data().to_bytes()
    }

    pub fn load(bytes: &[u8], analyzer: TextAnalyzer) -> Result<Self> {
        CountData::from_bytes(bytes)?.into_transformer(analyzer)
    }
}

fn sorted<'a, I>(map: I) -> BTreeMap<String, u32>
where
    I: IntoIterator<Item = (&'a String, &'a u32)>,
{
    map.into_iter().map(|(term, &value)| (term.clone(), value)).collect()
}
