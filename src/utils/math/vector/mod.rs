use std::{fmt, str::FromStr};

use num::Float;
use serde::{Deserialize, Serialize};

use crate::{
    error::{FeaturizerError, Result},
    utils::sort::radix_sort_u32_soa,
};

/// Vector norm used to normalize TF-IDF output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Norm {
    /// sum of absolute values
    #[serde(rename = "l1")]
    L1,
    /// square root of the sum of squares
    #[serde(rename = "l2")]
    #[default]
    L2,
}

impl Norm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Norm::L1 => "l1",
            Norm::L2 => "l2",
        }
    }
}

impl FromStr for Norm {
    type Err = FeaturizerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "l1" => Ok(Norm::L1),
            "l2" => Ok(Norm::L2),
            _ => Err(FeaturizerError::invalid_argument(format!(
                "norm: expected \"l1\" or \"l2\", got {s:?}"
            ))),
        }
    }
}

impl fmt::Display for Norm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sparse output vector
/// Holds `(index, value)` entries as two parallel arrays.
/// Entries stay in push order until [`SparseVec::sort_by_index`] is called.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseVec<N> {
    inds: Vec<u32>,
    vals: Vec<N>,
}

impl<N> Default for SparseVec<N> {
    fn default() -> Self {
        Self {
            inds: Vec::new(),
            vals: Vec::new(),
        }
    }
}

impl<N: Copy> SparseVec<N> {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            inds: Vec::with_capacity(cap),
            vals: Vec::with_capacity(cap),
        }
    }

    #[inline]
    pub fn push(&mut self, index: u32, value: N) {
        self.inds.push(index);
        self.vals.push(value);
    }

    /// number of stored entries
    #[inline]
    pub fn len(&self) -> usize {
        self.inds.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inds.is_empty()
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.inds
    }

    #[inline]
    pub fn values(&self) -> &[N] {
        &self.vals
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (u32, N)> + '_ {
        self.inds.iter().copied().zip(self.vals.iter().copied())
    }

    /// Value stored for `index`, first match wins
    pub fn get(&self, index: u32) -> Option<N> {
        self.inds
            .iter()
            .position(|&i| i == index)
            .map(|pos| self.vals[pos])
    }

    pub fn into_pairs(self) -> Vec<(u32, N)> {
        self.inds.into_iter().zip(self.vals).collect()
    }

    /// Reorder entries by ascending index (stable)
    pub fn sort_by_index(&mut self) -> &mut Self {
        radix_sort_u32_soa(&mut self.inds, &mut self.vals);
        self
    }
}

impl<N: Float> SparseVec<N> {
    /// Norm of the stored values, accumulated in push order
    pub fn norm(&self, norm: Norm) -> N {
        match norm {
            Norm::L1 => self.vals.iter().fold(N::zero(), |acc, &v| acc + v.abs()),
            Norm::L2 => self.vals.iter().fold(N::zero(), |acc, &v| acc + v * v).sqrt(),
        }
    }

    /// Divide every value by `divisor`
    pub fn div_scalar(&mut self, divisor: N) -> &mut Self {
        self.vals.iter_mut().for_each(|v| *v = *v / divisor);
        self
    }
}

impl<N: Copy> FromIterator<(u32, N)> for SparseVec<N> {
    fn from_iter<I: IntoIterator<Item = (u32, N)>>(iter: I) -> Self {
        let mut vec = SparseVec::new();
        for (index, value) in iter {
            vec.push(index, value);
        }
        vec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn norm_parses_known_names_only() {
        assert_eq!("l1".parse::<Norm>().unwrap(), Norm::L1);
        assert_eq!("l2".parse::<Norm>().unwrap(), Norm::L2);
        let err = "L2".parse::<Norm>().unwrap_err();
        assert!(err.to_string().contains("norm"));
        assert!("".parse::<Norm>().is_err());
    }

    #[test]
    fn norm_serde_uses_lowercase_names() {
        assert_eq!(serde_json::to_string(&Norm::L1).unwrap(), "\"l1\"");
        let n: Norm = serde_json::from_str("\"l2\"").unwrap();
        assert_eq!(n, Norm::L2);
    }

    #[test]
    fn l1_and_l2_norms() {
        let v: SparseVec<f32> = vec![(0, 3.0), (5, -4.0)].into_iter().collect();
        assert_eq!(v.norm(Norm::L1), 7.0);
        assert_eq!(v.norm(Norm::L2), 5.0);
    }

    #[test]
    fn div_scalar_normalizes() {
        let mut v: SparseVec<f64> = vec![(1, 3.0), (2, 4.0)].into_iter().collect();
        let n = v.norm(Norm::L2);
        v.div_scalar(n);
        assert!((v.norm(Norm::L2) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn push_order_is_kept_until_sorted() {
        let mut v: SparseVec<u32> = vec![(8, 1), (3, 2), (6, 3)].into_iter().collect();
        assert_eq!(v.indices(), &[8, 3, 6]);
        assert_eq!(v.get(3), Some(2));
        assert_eq!(v.get(4), None);

        v.sort_by_index();
        assert_eq!(v.clone().into_pairs(), vec![(3, 2), (6, 3), (8, 1)]);
    }
}
