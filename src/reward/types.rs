use std::fmt;
use std::str::FromStr;

use crate::protocol::{Query, RelevanceSet};

/// Which reward strategy a validator runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RewardMode {
    /// Mean reciprocal rank against benchmark ground truth.
    #[default]
    Mrr,
    /// Max cross-encoder relevance of returned documents.
    CrossEncoder,
}

impl RewardMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RewardMode::Mrr => "mrr",
            RewardMode::CrossEncoder => "cross_encoder",
        }
    }
}

impl fmt::Display for RewardMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RewardMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mrr" => Ok(RewardMode::Mrr),
            "cross_encoder" | "cross-encoder" | "crossencoder" => Ok(RewardMode::CrossEncoder),
            other => Err(format!(
                "unknown reward mode '{other}', expected 'mrr' or 'cross_encoder'"
            )),
        }
    }
}

/// Round inputs a strategy scores against.
#[derive(Debug, Clone)]
pub struct ScoringContext {
    pub query: Query,
    /// Present for benchmark rounds.
    pub relevant: Option<RelevanceSet>,
}

impl ScoringContext {
    pub fn new(query: Query, relevant: Option<RelevanceSet>) -> Self {
        Self { query, relevant }
    }
}

/// One reward per dispatched miner, in dispatch order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RewardVector(Vec<f32>);

impl RewardVector {
    pub fn zeros(len: usize) -> Self {
        Self(vec![0.0; len])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }

    pub fn get(&self, index: usize) -> Option<f32> {
        self.0.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        self.0.iter().copied()
    }

    /// Largest reward, if any.
    pub fn max(&self) -> Option<f32> {
        self.0.iter().copied().reduce(f32::max)
    }

    /// Arithmetic mean, `0.0` for an empty vector.
    pub fn mean(&self) -> f32 {
        if self.0.is_empty() {
            0.0
        } else {
            self.0.iter().sum::<f32>() / self.0.len() as f32
        }
    }
}

impl From<Vec<f32>> for RewardVector {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}

impl FromIterator<f32> for RewardVector {
    fn from_iter<I: IntoIterator<Item = f32>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
