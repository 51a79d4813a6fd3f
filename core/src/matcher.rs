use crate::catalog::Product;
use crate::index::{DocId, TextIndex};
use crate::{Error, Result};
use serde::Serialize;

/// Similarity below this is treated as noise.
pub const DEFAULT_RELEVANCE_THRESHOLD: f64 = 0.10;
pub const DEFAULT_TOP_N: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult<'a> {
    pub doc_id: DocId,
    pub product: &'a Product,
    pub relevance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelevanceMatcher {
    threshold: f64,
}

impl Default for RelevanceMatcher {
    fn default() -> Self { Self { threshold: DEFAULT_RELEVANCE_THRESHOLD } }
}

impl RelevanceMatcher {
    pub fn new(threshold: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(Error::InvalidArgument(format!("relevance threshold {threshold} outside [0, 1]")));
        }
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f64 { self.threshold }

    /// Top `top_n` products by cosine similarity to `query`, best first.
    ///
    /// Equal scores keep catalog order. Results under the threshold are
    /// dropped, so fewer than `top_n` may come back; an empty index always
    /// yields no results.
    pub fn find<'a>(&self, index: &'a TextIndex, query: &str, top_n: usize) -> Result<Vec<MatchResult<'a>>> {
        if top_n == 0 {
            return Err(Error::InvalidArgument("top_n must be positive".into()));
        }
        if index.is_empty() {
            return Ok(Vec::new());
        }
        let query_vec = index.transform(query);
        if query_vec.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(DocId, f64)> = index
            .similarities(&query_vec)
            .into_iter()
            .enumerate()
            .map(|(doc_id, score)| (doc_id as DocId, score))
            .collect();
        // stable: ties stay in catalog order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        let results = scored
            .into_iter()
            .take(top_n)
            .filter(|(_, score)| *score >= self.threshold)
            .filter_map(|(doc_id, relevance)| {
                index.product(doc_id).map(|product| MatchResult { doc_id, product, relevance: relevance.min(1.0) })
            })
            .collect();
        Ok(results)
    }
}
