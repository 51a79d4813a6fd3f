use crate::catalog::{Catalog, Product};
use crate::{Error, Result};
use crate::tokenizer::tokenize;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub type TermId = u32;
pub type DocId = u32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub weight: f64, // normalized tf-idf weight
}

/// Sparse, L2-normalized vector in an index's term space, sorted by term id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermVector {
    pub weights: Vec<(TermId, f64)>,
}

impl TermVector {
    pub fn is_empty(&self) -> bool { self.weights.is_empty() }
}

/// TF-IDF vector space over product names.
///
/// The vocabulary is fixed by [`TextIndex::build`]; transforming queries never
/// adds terms. Weights follow smoothed idf `ln((1 + n) / (1 + df)) + 1` with
/// raw term counts, and every document row is L2-normalized so a dot product
/// against a transformed query is the cosine similarity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextIndex {
    dictionary: HashMap<String, TermId>,
    df: Vec<u32>,
    idf: Vec<f64>,
    postings: Vec<Vec<Posting>>, // indexed by term id, postings sorted by doc_id
    products: Vec<Product>,
}

impl TextIndex {
    pub fn new() -> Self { Self::default() }

    /// Build the index from a catalog. An empty catalog yields an empty index,
    /// which answers every query with no matches.
    pub fn build(catalog: &Catalog) -> Self {
        Self::from_products(catalog.products().to_vec())
    }

    pub fn from_products(products: Vec<Product>) -> Self {
        let mut dictionary: HashMap<String, TermId> = HashMap::new();
        let mut df: Vec<u32> = Vec::new();
        let mut doc_terms: Vec<BTreeMap<TermId, u32>> = Vec::with_capacity(products.len());

        for product in &products {
            let mut tf_counts: BTreeMap<TermId, u32> = BTreeMap::new();
            for term in tokenize(&product.name) {
                let next_id = dictionary.len() as TermId;
                let tid = *dictionary.entry(term).or_insert_with(|| {
                    df.push(0);
                    next_id
                });
                *tf_counts.entry(tid).or_insert(0) += 1;
            }
            for tid in tf_counts.keys() {
                df[*tid as usize] += 1;
            }
            doc_terms.push(tf_counts);
        }

        let n = products.len() as f64;
        let idf: Vec<f64> = df.iter().map(|&d| ((1.0 + n) / (1.0 + d as f64)).ln() + 1.0).collect();

        let mut postings: Vec<Vec<Posting>> = vec![Vec::new(); dictionary.len()];
        for (doc_id, tf_counts) in doc_terms.into_iter().enumerate() {
            let weighted: Vec<(TermId, f64)> = tf_counts
                .into_iter()
                .map(|(tid, tf_raw)| (tid, tf_raw as f64 * idf[tid as usize]))
                .collect();
            let mut norm = weighted.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
            if norm == 0.0 { norm = 1.0; }
            // doc ids are visited in ascending order, so each list stays sorted
            for (tid, w) in weighted {
                postings[tid as usize].push(Posting { doc_id: doc_id as DocId, weight: w / norm });
            }
        }

        tracing::debug!(num_docs = products.len(), num_terms = dictionary.len(), "text index built");
        Self { dictionary, df, idf, postings, products }
    }

    pub fn is_empty(&self) -> bool { self.products.is_empty() || self.dictionary.is_empty() }

    pub fn num_docs(&self) -> usize { self.products.len() }

    pub fn num_terms(&self) -> usize { self.dictionary.len() }

    pub fn term_id(&self, term: &str) -> Option<TermId> { self.dictionary.get(term).copied() }

    pub fn document_frequency(&self, term: &str) -> Option<u32> {
        self.term_id(term).map(|tid| self.df[tid as usize])
    }

    /// Vocabulary terms ordered by term id.
    pub fn vocabulary(&self) -> Vec<&str> {
        let mut terms: Vec<(&str, TermId)> = self.dictionary.iter().map(|(t, id)| (t.as_str(), *id)).collect();
        terms.sort_by_key(|(_, id)| *id);
        terms.into_iter().map(|(t, _)| t).collect()
    }

    pub fn products(&self) -> &[Product] { &self.products }

    pub fn product(&self, doc_id: DocId) -> Option<&Product> { self.products.get(doc_id as usize) }

    /// Project a query onto the frozen vocabulary. Out-of-vocabulary terms are
    /// dropped; a query with no known terms yields an empty vector.
    pub fn transform(&self, query: &str) -> TermVector {
        let mut tf_q_raw: BTreeMap<TermId, u32> = BTreeMap::new();
        for term in tokenize(query) {
            if let Some(&tid) = self.dictionary.get(&term) {
                *tf_q_raw.entry(tid).or_insert(0) += 1;
            }
        }
        let weights: Vec<(TermId, f64)> = tf_q_raw
            .into_iter()
            .map(|(tid, tf_raw)| (tid, tf_raw as f64 * self.idf[tid as usize]))
            .collect();
        let norm = weights.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm == 0.0 {
            return TermVector::default();
        }
        TermVector { weights: weights.into_iter().map(|(tid, w)| (tid, w / norm)).collect() }
    }

    /// Check that the term tables, postings and products agree with each other.
    /// A snapshot read from disk must pass this before it is queried.
    pub fn validate(&self) -> Result<()> {
        let num_terms = self.dictionary.len();
        if self.df.len() != num_terms || self.idf.len() != num_terms || self.postings.len() != num_terms {
            return Err(Error::CorruptIndex(format!(
                "{num_terms} terms but {} df, {} idf and {} posting lists",
                self.df.len(),
                self.idf.len(),
                self.postings.len()
            )));
        }
        if let Some((term, tid)) = self.dictionary.iter().find(|(_, tid)| **tid as usize >= num_terms) {
            return Err(Error::CorruptIndex(format!("term {term:?} has out-of-range id {tid}")));
        }
        let num_docs = self.products.len();
        for (tid, plist) in self.postings.iter().enumerate() {
            for p in plist {
                if p.doc_id as usize >= num_docs {
                    return Err(Error::CorruptIndex(format!(
                        "posting for term {tid} points at document {} of {num_docs}",
                        p.doc_id
                    )));
                }
                if !p.weight.is_finite() {
                    return Err(Error::CorruptIndex(format!("posting for term {tid} has weight {}", p.weight)));
                }
            }
        }
        if let Some(w) = self.idf.iter().find(|w| !w.is_finite()) {
            return Err(Error::CorruptIndex(format!("non-finite idf {w}")));
        }
        Ok(())
    }

    /// Cosine similarity of `query` against every document, indexed by doc id.
    pub fn similarities(&self, query: &TermVector) -> Vec<f64> {
        let mut scores = vec![0.0f64; self.products.len()];
        for (tid, q_w) in &query.weights {
            if let Some(plist) = self.postings.get(*tid as usize) {
                for p in plist {
                    scores[p.doc_id as usize] += p.weight * q_w;
                }
            }
        }
        scores
    }
}
