use crate::config::RankingConfig;
use crate::index::TextIndex;
use crate::inventory::InventorySource;
use crate::matcher::{MatchResult, RelevanceMatcher};
use crate::urgency::{Need, UrgencyRanker};
use crate::{Error, Result};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation<'a> {
    pub need: Need,
    pub matches: Vec<MatchResult<'a>>,
}

/// Picks the most urgent need and the products that best match it.
pub struct Recommender<'a> {
    index: &'a TextIndex,
    inventory: &'a dyn InventorySource,
    ranker: UrgencyRanker,
    matcher: RelevanceMatcher,
    top_n: usize,
}

impl<'a> Recommender<'a> {
    pub fn new(index: &'a TextIndex, inventory: &'a dyn InventorySource, config: &RankingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            index,
            inventory,
            ranker: UrgencyRanker::new(config.urgency)?,
            matcher: RelevanceMatcher::new(config.relevance_threshold)?,
            top_n: config.top_n,
        })
    }

    pub fn prioritize<I, S>(&self, candidates: I) -> Vec<Need>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ranker.rank(self.inventory, candidates)
    }

    pub fn products_for(&self, query: &str) -> Result<Vec<MatchResult<'a>>> {
        self.matcher.find(self.index, query, self.top_n)
    }

    pub fn recommend<I, S>(&self, candidates: I) -> Result<Recommendation<'a>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let need = self.prioritize(candidates).into_iter().next().ok_or(Error::NoCandidates)?;
        let matches = self.products_for(&need.query)?;
        tracing::debug!(need = %need.query, urgency = need.urgency_score, num_matches = matches.len(), "recommendation");
        Ok(Recommendation { need, matches })
    }
}
