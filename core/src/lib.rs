pub mod catalog;
pub mod config;
pub mod error;
pub mod handle;
pub mod index;
pub mod inventory;
pub mod matcher;
pub mod persist;
pub mod recommend;
pub mod tokenizer;
pub mod urgency;

pub use catalog::{Catalog, Product};
pub use config::RankingConfig;
pub use error::{Error, Result};
pub use handle::IndexHandle;
pub use index::{DocId, Posting, TermId, TermVector, TextIndex};
pub use inventory::{InventoryItem, InventoryModel, InventorySource, FALLBACK_ITEM};
pub use matcher::{MatchResult, RelevanceMatcher, DEFAULT_RELEVANCE_THRESHOLD, DEFAULT_TOP_N};
pub use recommend::{Recommendation, Recommender};
pub use urgency::{Need, UrgencyRanker, UrgencyWeights};
