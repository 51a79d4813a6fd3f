use crate::inventory::InventorySource;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Need {
    pub query: String,
    pub urgency_score: f64,
    pub reason: String,
}

/// Tunables of the urgency score
/// `stock_weight * (1 - stock) + time_weight * min(last_buy / saturation_days, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrgencyWeights {
    pub stock_weight: f64,
    pub time_weight: f64,
    pub saturation_days: f64,
}

impl Default for UrgencyWeights {
    fn default() -> Self { Self { stock_weight: 0.7, time_weight: 0.3, saturation_days: 30.0 } }
}

impl UrgencyWeights {
    pub fn validate(&self) -> Result<()> {
        for (name, w) in [("stock_weight", self.stock_weight), ("time_weight", self.time_weight)] {
            if !w.is_finite() || w < 0.0 {
                return Err(Error::InvalidConfig(format!("{name} must be a non-negative number, got {w}")));
            }
        }
        if !self.saturation_days.is_finite() || self.saturation_days <= 0.0 {
            return Err(Error::InvalidConfig(format!("saturation_days must be positive, got {}", self.saturation_days)));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UrgencyRanker {
    weights: UrgencyWeights,
}

impl UrgencyRanker {
    pub fn new(weights: UrgencyWeights) -> Result<Self> {
        weights.validate()?;
        Ok(Self { weights })
    }

    pub fn weights(&self) -> &UrgencyWeights { &self.weights }

    pub fn score(&self, inventory: &dyn InventorySource, name: &str) -> Need {
        let data = inventory.lookup(name);
        let stock = data.stock.clamp(0.0, 1.0);
        let score_stock = 1.0 - stock;
        let score_time = (data.last_buy as f64 / self.weights.saturation_days).min(1.0);
        let urgency = self.weights.stock_weight * score_stock + self.weights.time_weight * score_time;
        Need {
            query: name.to_string(),
            urgency_score: urgency.clamp(0.0, 1.0),
            reason: format!("Stock: {:.0}%, Last Buy: {}d", stock * 100.0, data.last_buy),
        }
    }

    /// Score every need and order them most urgent first. Equal scores keep
    /// their input order.
    pub fn rank<I, S>(&self, inventory: &dyn InventorySource, needs: I) -> Vec<Need>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ranked: Vec<Need> = needs.into_iter().map(|n| self.score(inventory, n.as_ref())).collect();
        ranked.sort_by(|a, b| b.urgency_score.total_cmp(&a.urgency_score));
        ranked
    }
}
