use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Per-need snapshot: fraction of the usual quantity on hand and days since
/// the last purchase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub stock: f64,
    pub last_buy: u32,
}

/// Used for any need the inventory does not track.
pub const FALLBACK_ITEM: InventoryItem = InventoryItem { stock: 0.5, last_buy: 15 };

impl Default for InventoryItem {
    fn default() -> Self { FALLBACK_ITEM }
}

impl InventoryItem {
    pub fn new(stock: f64, last_buy: u32) -> Result<Self> {
        let item = Self { stock, last_buy };
        item.validate("item")?;
        Ok(item)
    }

    fn validate(&self, name: &str) -> Result<()> {
        if !self.stock.is_finite() || !(0.0..=1.0).contains(&self.stock) {
            return Err(Error::InvalidArgument(format!("stock for {name:?} must be within [0, 1], got {}", self.stock)));
        }
        Ok(())
    }
}

/// Where urgency ranking gets its per-need data. `lookup` never fails; unknown
/// names resolve to a fallback.
pub trait InventorySource: Send + Sync {
    fn lookup(&self, name: &str) -> InventoryItem;

    /// Tracked need names, in configuration order.
    fn names(&self) -> Vec<String>;
}

#[derive(Debug, Deserialize)]
struct InventoryEntry {
    name: String,
    #[serde(flatten)]
    item: InventoryItem,
}

#[derive(Debug, Deserialize)]
struct InventoryFile {
    #[serde(default)]
    fallback: Option<InventoryItem>,
    #[serde(default)]
    items: Vec<InventoryEntry>,
}

/// Static inventory supplied by configuration.
#[derive(Debug, Clone)]
pub struct InventoryModel {
    items: HashMap<String, InventoryItem>,
    order: Vec<String>,
    fallback: InventoryItem,
}

impl Default for InventoryModel {
    fn default() -> Self { Self { items: HashMap::new(), order: Vec::new(), fallback: FALLBACK_ITEM } }
}

impl InventoryModel {
    pub fn new<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, InventoryItem)>,
        S: Into<String>,
    {
        let mut model = Self::default();
        for (name, item) in entries {
            let name = name.into();
            item.validate(&name)?;
            if model.items.insert(name.clone(), item).is_some() {
                return Err(Error::InvalidArgument(format!("duplicate inventory entry {name:?}")));
            }
            model.order.push(name);
        }
        Ok(model)
    }

    pub fn with_fallback(mut self, fallback: InventoryItem) -> Result<Self> {
        fallback.validate("fallback")?;
        self.fallback = fallback;
        Ok(self)
    }

    pub fn fallback(&self) -> InventoryItem { self.fallback }

    pub fn len(&self) -> usize { self.order.len() }

    pub fn is_empty(&self) -> bool { self.order.is_empty() }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let file: InventoryFile = serde_json::from_reader(reader)
            .map_err(|e| Error::InvalidConfig(format!("inventory: {e}")))?;
        let model = Self::new(file.items.into_iter().map(|e| (e.name, e.item)))?;
        match file.fallback {
            Some(fallback) => model.with_fallback(fallback),
            None => Ok(model),
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = File::open(path.as_ref())?;
        let model = Self::from_reader(BufReader::new(f))?;
        tracing::info!(path = %path.as_ref().display(), num_items = model.len(), "inventory loaded");
        Ok(model)
    }
}

impl InventorySource for InventoryModel {
    fn lookup(&self, name: &str) -> InventoryItem {
        self.items.get(name).copied().unwrap_or(self.fallback)
    }

    fn names(&self) -> Vec<String> { self.order.clone() }
}
