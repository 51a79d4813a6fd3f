use crate::index::TextIndex;
use parking_lot::RwLock;
use std::sync::Arc;

/// Shared pointer to the current index snapshot.
///
/// Readers clone the `Arc` and query it without holding the lock; a reload
/// builds the new index off to the side and swaps it in whole.
#[derive(Debug, Default)]
pub struct IndexHandle {
    current: RwLock<Arc<TextIndex>>,
}

impl IndexHandle {
    pub fn new(index: TextIndex) -> Self {
        Self { current: RwLock::new(Arc::new(index)) }
    }

    pub fn current(&self) -> Arc<TextIndex> {
        self.current.read().clone()
    }

    /// Install `index` and return the snapshot it replaced.
    pub fn replace(&self, index: TextIndex) -> Arc<TextIndex> {
        let next = Arc::new(index);
        let (num_docs, num_terms) = (next.num_docs(), next.num_terms());
        let previous = std::mem::replace(&mut *self.current.write(), next);
        tracing::info!(num_docs, num_terms, "index snapshot swapped");
        previous
    }
}
