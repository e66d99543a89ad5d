use crate::index::CorpusIndex;
use parking_lot::{Mutex, MutexGuard, RwLock};
use std::sync::Arc;

/// Shared slot holding the current [`CorpusIndex`].
///
/// Readers clone the inner `Arc` and query that snapshot without holding the
/// lock, so a concurrent `publish` never hands them chunks from one build and
/// vectors from another.
#[derive(Debug, Default)]
pub struct IndexHandle {
    current: RwLock<Arc<CorpusIndex>>,
    rebuild: Mutex<()>,
}

impl IndexHandle {
    pub fn new(index: CorpusIndex) -> Self {
        Self {
            current: RwLock::new(Arc::new(index)),
            rebuild: Mutex::new(()),
        }
    }

    pub fn snapshot(&self) -> Arc<CorpusIndex> {
        Arc::clone(&*self.current.read())
    }

    /// Replaces the current index, returning the one it displaced.
    pub fn publish(&self, index: CorpusIndex) -> Arc<CorpusIndex> {
        let next = Arc::new(index);
        std::mem::replace(&mut *self.current.write(), next)
    }

    /// Held for the whole of a rebuild so only one writer runs at a time.
    pub fn rebuild_guard(&self) -> MutexGuard<'_, ()> {
        self.rebuild.lock()
    }
}
