//! Copy-on-write lexicon handle.
//!
//! Readers take an `Arc<ConceptGraph>` snapshot and never hold the lock
//! while compressing. Writers clone the current graph, apply their change
//! and swap the pointer; compressions already running keep the snapshot
//! they started with.

use std::sync::Arc;
use parking_lot::RwLock;

use super::ConceptGraph;
use crate::Result;

/// Shared, runtime-updatable lexicon.
#[derive(Debug, Clone)]
pub struct SharedLexicon {
    inner: Arc<RwLock<Arc<ConceptGraph>>>,
}

impl SharedLexicon {
    pub fn new(graph: ConceptGraph) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(graph))),
        }
    }

    /// The current frozen graph.
    pub fn snapshot(&self) -> Arc<ConceptGraph> {
        Arc::clone(&self.inner.read())
    }

    /// Apply `f` to a copy of the current graph and publish the copy.
    ///
    /// If `f` fails, the published graph is left untouched.
    pub fn update<T>(&self, f: impl FnOnce(&mut ConceptGraph) -> Result<T>) -> Result<T> {
        let mut guard = self.inner.write();
        let mut next = ConceptGraph::clone(&guard);
        let out = f(&mut next)?;
        *guard = Arc::new(next);
        tracing::debug!(concepts = guard.len(), "lexicon snapshot published");
        Ok(out)
    }
}
