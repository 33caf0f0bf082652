use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

use crate::dataset::{SourcePaths, Sources};
use crate::error::{EngineError, EngineResult};
use crate::query::{run_query, Query, QueryResponse, ReasonOptions};
use crate::scoring::{Engine, EnginePolicy};

/// Shared entry point for queries.
///
/// Queries issued before the first successful `initialize` fail with
/// [`EngineError::NotReady`]; they never block. Initialization builds a complete engine
/// before publishing it, so readers only ever see a fully built score matrix. The
/// `RwLock` guards the pointer swap only: readers clone the `Arc` and release the lock
/// before doing any work.
#[derive(Default)]
pub struct EngineHandle {
    published: RwLock<Option<Arc<Engine>>>,
    init_lock: Mutex<()>,
}

impl EngineHandle {
    /// An empty handle; every query fails with `NotReady` until `initialize` succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an engine from in-memory sources and publish it.
    ///
    /// Calls are serialized. On failure the previously published engine (if any) keeps
    /// serving.
    pub fn initialize(&self, sources: &Sources, policy: EnginePolicy) -> EngineResult<Arc<Engine>> {
        let _guard = self.init_lock.lock();
        let engine = Arc::new(Engine::build(sources, policy)?);
        let replaced = self.published.write().replace(Arc::clone(&engine)).is_some();
        if replaced {
            tracing::info!("engine reloaded");
        }
        Ok(engine)
    }

    /// Read the sources from disk, then `initialize`.
    pub fn initialize_from_paths(
        &self,
        paths: &SourcePaths,
        policy: EnginePolicy,
    ) -> EngineResult<Arc<Engine>> {
        let sources = Sources::read(paths)?;
        self.initialize(&sources, policy)
    }

    pub fn is_ready(&self) -> bool {
        self.published.read().is_some()
    }

    /// Snapshot of the currently published engine.
    pub fn engine(&self) -> EngineResult<Arc<Engine>> {
        self.published
            .read()
            .as_ref()
            .map(Arc::clone)
            .ok_or(EngineError::NotReady)
    }

    pub fn query(&self, query: &Query, reasons: &ReasonOptions) -> EngineResult<QueryResponse> {
        let engine = self.engine()?;
        run_query(&engine, query, reasons)
    }
}
