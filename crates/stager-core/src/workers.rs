//! Bounded worker pool for per-file work inside a pass.
//!
//! Every call blocks until all items are done, which is the barrier between
//! the copy/delete phase of a pass and its directory pruning.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;

use crate::error::{Result, StageError};

/// Shared cancellation switch. Work items check it before starting.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(StageError::Cancelled)
        } else {
            Ok(())
        }
    }
}

pub struct Workers {
    pool: rayon::ThreadPool,
    cancel: CancelFlag,
}

impl std::fmt::Debug for Workers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workers")
            .field("threads", &self.threads())
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

impl Workers {
    /// Pool with `jobs` threads, or one per available core when `None`.
    pub fn new(jobs: Option<usize>, cancel: CancelFlag) -> Result<Self> {
        let threads = jobs.filter(|n| *n > 0).unwrap_or_else(default_parallelism);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("stager-worker-{i}"))
            .build()
            .map_err(|e| StageError::ThreadPool {
                message: e.to_string(),
            })?;
        Ok(Self { pool, cancel })
    }

    /// Single-threaded pool, handy in tests.
    pub fn serial() -> Result<Self> {
        Self::new(Some(1), CancelFlag::new())
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn cancel_flag(&self) -> &CancelFlag {
        &self.cancel
    }

    /// Map every item, keeping input order. Stops at the first error.
    pub fn try_map<T, R, F>(&self, items: &[T], f: F) -> Result<Vec<R>>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> Result<R> + Sync + Send,
    {
        let cancel = &self.cancel;
        self.pool.install(|| {
            items
                .par_iter()
                .map(|item| {
                    cancel.check()?;
                    f(item)
                })
                .collect()
        })
    }
}

pub fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(4)
}
