//! Common utilities used across the crate.
//!
//! This module provides the parallelism configuration shared by training and
//! inference, and the interrupt flag used to request an early checkpoint.
//! Rayon work (line parsing) runs on a pool sized to the same thread count.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;

// =============================================================================
// Parallelism Configuration
// =============================================================================

/// Execution strategy for tree building and scoring.
///
/// `Parallel(n)` runs work on a [`WorkerPool`](crate::pool::WorkerPool) of
/// exactly `n` workers. A single worker is still a pool: the coordinating
/// thread submits jobs and the worker executes them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Parallelism {
    /// Run everything on the calling thread.
    #[default]
    Sequential,
    /// Run jobs on a pool of `n` workers.
    Parallel(usize),
}

impl Parallelism {
    /// Create from the command-line thread count semantics.
    ///
    /// - `0` → sequential
    /// - `n < 0` → one worker per available hardware thread
    /// - `n > 0` → exactly `n` workers
    #[inline]
    pub fn from_threads(n_threads: i32) -> Self {
        match n_threads {
            0 => Self::Sequential,
            n if n < 0 => Self::Parallel(rayon::current_num_threads().max(1)),
            n => Self::Parallel(n as usize),
        }
    }

    /// Returns `true` if work is dispatched to a worker pool.
    #[inline]
    pub fn is_parallel(self) -> bool {
        matches!(self, Self::Parallel(_))
    }

    /// Number of threads doing the work (1 for sequential).
    #[inline]
    pub fn n_threads(self) -> usize {
        match self {
            Self::Sequential => 1,
            Self::Parallel(n) => n,
        }
    }

    /// Run `f` inside a rayon pool of `n_threads` threads.
    ///
    /// Sequential runs `f` on the calling thread. If the pool cannot be
    /// built, `f` runs on the global rayon pool instead.
    pub fn install<T: Send>(self, f: impl FnOnce() -> T + Send) -> T {
        match self {
            Self::Sequential => f(),
            Self::Parallel(n) => match rayon::ThreadPoolBuilder::new().num_threads(n).build() {
                Ok(pool) => pool.install(f),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to build thread pool; using the global pool");
                    f()
                }
            },
        }
    }

    /// Map over an iterator, in parallel on `n_threads` rayon threads when allowed.
    ///
    /// Output order always matches input order.
    #[inline]
    pub fn maybe_par_map<T, B, I, F>(self, iter: I, f: F) -> Vec<B>
    where
        T: Send,
        B: Send,
        I: IntoIterator<Item = T> + IntoParallelIterator<Item = T> + Send,
        F: Fn(T) -> B + Sync + Send,
    {
        if self.is_parallel() {
            self.install(|| iter.into_par_iter().map(f).collect())
        } else {
            iter.into_iter().map(f).collect()
        }
    }
}

// =============================================================================
// Interrupt
// =============================================================================

/// Shared flag asking long-running work to stop early.
///
/// Cloning is cheap; all clones observe the same flag. Training and scoring
/// check it before submitting each job, so work already handed out still
/// completes and whatever exists at that point can be checkpointed.
#[derive(Clone, Debug, Default)]
pub struct Interrupt(Arc<AtomicBool>);

impl Interrupt {
    /// Create a flag that has not been requested.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop. Returns `true` if a stop had already been requested.
    pub fn request(&self) -> bool {
        self.0.swap(true, Ordering::SeqCst)
    }

    /// Whether a stop has been requested.
    #[inline]
    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
