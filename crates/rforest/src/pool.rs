//! Fixed-size worker pool with blocking submission.
//!
//! [`with_pool`] starts `n` long-lived workers inside a [`std::thread::scope`],
//! hands the caller a [`WorkerPool`] to submit jobs through, and joins every
//! worker before returning. Because the pool is scoped, jobs may borrow data
//! owned by the caller (the sample store, the forest, the vote table).
//!
//! Jobs are handed over a rendezvous channel (capacity zero): [`WorkerPool::add_job`]
//! blocks until one idle worker takes the job. At most `n` jobs ever run at
//! once and no job is ever queued behind a busy worker.

use std::cell::Cell;
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::{Arc, Mutex};
use std::thread;

/// A unit of work executed by exactly one worker.
pub type Job<'env> = Box<dyn FnOnce() + Send + 'env>;

/// Errors raised by the worker pool.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    /// Every worker has exited, so the job cannot be handed over.
    #[error("worker pool is closed")]
    Closed,

    /// A pool needs at least one worker.
    #[error("worker pool needs at least one worker")]
    NoWorkers,

    #[error("failed to spawn worker thread: {source}")]
    Spawn {
        #[source]
        source: std::io::Error,
    },
}

/// Submission handle for a running pool.
///
/// Only available inside [`with_pool`]. Not `Sync`: jobs are submitted from
/// the coordinating thread only.
pub struct WorkerPool<'env> {
    sender: SyncSender<Job<'env>>,
    n_workers: usize,
    submitted: Cell<usize>,
}

impl<'env> WorkerPool<'env> {
    /// Hand `job` to an idle worker, blocking until one is available.
    pub fn add_job<F>(&self, job: F) -> Result<(), PoolError>
    where
        F: FnOnce() + Send + 'env,
    {
        self.sender
            .send(Box::new(job))
            .map_err(|_| PoolError::Closed)?;
        self.submitted.set(self.submitted.get() + 1);
        Ok(())
    }

    /// Number of workers in the pool.
    #[inline]
    pub fn n_workers(&self) -> usize {
        self.n_workers
    }

    /// Number of jobs accepted so far.
    #[inline]
    pub fn submitted(&self) -> usize {
        self.submitted.get()
    }
}

/// Run `f` with a pool of `n_workers` threads.
///
/// When `f` returns, the pool is closed and every worker is joined before
/// this function returns. A panicking job is re-raised here once all workers
/// have stopped.
pub fn with_pool<'env, R>(
    n_workers: usize,
    f: impl FnOnce(&WorkerPool<'env>) -> R,
) -> Result<R, PoolError> {
    if n_workers == 0 {
        return Err(PoolError::NoWorkers);
    }

    thread::scope(|scope| {
        let (sender, receiver) = mpsc::sync_channel::<Job<'env>>(0);
        let receiver = Arc::new(Mutex::new(receiver));

        for worker_id in 0..n_workers {
            let receiver = Arc::clone(&receiver);
            let spawned = thread::Builder::new()
                .name(format!("rforest-worker-{worker_id}"))
                .spawn_scoped(scope, move || worker_loop(worker_id, &receiver));
            if let Err(source) = spawned {
                // workers already running see the channel close and exit
                drop(sender);
                return Err(PoolError::Spawn { source });
            }
        }
        drop(receiver);
        tracing::trace!(n_workers, "worker pool started");

        let pool = WorkerPool {
            sender,
            n_workers,
            submitted: Cell::new(0),
        };
        let result = f(&pool);

        tracing::trace!(submitted = pool.submitted(), "worker pool shutting down");
        drop(pool);
        Ok(result)
    })
}

fn worker_loop(worker_id: usize, receiver: &Mutex<Receiver<Job<'_>>>) {
    loop {
        // The lock is released before the job runs so another worker can wait.
        let job = match receiver.lock() {
            Ok(guard) => guard.recv(),
            Err(_) => break,
        };
        match job {
            Ok(job) => job(),
            Err(_) => break,
        }
    }
    tracing::trace!(worker_id, "worker exiting");
}
