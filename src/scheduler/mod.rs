//! Parallel task scheduling for the extraction pipeline.
//!
//! `Scheduler` is a cheap cloneable handle injected into the stages that
//! parallelize. Three backends share one interface:
//! - a fixed pool of worker threads where the caller acts as an extra worker,
//! - an inline backend that runs everything on the calling thread,
//! - rayon's global pool (feature `rayon`).
//!
//! Borrowing primitives (`join`, `split`, `map_range`, `for_each_row_mut`)
//! always wait for every task they started before returning, including when a
//! task panics. Panics surface as [`FingerError::TaskFailed`].

mod pool;

use crate::util::math::split_point;
use crate::util::{FingerError, FingerResult};
use crossbeam_channel::{bounded, Receiver};
use pool::{Job, WorkerPool};
use std::any::Any;
use std::ops::Range;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};

type ScopedTask<'env> = Box<dyn FnOnce() + Send + 'env>;

#[derive(Clone)]
enum Backend {
    Inline,
    Pool(Arc<WorkerPool>),
    #[cfg(feature = "rayon")]
    Rayon,
}

/// Handle to a task execution backend.
#[derive(Clone)]
pub struct Scheduler {
    backend: Backend,
}

impl Scheduler {
    /// Pool sized to the machine: one worker per hardware thread minus the caller.
    pub fn new() -> Self {
        let threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self::pool(threads.saturating_sub(1))
    }

    /// Process-wide machine-sized pool, created on first use.
    ///
    /// Every call returns a handle to the same workers.
    pub fn shared() -> Self {
        static SHARED: OnceLock<Scheduler> = OnceLock::new();
        SHARED.get_or_init(Self::new).clone()
    }

    /// Pool with exactly `workers` background threads.
    ///
    /// `pool(0)` is valid and runs every task on the calling thread.
    pub fn pool(workers: usize) -> Self {
        Self {
            backend: Backend::Pool(Arc::new(WorkerPool::new(workers))),
        }
    }

    #[cfg(test)]
    pub(crate) fn shares_workers_with(&self, other: &Scheduler) -> bool {
        match (&self.backend, &other.backend) {
            (Backend::Pool(a), Backend::Pool(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Runs every task synchronously on the calling thread.
    pub fn inline() -> Self {
        Self {
            backend: Backend::Inline,
        }
    }

    /// Delegates to rayon's global thread pool.
    #[cfg(feature = "rayon")]
    pub fn rayon() -> Self {
        Self {
            backend: Backend::Rayon,
        }
    }

    /// Number of tasks that can make progress at once, caller included.
    pub fn concurrency(&self) -> usize {
        match &self.backend {
            Backend::Inline => 1,
            Backend::Pool(pool) => pool.worker_count() + 1,
            #[cfg(feature = "rayon")]
            Backend::Rayon => rayon::current_num_threads().max(1),
        }
    }

    /// Starts an owned task and returns a ticket for its result.
    ///
    /// On the pool backend the task runs on the calling thread when no worker
    /// is idle, so the ticket is already resolved on return.
    pub fn schedule<T, F>(&self, task: F) -> Ticket<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (sender, receiver) = bounded(1);
        let job: Job = Box::new(move || {
            let outcome = catch_unwind(AssertUnwindSafe(task));
            let _ = sender.send(outcome);
        });
        match &self.backend {
            Backend::Inline => job(),
            Backend::Pool(pool) => {
                if let Err(job) = pool.try_submit(job) {
                    job();
                }
            }
            #[cfg(feature = "rayon")]
            Backend::Rayon => rayon::spawn(job),
        }
        Ticket { receiver }
    }

    /// Runs two borrowing tasks, potentially in parallel, and returns both results.
    pub fn join<A, B, RA, RB>(&self, a: A, b: B) -> FingerResult<(RA, RB)>
    where
        A: FnOnce() -> RA + Send,
        B: FnOnce() -> RB + Send,
        RA: Send,
        RB: Send,
    {
        let mut result_a = None;
        let mut result_b = None;
        {
            let slot_a = &mut result_a;
            let slot_b = &mut result_b;
            self.run_scoped(vec![
                Box::new(move || *slot_a = Some(a())) as ScopedTask<'_>,
                Box::new(move || *slot_b = Some(b())) as ScopedTask<'_>,
            ])?;
        }
        match (result_a, result_b) {
            (Some(a), Some(b)) => Ok((a, b)),
            _ => Err(missing_result()),
        }
    }

    /// Splits `range` into at most `concurrency()` near-equal contiguous chunks.
    ///
    /// Every index is covered exactly once. An empty range runs nothing.
    pub fn split<F>(&self, range: Range<usize>, body: F) -> FingerResult<()>
    where
        F: Fn(Range<usize>) + Sync,
    {
        let body = &body;
        let tasks = self
            .chunks(range)
            .into_iter()
            .map(|chunk| Box::new(move || body(chunk)) as ScopedTask<'_>)
            .collect();
        self.run_scoped(tasks)
    }

    /// Evaluates `body` for every index in `0..len`, returning results in index order.
    pub fn map_range<T, F>(&self, len: usize, body: F) -> FingerResult<Vec<T>>
    where
        F: Fn(usize) -> T + Sync,
        T: Send,
    {
        let chunks = self.chunks(0..len);
        let mut parts: Vec<Option<Vec<T>>> = chunks.iter().map(|_| None).collect();
        {
            let body = &body;
            let tasks = parts
                .iter_mut()
                .zip(chunks)
                .map(|(slot, chunk)| {
                    Box::new(move || *slot = Some(chunk.map(body).collect())) as ScopedTask<'_>
                })
                .collect();
            self.run_scoped(tasks)?;
        }
        let mut results = Vec::with_capacity(len);
        for part in parts {
            results.extend(part.ok_or_else(missing_result)?);
        }
        Ok(results)
    }

    /// Hands disjoint bands of whole rows to `body`.
    ///
    /// `data` is a row-major buffer with `row_len` elements per row; `body`
    /// receives the row range of its band and the matching mutable slice.
    pub fn for_each_row_mut<T, F>(&self, data: &mut [T], row_len: usize, body: F) -> FingerResult<()>
    where
        T: Send,
        F: Fn(Range<usize>, &mut [T]) + Sync,
    {
        if row_len == 0 {
            return Ok(());
        }
        let rows = data.len() / row_len;
        let body = &body;
        let mut rest = &mut data[..rows * row_len];
        let mut tasks: Vec<ScopedTask<'_>> = Vec::new();
        for band in self.chunks(0..rows) {
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(band.len() * row_len);
            rest = tail;
            tasks.push(Box::new(move || body(band, head)));
        }
        self.run_scoped(tasks)
    }

    fn chunks(&self, range: Range<usize>) -> Vec<Range<usize>> {
        let count = self.concurrency().min(range.len());
        (0..count)
            .map(|i| {
                split_point(range.start, range.end, i, count)
                    ..split_point(range.start, range.end, i + 1, count)
            })
            .collect()
    }

    fn run_scoped(&self, tasks: Vec<ScopedTask<'_>>) -> FingerResult<()> {
        if tasks.len() <= 1 {
            return run_inline(tasks);
        }
        match &self.backend {
            Backend::Inline => run_inline(tasks),
            Backend::Pool(_) => {
                let mut scope = PendingScope {
                    tickets: Vec::with_capacity(tasks.len()),
                };
                for task in tasks {
                    // SAFETY: `scope` waits on every ticket before this
                    // function returns or unwinds, so the borrowed environment
                    // outlives every task that can observe it.
                    let task: ScopedTask<'static> =
                        unsafe { std::mem::transmute::<ScopedTask<'_>, ScopedTask<'static>>(task) };
                    scope.tickets.push(self.schedule(task));
                }
                scope.wait_all()
            }
            #[cfg(feature = "rayon")]
            Backend::Rayon => catch_unwind(AssertUnwindSafe(|| {
                rayon::scope(|scope| {
                    for task in tasks {
                        scope.spawn(move |_| task());
                    }
                })
            }))
            .map_err(|payload| task_failed(payload.as_ref())),
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let backend = match &self.backend {
            Backend::Inline => "inline",
            Backend::Pool(_) => "pool",
            #[cfg(feature = "rayon")]
            Backend::Rayon => "rayon",
        };
        f.debug_struct("Scheduler")
            .field("backend", &backend)
            .field("concurrency", &self.concurrency())
            .finish()
    }
}

/// Pending result of a scheduled task.
pub struct Ticket<T> {
    receiver: Receiver<std::thread::Result<T>>,
}

impl<T> Ticket<T> {
    /// Blocks until the task has finished.
    pub fn wait(self) -> FingerResult<T> {
        match self.receiver.recv() {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(payload)) => Err(task_failed(payload.as_ref())),
            Err(_) => Err(FingerError::TaskFailed {
                reason: "task was dropped before completion".to_string(),
            }),
        }
    }
}

struct PendingScope {
    tickets: Vec<Ticket<()>>,
}

impl PendingScope {
    fn wait_all(&mut self) -> FingerResult<()> {
        let mut failure = None;
        for ticket in self.tickets.drain(..) {
            if let Err(err) = ticket.wait() {
                failure.get_or_insert(err);
            }
        }
        failure.map_or(Ok(()), Err)
    }
}

impl Drop for PendingScope {
    fn drop(&mut self) {
        let _ = self.wait_all();
    }
}

fn run_inline(tasks: Vec<ScopedTask<'_>>) -> FingerResult<()> {
    let mut failure = None;
    for task in tasks {
        if let Err(payload) = catch_unwind(AssertUnwindSafe(task)) {
            failure.get_or_insert(task_failed(payload.as_ref()));
        }
    }
    failure.map_or(Ok(()), Err)
}

fn task_failed(payload: &(dyn Any + Send)) -> FingerError {
    let reason = if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "task panicked".to_string()
    };
    FingerError::TaskFailed { reason }
}

fn missing_result() -> FingerError {
    FingerError::TaskFailed {
        reason: "task finished without a result".to_string(),
    }
}
