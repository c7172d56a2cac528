//! Fixed-size worker pool.
//!
//! Each worker owns a single-slot mailbox. A job is handed only to a worker
//! that is currently idle; when none is idle the submitter gets the job back
//! and runs it itself, so waiting on a job can never deadlock the pool.

use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

pub(crate) struct WorkerPool {
    mailboxes: Vec<Sender<Job>>,
    idle: Arc<Mutex<Vec<bool>>>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub(crate) fn new(workers: usize) -> Self {
        let idle = Arc::new(Mutex::new(Vec::with_capacity(workers)));
        let mut mailboxes = Vec::with_capacity(workers);
        let mut handles = Vec::with_capacity(workers);
        for index in 0..workers {
            let (sender, receiver) = bounded::<Job>(1);
            let worker_idle = Arc::clone(&idle);
            let spawned = thread::Builder::new()
                .name(format!("fingermatch-worker-{index}"))
                .spawn(move || run_worker(index, receiver, worker_idle));
            match spawned {
                Ok(handle) => {
                    idle.lock().push(true);
                    mailboxes.push(sender);
                    handles.push(handle);
                }
                Err(_) => break,
            }
        }
        Self {
            mailboxes,
            idle,
            handles,
        }
    }

    pub(crate) fn worker_count(&self) -> usize {
        self.mailboxes.len()
    }

    /// Hands `job` to an idle worker, or returns it when every worker is busy.
    pub(crate) fn try_submit(&self, job: Job) -> Result<(), Job> {
        let index = {
            let mut idle = self.idle.lock();
            match idle.iter().position(|&free| free) {
                Some(index) => {
                    idle[index] = false;
                    index
                }
                None => return Err(job),
            }
        };
        self.mailboxes[index].send(job).map_err(|err| {
            self.idle.lock()[index] = true;
            err.into_inner()
        })
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.mailboxes.clear();
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}

fn run_worker(index: usize, mailbox: Receiver<Job>, idle: Arc<Mutex<Vec<bool>>>) {
    for job in mailbox.iter() {
        job();
        idle.lock()[index] = true;
    }
}

#[cfg(test)]
mod tests {
    use super::WorkerPool;
    use crossbeam_channel::bounded;

    #[test]
    fn busy_pool_returns_job() {
        let pool = WorkerPool::new(1);
        assert_eq!(pool.worker_count(), 1);

        let (release_tx, release_rx) = bounded::<()>(0);
        let (done_tx, done_rx) = bounded::<u32>(2);
        let first_done = done_tx.clone();
        assert!(pool
            .try_submit(Box::new(move || {
                let _ = release_rx.recv();
                let _ = first_done.send(1);
            }))
            .is_ok());

        let rejected = pool.try_submit(Box::new(move || {
            let _ = done_tx.send(2);
        }));
        let job = rejected.err().expect("only worker is busy");
        job();
        assert_eq!(done_rx.recv().unwrap(), 2);

        release_tx.send(()).unwrap();
        assert_eq!(done_rx.recv().unwrap(), 1);
    }
}
