use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use tracing::warn;

use super::{Tether, Worker, POLL_INTERVAL};
use crate::component::Component;
use crate::error::ThreadResult;

type Job = Box<dyn FnOnce(&Arc<dyn Component>) + Send>;

#[derive(Default)]
struct Queue {
    jobs: Mutex<VecDeque<Job>>,
    available: Condvar,
    completed: AtomicUsize,
}

/// Fixed set of workers executing submitted jobs against the parent.
pub struct ThreadPool {
    tether: Tether,
    workers: Vec<Worker>,
    queue: Arc<Queue>,
}

impl ThreadPool {
    /// Start `size` workers (at least one), named `<name>-<n>`.
    pub fn spawn(name: &str, parent: &Arc<dyn Component>, size: usize) -> ThreadResult<Self> {
        let tether = Tether::new(parent);
        let queue = Arc::new(Queue::default());

        let workers = (1..=size.max(1))
            .map(|n| {
                let worker_name = format!("{}-{}", name, n);
                let body = {
                    let tether = tether.clone();
                    let queue = queue.clone();
                    let worker_name = worker_name.clone();
                    move || {
                        tether.log_started(&worker_name);
                        while let Some(job) = next_job(&queue, &tether) {
                            let Some(parent) = tether.live_parent() else {
                                break;
                            };
                            job(&parent);
                            queue.completed.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                };
                Worker::spawn(worker_name, &tether, body)
            })
            .collect::<ThreadResult<Vec<_>>>()?;

        Ok(Self {
            tether,
            workers,
            queue,
        })
    }

    /// Queue a job; false once the pool is stopping.
    pub fn submit<F>(&self, job: F) -> bool
    where
        F: FnOnce(&Arc<dyn Component>) + Send + 'static,
    {
        if self.tether.live_parent().is_none() {
            warn!("[ThreadPool::submit] pool is stopping; job dropped");
            return false;
        }
        self.queue.jobs.lock().push_back(Box::new(job));
        self.queue.available.notify_one();
        true
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Jobs waiting for a worker
    pub fn pending(&self) -> usize {
        self.queue.jobs.lock().len()
    }

    /// Jobs run to completion so far
    pub fn completed(&self) -> usize {
        self.queue.completed.load(Ordering::SeqCst)
    }

    /// Stop every worker; queued jobs that have not started are discarded.
    pub fn terminate(&self) {
        for worker in &self.workers {
            worker.terminate();
        }
        self.queue.available.notify_all();
    }

    pub fn join(&self) -> ThreadResult<()> {
        self.workers.iter().try_for_each(Worker::join)
    }
}

fn next_job(queue: &Queue, tether: &Tether) -> Option<Job> {
    let mut jobs = queue.jobs.lock();
    loop {
        tether.live_parent()?;
        if let Some(job) = jobs.pop_front() {
            return Some(job);
        }
        queue.available.wait_for(&mut jobs, POLL_INTERVAL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{share, ComponentBase, SHUTDOWN_EVENT};
    use crate::thread::test_support::eventually;
    use std::time::Duration;

    fn parent() -> Arc<dyn Component> {
        share(ComponentBase::new())
    }

    #[test]
    fn test_runs_all_jobs() {
        let parent = parent();
        let pool = ThreadPool::spawn("pool", &parent, 3).unwrap();
        assert_eq!(pool.size(), 3);

        let sum = Arc::new(AtomicUsize::new(0));
        for i in 1..=10 {
            let sum = sum.clone();
            assert!(pool.submit(move |_| {
                sum.fetch_add(i, Ordering::SeqCst);
            }));
        }

        assert!(eventually(Duration::from_secs(5), || pool.completed() == 10));
        assert_eq!(sum.load(Ordering::SeqCst), 55);
        assert_eq!(pool.pending(), 0);

        pool.terminate();
        pool.join().unwrap();
    }

    #[test]
    fn test_zero_size_gets_one_worker() {
        let parent = parent();
        let pool = ThreadPool::spawn("pool", &parent, 0).unwrap();
        assert_eq!(pool.size(), 1);
        pool.terminate();
        pool.join().unwrap();
    }

    #[test]
    fn test_shutdown_stops_workers_and_submissions() {
        let parent = parent();
        let pool = ThreadPool::spawn("pool", &parent, 2).unwrap();
        parent.event(SHUTDOWN_EVENT, None);
        pool.join().unwrap();
        assert!(!pool.submit(|_| {}));
    }
}
