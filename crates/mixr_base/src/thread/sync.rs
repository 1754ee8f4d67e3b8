use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use super::{Tether, Worker, POLL_INTERVAL};
use crate::component::Component;
use crate::error::ThreadResult;

#[derive(Default)]
struct Rendezvous {
    start: bool,
    completed: bool,
    exited: bool,
}

#[derive(Default)]
struct Signals {
    state: Mutex<Rendezvous>,
    changed: Condvar,
}

/// Runs a work function once per start signal and reports completion.
///
/// The owner calls [`SyncThread::signal_start`], does its own share of the
/// frame, then blocks in [`SyncThread::wait_for_completed`].
pub struct SyncThread {
    worker: Worker,
    signals: Arc<Signals>,
}

impl SyncThread {
    pub fn spawn<F>(name: impl Into<String>, parent: &Arc<dyn Component>, mut work: F) -> ThreadResult<Self>
    where
        F: FnMut(&Arc<dyn Component>) + Send + 'static,
    {
        let name = name.into();
        let tether = Tether::new(parent);
        let signals = Arc::new(Signals::default());

        let body = {
            let tether = tether.clone();
            let signals = signals.clone();
            let name = name.clone();
            move || {
                tether.log_started(&name);
                loop {
                    if !wait_for_start(&signals, &tether) {
                        break;
                    }
                    let Some(parent) = tether.live_parent() else {
                        break;
                    };
                    work(&parent);
                    drop(parent);

                    signals.state.lock().completed = true;
                    signals.changed.notify_all();
                }

                signals.state.lock().exited = true;
                signals.changed.notify_all();
            }
        };

        Ok(Self {
            worker: Worker::spawn(name, &tether, body)?,
            signals,
        })
    }

    /// Release the worker for one run of its work function.
    pub fn signal_start(&self) {
        let mut state = self.signals.state.lock();
        state.start = true;
        state.completed = false;
        self.signals.changed.notify_all();
    }

    /// Block until the run released by the last start signal completes.
    ///
    /// Returns false on timeout, or if the worker exited without finishing.
    pub fn wait_for_completed(&self, timeout: Option<Duration>) -> bool {
        let deadline = timeout.map(|timeout| Instant::now() + timeout);
        let mut state = self.signals.state.lock();
        while !state.completed && !state.exited {
            match deadline {
                Some(deadline) => {
                    if self.signals.changed.wait_until(&mut state, deadline).timed_out() {
                        return state.completed;
                    }
                }
                None => self.signals.changed.wait(&mut state),
            }
        }
        state.completed
    }

    pub fn name(&self) -> &str {
        &self.worker.name
    }

    pub fn terminate(&self) {
        self.worker.terminate();
        self.signals.changed.notify_all();
    }

    pub fn is_terminated(&self) -> bool {
        self.worker.is_terminated()
    }

    pub fn join(&self) -> ThreadResult<()> {
        self.worker.join()
    }
}

/// Wait for a start signal; false once the worker should exit instead.
fn wait_for_start(signals: &Signals, tether: &Tether) -> bool {
    let mut state = signals.state.lock();
    loop {
        if state.start {
            state.start = false;
            return true;
        }
        if tether.live_parent().is_none() {
            return false;
        }
        signals.changed.wait_for(&mut state, POLL_INTERVAL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{share, ComponentBase, SHUTDOWN_EVENT};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn parent() -> Arc<dyn Component> {
        share(ComponentBase::new())
    }

    #[test]
    fn test_one_run_per_signal() {
        let parent = parent();
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let thread = SyncThread::spawn("sync", &parent, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

        for expected in 1..=3 {
            thread.signal_start();
            assert!(thread.wait_for_completed(Some(Duration::from_secs(5))));
            assert_eq!(runs.load(Ordering::SeqCst), expected);
        }

        thread.terminate();
        thread.join().unwrap();
        assert_eq!(runs.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_wait_times_out_without_signal() {
        let parent = parent();
        let thread = SyncThread::spawn("idle", &parent, |_| {}).unwrap();
        assert!(!thread.wait_for_completed(Some(Duration::from_millis(30))));
        thread.terminate();
        thread.join().unwrap();
    }

    #[test]
    fn test_shutdown_releases_waiter() {
        let parent = parent();
        let thread = SyncThread::spawn("sync", &parent, |_| {}).unwrap();
        parent.event(SHUTDOWN_EVENT, None);
        thread.join().unwrap();
        assert!(!thread.wait_for_completed(None));
    }
}
