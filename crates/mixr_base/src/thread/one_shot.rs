use std::sync::Arc;

use super::{Tether, Worker};
use crate::component::Component;
use crate::error::ThreadResult;

/// Runs a work function once on its own thread.
pub struct OneShotThread {
    worker: Worker,
}

impl OneShotThread {
    /// The work function is skipped if the parent is already gone or shut
    /// down by the time the thread starts.
    pub fn spawn<F>(name: impl Into<String>, parent: &Arc<dyn Component>, work: F) -> ThreadResult<Self>
    where
        F: FnOnce(&Arc<dyn Component>) + Send + 'static,
    {
        let name = name.into();
        let tether = Tether::new(parent);
        let body = {
            let tether = tether.clone();
            let name = name.clone();
            move || {
                tether.log_started(&name);
                if let Some(parent) = tether.live_parent() {
                    work(&parent);
                }
            }
        };
        Ok(Self {
            worker: Worker::spawn(name, &tether, body)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.worker.name
    }

    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    pub fn join(&self) -> ThreadResult<()> {
        self.worker.join()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{share, ComponentBase, SHUTDOWN_EVENT};
    use crate::error::ThreadError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_runs_once() {
        let parent: Arc<dyn Component> = share(ComponentBase::new());
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();

        let thread = OneShotThread::spawn("one-shot", &parent, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
        assert_eq!(thread.name(), "one-shot");
        thread.join().unwrap();
        thread.join().unwrap();

        assert!(thread.is_finished());
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_skipped_after_shutdown() {
        let parent: Arc<dyn Component> = share(ComponentBase::new());
        parent.event(SHUTDOWN_EVENT, None);
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();

        let thread = OneShotThread::spawn("one-shot", &parent, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
        thread.join().unwrap();
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_panic_is_reported() {
        let parent: Arc<dyn Component> = share(ComponentBase::new());
        let thread = OneShotThread::spawn("doomed", &parent, |_| panic!("boom")).unwrap();
        assert!(matches!(thread.join(), Err(ThreadError::Panicked(name)) if name == "doomed"));
    }
}
