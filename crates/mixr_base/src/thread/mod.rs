//! Worker threads bound to a parent component
//!
//! Each wrapper holds only a weak reference to its parent and keeps running
//! while the parent is alive and not shut down, and while its own terminate
//! flag is clear. The parent is upgraded for the duration of one unit of
//! work, never across a sleep or wait.

mod one_shot;
mod periodic;
mod pool;
mod sync;

pub use one_shot::OneShotThread;
pub use periodic::PeriodicThread;
pub use pool::ThreadPool;
pub use sync::SyncThread;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::component::Component;
use crate::error::{ThreadError, ThreadResult};
use crate::message::MessageType;

/// Upper bound on how long an idle worker waits before re-checking its
/// loop condition.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Non-owning parent reference plus the stop flag shared with the handle.
#[derive(Clone)]
struct Tether {
    parent: Weak<dyn Component>,
    terminate: Arc<AtomicBool>,
}

impl Tether {
    fn new(parent: &Arc<dyn Component>) -> Self {
        Self {
            parent: Arc::downgrade(parent),
            terminate: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The parent, if the worker should keep going.
    fn live_parent(&self) -> Option<Arc<dyn Component>> {
        if self.terminate.load(Ordering::Acquire) {
            return None;
        }
        self.parent.upgrade().filter(|parent| parent.is_not_shutdown())
    }

    fn log_started(&self, name: &str) {
        if let Some(parent) = self.parent.upgrade() {
            if parent.is_message_enabled(MessageType::INFO) {
                info!("[{}] started for {}", name, parent.metadata().class_name());
            }
        }
    }
}

/// Join handle and stop flag common to every wrapper.
struct Worker {
    name: String,
    terminate: Arc<AtomicBool>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Worker {
    fn spawn<F>(name: String, tether: &Tether, body: F) -> ThreadResult<Self>
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = thread::Builder::new().name(name.clone()).spawn(body)?;
        debug!("[Worker::spawn] {}", name);
        Ok(Self {
            name,
            terminate: tether.terminate.clone(),
            handle: Mutex::new(Some(handle)),
        })
    }

    fn terminate(&self) {
        self.terminate.store(true, Ordering::Release);
    }

    fn is_terminated(&self) -> bool {
        self.terminate.load(Ordering::Acquire)
    }

    fn is_finished(&self) -> bool {
        self.handle
            .lock()
            .as_ref()
            .is_none_or(JoinHandle::is_finished)
    }

    /// Wait for the thread to exit. Joining twice is a no-op.
    fn join(&self) -> ThreadResult<()> {
        let handle = self.handle.lock().take();
        match handle {
            Some(handle) => handle
                .join()
                .map_err(|_| ThreadError::Panicked(self.name.clone())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::time::{Duration, Instant};

    /// Poll `condition` until it holds or `timeout` passes.
    pub fn eventually(timeout: Duration, condition: impl Fn() -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
        condition()
    }
}
