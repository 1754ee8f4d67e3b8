use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use super::{Tether, Worker};
use crate::component::Component;
use crate::error::{ThreadError, ThreadResult};
use crate::message::MessageType;

/// Runs a work function at a fixed rate, passing the measured time since
/// the previous cycle in seconds.
///
/// Overruns are not caught up: a late cycle pushes the schedule back.
pub struct PeriodicThread {
    worker: Worker,
    rate_hz: f64,
    cycles: Arc<AtomicU64>,
}

impl PeriodicThread {
    pub fn spawn<F>(
        name: impl Into<String>,
        parent: &Arc<dyn Component>,
        rate_hz: f64,
        mut work: F,
    ) -> ThreadResult<Self>
    where
        F: FnMut(&Arc<dyn Component>, f64) + Send + 'static,
    {
        if !(rate_hz.is_finite() && rate_hz > 0.0) {
            return Err(ThreadError::InvalidRate(rate_hz));
        }

        let name = name.into();
        let period = Duration::from_secs_f64(1.0 / rate_hz);
        let tether = Tether::new(parent);
        let cycles = Arc::new(AtomicU64::new(0));

        let body = {
            let tether = tether.clone();
            let cycles = cycles.clone();
            let name = name.clone();
            move || {
                tether.log_started(&name);
                let mut last: Option<Instant> = None;
                let mut next = Instant::now();

                while let Some(parent) = tether.live_parent() {
                    let now = Instant::now();
                    let dt = last.map_or(period.as_secs_f64(), |last| (now - last).as_secs_f64());
                    last = Some(now);

                    work(&parent, dt);
                    cycles.fetch_add(1, Ordering::Relaxed);

                    next += period;
                    let now = Instant::now();
                    if next > now {
                        drop(parent);
                        thread::sleep(next - now);
                    } else {
                        if parent.is_message_enabled(MessageType::DEBUG) {
                            debug!("[{}] overran its period by {:?}", name, now - next);
                        }
                        next = now;
                    }
                }
            }
        };

        Ok(Self {
            worker: Worker::spawn(name, &tether, body)?,
            rate_hz,
            cycles,
        })
    }

    pub fn name(&self) -> &str {
        &self.worker.name
    }

    pub fn rate_hz(&self) -> f64 {
        self.rate_hz
    }

    /// Completed work cycles so far
    pub fn cycles(&self) -> u64 {
        self.cycles.load(Ordering::Relaxed)
    }

    /// Ask the loop to stop after the current cycle.
    pub fn terminate(&self) {
        self.worker.terminate();
    }

    pub fn is_terminated(&self) -> bool {
        self.worker.is_terminated()
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
    use crate::thread::test_support::eventually;
    use parking_lot::Mutex;

    fn parent() -> Arc<dyn Component> {
        share(ComponentBase::new())
    }

    #[test]
    fn test_invalid_rate() {
        let parent = parent();
        for rate in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let result = PeriodicThread::spawn("bad", &parent, rate, |_, _| {});
            assert!(matches!(result, Err(ThreadError::InvalidRate(_))));
        }
    }

    #[test]
    fn test_runs_until_terminated() {
        let parent = parent();
        let dts = Arc::new(Mutex::new(Vec::new()));
        let seen = dts.clone();

        let thread = PeriodicThread::spawn("tc", &parent, 200.0, move |_, dt| {
            seen.lock().push(dt);
        })
        .unwrap();
        assert!(eventually(Duration::from_secs(5), || thread.cycles() >= 3));

        thread.terminate();
        assert!(thread.is_terminated());
        thread.join().unwrap();
        assert!(thread.is_finished());

        let dts = dts.lock();
        assert_eq!(dts.len() as u64, thread.cycles());
        assert!((dts[0] - 1.0 / 200.0).abs() < 1e-9);
        assert!(dts.iter().all(|dt| *dt > 0.0));
    }

    #[test]
    fn test_stops_on_shutdown() {
        let parent = parent();
        let thread = PeriodicThread::spawn("bg", &parent, 500.0, |parent, dt| {
            parent.update_data(dt);
        })
        .unwrap();
        assert!(eventually(Duration::from_secs(5), || thread.cycles() >= 1));

        parent.event(SHUTDOWN_EVENT, None);
        thread.join().unwrap();
        assert!(!thread.is_terminated());
    }

    #[test]
    fn test_stops_when_parent_dropped() {
        let parent = parent();
        let thread = PeriodicThread::spawn("orphan", &parent, 500.0, |_, _| {}).unwrap();
        assert!(eventually(Duration::from_secs(5), || thread.cycles() >= 1));
        drop(parent);
        thread.join().unwrap();
    }
}
