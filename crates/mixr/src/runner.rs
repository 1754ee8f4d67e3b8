//! Drives a component tree from two periodic threads
//!
//! The time-critical thread calls `tc_frame` on the root and the background
//! thread calls `update_data`. Both stop once the root is shut down, which
//! happens when the run duration elapses, on ctrl-c, or when something in
//! the tree sends a shutdown event to the root itself.

use std::fmt;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{error, info};

use mixr_base::component::SHUTDOWN_EVENT;
use mixr_base::config::Document;
use mixr_base::thread::PeriodicThread;
use mixr_base::{Component, Factory, MessageType};

use crate::settings::RunConfig;

/// How often the runner checks whether the tree shut itself down
const SHUTDOWN_POLL: Duration = Duration::from_millis(20);

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Elapsed,
    Interrupted,
    Shutdown,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Elapsed => write!(f, "run duration elapsed"),
            StopReason::Interrupted => write!(f, "interrupted"),
            StopReason::Shutdown => write!(f, "component tree shut down"),
        }
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub reason: StopReason,
    pub tc_cycles: u64,
    pub background_cycles: u64,
}

pub struct Runner {
    root: Arc<dyn Component>,
    config: RunConfig,
}

impl Runner {
    pub fn new(root: Arc<dyn Component>, config: RunConfig) -> Self {
        Self { root, config }
    }

    /// Build the tree and read the `[run]` table from one document.
    pub fn load(path: &Path, factory: &Factory) -> Result<Self> {
        let document = Document::load(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: RunConfig = document
            .section("run")
            .context("Invalid [run] settings")?;
        let root = document
            .build_component(factory)
            .with_context(|| format!("Failed to build component tree from {}", path.display()))?;
        Ok(Self::new(root, config))
    }

    pub fn root(&self) -> &Arc<dyn Component> {
        &self.root
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut RunConfig {
        &mut self.config
    }

    /// Run until the duration elapses, ctrl-c, or the tree shuts down.
    pub async fn run(&self) -> Result<RunSummary> {
        self.run_until(interrupted()).await
    }

    /// Run until the duration elapses, `interrupt` completes, or the tree
    /// shuts down. The root receives a shutdown event before returning.
    pub async fn run_until<F>(&self, interrupt: F) -> Result<RunSummary>
    where
        F: Future<Output = ()>,
    {
        let base = self.root.component_base();
        if self.config.timing_stats {
            base.set_timing_stats_enabled(true);
        }
        if self.config.print_timing_stats {
            base.set_print_timing_stats(true);
        }

        info!(
            "Starting {} at {} Hz (background {} Hz)",
            self.root.metadata().class_name(),
            self.config.tc_rate_hz,
            self.config.background_rate_hz
        );

        let tc = PeriodicThread::spawn("mixr-tc", &self.root, self.config.tc_rate_hz, |root, dt| {
            root.tc_frame(dt)
        })
        .context("Failed to start time-critical thread")?;
        let background = PeriodicThread::spawn(
            "mixr-background",
            &self.root,
            self.config.background_rate_hz,
            |root, dt| root.update_data(dt),
        )
        .context("Failed to start background thread")?;

        let reason = wait_for_stop(&self.root, self.config.duration(), interrupt).await;
        info!("Stopping: {}", reason);

        self.root.event(SHUTDOWN_EVENT, None);
        tc.join()?;
        background.join()?;

        let summary = RunSummary {
            reason,
            tc_cycles: tc.cycles(),
            background_cycles: background.cycles(),
        };
        if self.root.is_message_enabled(MessageType::INFO) {
            info!(
                "Ran {} time-critical and {} background cycles",
                summary.tc_cycles, summary.background_cycles
            );
        }
        if let Some(stats) = base.timing_stats() {
            info!(
                samples = stats.n(),
                mean_ms = stats.mean(),
                min_ms = stats.min(),
                max_ms = stats.max(),
                "Frame timing"
            );
        }
        Ok(summary)
    }
}

/// Completes on ctrl-c; never completes if the handler cannot be installed.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Wait for the first of: `duration` elapsing, `interrupt` completing, or
/// `root` shutting down.
pub async fn wait_for_stop<F>(
    root: &Arc<dyn Component>,
    duration: Option<Duration>,
    interrupt: F,
) -> StopReason
where
    F: Future<Output = ()>,
{
    let elapsed = async {
        match duration {
            Some(duration) => tokio::time::sleep(duration).await,
            None => std::future::pending::<()>().await,
        }
    };
    let shutdown = async {
        let mut ticker = tokio::time::interval(SHUTDOWN_POLL);
        while root.is_not_shutdown() {
            ticker.tick().await;
        }
    };

    tokio::select! {
        _ = elapsed => StopReason::Elapsed,
        _ = interrupt => StopReason::Interrupted,
        _ = shutdown => StopReason::Shutdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mixr_base::{share, ComponentBase};
    use std::io::Write;

    fn root() -> Arc<dyn Component> {
        share(ComponentBase::new())
    }

    #[test]
    fn test_wait_elapsed() {
        let root = root();
        let reason = tokio_test::block_on(wait_for_stop(
            &root,
            Some(Duration::from_millis(30)),
            std::future::pending(),
        ));
        assert_eq!(reason, StopReason::Elapsed);
    }

    #[test]
    fn test_wait_interrupted() {
        let root = root();
        let reason = tokio_test::block_on(wait_for_stop(&root, None, std::future::ready(())));
        assert_eq!(reason, StopReason::Interrupted);
    }

    #[test]
    fn test_wait_shutdown() {
        let root = root();
        root.event(SHUTDOWN_EVENT, None);
        let reason = tokio_test::block_on(wait_for_stop(&root, None, std::future::pending()));
        assert_eq!(reason, StopReason::Shutdown);
    }

    #[tokio::test]
    async fn test_run_for_duration() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            r#"
type = "Component"
enableTimingStats = true

[[components]]
name = "child"
type = "Component"

[run]
tc_rate_hz = 200.0
background_rate_hz = 50.0
duration_secs = 0.2
"#
        )
        .unwrap();

        let runner = Runner::load(file.path(), &Factory::with_builtins()).unwrap();
        assert_eq!(runner.config().tc_rate_hz, 200.0);

        let summary = runner.run_until(std::future::pending()).await.unwrap();
        assert_eq!(summary.reason, StopReason::Elapsed);
        assert!(summary.tc_cycles > 0);
        assert!(runner.root().is_shutdown());

        let child = runner.root().component_base().find_by_name("child").unwrap();
        assert!(child.component().is_shutdown());
        let stats = runner.root().component_base().timing_stats().unwrap();
        assert_eq!(stats.n() as u64, summary.tc_cycles);
    }

    #[tokio::test]
    async fn test_load_reports_bad_documents() {
        let dir = tempfile::tempdir().unwrap();
        let err = Runner::load(&dir.path().join("missing.toml"), &Factory::with_builtins())
            .err()
            .unwrap();
        assert!(err.to_string().contains("missing.toml"));
    }
}
