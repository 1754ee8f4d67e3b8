//! Runner settings
//!
//! Read from the `[run]` table of a component document, then overridden by
//! command line flags.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How the runner drives the component tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Time-critical update rate
    #[serde(default = "default_tc_rate")]
    pub tc_rate_hz: f64,
    /// Background update rate
    #[serde(default = "default_background_rate")]
    pub background_rate_hz: f64,
    /// Stop after this many seconds; run until interrupted when absent
    #[serde(default)]
    pub duration_secs: Option<f64>,
    #[serde(default)]
    pub timing_stats: bool,
    #[serde(default)]
    pub print_timing_stats: bool,
}

fn default_tc_rate() -> f64 {
    50.0
}

fn default_background_rate() -> f64 {
    10.0
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            tc_rate_hz: default_tc_rate(),
            background_rate_hz: default_background_rate(),
            duration_secs: None,
            timing_stats: false,
            print_timing_stats: false,
        }
    }
}

/// Command line values that take precedence over the document
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub tc_rate_hz: Option<f64>,
    pub background_rate_hz: Option<f64>,
    pub duration_secs: Option<f64>,
    pub timing_stats: bool,
    pub print_timing_stats: bool,
}

impl RunConfig {
    pub fn with_overrides(mut self, overrides: &Overrides) -> Self {
        if let Some(rate) = overrides.tc_rate_hz {
            self.tc_rate_hz = rate;
        }
        if let Some(rate) = overrides.background_rate_hz {
            self.background_rate_hz = rate;
        }
        if let Some(secs) = overrides.duration_secs {
            self.duration_secs = Some(secs);
        }
        self.timing_stats |= overrides.timing_stats;
        self.print_timing_stats |= overrides.print_timing_stats;
        self
    }

    /// Run length, if a representable non-negative duration was configured
    pub fn duration(&self) -> Option<Duration> {
        self.duration_secs
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }
}
