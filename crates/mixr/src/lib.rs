//! MIXR - Real-time component tree runner
//!
//! Loads a component document through the [`mixr_base`] factory and drives
//! the resulting tree from a time-critical and a background thread.

pub use mixr_base;

pub mod runner;
pub mod settings;

use mixr_base::Factory;

/// Factory holding every class the runner can build from a document.
pub fn default_factory() -> Factory {
    Factory::with_builtins()
}
