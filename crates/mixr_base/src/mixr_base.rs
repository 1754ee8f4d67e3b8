//! MIXR Base - Object runtime and component engine
//!
//! This crate holds the reflective object model the rest of MIXR is built on:
//! per-class metadata with chained property tables, name-addressed slot
//! assignment, reference counting, and the component tree that is driven by
//! a time-critical and a background update pass.
//!
//! Classes are declared with the [`mixr_class`] attribute, which generates
//! their [`ClassMetadata`] and property table.

// The class attribute expands to `::mixr_base::...` paths.
extern crate self as mixr_base;

mod error;
mod factory;
mod message;
mod metadata;
mod object;
mod property_table;
mod referenced;
mod statistic;
mod value;

pub mod component;
pub mod config;
pub mod thread;

pub use component::{share, Component, ComponentBase, EventToken, Pair, Selection, SendData};
pub use error::*;
pub use factory::*;
pub use message::*;
pub use metadata::*;
pub use object::*;
pub use property_table::*;
pub use referenced::*;
pub use statistic::*;
pub use value::*;

pub use mixr_macros::mixr_class;
