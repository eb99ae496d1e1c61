// src/graph/mod.rs

//! Graph reading and execution-order planning.
//!
//! - [`query`] is the read-only query layer over the document store.
//! - [`planner`] derives the program-to-program dependency graph and
//!   produces deterministic execution orders.

pub mod planner;
pub mod query;

pub use planner::plan_order;
