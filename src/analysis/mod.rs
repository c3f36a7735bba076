//! Analysis modules.
//!
//! This module computes the analytics summary over a user's todos.

pub mod aggregator;

pub use aggregator::*;
