//! Utility library for the ccbench project

pub mod other;
pub mod stats;
