//! Calculation modules.
//!
//! `brackets` and `projection` are the two generic engines. `tools` holds
//! the per-tax calculators that select a configured schedule and feed it to
//! the engines.

pub mod brackets;
pub mod common;
pub mod projection;
pub mod tools;
