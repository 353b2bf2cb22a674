//! Multi-modal journey planning with unlimited walking transfers.
//!
//! Preprocessing: contraction hierarchies over the walking graph (with a
//! core variant keeping the stops uncontracted) and ULTRA transfer shortcut
//! computation, both stop-to-stop (for RAPTOR) and event-to-event (for
//! Trip-Based). Queries: ULTRA-RAPTOR and the Trip-Based engine, both using
//! a bucket-CH oracle for initial and final walking.

#[macro_use]
pub mod report;

pub mod algo;
pub mod cli;
pub mod datastr;
pub mod experiments;
pub mod io;
