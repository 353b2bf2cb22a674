//! Building blocks for fast multi-modal routing.

use crate::datastr::graph::*;

pub mod contraction_hierarchy;
pub mod dijkstra;
pub mod raptor;
pub mod trip_based;

/// One entry of the Pareto set on (arrival time, number of trips).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrivalLabel {
    pub arrival_time: Weight,
    pub number_of_trips: u32,
}
