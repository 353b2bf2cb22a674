//! Criteria deciding when contraction stops and the remaining core is kept.

use crate::datastr::graph::dynamic_graph::DynamicGraph;
use crate::datastr::graph::Graph;

pub trait StopCriterion {
    fn should_stop(&self, core: &DynamicGraph, core_size: usize) -> bool;
}

/// Contracts everything.
pub struct NoStopCriterion;

impl StopCriterion for NoStopCriterion {
    fn should_stop(&self, _core: &DynamicGraph, _core_size: usize) -> bool {
        false
    }
}

pub struct MinCoreSize {
    pub min_core_size: usize,
}

impl StopCriterion for MinCoreSize {
    fn should_stop(&self, _core: &DynamicGraph, core_size: usize) -> bool {
        core_size <= self.min_core_size
    }
}

pub struct MaxCoreDegree {
    pub max_core_degree: f64,
}

impl StopCriterion for MaxCoreDegree {
    fn should_stop(&self, core: &DynamicGraph, core_size: usize) -> bool {
        core.num_edges() as f64 / core_size as f64 >= self.max_core_degree
    }
}

/// Stop when the core is small enough or has become too dense.
pub struct CoreCriterion {
    min_core_size: usize,
    max_core_degree: f64,
}

impl CoreCriterion {
    pub fn new(min_core_size: usize, max_core_degree: f64) -> CoreCriterion {
        CoreCriterion {
            min_core_size,
            max_core_degree,
        }
    }
}

impl StopCriterion for CoreCriterion {
    fn should_stop(&self, core: &DynamicGraph, core_size: usize) -> bool {
        core_size <= self.min_core_size || core.num_edges() as f64 / core_size as f64 >= self.max_core_degree
    }
}
