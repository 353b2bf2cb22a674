//! Contraction hierarchies for the walking graph.
//!
//! The builder contracts vertices in priority order, inserting witness-checked
//! shortcuts into a dynamic core graph and accumulating an upward (forward)
//! and a downward (backward) overlay. A core variant keeps the transit stops
//! uncontracted so that ULTRA's searches can run on the much smaller core.

use crate::datastr::graph::*;
use crate::io::{Deconstruct, Loader, Reconstruct, Store};
use std::io::Result;
use std::path::Path;

pub mod bucket_query;
pub mod builder;
pub mod key_function;
pub mod query;
pub mod stop_criterion;
pub mod witness_search;

pub use bucket_query::BucketChInitialTransfers;
pub use builder::Builder;
pub use key_function::{FactorKey, GreedyKey, KeyFunction, MinLevelKey, PartialKey, PermutationKey};
pub use stop_criterion::{CoreCriterion, MaxCoreDegree, MinCoreSize, NoStopCriterion, StopCriterion};
pub use witness_search::{NoWitnessSearch, WitnessDijkstra, WitnessSearch};

/// The completely preprocessed hierarchy: both overlays, the contraction
/// order and the per-vertex levels.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractionHierarchy {
    pub forward: FirstOutGraph,
    pub backward: FirstOutGraph,
    pub order: Vec<Vertex>,
    pub level: Vec<u16>,
}

impl ContractionHierarchy {
    pub fn num_vertices(&self) -> usize {
        self.forward.num_vertices()
    }

    pub fn serialize<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        self.deconstruct_to(dir)?;
        self.forward.deconstruct_to(dir.join("forward"))?;
        self.backward.deconstruct_to(dir.join("backward"))
    }

    pub fn deserialize<P: AsRef<Path>>(dir: P) -> Result<ContractionHierarchy> {
        let dir = dir.as_ref();
        let mut ch = ContractionHierarchy::reconstruct_from(dir)?;
        ch.forward = FirstOutGraph::reconstruct_from(dir.join("forward"))?;
        ch.backward = FirstOutGraph::reconstruct_from(dir.join("backward"))?;
        Ok(ch)
    }
}

impl Deconstruct for ContractionHierarchy {
    fn store_each(&self, store: &dyn Fn(&str, &dyn Store) -> Result<()>) -> Result<()> {
        store("order", &self.order)?;
        store("level", &self.level)?;
        Ok(())
    }
}

impl Reconstruct for ContractionHierarchy {
    fn reconstruct_with(loader: Loader) -> Result<ContractionHierarchy> {
        Ok(ContractionHierarchy {
            forward: FirstOutGraph::empty(0),
            backward: FirstOutGraph::empty(0),
            order: loader.load("order")?,
            level: loader.load("level")?,
        })
    }
}

/// Fully contracts `graph` with the default greedy key and witness search.
pub fn contract_graph<G: LinkIterGraph>(graph: &G) -> ContractionHierarchy {
    let mut builder = Builder::new(graph, GreedyKey::default(), WitnessDijkstra::new(500, true), NoStopCriterion);
    builder.run();
    builder.copy_core_to_ch();
    builder.finalize()
}

/// Contracts everything except the first `num_core` vertices (the stops).
/// Stops early when the average core degree exceeds `max_core_degree`.
/// Returns the hierarchy and the remaining core as a static graph; the core
/// preserves shortest-path distances between all uncontracted vertices.
pub fn contract_to_core<G: LinkIterGraph>(graph: &G, num_core: usize, max_core_degree: f64) -> (ContractionHierarchy, FirstOutGraph) {
    let contractable = (0..graph.num_vertices()).map(|vertex| vertex >= num_core).collect();
    let mut builder = Builder::new(
        graph,
        PartialKey::new(contractable, GreedyKey::default()),
        WitnessDijkstra::new(500, true),
        CoreCriterion::new(num_core, max_core_degree),
    );
    builder.run();
    let core = builder.core_graph();
    builder.copy_core_to_ch();
    (builder.finalize(), core)
}
