//! Priorities deciding the contraction order.

use super::witness_search::WitnessSearch;
use crate::datastr::graph::dynamic_graph::DynamicGraph;
use crate::datastr::graph::*;

pub trait KeyFunction<W: WitnessSearch> {
    /// Priority of `vertex`; smaller keys contract first.
    fn key(&mut self, vertex: Vertex, core: &DynamicGraph, level: &[u16], witness_search: &mut W) -> i32;

    /// Called once per main-loop iteration. Returns vertices whose key has
    /// to be recomputed (used by the partial key's phase switch).
    fn update(&mut self, _num_contracted: usize) -> Vec<Vertex> {
        Vec::new()
    }
}

/// The classic greedy key: chain vertices (total degree at most two) contract
/// eagerly, everything else is priced by a simulated contraction.
pub struct GreedyKey {
    shortcut_weight: i32,
    level_weight: i32,
    degree_weight: i32,
}

impl GreedyKey {
    pub fn new(shortcut_weight: i32, level_weight: i32, degree_weight: i32) -> GreedyKey {
        GreedyKey {
            shortcut_weight,
            level_weight,
            degree_weight,
        }
    }

    fn simulate_contract<W: WitnessSearch>(&self, vertex: Vertex, core: &DynamicGraph, witness_search: &mut W) -> i32 {
        let mut shortcuts_added = 0;
        for first in core.edges_to(vertex) {
            for second in core.edges_from(vertex) {
                if first.head == second.head {
                    continue;
                }
                if witness_search.shortcut_is_necessary(core, first.head, second.head, vertex, first.weight + second.weight) {
                    shortcuts_added += 1;
                }
            }
        }
        shortcuts_added
    }
}

impl Default for GreedyKey {
    fn default() -> GreedyKey {
        GreedyKey::new(1024, 1024, 0)
    }
}

impl<W: WitnessSearch> KeyFunction<W> for GreedyKey {
    fn key(&mut self, vertex: Vertex, core: &DynamicGraph, level: &[u16], witness_search: &mut W) -> i32 {
        let in_degree = core.in_degree(vertex) as i32;
        let out_degree = core.out_degree(vertex) as i32;
        if in_degree <= 2 && out_degree <= 2 {
            let degree = in_degree + out_degree;
            if degree <= 1 {
                return level[vertex.id()] as i32 - 1000;
            }
            if degree == 2 {
                return level[vertex.id()] as i32 - 100000;
            }
        }
        let shortcuts_added = self.simulate_contract(vertex, core, witness_search);
        let key = ((self.shortcut_weight * shortcuts_added) / (in_degree + out_degree))
            + (self.level_weight * level[vertex.id()] as i32)
            + (self.degree_weight * in_degree * out_degree);
        debug_assert!(key >= 0);
        key
    }
}

/// Contracts in a fixed externally supplied order.
pub struct PermutationKey {
    rank: Vec<i32>,
}

impl PermutationKey {
    pub fn new(rank: Vec<i32>) -> PermutationKey {
        PermutationKey { rank }
    }
}

impl<W: WitnessSearch> KeyFunction<W> for PermutationKey {
    fn key(&mut self, vertex: Vertex, _core: &DynamicGraph, _level: &[u16], _witness_search: &mut W) -> i32 {
        self.rank[vertex.id()]
    }
}

/// Keeps a designated vertex set uncontracted by giving it infinite keys.
/// With `switch_after`, the set is released once that many vertices are
/// contracted, turning the core phase into a full contraction.
pub struct PartialKey<K> {
    contractable: Vec<bool>,
    switch_after: usize,
    key_function: K,
}

impl<K> PartialKey<K> {
    pub fn new(contractable: Vec<bool>, key_function: K) -> PartialKey<K> {
        PartialKey {
            contractable,
            switch_after: usize::MAX,
            key_function,
        }
    }

    pub fn with_phase_switch(contractable: Vec<bool>, switch_after: usize, key_function: K) -> PartialKey<K> {
        PartialKey {
            contractable,
            switch_after,
            key_function,
        }
    }
}

impl<W: WitnessSearch, K: KeyFunction<W>> KeyFunction<W> for PartialKey<K> {
    fn key(&mut self, vertex: Vertex, core: &DynamicGraph, level: &[u16], witness_search: &mut W) -> i32 {
        if self.contractable[vertex.id()] {
            self.key_function.key(vertex, core, level, witness_search)
        } else {
            i32::MAX
        }
    }

    fn update(&mut self, num_contracted: usize) -> Vec<Vertex> {
        if num_contracted < self.switch_after {
            return Vec::new();
        }
        self.switch_after = usize::MAX;
        let released = self
            .contractable
            .iter()
            .enumerate()
            .filter(|(_, &contractable)| !contractable)
            .map(|(vertex, _)| Vertex::new(vertex))
            .collect();
        self.contractable.iter_mut().for_each(|contractable| *contractable = true);
        released
    }
}

/// Pushes vertices below their prescribed minimum level to the back of the
/// queue without disturbing the order among them.
pub struct MinLevelKey<K> {
    min_level: Vec<u16>,
    key_function: K,
}

impl<K> MinLevelKey<K> {
    const OFFSET: i32 = (1 << 30) - 1;

    pub fn new(min_level: Vec<u16>, key_function: K) -> MinLevelKey<K> {
        MinLevelKey { min_level, key_function }
    }
}

impl<W: WitnessSearch, K: KeyFunction<W>> KeyFunction<W> for MinLevelKey<K> {
    fn key(&mut self, vertex: Vertex, core: &DynamicGraph, level: &[u16], witness_search: &mut W) -> i32 {
        let mut key = self.key_function.key(vertex, core, level, witness_search);
        if level[vertex.id()] < self.min_level[vertex.id()] {
            key = key.min(Self::OFFSET) + Self::OFFSET;
        }
        key
    }

    fn update(&mut self, num_contracted: usize) -> Vec<Vertex> {
        self.key_function.update(num_contracted)
    }
}

/// Scales positive keys by a per-vertex multiplier.
pub struct FactorKey<K> {
    factor: Vec<f32>,
    key_function: K,
}

impl<K> FactorKey<K> {
    pub fn new(factor: Vec<f32>, key_function: K) -> FactorKey<K> {
        FactorKey { factor, key_function }
    }
}

impl<W: WitnessSearch, K: KeyFunction<W>> KeyFunction<W> for FactorKey<K> {
    fn key(&mut self, vertex: Vertex, core: &DynamicGraph, level: &[u16], witness_search: &mut W) -> i32 {
        let key = self.key_function.key(vertex, core, level, witness_search);
        if key > 0 {
            let scaled = key as f32 * self.factor[vertex.id()];
            if scaled >= i32::MAX as f32 || scaled < 0.0 {
                return i32::MAX;
            }
            return scaled as i32;
        }
        key
    }

    fn update(&mut self, num_contracted: usize) -> Vec<Vertex> {
        self.key_function.update(num_contracted)
    }
}
