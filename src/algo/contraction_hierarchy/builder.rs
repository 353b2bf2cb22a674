//! Node-contraction core of the CH preprocessing.
//!
//! The key function, witness search and stop criterion are type parameters so
//! that the hot contraction loop monomorphizes; the shells select concrete
//! combinations.

use super::key_function::KeyFunction;
use super::stop_criterion::StopCriterion;
use super::witness_search::WitnessSearch;
use super::ContractionHierarchy;
use crate::datastr::graph::dynamic_graph::DynamicGraph;
use crate::datastr::graph::*;
use crate::datastr::index_heap::{IndexdMinHeap, Indexing};

/// Queue entry ordered by (key, vertex id). The id tie-break makes the
/// contraction order deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct QueueLabel {
    key: i32,
    vertex: Vertex,
}

impl Indexing for QueueLabel {
    fn as_index(&self) -> usize {
        self.vertex.id()
    }
}

pub struct Builder<K, W, S> {
    core: DynamicGraph,
    forward: Vec<Vec<Link>>,
    backward: Vec<Vec<Link>>,
    order: Vec<Vertex>,
    level: Vec<u16>,
    contracted: Vec<bool>,
    queue: IndexdMinHeap<QueueLabel>,
    key_function: K,
    witness_search: W,
    stop_criterion: S,
    sort_shortcuts: bool,
}

impl<K, W, S> Builder<K, W, S>
where
    W: WitnessSearch,
    K: KeyFunction<W>,
    S: StopCriterion,
{
    pub fn new<G: LinkIterGraph>(graph: &G, key_function: K, witness_search: W, stop_criterion: S) -> Builder<K, W, S> {
        let n = graph.num_vertices();
        Builder {
            core: DynamicGraph::from_graph(graph),
            forward: vec![Vec::new(); n],
            backward: vec![Vec::new(); n],
            order: Vec::new(),
            level: vec![0; n],
            contracted: vec![false; n],
            queue: IndexdMinHeap::new(n),
            key_function,
            witness_search,
            stop_criterion,
            sort_shortcuts: false,
        }
    }

    /// Sort candidate shortcuts by weight before witness testing, making the
    /// inserted shortcut set independent of adjacency order.
    pub fn set_sort_shortcuts(&mut self, sort_shortcuts: bool) {
        self.sort_shortcuts = sort_shortcuts;
    }

    pub fn run(&mut self) {
        self.initialize(true);
        self.contract_queue_vertices();
    }

    /// Continues contraction after a phase break, preserving the existing
    /// order. Vertices already contracted are skipped when rebuilding the queue.
    pub fn resume(&mut self) {
        self.initialize(false);
        self.contract_queue_vertices();
    }

    pub fn num_uncontracted_vertices(&self) -> usize {
        self.queue.len()
    }

    pub fn order(&self) -> &[Vertex] {
        &self.order
    }

    /// The uncontracted remainder as a static graph. Contracted vertices are
    /// isolated; the subgraph on the core vertices preserves their distances.
    pub fn core_graph(&self) -> FirstOutGraph {
        self.core.to_first_out_graph()
    }

    /// Dumps the remaining core edges into both overlays. Called after the
    /// stop criterion fired (or with an empty queue as a no-op).
    pub fn copy_core_to_ch(&mut self) {
        while let Some(label) = self.queue.pop() {
            let vertex = label.vertex;
            for arc in self.core.edges_from(vertex) {
                self.forward[vertex.id()].push(Link {
                    head: arc.head,
                    weight: arc.weight,
                });
                self.backward[arc.head.id()].push(Link {
                    head: vertex,
                    weight: arc.weight,
                });
            }
        }
    }

    pub fn finalize(self) -> ContractionHierarchy {
        ContractionHierarchy {
            forward: FirstOutGraph::from_adjacency_lists(self.forward),
            backward: FirstOutGraph::from_adjacency_lists(self.backward),
            order: self.order,
            level: self.level,
        }
    }

    fn initialize(&mut self, reset: bool) {
        if reset {
            self.order.clear();
            self.level.iter_mut().for_each(|level| *level = 0);
            self.contracted.iter_mut().for_each(|contracted| *contracted = false);
        }
        self.witness_search.initialize(self.core.num_vertices());
        let mut labels = Vec::with_capacity(self.core.num_vertices() - self.order.len());
        for vertex in 0..self.core.num_vertices() {
            if self.contracted[vertex] {
                continue;
            }
            let vertex = Vertex::new(vertex);
            let key = self.key_function.key(vertex, &self.core, &self.level, &mut self.witness_search);
            labels.push(QueueLabel { key, vertex });
        }
        self.queue.build(labels);
    }

    fn contract_queue_vertices(&mut self) {
        while !self.queue.is_empty() {
            for vertex in self.key_function.update(self.order.len()) {
                self.re_key(vertex);
            }
            let core_size = self.core.num_vertices() - self.order.len();
            if self.stop_criterion.should_stop(&self.core, core_size) {
                break;
            }
            let vertex = self.queue.pop().unwrap().vertex;
            self.contract(vertex);
        }
    }

    fn re_key(&mut self, vertex: Vertex) {
        if !self.queue.contains_index(vertex.id()) {
            return;
        }
        let key = self.key_function.key(vertex, &self.core, &self.level, &mut self.witness_search);
        self.queue.update(QueueLabel { key, vertex });
    }

    fn contract(&mut self, vertex: Vertex) {
        self.order.push(vertex);
        self.contracted[vertex.id()] = true;

        let mut shortcuts = Vec::new();
        for first in self.core.edges_to(vertex) {
            for second in self.core.edges_from(vertex) {
                if first.head == second.head {
                    continue;
                }
                shortcuts.push((first.head, second.head, first.weight + second.weight));
            }
        }
        if self.sort_shortcuts {
            shortcuts.sort_by_key(|&(_, _, weight)| weight);
        }
        for (from, to, weight) in shortcuts {
            if self.witness_search.shortcut_is_necessary(&self.core, from, to, vertex, weight) {
                self.core.insert_or_decrease(from, to, weight, vertex);
            }
        }

        let mut neighbors = Vec::new();
        for arc in self.core.edges_from(vertex) {
            self.forward[vertex.id()].push(Link {
                head: arc.head,
                weight: arc.weight,
            });
            neighbors.push(arc.head);
        }
        for arc in self.core.edges_to(vertex) {
            self.backward[vertex.id()].push(Link {
                head: arc.head,
                weight: arc.weight,
            });
            neighbors.push(arc.head);
        }
        self.core.isolate_vertex(vertex);

        neighbors.sort_unstable();
        neighbors.dedup();
        let level = self.level[vertex.id()] + 1;
        for neighbor in neighbors {
            self.level[neighbor.id()] = self.level[neighbor.id()].max(level);
            self.re_key(neighbor);
        }
    }
}
