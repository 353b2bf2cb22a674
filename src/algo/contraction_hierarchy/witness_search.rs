//! Witness search: certifies that a candidate shortcut is unnecessary because
//! a path of no larger weight avoiding the contracted vertex already exists.

use crate::algo::dijkstra::State;
use crate::datastr::graph::dynamic_graph::DynamicGraph;
use crate::datastr::graph::*;
use crate::datastr::index_heap::IndexdMinHeap;
use crate::datastr::timestamped_vector::TimestampedVector;

pub trait WitnessSearch {
    fn initialize(&mut self, _num_vertices: usize) {}

    /// Is the shortcut `(from, to)` via `via` with weight `shortcut_weight`
    /// required to preserve distances? Over-approximating ("yes" although a
    /// witness exists) only costs extra edges, never correctness.
    fn shortcut_is_necessary(&mut self, core: &DynamicGraph, from: Vertex, to: Vertex, via: Vertex, shortcut_weight: Weight) -> bool;
}

/// Inserts every candidate shortcut.
pub struct NoWitnessSearch;

impl WitnessSearch for NoWitnessSearch {
    fn shortcut_is_necessary(&mut self, _core: &DynamicGraph, _from: Vertex, _to: Vertex, _via: Vertex, _shortcut_weight: Weight) -> bool {
        true
    }
}

/// Dijkstra from the shortcut tail that forbids the contracted vertex.
/// Successive calls with the same (from, via) pair continue the previous
/// search instead of starting over; labels reset lazily via timestamps.
/// A queue-pop limit (optionally scaled by the out-degree of `via`) caps the
/// effort on pathological inputs, at the price of superfluous shortcuts.
pub struct WitnessDijkstra {
    labels: TimestampedVector<Weight>,
    queue: IndexdMinHeap<State<Weight>>,
    current_from: Vertex,
    current_via: Vertex,
    q_pops: usize,
    q_pop_limit: usize,
    adaptive_limit: bool,
    current_limit: usize,
}

impl WitnessDijkstra {
    /// `q_pop_limit == 0` disables the cap.
    pub fn new(q_pop_limit: usize, adaptive_limit: bool) -> WitnessDijkstra {
        WitnessDijkstra {
            labels: TimestampedVector::new(0, INFINITY),
            queue: IndexdMinHeap::new(0),
            current_from: Vertex::INVALID,
            current_via: Vertex::INVALID,
            q_pops: 0,
            q_pop_limit,
            adaptive_limit,
            current_limit: 0,
        }
    }
}

impl WitnessSearch for WitnessDijkstra {
    fn initialize(&mut self, num_vertices: usize) {
        self.labels = TimestampedVector::new(num_vertices, INFINITY);
        self.queue = IndexdMinHeap::new(num_vertices);
        self.current_from = Vertex::INVALID;
        self.current_via = Vertex::INVALID;
    }

    fn shortcut_is_necessary(&mut self, core: &DynamicGraph, from: Vertex, to: Vertex, via: Vertex, shortcut_weight: Weight) -> bool {
        if self.current_from != from || self.current_via != via {
            self.current_from = from;
            self.current_via = via;
            self.queue.clear();
            self.labels.reset();
            self.labels.set(from.id(), 0);
            self.queue.push(State { key: 0, vertex: from });
            self.q_pops = 0;
            self.current_limit = if self.adaptive_limit {
                self.q_pop_limit * core.out_degree(via)
            } else {
                self.q_pop_limit
            };
        }

        while let Some(front) = self.queue.peek() {
            if front.key > shortcut_weight || front.vertex == to {
                break;
            }
            let State { key, vertex } = self.queue.pop().unwrap();
            for arc in core.edges_from(vertex) {
                if arc.head == via {
                    continue;
                }
                let distance = key + arc.weight;
                if distance < self.labels[arc.head.id()] {
                    self.labels.set(arc.head.id(), distance);
                    self.queue.update(State {
                        key: distance,
                        vertex: arc.head,
                    });
                }
            }
            if self.q_pop_limit > 0 {
                self.q_pops += 1;
                if self.q_pops > self.current_limit {
                    break;
                }
            }
        }

        self.labels[to.id()] > shortcut_weight
    }
}
