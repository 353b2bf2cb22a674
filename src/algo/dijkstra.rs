//! Basic variant of Dijkstra's algorithm.
//!
//! Used for the station equivalence computation, for the bucket construction
//! on the CH overlays and as ground truth in tests. The ULTRA searches run
//! their own specialized label-coupled variants.

use crate::datastr::{graph::*, index_heap::*, timestamped_vector::*};

/// Priority queue entries.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct State<K> {
    pub key: K,
    pub vertex: Vertex,
}

impl<K: PartialOrd> PartialOrd for State<K> {
    #[inline]
    fn partial_cmp(&self, rhs: &Self) -> Option<std::cmp::Ordering> {
        self.key.partial_cmp(&rhs.key)
    }
}

impl<K: Ord> Ord for State<K> {
    #[inline]
    fn cmp(&self, rhs: &Self) -> std::cmp::Ordering {
        self.key.cmp(&rhs.key)
    }
}

impl<K> Indexing for State<K> {
    #[inline]
    fn as_index(&self) -> usize {
        self.vertex.id()
    }
}

/// Scratch state of a Dijkstra search, reusable across runs.
#[derive(Clone)]
pub struct DijkstraData {
    pub distances: TimestampedVector<Weight>,
    pub predecessors: Vec<Vertex>,
    pub queue: IndexdMinHeap<State<Weight>>,
}

impl DijkstraData {
    pub fn new(n: usize) -> DijkstraData {
        DijkstraData {
            distances: TimestampedVector::new(n, INFINITY),
            predecessors: vec![Vertex::INVALID; n],
            queue: IndexdMinHeap::new(n),
        }
    }
}

/// One running query over borrowed scratch state.
pub struct DijkstraRun<'a, G> {
    graph: &'a G,
    data: &'a mut DijkstraData,
}

impl<'a, G: LinkIterGraph> DijkstraRun<'a, G> {
    pub fn query(graph: &'a G, data: &'a mut DijkstraData, from: Vertex) -> DijkstraRun<'a, G> {
        data.queue.clear();
        data.distances.reset();
        data.distances.set(from.id(), 0);
        data.queue.push(State { key: 0, vertex: from });
        DijkstraRun { graph, data }
    }

    /// Settles the next vertex. The edge predicate decides which outgoing
    /// links are relaxed.
    pub fn next_filtered_edges(&mut self, mut edge_predicate: impl FnMut(Vertex, &Link) -> bool) -> Option<(Vertex, Weight)> {
        let State { vertex, key } = self.data.queue.pop()?;
        for link in self.graph.link_iter(vertex) {
            if !edge_predicate(vertex, &link) {
                continue;
            }
            let distance = key + link.weight;
            if distance < self.data.distances[link.head.id()] {
                self.data.distances.set(link.head.id(), distance);
                self.data.predecessors[link.head.id()] = vertex;
                self.data.queue.update(State {
                    key: distance,
                    vertex: link.head,
                });
            }
        }
        Some((vertex, key))
    }

    pub fn tentative_distance(&self, vertex: Vertex) -> Weight {
        self.data.distances[vertex.id()]
    }

    pub fn min_queue_key(&self) -> Weight {
        self.data.queue.peek().map(|state| state.key).unwrap_or(INFINITY)
    }
}

impl<'a, G: LinkIterGraph> Iterator for DijkstraRun<'a, G> {
    type Item = (Vertex, Weight);

    #[inline]
    fn next(&mut self) -> Option<(Vertex, Weight)> {
        self.next_filtered_edges(|_, _| true)
    }
}

/// One-to-all run invoking `on_settle` for every settled vertex.
pub fn run_one_to_all<G: LinkIterGraph>(
    graph: &G,
    data: &mut DijkstraData,
    from: Vertex,
    mut edge_predicate: impl FnMut(Vertex, &Link) -> bool,
    mut on_settle: impl FnMut(Vertex, Weight),
) {
    let mut run = DijkstraRun::query(graph, data, from);
    while let Some((vertex, distance)) = run.next_filtered_edges(&mut edge_predicate) {
        on_settle(vertex, distance);
    }
}
