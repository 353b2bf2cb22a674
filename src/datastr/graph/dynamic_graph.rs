//! Dynamic graph used during CH preprocessing and for shortcut accumulation.
//!
//! Keeps both out- and in-adjacency so that contraction can enumerate all
//! predecessor/successor pairs of a vertex. Edges carry the via vertex of the
//! shortcut they replace (`Vertex::INVALID` for input edges).

use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DynamicArc {
    pub head: Vertex,
    pub weight: Weight,
    pub via: Vertex,
}

#[derive(Debug, Clone)]
pub struct DynamicGraph {
    out: Vec<Vec<DynamicArc>>,
    // mirrored: `inn[v]` holds one arc per in-edge of `v`, with `head` = tail of the edge
    inn: Vec<Vec<DynamicArc>>,
    num_edges: usize,
}

impl DynamicGraph {
    pub fn new(n: usize) -> DynamicGraph {
        DynamicGraph {
            out: vec![Vec::new(); n],
            inn: vec![Vec::new(); n],
            num_edges: 0,
        }
    }

    /// Copies a static graph, dropping loops (a loop never helps a shortest path).
    pub fn from_graph<G: LinkIterGraph>(graph: &G) -> DynamicGraph {
        let mut result = DynamicGraph::new(graph.num_vertices());
        for vertex in 0..graph.num_vertices() {
            let vertex = Vertex::new(vertex);
            for Link { head, weight } in graph.link_iter(vertex) {
                if head == vertex {
                    continue;
                }
                result.insert_or_decrease(vertex, head, weight, Vertex::INVALID);
            }
        }
        result
    }

    pub fn edges_from(&self, vertex: Vertex) -> &[DynamicArc] {
        &self.out[vertex.id()]
    }

    pub fn edges_to(&self, vertex: Vertex) -> &[DynamicArc] {
        &self.inn[vertex.id()]
    }

    pub fn out_degree(&self, vertex: Vertex) -> usize {
        self.out[vertex.id()].len()
    }

    pub fn in_degree(&self, vertex: Vertex) -> usize {
        self.inn[vertex.id()].len()
    }

    pub fn has_edge(&self, from: Vertex, to: Vertex) -> bool {
        self.out[from.id()].iter().any(|arc| arc.head == to)
    }

    pub fn find_edge(&self, from: Vertex, to: Vertex) -> Option<DynamicArc> {
        self.out[from.id()].iter().find(|arc| arc.head == to).copied()
    }

    /// Inserts the edge `(from, to)` or lowers the weight of an existing parallel edge.
    /// Keeps exactly one edge per vertex pair, always with the minimum weight seen.
    pub fn insert_or_decrease(&mut self, from: Vertex, to: Vertex, weight: Weight, via: Vertex) {
        debug_assert!(from != to, "loop edges are never inserted");
        if let Some(arc) = self.out[from.id()].iter_mut().find(|arc| arc.head == to) {
            if weight < arc.weight {
                arc.weight = weight;
                arc.via = via;
                let mirrored = self.inn[to.id()].iter_mut().find(|arc| arc.head == from).unwrap();
                mirrored.weight = weight;
                mirrored.via = via;
            }
            return;
        }
        self.out[from.id()].push(DynamicArc { head: to, weight, via });
        self.inn[to.id()].push(DynamicArc { head: from, weight, via });
        self.num_edges += 1;
    }

    /// Removes all edges incident to `vertex`.
    pub fn isolate_vertex(&mut self, vertex: Vertex) {
        let out = std::mem::take(&mut self.out[vertex.id()]);
        for arc in &out {
            let list = &mut self.inn[arc.head.id()];
            let pos = list.iter().position(|mirrored| mirrored.head == vertex).unwrap();
            list.swap_remove(pos);
        }
        let inn = std::mem::take(&mut self.inn[vertex.id()]);
        for arc in &inn {
            let list = &mut self.out[arc.head.id()];
            let pos = list.iter().position(|mirrored| mirrored.head == vertex).unwrap();
            list.swap_remove(pos);
        }
        self.num_edges -= out.len() + inn.len();
    }

    /// Freeze into the static layout, discarding via information.
    pub fn to_first_out_graph(&self) -> FirstOutGraph {
        let lists = self
            .out
            .iter()
            .map(|arcs| {
                arcs.iter()
                    .map(|arc| Link {
                        head: arc.head,
                        weight: arc.weight,
                    })
                    .collect()
            })
            .collect();
        FirstOutGraph::from_adjacency_lists(lists)
    }
}

impl Graph for DynamicGraph {
    fn num_vertices(&self) -> usize {
        self.out.len()
    }

    fn num_edges(&self) -> usize {
        self.num_edges
    }

    fn degree(&self, vertex: Vertex) -> usize {
        self.out_degree(vertex) + self.in_degree(vertex)
    }
}

impl LinkIterGraph for DynamicGraph {
    fn link_iter(&self, vertex: Vertex) -> impl Iterator<Item = Link> + '_ {
        self.out[vertex.id()].iter().map(|arc| Link {
            head: arc.head,
            weight: arc.weight,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_minimum_parallel_edge() {
        let mut graph = DynamicGraph::new(3);
        graph.insert_or_decrease(Vertex(0), Vertex(1), 5, Vertex::INVALID);
        graph.insert_or_decrease(Vertex(0), Vertex(1), 3, Vertex(2));
        graph.insert_or_decrease(Vertex(0), Vertex(1), 7, Vertex::INVALID);
        assert_eq!(graph.num_edges(), 1);
        let arc = graph.find_edge(Vertex(0), Vertex(1)).unwrap();
        assert_eq!(arc.weight, 3);
        assert_eq!(arc.via, Vertex(2));
    }

    #[test]
    fn isolate_removes_mirrored_entries() {
        let mut graph = DynamicGraph::new(3);
        graph.insert_or_decrease(Vertex(0), Vertex(1), 1, Vertex::INVALID);
        graph.insert_or_decrease(Vertex(1), Vertex(2), 1, Vertex::INVALID);
        graph.insert_or_decrease(Vertex(2), Vertex(1), 1, Vertex::INVALID);
        graph.isolate_vertex(Vertex(1));
        assert_eq!(graph.num_edges(), 0);
        assert_eq!(graph.out_degree(Vertex(0)), 0);
        assert_eq!(graph.in_degree(Vertex(2)), 0);
    }
}
