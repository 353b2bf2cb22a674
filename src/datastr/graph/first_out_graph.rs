//! Goto static graph representation for route planning algorithms.
//!
//! The graph is stored as an adjacency array using three collections:
//! `first_out` (`n + 1` entries), `head` and `weight` (`m` entries each).
//! `head[first_out[v]..first_out[v + 1]]` contains the neighbors of `v`.

use super::*;
use crate::io::{Deconstruct, Loader, Reconstruct, Store};
use std::ops::Range;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FirstOutGraph {
    first_out: Vec<u32>,
    head: Vec<Vertex>,
    weight: Vec<Weight>,
}

impl FirstOutGraph {
    pub fn new(first_out: Vec<u32>, head: Vec<Vertex>, weight: Vec<Weight>) -> FirstOutGraph {
        assert_eq!(*first_out.first().expect("first_out must not be empty"), 0);
        assert_eq!(*first_out.last().unwrap() as usize, head.len());
        assert_eq!(weight.len(), head.len());

        FirstOutGraph { first_out, head, weight }
    }

    /// A graph with `n` vertices and no edges.
    pub fn empty(n: usize) -> FirstOutGraph {
        FirstOutGraph {
            first_out: vec![0; n + 1],
            head: Vec::new(),
            weight: Vec::new(),
        }
    }

    pub fn from_adjacency_lists(adjacency_lists: Vec<Vec<Link>>) -> FirstOutGraph {
        // prefix sum over the adjacency list sizes
        let mut first_out = Vec::with_capacity(adjacency_lists.len() + 1);
        first_out.push(0u32);
        for links in &adjacency_lists {
            first_out.push(first_out.last().unwrap() + links.len() as u32);
        }

        let (head, weight) = adjacency_lists
            .into_iter()
            .flat_map(|links| links.into_iter().map(|Link { head, weight }| (head, weight)))
            .unzip();

        FirstOutGraph::new(first_out, head, weight)
    }

    /// Create a new graph with all edges reversed.
    pub fn reversed<G: LinkIterGraph>(graph: &G) -> FirstOutGraph {
        let mut reversed: Vec<Vec<Link>> = (0..graph.num_vertices()).map(|_| Vec::new()).collect();

        for vertex in 0..graph.num_vertices() {
            let vertex = Vertex::new(vertex);
            for Link { head, weight } in graph.link_iter(vertex) {
                reversed[head.id()].push(Link { head: vertex, weight });
            }
        }

        FirstOutGraph::from_adjacency_lists(reversed)
    }

    pub fn first_out(&self) -> &[u32] {
        &self.first_out
    }

    pub fn head(&self) -> &[Vertex] {
        &self.head
    }

    pub fn weight(&self) -> &[Weight] {
        &self.weight
    }

    /// Range of edge ids forming the outgoing edges of `vertex`.
    #[inline]
    pub fn edge_range(&self, vertex: Vertex) -> Range<usize> {
        self.first_out[vertex.id()] as usize..self.first_out[vertex.id() + 1] as usize
    }

    /// Index of the first outgoing edge of `vertex`.
    /// Also valid for `vertex == num_vertices` where it yields `num_edges`.
    #[inline]
    pub fn begin_edge_from(&self, vertex: usize) -> usize {
        self.first_out[vertex] as usize
    }

    #[inline]
    pub fn link(&self, edge: usize) -> Link {
        Link {
            head: self.head[edge],
            weight: self.weight[edge],
        }
    }

    pub fn edge_index(&self, from: Vertex, to: Vertex) -> Option<usize> {
        self.edge_range(from).find(|&e| self.head[e] == to)
    }
}

impl Graph for FirstOutGraph {
    fn num_vertices(&self) -> usize {
        self.first_out.len() - 1
    }

    fn num_edges(&self) -> usize {
        self.head.len()
    }

    fn degree(&self, vertex: Vertex) -> usize {
        self.edge_range(vertex).len()
    }
}

impl LinkIterGraph for FirstOutGraph {
    fn link_iter(&self, vertex: Vertex) -> impl Iterator<Item = Link> + '_ {
        let range = self.edge_range(vertex);
        self.head[range.clone()]
            .iter()
            .zip(self.weight[range].iter())
            .map(|(&head, &weight)| Link { head, weight })
    }
}

impl Deconstruct for FirstOutGraph {
    fn store_each(&self, store: &dyn Fn(&str, &dyn Store) -> std::io::Result<()>) -> std::io::Result<()> {
        store("first_out", &self.first_out)?;
        store("head", &self.head)?;
        store("weight", &self.weight)?;
        Ok(())
    }
}

impl Reconstruct for FirstOutGraph {
    fn reconstruct_with(loader: Loader) -> std::io::Result<FirstOutGraph> {
        Ok(FirstOutGraph::new(loader.load("first_out")?, loader.load("head")?, loader.load("weight")?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacency_round_trip() {
        let graph = FirstOutGraph::from_adjacency_lists(vec![
            vec![Link { head: Vertex(1), weight: 2 }, Link { head: Vertex(2), weight: 7 }],
            vec![Link { head: Vertex(2), weight: 1 }],
            vec![],
        ]);
        assert_eq!(graph.num_vertices(), 3);
        assert_eq!(graph.num_edges(), 3);
        assert_eq!(graph.degree(Vertex(0)), 2);
        assert_eq!(graph.link_iter(Vertex(1)).next(), Some(Link { head: Vertex(2), weight: 1 }));
    }

    #[test]
    fn reversal_flips_edges() {
        let graph = FirstOutGraph::from_adjacency_lists(vec![vec![Link { head: Vertex(1), weight: 3 }], vec![], vec![]]);
        let reversed = FirstOutGraph::reversed(&graph);
        assert_eq!(reversed.degree(Vertex(0)), 0);
        assert_eq!(reversed.link_iter(Vertex(1)).next(), Some(Link { head: Vertex(0), weight: 3 }));
    }
}
