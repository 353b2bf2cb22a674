//! Plain bidirectional CH distance query.
//!
//! Not much more than two alternating upward Dijkstras with a different
//! stopping criterion: a direction only keeps running while its minimum queue
//! key can still improve the tentative distance.

use super::ContractionHierarchy;
use crate::algo::dijkstra::*;
use crate::datastr::graph::*;

pub struct Server<'a> {
    ch: &'a ContractionHierarchy,
    forward_data: DijkstraData,
    backward_data: DijkstraData,
    meeting_vertex: Vertex,
}

impl<'a> Server<'a> {
    pub fn new(ch: &'a ContractionHierarchy) -> Server<'a> {
        let n = ch.num_vertices();
        Server {
            ch,
            forward_data: DijkstraData::new(n),
            backward_data: DijkstraData::new(n),
            meeting_vertex: Vertex::INVALID,
        }
    }

    pub fn distance(&mut self, from: Vertex, to: Vertex) -> Option<Weight> {
        let mut tentative_distance = INFINITY;
        self.meeting_vertex = Vertex::INVALID;

        let mut forward = DijkstraRun::query(&self.ch.forward, &mut self.forward_data, from);
        let mut backward = DijkstraRun::query(&self.ch.backward, &mut self.backward_data, to);

        loop {
            let forward_key = forward.min_queue_key();
            let backward_key = backward.min_queue_key();
            if forward_key.min(backward_key) >= tentative_distance {
                break;
            }
            if forward_key <= backward_key {
                if let Some((vertex, distance)) = forward.next() {
                    let candidate = distance + backward.tentative_distance(vertex);
                    if candidate < tentative_distance {
                        tentative_distance = candidate;
                        self.meeting_vertex = vertex;
                    }
                }
            } else if let Some((vertex, distance)) = backward.next() {
                let candidate = distance + forward.tentative_distance(vertex);
                if candidate < tentative_distance {
                    tentative_distance = candidate;
                    self.meeting_vertex = vertex;
                }
            }
        }

        if tentative_distance >= INFINITY {
            None
        } else {
            Some(tentative_distance)
        }
    }

    pub fn meeting_vertex(&self) -> Vertex {
        self.meeting_vertex
    }
}
