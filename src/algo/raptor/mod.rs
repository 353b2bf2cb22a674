//! RAPTOR-family algorithms: the ULTRA stop-to-stop shortcut computation and
//! the ULTRA-RAPTOR query engine.

use crate::algo::dijkstra::{run_one_to_all, DijkstraData};
use crate::datastr::graph::*;
use crate::datastr::timetable::*;

pub mod builder;
pub mod shortcut_search;
pub mod ultra_raptor;

pub use builder::compute_stop_to_stop_shortcuts;
pub use shortcut_search::{ShortcutSearch, ShortcutSearchConfig};
pub use ultra_raptor::UltraRaptor;

/// A stop-to-stop transfer shortcut. The set is deduplicated by
/// (origin, destination); the walking distance is determined by the pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortcut {
    pub origin: StopId,
    pub destination: StopId,
    pub walking_distance: Weight,
}

/// The set of stops mutually connected by zero-weight walking edges,
/// represented by its smallest member.
#[derive(Debug, Clone)]
pub struct Station {
    pub representative: StopId,
    pub stops: Vec<StopId>,
}

impl Station {
    fn add(&mut self, stop: StopId) {
        if self.representative > stop {
            self.representative = stop;
        }
        self.stops.push(stop);
    }
}

/// Station membership for every stop, shared read-only by all workers.
#[derive(Debug)]
pub struct Stations {
    station_of_stop: Vec<Station>,
}

impl Stations {
    pub fn compute(data: &Timetable) -> Stations {
        let mut station_of_stop: Vec<Station> = (0..data.num_stops())
            .map(|_| Station {
                representative: StopId::INVALID,
                stops: Vec::new(),
            })
            .collect();
        let mut dijkstra_data = DijkstraData::new(data.num_vertices());
        for stop in data.stops() {
            run_one_to_all(
                &data.transfer_graph,
                &mut dijkstra_data,
                stop.vertex(),
                |_, link| link.weight == 0,
                |vertex, _| {
                    if data.is_stop(vertex) {
                        station_of_stop[stop.id()].add(vertex.stop());
                    }
                },
            );
        }
        Stations { station_of_stop }
    }

    #[inline]
    pub fn station_of(&self, stop: StopId) -> &Station {
        &self.station_of_stop[stop.id()]
    }

    #[inline]
    pub fn representative(&self, stop: StopId) -> StopId {
        self.station_of_stop[stop.id()].representative
    }
}

/// Sorts by (origin, destination), deduplicates and freezes the shortcut set
/// into a transfer graph over the stops.
pub fn shortcuts_to_transfer_graph(mut shortcuts: Vec<Shortcut>, num_stops: usize) -> (Vec<Shortcut>, FirstOutGraph) {
    shortcuts.sort_by_key(|shortcut| (shortcut.origin, shortcut.destination));
    shortcuts.dedup_by_key(|shortcut| (shortcut.origin, shortcut.destination));
    let mut adjacency: Vec<Vec<Link>> = vec![Vec::new(); num_stops];
    for shortcut in &shortcuts {
        adjacency[shortcut.origin.id()].push(Link {
            head: shortcut.destination.vertex(),
            weight: shortcut.walking_distance,
        });
    }
    (shortcuts, FirstOutGraph::from_adjacency_lists(adjacency))
}
