//! ULTRA stop-to-stop shortcut search.
//!
//! A three-round RAPTOR-like range search from one station: round 0 is pure
//! walking from the source station, round 1 the first trip, round 2 the
//! second trip. Journeys boarding the first trip directly at the source
//! station are *candidates*; every other journey is a *witness*. A shortcut
//! (trip-1 alighting stop -> trip-2 boarding stop) is emitted exactly for the
//! candidates that survive witness domination in the final walking round.
//!
//! Departure times are processed in descending order without clearing the
//! arrival labels in between, so journeys found for later departures prune
//! earlier ones for free.

use super::{Shortcut, Station, Stations};
use crate::algo::dijkstra::State;
use crate::datastr::graph::*;
use crate::datastr::index_heap::IndexdMinHeap;
use crate::datastr::indexed_map::IndexedMap;
use crate::datastr::indexed_set::IndexedSet;
use crate::datastr::timetable::*;

#[derive(Debug, Clone, Copy)]
pub struct ShortcutSearchConfig {
    /// After the last candidate settled, the witness search keeps running for
    /// this many additional seconds of arrival time. Too small a limit leaves
    /// superfluous shortcuts, never incorrect ones.
    pub witness_transfer_limit: Weight,
    /// Demote candidates whose shortcut was already found to witnesses.
    pub prune_with_existing_shortcuts: bool,
    /// Only emit shortcuts whose destination lies in the round-0 walking ball.
    pub require_direct_transfer: bool,
}

impl Default for ShortcutSearchConfig {
    fn default() -> ShortcutSearchConfig {
        ShortcutSearchConfig {
            witness_transfer_limit: 15 * 60,
            prune_with_existing_shortcuts: true,
            require_direct_transfer: false,
        }
    }
}

struct DepartureLabel {
    route: Option<RouteSegment>,
    departure_time: Weight,
}

struct ConsolidatedDepartureLabel {
    routes: Vec<RouteSegment>,
    departure_time: Weight,
}

pub struct ShortcutSearch<'a> {
    data: &'a Timetable,
    stations: &'a Stations,
    config: ShortcutSearchConfig,

    source_station: Station,
    source_departure_time: Weight,

    direct_transfer_arrival: Vec<Weight>,
    direct_transfer_queue: IndexdMinHeap<State<Weight>>,
    stops_reached_by_direct_transfer: Vec<StopId>,

    zero_trips_arrival: Vec<Weight>,
    one_trip_arrival: Vec<Weight>,
    one_trip_queue: IndexdMinHeap<State<Weight>>,
    two_trips_arrival: Vec<Weight>,
    two_trips_queue: IndexdMinHeap<State<Weight>>,

    // only valid for candidates, `INVALID` marks witnesses
    one_trip_transfer_parent: Vec<StopId>,
    two_trips_route_parent: Vec<StopId>,

    shortcut_candidates_in_queue: isize,
    // maps potential shortcut destinations to the final stops of the
    // candidate journeys using that shortcut
    shortcut_destination_candidates: IndexedMap<StopId, Vec<StopId>>,
    shortcut_destination_stops: Vec<StopId>,

    routes_serving_updated_stops: IndexedMap<RouteId, StopIndex>,
    stops_updated_by_route: IndexedSet<StopId>,
    stops_updated_by_transfer: IndexedSet<StopId>,

    earliest_departure_time: Weight,

    local_shortcut_graph: Vec<Vec<StopId>>,
    shortcuts: Vec<Shortcut>,
}

impl<'a> ShortcutSearch<'a> {
    pub fn new(data: &'a Timetable, stations: &'a Stations, config: ShortcutSearchConfig) -> ShortcutSearch<'a> {
        assert!(data.has_implicit_buffer_times(), "shortcut search requires implicit departure buffer times");
        let num_stops = data.num_stops();
        let num_vertices = data.num_vertices();
        ShortcutSearch {
            data,
            stations,
            config,
            source_station: Station {
                representative: StopId::INVALID,
                stops: Vec::new(),
            },
            source_departure_time: 0,
            direct_transfer_arrival: vec![NEVER; num_vertices],
            direct_transfer_queue: IndexdMinHeap::new(num_vertices),
            stops_reached_by_direct_transfer: Vec::new(),
            zero_trips_arrival: vec![NEVER; num_stops],
            one_trip_arrival: vec![NEVER; num_vertices],
            one_trip_queue: IndexdMinHeap::new(num_vertices),
            two_trips_arrival: vec![NEVER; num_vertices],
            two_trips_queue: IndexdMinHeap::new(num_vertices),
            one_trip_transfer_parent: vec![StopId::INVALID; num_vertices],
            two_trips_route_parent: vec![StopId::INVALID; num_stops],
            shortcut_candidates_in_queue: 0,
            shortcut_destination_candidates: IndexedMap::new(num_stops),
            shortcut_destination_stops: Vec::new(),
            routes_serving_updated_stops: IndexedMap::new(data.num_routes()),
            stops_updated_by_route: IndexedSet::new(num_stops),
            stops_updated_by_transfer: IndexedSet::new(num_stops),
            earliest_departure_time: data.min_departure_time(),
            local_shortcut_graph: vec![Vec::new(); num_stops],
            shortcuts: Vec::new(),
        }
    }

    /// Runs the search for one station. Only executed on the representative;
    /// other members of the station return immediately.
    pub fn run(&mut self, source: StopId, min_time: Weight, max_time: Weight) {
        debug_assert!(source.id() < self.data.num_stops(), "source {} is not a stop", source);
        if self.stations.representative(source) != source {
            return;
        }
        self.set_source(source);
        for label in self.collect_departures(min_time, max_time) {
            self.run_for_departure_time(&label);
            for position in 0..self.shortcut_destination_stops.len() {
                let destination = self.shortcut_destination_stops[position];
                let origin = self.one_trip_transfer_parent[destination.vertex().id()];
                debug_assert!(origin.is_valid(), "shortcut origin of {} is unknown", destination);
                if !self.local_shortcut_graph[origin.id()].contains(&destination) {
                    self.local_shortcut_graph[origin.id()].push(destination);
                    self.shortcuts.push(Shortcut {
                        origin,
                        destination,
                        walking_distance: self.one_trip_arrival[destination.vertex().id()] - self.one_trip_arrival[origin.vertex().id()],
                    });
                }
            }
        }
    }

    pub fn take_shortcuts(&mut self) -> Vec<Shortcut> {
        std::mem::take(&mut self.shortcuts)
    }

    fn set_source(&mut self, source: StopId) {
        debug_assert!(self.direct_transfer_queue.is_empty(), "queue for round 0 is not empty");
        self.clear();
        self.source_station = self.stations.station_of(source).clone();
        self.initial_dijkstra();
        self.stops_reached_by_direct_transfer.sort_unstable();
    }

    fn clear(&mut self) {
        self.source_station = Station {
            representative: StopId::INVALID,
            stops: Vec::new(),
        };
        self.direct_transfer_arrival.fill(NEVER);
        self.stops_reached_by_direct_transfer.clear();
        self.zero_trips_arrival.fill(NEVER);
        self.one_trip_queue.clear();
        self.one_trip_arrival.fill(NEVER);
        self.two_trips_queue.clear();
        self.two_trips_arrival.fill(NEVER);
        self.one_trip_transfer_parent.fill(StopId::INVALID);
        self.two_trips_route_parent.fill(StopId::INVALID);
        self.shortcut_candidates_in_queue = 0;
        self.shortcut_destination_candidates.clear();
        self.shortcut_destination_stops.clear();
        self.routes_serving_updated_stops.clear();
        self.stops_updated_by_route.clear();
        self.stops_updated_by_transfer.clear();
    }

    fn run_for_departure_time(&mut self, label: &ConsolidatedDepartureLabel) {
        self.shortcut_candidates_in_queue = 0;
        self.shortcut_destination_candidates.clear();
        self.shortcut_destination_stops.clear();

        self.routes_serving_updated_stops.clear();
        self.stops_updated_by_route.clear();
        self.stops_updated_by_transfer.clear();

        self.source_departure_time = label.departure_time;
        for position in 0..self.source_station.stops.len() {
            let stop = self.source_station.stops[position];
            self.zero_trips_arrival[stop.id()] = label.departure_time;
            self.one_trip_arrival[stop.vertex().id()] = label.departure_time;
            self.one_trip_queue.remove(stop.vertex().id());
            self.two_trips_arrival[stop.vertex().id()] = label.departure_time;
            self.two_trips_queue.remove(stop.vertex().id());
        }

        self.relax_initial_transfers();
        self.collect_routes(&label.routes);
        self.scan_routes(1);
        for position in 0..self.source_station.stops.len() {
            let stop = self.source_station.stops[position];
            self.stops_updated_by_transfer.insert(stop);
        }
        self.collect_routes_serving_updated_stops(1);
        self.scan_routes(1);
        self.intermediate_dijkstra();
        self.collect_routes_serving_updated_stops(2);
        self.scan_routes(2);
        self.final_dijkstra();
    }

    fn collect_departures(&self, min_time: Weight, max_time: Weight) -> Vec<ConsolidatedDepartureLabel> {
        debug_assert!(self.direct_transfer_arrival[self.source_station.representative.vertex().id()] == 0);
        let cutoff_time = min_time.max(self.earliest_departure_time);
        let mut departure_labels = Vec::new();
        for route in self.data.routes() {
            let stops = self.data.stop_array_of_route(route);
            let trip_size = stops.len();
            let events = self.data.events_of_route(route);
            let mut minimal_transfer_time = NEVER;
            for stop_index in 0..trip_size.saturating_sub(1) {
                let transfer_time = self.direct_transfer_arrival[stops[stop_index].vertex().id()];
                if transfer_time > minimal_transfer_time {
                    continue;
                }
                minimal_transfer_time = transfer_time;
                for trip in 0..self.data.number_of_trips_in_route(route) {
                    let departure_time = events[trip * trip_size + stop_index].departure_time - minimal_transfer_time;
                    if departure_time < cutoff_time {
                        continue;
                    }
                    if departure_time > max_time {
                        break;
                    }
                    if self.stations.representative(stops[stop_index]) == self.source_station.representative {
                        departure_labels.push(DepartureLabel {
                            route: None,
                            departure_time,
                        });
                    } else {
                        departure_labels.push(DepartureLabel {
                            route: Some(RouteSegment {
                                route_id: route,
                                stop_index: StopIndex::new(stop_index),
                            }),
                            departure_time,
                        });
                    }
                }
            }
        }
        // descending by departure time; among equal times the routed labels
        // come first so they attach to the right consolidated run
        departure_labels.sort_by(|a, b| {
            b.departure_time
                .cmp(&a.departure_time)
                .then_with(|| route_sort_key(a).cmp(&route_sort_key(b)))
        });

        let mut result = vec![ConsolidatedDepartureLabel {
            routes: Vec::new(),
            departure_time: NEVER,
        }];
        for label in departure_labels {
            match label.route {
                None => {
                    if label.departure_time == result.last().unwrap().departure_time {
                        continue;
                    }
                    result.last_mut().unwrap().departure_time = label.departure_time;
                    result.push(ConsolidatedDepartureLabel {
                        routes: Vec::new(),
                        departure_time: label.departure_time,
                    });
                }
                Some(segment) => result.last_mut().unwrap().routes.push(segment),
            }
        }
        result.pop();
        result
    }

    fn initial_dijkstra(&mut self) {
        let data = self.data;
        let representative = self.source_station.representative.vertex();
        self.direct_transfer_arrival[representative.id()] = 0;
        self.direct_transfer_queue.update(State {
            key: 0,
            vertex: representative,
        });
        while let Some(State { key, vertex }) = self.direct_transfer_queue.pop() {
            for link in data.transfer_graph.link_iter(vertex) {
                let new_arrival_time = key + link.weight;
                if new_arrival_time < self.direct_transfer_arrival[link.head.id()] {
                    self.direct_transfer_arrival[link.head.id()] = new_arrival_time;
                    self.direct_transfer_queue.update(State {
                        key: new_arrival_time,
                        vertex: link.head,
                    });
                }
            }
            if data.is_stop(vertex) && self.stations.representative(vertex.stop()) != self.source_station.representative {
                self.stops_reached_by_direct_transfer.push(vertex.stop());
            }
        }
    }

    fn relax_initial_transfers(&mut self) {
        debug_assert!(self.stops_updated_by_transfer.is_empty());
        for position in 0..self.stops_reached_by_direct_transfer.len() {
            let stop = self.stops_reached_by_direct_transfer[position];
            let new_arrival_time = self.source_departure_time + self.direct_transfer_arrival[stop.vertex().id()];
            self.arrival_by_edge0(stop.vertex(), new_arrival_time);
            self.stops_updated_by_transfer.insert(stop);
        }
    }

    fn collect_routes(&mut self, routes: &[RouteSegment]) {
        for &segment in routes {
            debug_assert!(self.data.is_route(segment.route_id));
            debug_assert!(segment.stop_index.id() + 1 < self.data.number_of_stops_in_route(segment.route_id));
            if self.routes_serving_updated_stops.contains(segment.route_id) {
                let stop_index = self.routes_serving_updated_stops.get_mut(segment.route_id).unwrap();
                *stop_index = (*stop_index).min(segment.stop_index);
            } else {
                self.routes_serving_updated_stops.insert(segment.route_id, segment.stop_index);
            }
        }
    }

    fn collect_routes_serving_updated_stops(&mut self, round: u8) {
        for position in 0..self.stops_updated_by_transfer.len() {
            let stop = self.stops_updated_by_transfer.element(position);
            let arrival_time = self.arrival_time(round - 1, stop);
            for &segment in self.data.routes_containing_stop(stop) {
                debug_assert!(self.data.stop_of_route_segment(segment) == stop);
                if segment.stop_index.id() + 1 == self.data.number_of_stops_in_route(segment.route_id) {
                    continue;
                }
                if self.data.last_trip_of_route(segment.route_id)[segment.stop_index.id()].departure_time < arrival_time {
                    continue;
                }
                if self.routes_serving_updated_stops.contains(segment.route_id) {
                    let stop_index = self.routes_serving_updated_stops.get_mut(segment.route_id).unwrap();
                    *stop_index = (*stop_index).min(segment.stop_index);
                } else {
                    self.routes_serving_updated_stops.insert(segment.route_id, segment.stop_index);
                }
            }
        }
    }

    fn scan_routes(&mut self, round: u8) {
        debug_assert!(round == 1 || round == 2, "invalid round");
        let data = self.data;
        for position in 0..self.routes_serving_updated_stops.len() {
            let route = self.routes_serving_updated_stops.key(position);
            let stop_index = *self.routes_serving_updated_stops.get(route).unwrap();
            let mut trip = data.trip_iterator(route, stop_index);
            let mut parent_index = stop_index;
            while trip.has_further_stops() {
                // find the earliest trip that can be entered
                if trip.has_earlier_trip() && trip.previous_departure_time() >= self.arrival_time(round - 1, trip.stop()) {
                    while trip.has_earlier_trip() && trip.previous_departure_time() >= self.arrival_time(round - 1, trip.stop()) {
                        trip.previous_trip();
                    }
                    if !self.stops_updated_by_transfer.contains(trip.stop()) {
                        // Trip was improved by an arrival found during a
                        // previous departure run and has been explored then.
                        // Fast forward to the next stop updated in this run.
                        if !trip.has_earlier_trip() {
                            break;
                        }
                        loop {
                            trip.next_stop();
                            if !trip.has_further_stops() {
                                break;
                            }
                            if self.stops_updated_by_transfer.contains(trip.stop())
                                && trip.previous_departure_time() >= self.arrival_time(round - 1, trip.stop())
                            {
                                break;
                            }
                        }
                        continue;
                    }
                    parent_index = trip.stop_index();
                }
                trip.next_stop();
                let new_arrival_time = trip.arrival_time();
                let stop = trip.stop();
                let parent = trip.stop_at(parent_index);
                let current_arrival_time = self.arrival_time(round, stop);
                if new_arrival_time < current_arrival_time
                    || (new_arrival_time == current_arrival_time && self.is_candidate_boarding(round, parent))
                {
                    self.arrival_by_route(round, stop, new_arrival_time, parent);
                }
            }
        }
        self.stops_updated_by_transfer.clear();
        self.routes_serving_updated_stops.clear();
    }

    fn intermediate_dijkstra(&mut self) {
        debug_assert!(self.stops_updated_by_transfer.is_empty());

        self.shortcut_candidates_in_queue = 0;
        for position in 0..self.stops_updated_by_route.len() {
            let stop = self.stops_updated_by_route.element(position);
            self.one_trip_queue.update(State {
                key: self.one_trip_arrival[stop.vertex().id()],
                vertex: stop.vertex(),
            });
            if self.one_trip_transfer_parent[stop.vertex().id()].is_valid() {
                self.shortcut_candidates_in_queue += 1;
            }
        }
        if self.shortcut_candidates_in_queue == 0 {
            self.stops_updated_by_route.clear();
            return;
        }

        let data = self.data;
        let mut transfer_limit = Weight::MAX;
        while let Some(State { key, vertex }) = self.one_trip_queue.pop() {
            for link in data.transfer_graph.link_iter(vertex) {
                let new_arrival_time = key + link.weight;
                let current = self.one_trip_arrival[link.head.id()];
                if new_arrival_time < current {
                    self.arrival_by_edge1(link.head, new_arrival_time, vertex);
                } else if new_arrival_time == current
                    && !self.one_trip_transfer_parent[vertex.id()].is_valid()
                    && self.one_trip_transfer_parent[link.head.id()].is_valid()
                {
                    // on ties, a witness displaces the candidate
                    self.arrival_by_edge1(link.head, new_arrival_time, vertex);
                }
            }
            if self.one_trip_transfer_parent[vertex.id()].is_valid() {
                self.shortcut_candidates_in_queue -= 1;
            }
            if self.shortcut_candidates_in_queue == 0 {
                // All candidates settled; keep the search running until the
                // witness transfer limit is met. Witnesses beyond the limit
                // may be pruned, leading to superfluous shortcuts.
                self.shortcut_candidates_in_queue = -1;
                transfer_limit = key.saturating_add(self.config.witness_transfer_limit);
            }
            if data.is_stop(vertex) {
                self.stops_updated_by_transfer.insert(vertex.stop());
            }
            if key > transfer_limit {
                break;
            }
        }

        self.stops_updated_by_route.clear();
    }

    fn final_dijkstra(&mut self) {
        debug_assert!(self.stops_updated_by_transfer.is_empty());

        for position in 0..self.stops_updated_by_route.len() {
            let stop = self.stops_updated_by_route.element(position);
            self.two_trips_queue.update(State {
                key: self.two_trips_arrival[stop.vertex().id()],
                vertex: stop.vertex(),
            });
            let route_parent = self.two_trips_route_parent[stop.id()];
            if route_parent.is_valid() {
                if !self.shortcut_destination_candidates.contains(route_parent) {
                    self.shortcut_destination_candidates.insert(route_parent, Vec::new());
                }
                self.shortcut_destination_candidates.get_mut(route_parent).unwrap().push(stop);
            }
        }

        let data = self.data;
        while let Some(State { key, vertex }) = self.two_trips_queue.pop() {
            for link in data.transfer_graph.link_iter(vertex) {
                let new_arrival_time = key + link.weight;
                if new_arrival_time < self.two_trips_arrival[link.head.id()] {
                    self.arrival_by_edge2(link.head, new_arrival_time);
                }
            }
            if data.is_stop(vertex) {
                let route_parent = self.two_trips_route_parent[vertex.stop().id()];
                if route_parent.is_valid() {
                    // no witness dominates this candidate journey => shortcut
                    if !self.config.require_direct_transfer || self.direct_transfer_arrival[vertex.id()] < NEVER {
                        self.shortcut_destination_stops.push(route_parent);
                    }
                    // the other candidates through this destination are
                    // redundant now
                    let obsolete = self
                        .shortcut_destination_candidates
                        .remove(route_parent)
                        .expect("settled candidate is unknown to its shortcut destination");
                    for candidate in obsolete {
                        self.two_trips_route_parent[candidate.id()] = StopId::INVALID;
                    }
                }
            }
            if self.shortcut_destination_candidates.is_empty() {
                break;
            }
        }

        self.stops_updated_by_route.clear();
    }

    fn arrival_time(&self, round: u8, stop: StopId) -> Weight {
        match round {
            0 => self.zero_trips_arrival[stop.id()],
            1 => self.one_trip_arrival[stop.vertex().id()],
            _ => self.two_trips_arrival[stop.vertex().id()],
        }
    }

    fn is_candidate_boarding(&self, round: u8, parent: StopId) -> bool {
        match round {
            1 => self.stations.representative(parent) == self.source_station.representative,
            _ => {
                let transfer_parent = self.one_trip_transfer_parent[parent.vertex().id()];
                transfer_parent.is_valid() && transfer_parent != parent && !self.shortcut_already_exists(parent)
            }
        }
    }

    fn shortcut_already_exists(&self, parent: StopId) -> bool {
        if !self.config.prune_with_existing_shortcuts {
            return false;
        }
        let origin = self.one_trip_transfer_parent[parent.vertex().id()];
        self.local_shortcut_graph[origin.id()].contains(&parent)
    }

    fn arrival_by_route(&mut self, round: u8, stop: StopId, arrival_time: Weight, parent: StopId) {
        if round == 1 {
            self.arrival_by_route1(stop, arrival_time, parent);
        } else {
            self.arrival_by_route2(stop, arrival_time, parent);
        }
    }

    fn arrival_by_route1(&mut self, stop: StopId, arrival_time: Weight, parent: StopId) {
        // Shortcut origin candidates are marked here (and only here). Once
        // added they cannot be dominated during this route scan, since
        // witnesses are scanned first.
        if self.stations.representative(parent) == self.source_station.representative {
            self.one_trip_transfer_parent[stop.vertex().id()] = stop;
        } else {
            self.one_trip_transfer_parent[stop.vertex().id()] = StopId::INVALID;
        }
        self.one_trip_arrival[stop.vertex().id()] = arrival_time;
        // the label will be re-added to the queue with its correct key when
        // the intermediate Dijkstra starts
        self.one_trip_queue.remove(stop.vertex().id());
        if self.two_trips_arrival[stop.vertex().id()] > arrival_time {
            self.two_trips_arrival[stop.vertex().id()] = arrival_time;
            self.two_trips_queue.remove(stop.vertex().id());
        }
        self.stops_updated_by_route.insert(stop);
    }

    fn arrival_by_route2(&mut self, stop: StopId, arrival_time: Weight, parent: StopId) {
        // mark the journey as candidate or witness
        if self.is_candidate_boarding(2, parent) {
            self.two_trips_route_parent[stop.id()] = parent;
        } else {
            self.two_trips_route_parent[stop.id()] = StopId::INVALID;
        }
        self.two_trips_arrival[stop.vertex().id()] = arrival_time;
        self.two_trips_queue.remove(stop.vertex().id());
        self.stops_updated_by_route.insert(stop);
    }

    fn arrival_by_edge0(&mut self, vertex: Vertex, arrival_time: Weight) {
        self.zero_trips_arrival[vertex.stop().id()] = arrival_time;
        if self.one_trip_arrival[vertex.id()] > arrival_time {
            self.one_trip_arrival[vertex.id()] = arrival_time;
            self.one_trip_queue.remove(vertex.id());
            if self.two_trips_arrival[vertex.id()] > arrival_time {
                self.two_trips_arrival[vertex.id()] = arrival_time;
                self.two_trips_queue.remove(vertex.id());
            }
        }
    }

    fn arrival_by_edge1(&mut self, vertex: Vertex, arrival_time: Weight, parent: Vertex) {
        if self.one_trip_queue.contains_index(vertex.id()) && self.one_trip_transfer_parent[vertex.id()].is_valid() {
            self.shortcut_candidates_in_queue -= 1;
        }
        if self.one_trip_transfer_parent[parent.id()].is_valid() {
            self.shortcut_candidates_in_queue += 1;
        }
        self.one_trip_transfer_parent[vertex.id()] = self.one_trip_transfer_parent[parent.id()];
        self.one_trip_arrival[vertex.id()] = arrival_time;
        if self.two_trips_arrival[vertex.id()] > arrival_time {
            self.two_trips_arrival[vertex.id()] = arrival_time;
            self.two_trips_queue.remove(vertex.id());
        }
        self.one_trip_queue.update(State {
            key: arrival_time,
            vertex,
        });
    }

    fn arrival_by_edge2(&mut self, vertex: Vertex, arrival_time: Weight) {
        self.two_trips_arrival[vertex.id()] = arrival_time;
        self.two_trips_queue.update(State {
            key: arrival_time,
            vertex,
        });
        if !self.data.is_stop(vertex) {
            return;
        }
        let stop = vertex.stop();
        let route_parent = self.two_trips_route_parent[stop.id()];
        if route_parent.is_valid() {
            // the candidate was dominated by a witness
            let now_empty = {
                let candidates = self
                    .shortcut_destination_candidates
                    .get_mut(route_parent)
                    .expect("dominated candidate is unknown to its shortcut destination");
                let position = candidates.iter().position(|&candidate| candidate == stop).unwrap();
                candidates.swap_remove(position);
                candidates.is_empty()
            };
            if now_empty {
                self.shortcut_destination_candidates.remove(route_parent);
            }
        }
        self.two_trips_route_parent[stop.id()] = StopId::INVALID;
    }
}

fn route_sort_key(label: &DepartureLabel) -> u32 {
    label.route.map(|segment| segment.route_id.0).unwrap_or(u32::MAX)
}
