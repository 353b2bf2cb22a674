//! ULTRA-RAPTOR: multi-round earliest-arrival queries between arbitrary
//! vertices, with initial and final walking answered by the bucket-CH oracle
//! and intermediate transfers by the shortcut graph.
//!
//! When stops carry minimum change times or direct walking must not dominate
//! the first round, route and transfer updates are kept in separate rounds
//! (round factor two); otherwise they share one round per trip.

use super::super::ArrivalLabel;
use crate::algo::contraction_hierarchy::{BucketChInitialTransfers, ContractionHierarchy};
use crate::datastr::graph::*;
use crate::datastr::indexed_map::IndexedMap;
use crate::datastr::indexed_set::IndexedSet;
use crate::datastr::timetable::*;

#[derive(Debug, Clone, Copy)]
pub struct UltraRaptorConfig {
    pub target_pruning: bool,
    pub use_min_transfer_times: bool,
    pub prevent_direct_walking: bool,
}

impl Default for UltraRaptorConfig {
    fn default() -> UltraRaptorConfig {
        UltraRaptorConfig {
            target_pruning: true,
            use_min_transfer_times: false,
            prevent_direct_walking: false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct EarliestArrivalLabel {
    arrival_time: Weight,
    parent_departure_time: Weight,
    parent: Vertex,
    uses_route: bool,
    route_id: RouteId,
}

impl Default for EarliestArrivalLabel {
    fn default() -> EarliestArrivalLabel {
        EarliestArrivalLabel {
            arrival_time: NEVER,
            parent_departure_time: NEVER,
            parent: Vertex::INVALID,
            uses_route: false,
            route_id: RouteId::INVALID,
        }
    }
}

/// Route and transfer arrivals tracked separately; with round factor one both
/// components are written together and behave like a single value.
#[derive(Debug, Clone, Copy)]
struct EarliestArrivalTime {
    by_route: Weight,
    by_transfer: Weight,
}

impl Default for EarliestArrivalTime {
    fn default() -> EarliestArrivalTime {
        EarliestArrivalTime {
            by_route: NEVER,
            by_transfer: NEVER,
        }
    }
}

type Round = Vec<EarliestArrivalLabel>;

pub struct UltraRaptor<'a> {
    data: &'a Timetable,
    initial_transfers: BucketChInitialTransfers<'a>,
    config: UltraRaptorConfig,

    rounds: Vec<Round>,
    earliest_arrival: Vec<EarliestArrivalTime>,

    stops_updated_by_route: IndexedSet<StopId>,
    stops_updated_by_transfer: IndexedSet<StopId>,
    routes_serving_updated_stops: IndexedMap<RouteId, StopIndex>,

    source_vertex: Vertex,
    target_vertex: Vertex,
    target_stop: StopId,
    source_departure_time: Weight,
}

impl<'a> UltraRaptor<'a> {
    pub fn new(data: &'a Timetable, ch: &'a ContractionHierarchy, config: UltraRaptorConfig) -> UltraRaptor<'a> {
        if config.use_min_transfer_times {
            assert!(
                !data.has_implicit_buffer_times(),
                "either min transfer times are used or departure buffer times are implicit"
            );
        } else {
            assert!(
                data.has_implicit_buffer_times(),
                "either min transfer times are used or departure buffer times are implicit"
            );
        }
        let num_stops = data.num_stops();
        UltraRaptor {
            data,
            initial_transfers: BucketChInitialTransfers::new(ch, num_stops),
            config,
            rounds: Vec::new(),
            earliest_arrival: vec![EarliestArrivalTime::default(); num_stops + 1],
            stops_updated_by_route: IndexedSet::new(num_stops + 1),
            stops_updated_by_transfer: IndexedSet::new(num_stops + 1),
            routes_serving_updated_stops: IndexedMap::new(data.num_routes()),
            source_vertex: Vertex::INVALID,
            target_vertex: Vertex::INVALID,
            target_stop: StopId::new(num_stops),
            source_departure_time: NEVER,
        }
    }

    #[inline]
    fn separate_route_and_transfer_entries(&self) -> bool {
        self.config.use_min_transfer_times || self.config.prevent_direct_walking
    }

    #[inline]
    fn round_factor(&self) -> usize {
        if self.separate_route_and_transfer_entries() {
            2
        } else {
            1
        }
    }

    pub fn run(&mut self, source: Vertex, departure_time: Weight, target: Vertex) {
        self.run_with_max_rounds(source, departure_time, target, 50);
    }

    pub fn run_with_max_rounds(&mut self, source: Vertex, departure_time: Weight, target: Vertex, max_rounds: usize) {
        self.clear();
        self.initialize(source, departure_time, target);
        self.relax_initial_transfers(departure_time);
        for _ in 0..max_rounds {
            self.start_new_round();
            self.collect_routes_serving_updated_stops();
            self.scan_routes();
            if self.stops_updated_by_route.is_empty() {
                break;
            }
            if self.separate_route_and_transfer_entries() {
                self.start_new_round();
            }
            self.relax_intermediate_transfers();
        }
    }

    /// The Pareto set on (arrival time, number of trips) at the target.
    pub fn get_arrivals(&self) -> Vec<ArrivalLabel> {
        let mut labels: Vec<ArrivalLabel> = Vec::new();
        let mut index = 0;
        while index < self.rounds.len() {
            let mut round = index;
            if self.separate_route_and_transfer_entries()
                && round + 1 < self.rounds.len()
                && self.rounds[round + 1][self.target_stop.id()].arrival_time < self.rounds[round][self.target_stop.id()].arrival_time
            {
                round += 1;
            }
            let arrival_time = self.rounds[round][self.target_stop.id()].arrival_time;
            if arrival_time < labels.last().map(|label| label.arrival_time).unwrap_or(NEVER) {
                labels.push(ArrivalLabel {
                    arrival_time,
                    number_of_trips: (index / self.round_factor()) as u32,
                });
            }
            index += self.round_factor();
        }
        labels
    }

    pub fn reachable(&self, vertex: Vertex) -> bool {
        self.get_earliest_arrival_time(vertex) < NEVER
    }

    pub fn get_earliest_arrival_time(&self, vertex: Vertex) -> Weight {
        let stop = if vertex == self.target_vertex { self.target_stop } else { vertex.stop() };
        let entry = &self.earliest_arrival[stop.id()];
        entry.by_route.min(entry.by_transfer)
    }

    pub fn get_walking_travel_time(&self) -> Weight {
        self.initial_transfers.get_distance()
    }

    fn clear(&mut self) {
        self.stops_updated_by_route.clear();
        self.stops_updated_by_transfer.clear();
        self.routes_serving_updated_stops.clear();
        self.target_stop = StopId::new(self.data.num_stops());
        self.source_departure_time = NEVER;
        self.rounds.clear();
        self.earliest_arrival.fill(EarliestArrivalTime::default());
    }

    fn initialize(&mut self, source: Vertex, departure_time: Weight, target: Vertex) {
        self.source_vertex = source;
        self.target_vertex = target;
        if self.data.is_stop(target) {
            self.target_stop = target.stop();
        }
        self.source_departure_time = departure_time;
        self.start_new_round();
        if self.data.is_stop(source) {
            self.arrival_by_route(source.stop(), departure_time);
            let label = &mut self.current_round()[source.id()];
            label.parent = source;
            label.parent_departure_time = departure_time;
            label.uses_route = false;
            if !self.separate_route_and_transfer_entries() {
                self.stops_updated_by_transfer.insert(source.stop());
            }
        }
        if self.separate_route_and_transfer_entries() {
            self.start_new_round();
        }
    }

    fn relax_initial_transfers(&mut self, source_departure_time: Weight) {
        self.initial_transfers.run(self.source_vertex, self.target_vertex);
        for position in 0..self.initial_transfers.get_forward_pois().len() {
            let stop = self.initial_transfers.get_forward_pois()[position];
            if stop == self.target_stop {
                continue;
            }
            debug_assert!(self.initial_transfers.get_forward_distance(stop) != INFINITY);
            let arrival_time = source_departure_time + self.initial_transfers.get_forward_distance(stop);
            if self.arrival_by_transfer(stop, arrival_time) {
                let source = self.source_vertex;
                let label = &mut self.current_round()[stop.id()];
                label.parent = source;
                label.parent_departure_time = source_departure_time;
                label.uses_route = false;
            }
        }
        if !self.config.prevent_direct_walking && self.initial_transfers.get_distance() != INFINITY {
            let arrival_time = source_departure_time + self.initial_transfers.get_distance();
            let target_stop = self.target_stop;
            if self.arrival_by_transfer(target_stop, arrival_time) {
                let source = self.source_vertex;
                let label = &mut self.current_round()[target_stop.id()];
                label.parent = source;
                label.parent_departure_time = source_departure_time;
                label.uses_route = false;
            }
        }
    }

    fn collect_routes_serving_updated_stops(&mut self) {
        for position in 0..self.stops_updated_by_transfer.len() {
            let stop = self.stops_updated_by_transfer.element(position);
            let arrival_time = self.previous_round_arrival(stop);
            debug_assert!(arrival_time < NEVER, "updated stop has arrival time never");
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

    fn scan_routes(&mut self) {
        self.stops_updated_by_route.clear();
        let data = self.data;
        for position in 0..self.routes_serving_updated_stops.len() {
            let route = self.routes_serving_updated_stops.key(position);
            let mut stop_index = self.routes_serving_updated_stops.get(route).unwrap().id();
            let trip_size = data.number_of_stops_in_route(route);
            debug_assert!(stop_index + 1 < trip_size, "cannot scan a route starting at its last stop");

            let stops = data.stop_array_of_route(route);
            let events = data.events_of_route(route);
            let num_trips = data.number_of_trips_in_route(route);
            let mut trip = num_trips - 1;
            let mut stop = stops[stop_index];
            debug_assert!(
                events[trip * trip_size + stop_index].departure_time >= self.previous_round_arrival(stop),
                "cannot scan a route after the last trip has departed"
            );

            let mut parent_index = stop_index;
            while stop_index + 1 < trip_size {
                while trip > 0 && events[(trip - 1) * trip_size + stop_index].departure_time >= self.previous_round_arrival(stop) {
                    trip -= 1;
                    parent_index = stop_index;
                }
                stop_index += 1;
                stop = stops[stop_index];
                if self.arrival_by_route(stop, events[trip * trip_size + stop_index].arrival_time) {
                    let label = &mut self.current_round()[stop.id()];
                    label.parent = stops[parent_index].vertex();
                    label.parent_departure_time = events[trip * trip_size + parent_index].departure_time;
                    label.uses_route = true;
                    label.route_id = route;
                }
            }
        }
    }

    fn relax_intermediate_transfers(&mut self) {
        self.stops_updated_by_transfer.clear();
        self.routes_serving_updated_stops.clear();
        let data = self.data;
        for position in 0..self.stops_updated_by_route.len() {
            let stop = self.stops_updated_by_route.element(position);
            let earliest_arrival_time = if self.separate_route_and_transfer_entries() {
                self.previous_round_arrival(stop)
            } else {
                self.current_round_arrival(stop)
            };
            for edge in data.transfer_graph.edge_range(stop.vertex()) {
                let link = data.transfer_graph.link(edge);
                debug_assert!(data.is_stop(link.head), "transfer graph contains edges to non-stop vertices");
                let to_stop = link.head.stop();
                if to_stop == self.target_stop {
                    continue;
                }
                let arrival_time = earliest_arrival_time + link.weight;
                if self.arrival_by_transfer(to_stop, arrival_time) {
                    let label = &mut self.current_round()[to_stop.id()];
                    label.parent = stop.vertex();
                    label.parent_departure_time = earliest_arrival_time;
                    label.uses_route = false;
                }
            }
            if self.initial_transfers.get_backward_distance(stop) != INFINITY {
                let arrival_time = earliest_arrival_time + self.initial_transfers.get_backward_distance(stop);
                let target_stop = self.target_stop;
                if self.arrival_by_transfer(target_stop, arrival_time) {
                    let label = &mut self.current_round()[target_stop.id()];
                    label.parent = stop.vertex();
                    label.parent_departure_time = earliest_arrival_time;
                    label.uses_route = false;
                }
            }
            if self.separate_route_and_transfer_entries() {
                let arrival_time = earliest_arrival_time + self.data.min_change_time(stop);
                if self.arrival_by_transfer(stop, arrival_time) {
                    let label = &mut self.current_round()[stop.id()];
                    label.parent = stop.vertex();
                    label.parent_departure_time = earliest_arrival_time;
                    label.uses_route = false;
                }
            } else {
                self.stops_updated_by_transfer.insert(stop);
            }
        }
    }

    fn current_round(&mut self) -> &mut Round {
        self.rounds.last_mut().expect("no round exists")
    }

    fn current_round_arrival(&self, stop: StopId) -> Weight {
        self.rounds.last().unwrap()[stop.id()].arrival_time
    }

    fn previous_round_arrival(&self, stop: StopId) -> Weight {
        self.rounds[self.rounds.len() - 2][stop.id()].arrival_time
    }

    fn start_new_round(&mut self) {
        self.rounds.push(vec![EarliestArrivalLabel::default(); self.data.num_stops() + 1]);
    }

    fn arrival_by_route(&mut self, stop: StopId, time: Weight) -> bool {
        if self.config.target_pruning && self.earliest_arrival[self.target_stop.id()].by_route <= time {
            return false;
        }
        if self.earliest_arrival[stop.id()].by_route <= time {
            return false;
        }
        self.current_round()[stop.id()].arrival_time = time;
        self.earliest_arrival[stop.id()].by_route = time;
        if !self.separate_route_and_transfer_entries() {
            self.earliest_arrival[stop.id()].by_transfer = time;
        }
        self.stops_updated_by_route.insert(stop);
        true
    }

    fn arrival_by_transfer(&mut self, stop: StopId, time: Weight) -> bool {
        if self.config.target_pruning && self.earliest_arrival[self.target_stop.id()].by_transfer <= time {
            return false;
        }
        if self.earliest_arrival[stop.id()].by_transfer <= time {
            return false;
        }
        self.current_round()[stop.id()].arrival_time = time;
        self.earliest_arrival[stop.id()].by_transfer = time;
        if !self.separate_route_and_transfer_entries() {
            self.earliest_arrival[stop.id()].by_route = time;
        }
        if stop.id() < self.data.num_stops() {
            self.stops_updated_by_transfer.insert(stop);
        }
        true
    }
}
