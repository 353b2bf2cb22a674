//! Trip-Based query: breadth-first search over enqueued trip segments with
//! reached-index dominance, walking legs answered by the bucket-CH oracle.

use super::reached_index::ReachedIndex;
use crate::algo::contraction_hierarchy::{BucketChInitialTransfers, ContractionHierarchy};
use crate::datastr::graph::*;
use crate::datastr::timetable::*;
use crate::datastr::trip_based::TripBasedData;

/// One Pareto entry of the query result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Journey {
    pub arrival_time: Weight,
    pub number_of_used_vehicles: u32,
}

/// A contiguous range of stop events of one trip; reinterpreted as a range of
/// outgoing stop-event-graph edges in the second half of each round.
#[derive(Debug, Clone, Copy)]
struct TripLabel {
    begin: u32,
    end: u32,
}

/// Per-edge lookup data, materialized once so the hot loop touches one array.
#[derive(Debug, Clone, Copy)]
struct EdgeLabel {
    stop_event: StopEventId,
    trip: TripId,
    first_event: StopEventId,
}

/// Per-route departure times, transposed to (stop index, trip).
#[derive(Debug, Clone)]
struct RouteLabel {
    num_trips: usize,
    departure_times: Vec<Weight>,
}

impl RouteLabel {
    fn end_index(&self) -> usize {
        self.departure_times.len() / self.num_trips
    }

    #[inline]
    fn departure(&self, stop_index: usize, trip: usize) -> Weight {
        self.departure_times[stop_index * self.num_trips + trip]
    }
}

pub struct TripBasedQuery<'a> {
    data: &'a TripBasedData,
    bucket_query: BucketChInitialTransfers<'a>,
    current_queue: Vec<TripLabel>,
    next_queue: Vec<TripLabel>,
    reached_index: ReachedIndex<'a>,

    min_arrival_time: Weight,
    number_of_used_vehicles: usize,
    min_arrival_time_by_max_vehicles: Vec<Weight>,

    edge_labels: Vec<EdgeLabel>,
    route_labels: Vec<RouteLabel>,
}

impl<'a> TripBasedQuery<'a> {
    pub fn new(data: &'a TripBasedData, ch: &'a ContractionHierarchy) -> TripBasedQuery<'a> {
        let graph = &data.stop_event_graph;
        let mut edge_labels = Vec::with_capacity(graph.num_edges());
        for edge in 0..graph.num_edges() {
            let boarding_event = graph.head()[edge];
            let trip = data.trip_of_stop_event[boarding_event.id()];
            edge_labels.push(EdgeLabel {
                stop_event: StopEventId::new(boarding_event.id() + 1),
                trip,
                first_event: data.first_stop_event_of_trip[trip.id()],
            });
        }

        let timetable = &data.timetable;
        let mut route_labels = Vec::with_capacity(timetable.num_routes());
        for route in timetable.routes() {
            let num_stops = timetable.number_of_stops_in_route(route);
            let num_trips = timetable.number_of_trips_in_route(route);
            let events = timetable.events_of_route(route);
            let mut departure_times = vec![0; (num_stops - 1) * num_trips];
            for trip in 0..num_trips {
                for stop_index in 0..num_stops - 1 {
                    departure_times[stop_index * num_trips + trip] = events[trip * num_stops + stop_index].departure_time;
                }
            }
            route_labels.push(RouteLabel {
                num_trips,
                departure_times,
            });
        }

        TripBasedQuery {
            data,
            bucket_query: BucketChInitialTransfers::new(ch, data.timetable.num_stops()),
            current_queue: Vec::new(),
            next_queue: Vec::new(),
            reached_index: ReachedIndex::new(data),
            min_arrival_time: INFINITY,
            number_of_used_vehicles: 0,
            min_arrival_time_by_max_vehicles: vec![INFINITY],
            edge_labels,
            route_labels,
        }
    }

    pub fn run(&mut self, source: Vertex, departure_time: Weight, target: Vertex) {
        self.clear();
        self.compute_initial_and_final_transfers(source, departure_time, target);
        self.evaluate_initial_transfers(departure_time);
        self.scan_trips();
    }

    pub fn get_earliest_arrival_time(&self) -> Weight {
        *self.min_arrival_time_by_max_vehicles.last().unwrap()
    }

    /// One entry per Pareto-dominant number of used vehicles.
    pub fn get_journeys(&self) -> Vec<Journey> {
        let mut result: Vec<Journey> = Vec::new();
        for (vehicles, &arrival_time) in self.min_arrival_time_by_max_vehicles.iter().enumerate() {
            if arrival_time >= INFINITY {
                continue;
            }
            if result.last().map(|journey| journey.arrival_time) == Some(arrival_time) {
                continue;
            }
            result.push(Journey {
                arrival_time,
                number_of_used_vehicles: vehicles as u32,
            });
        }
        result
    }

    fn clear(&mut self) {
        self.current_queue.clear();
        self.next_queue.clear();
        self.reached_index.clear();
        self.number_of_used_vehicles = 0;
        self.min_arrival_time = INFINITY;
        self.min_arrival_time_by_max_vehicles.clear();
        self.min_arrival_time_by_max_vehicles.push(INFINITY);
    }

    fn compute_initial_and_final_transfers(&mut self, source: Vertex, departure_time: Weight, target: Vertex) {
        self.bucket_query.run(source, target);
        if self.bucket_query.get_distance() != INFINITY {
            self.add_journey(departure_time + self.bucket_query.get_distance());
        }
    }

    fn evaluate_initial_transfers(&mut self, departure_time: Weight) {
        let data = self.data;
        let mut reached_routes = vec![false; data.timetable.num_routes()];
        for &stop in self.bucket_query.get_forward_pois() {
            for segment in data.timetable.routes_containing_stop(stop) {
                reached_routes[segment.route_id.id()] = true;
            }
        }
        for route in 0..data.timetable.num_routes() {
            if !reached_routes[route] {
                continue;
            }
            let first_trip = data.first_trip_of_route[route];
            let stops = data.timetable.stop_array_of_route(RouteId::new(route));
            let end_index = self.route_labels[route].end_index();
            let mut trip_index: Option<usize> = None;
            for stop_index in 0..end_index {
                let time_from_source = self.bucket_query.get_forward_distance(stops[stop_index]);
                if time_from_source == INFINITY {
                    continue;
                }
                let stop_departure_time = departure_time + time_from_source;
                let next_trip = match trip_index {
                    None => match self.find_earliest_trip(route, stop_index, stop_departure_time) {
                        None => continue,
                        Some(trip) => trip,
                    },
                    Some(current) => {
                        // can we catch a strictly earlier trip at this stop?
                        if self.route_departure(route, stop_index, current - 1) < stop_departure_time {
                            continue;
                        }
                        let mut trip = current - 1;
                        while trip > 0 && self.route_departure(route, stop_index, trip - 1) >= stop_departure_time {
                            trip -= 1;
                        }
                        trip
                    }
                };
                trip_index = Some(next_trip);
                self.enqueue_trip(TripId::new(first_trip.id() + next_trip), stop_index);
                if next_trip == 0 {
                    break;
                }
            }
        }
    }

    #[inline]
    fn route_departure(&self, route: usize, stop_index: usize, trip: usize) -> Weight {
        self.route_labels[route].departure(stop_index, trip)
    }

    fn find_earliest_trip(&self, route: usize, stop_index: usize, time: Weight) -> Option<usize> {
        let label = &self.route_labels[route];
        let base = stop_index * label.num_trips;
        let slice = &label.departure_times[base..base + label.num_trips];
        let trip = slice.partition_point(|&departure| departure < time);
        if trip < label.num_trips {
            Some(trip)
        } else {
            None
        }
    }

    fn scan_trips(&mut self) {
        while !self.next_queue.is_empty() {
            std::mem::swap(&mut self.current_queue, &mut self.next_queue);
            self.number_of_used_vehicles += 1;

            // check whether the target is reachable from any scanned event
            for position in 0..self.current_queue.len() {
                let label = self.current_queue[position];
                for event in label.begin..label.end {
                    let arrival = self.data.arrival_events[event as usize];
                    if arrival.arrival_time >= self.min_arrival_time {
                        break;
                    }
                    let time_to_target = self.bucket_query.get_backward_distance(arrival.stop);
                    if time_to_target != INFINITY {
                        self.add_journey(arrival.arrival_time + time_to_target);
                    }
                }
            }

            // clip each label at the pruning bound and translate the event
            // range into the matching range of outgoing transfer edges
            for position in 0..self.current_queue.len() {
                let mut label = self.current_queue[position];
                for event in label.begin..label.end {
                    if self.data.arrival_events[event as usize].arrival_time >= self.min_arrival_time {
                        label.end = event;
                        break;
                    }
                }
                label.begin = self.data.stop_event_graph.begin_edge_from(label.begin as usize) as u32;
                label.end = self.data.stop_event_graph.begin_edge_from(label.end as usize) as u32;
                self.current_queue[position] = label;
            }

            // relax the transfers
            for position in 0..self.current_queue.len() {
                let label = self.current_queue[position];
                for edge in label.begin..label.end {
                    self.enqueue_edge(edge as usize);
                }
            }
            self.current_queue.clear();
        }
    }

    fn enqueue_trip(&mut self, trip: TripId, stop_index: usize) {
        if self.reached_index.already_reached(trip, stop_index + 1) {
            return;
        }
        let first_event = self.data.first_stop_event_of_trip[trip.id()];
        self.next_queue.push(TripLabel {
            begin: (first_event.id() + stop_index + 1) as u32,
            end: (first_event.id() + self.reached_index.index(trip)) as u32,
        });
        self.reached_index.update(trip, stop_index);
    }

    fn enqueue_edge(&mut self, edge: usize) {
        let label = self.edge_labels[edge];
        let boarding_index = label.stop_event.id() - label.first_event.id();
        if self.reached_index.already_reached(label.trip, boarding_index) {
            return;
        }
        self.next_queue.push(TripLabel {
            begin: label.stop_event.id() as u32,
            end: (label.first_event.id() + self.reached_index.index(label.trip)) as u32,
        });
        self.reached_index.update(label.trip, boarding_index);
    }

    fn add_journey(&mut self, new_arrival_time: Weight) {
        if self.number_of_used_vehicles >= self.min_arrival_time_by_max_vehicles.len() {
            let last = *self.min_arrival_time_by_max_vehicles.last().unwrap();
            self.min_arrival_time_by_max_vehicles.resize(self.number_of_used_vehicles + 1, last);
        }
        let entry = &mut self.min_arrival_time_by_max_vehicles[self.number_of_used_vehicles];
        *entry = (*entry).min(new_arrival_time);
        self.min_arrival_time = *entry;
    }
}
