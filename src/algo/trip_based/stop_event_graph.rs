//! Exhaustive stop-event transfer generation (the non-ULTRA Trip-Based
//! preprocessing): for every stop event, enumerate the earliest boardable
//! trip of each route within walking range, filter U-turns, then reduce the
//! transfer set with a backward sweep that keeps only transfers improving
//! some downstream arrival.
//!
//! Assumes a transitively closed one-hop transfer graph between stops.

use super::super::raptor::builder::{thread_pool, ParallelConfig};
use crate::datastr::graph::*;
use crate::datastr::timetable::*;
use crate::datastr::trip_based::TripBasedData;
use crate::report::Timer;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy)]
struct StopLabel {
    arrival_time: Weight,
    timestamp: u32,
}

impl StopLabel {
    fn check_timestamp(&mut self, timestamp: u32) {
        if self.timestamp != timestamp {
            self.arrival_time = INFINITY;
            self.timestamp = timestamp;
        }
    }

    fn update(&mut self, timestamp: u32, arrival_time: Weight) {
        self.check_timestamp(timestamp);
        self.arrival_time = self.arrival_time.min(arrival_time);
    }
}

struct StopEventGraphBuilder<'a> {
    data: &'a TripBasedData,
    edges: Vec<(StopEventId, Vec<StopEventId>)>,
    labels: Vec<StopLabel>,
    timestamp: u32,
}

impl<'a> StopEventGraphBuilder<'a> {
    fn new(data: &'a TripBasedData) -> StopEventGraphBuilder<'a> {
        StopEventGraphBuilder {
            data,
            edges: Vec::new(),
            labels: vec![
                StopLabel {
                    arrival_time: INFINITY,
                    timestamp: 0,
                };
                data.timetable.num_stops()
            ],
            timestamp: 0,
        }
    }

    fn scan_trip(&mut self, trip: TripId) -> Vec<Vec<StopEventId>> {
        let data = self.data;
        let stops = data.stop_array_of_trip(trip);
        let first_event = data.first_stop_event_of_trip[trip.id()];
        let num_stops = data.number_of_stops_in_trip(trip);
        let mut transfers: Vec<Vec<StopEventId>> = vec![Vec::new(); num_stops];
        for index in 1..num_stops {
            let arrival_time = data.timetable.stop_event(StopEventId::new(first_event.id() + index)).arrival_time;
            self.scan_routes_at(trip, index, stops[index], arrival_time, &mut transfers[index]);
            for link in data.timetable.transfer_graph.link_iter(stops[index].vertex()) {
                debug_assert!(data.timetable.is_stop(link.head));
                self.scan_routes_at(trip, index, link.head.stop(), arrival_time + link.weight, &mut transfers[index]);
            }
        }
        transfers
    }

    fn scan_routes_at(&self, trip: TripId, index: usize, stop: StopId, arrival_time: Weight, transfers: &mut Vec<StopEventId>) {
        let data = self.data;
        let original_route = data.route_of_trip[trip.id()];
        for &segment in data.timetable.routes_containing_stop(stop) {
            let Some(other) = data.get_earliest_trip(segment, arrival_time) else {
                continue;
            };
            if segment.route_id == original_route && other >= trip && segment.stop_index.id() >= index {
                continue;
            }
            if self.is_u_transfer(trip, index, other, segment.stop_index.id()) {
                continue;
            }
            transfers.push(data.stop_event_id(other, segment.stop_index));
        }
    }

    /// Boarding `to_trip` would revisit the previous stop of `from_trip` no
    /// earlier than staying seated would.
    fn is_u_transfer(&self, from_trip: TripId, from_index: usize, to_trip: TripId, to_index: usize) -> bool {
        let data = self.data;
        if from_index < 2 {
            return false;
        }
        if to_index + 1 >= data.number_of_stops_in_trip(to_trip) {
            return false;
        }
        if data.get_stop(from_trip, StopIndex::new(from_index - 1)) != data.get_stop(to_trip, StopIndex::new(to_index + 1)) {
            return false;
        }
        if data.get_stop_event(from_trip, StopIndex::new(from_index - 1)).arrival_time
            > data.get_stop_event(to_trip, StopIndex::new(to_index + 1)).departure_time
        {
            return false;
        }
        true
    }

    /// Backward sweep over the trip: a transfer survives only if it strictly
    /// improves the arrival at some stop downstream of the boarding event.
    fn reduce_transfers(&mut self, trip: TripId, transfers: &mut [Vec<StopEventId>]) {
        self.timestamp += 1;
        let timestamp = self.timestamp;
        let data = self.data;
        let stops = data.stop_array_of_trip(trip);
        let first_event = data.first_stop_event_of_trip[trip.id()];
        for index in (1..data.number_of_stops_in_trip(trip)).rev() {
            let arrival_time = data.timetable.stop_event(StopEventId::new(first_event.id() + index)).arrival_time;
            self.labels[stops[index].id()].update(timestamp, arrival_time);
            for link in data.timetable.transfer_graph.link_iter(stops[index].vertex()) {
                self.labels[link.head.id()].update(timestamp, arrival_time + link.weight);
            }

            if transfers[index].is_empty() {
                continue;
            }
            transfers[index].sort_by_key(|&target| data.arrival_events[target.id()].arrival_time);
            transfers[index].dedup();

            let mut kept = Vec::with_capacity(transfers[index].len());
            for &target in transfers[index].iter() {
                let mut keep = false;
                let target_index = data.index_of_stop_event[target.id()].id();
                let target_trip = data.trip_of_stop_event[target.id()];
                let target_stops = &data.stop_array_of_trip(target_trip)[target_index..];
                for offset in (1..data.number_of_stops_in_trip(target_trip) - target_index).rev() {
                    let stop = target_stops[offset];
                    let time = data.arrival_events[target.id() + offset].arrival_time;
                    let label = &mut self.labels[stop.id()];
                    label.check_timestamp(timestamp);
                    if label.arrival_time > time {
                        label.arrival_time = time;
                        keep = true;
                    }
                    for link in data.timetable.transfer_graph.link_iter(stop.vertex()) {
                        let label = &mut self.labels[link.head.id()];
                        label.check_timestamp(timestamp);
                        if label.arrival_time > time + link.weight {
                            label.arrival_time = time + link.weight;
                            keep = true;
                        }
                    }
                }
                if keep {
                    kept.push(target);
                }
            }
            transfers[index] = kept;
        }
    }

    fn process_trip(&mut self, trip: TripId) {
        let mut transfers = self.scan_trip(trip);
        self.reduce_transfers(trip, &mut transfers);
        let first_event = self.data.first_stop_event_of_trip[trip.id()];
        for (index, targets) in transfers.into_iter().enumerate() {
            if !targets.is_empty() {
                self.edges.push((StopEventId::new(first_event.id() + index), targets));
            }
        }
    }
}

/// Computes the exhaustive stop-event transfer graph and installs it in `data`.
pub fn compute_stop_event_graph(data: &mut TripBasedData, parallel: ParallelConfig) {
    eprintln!("computing stop event graph with {} threads", parallel.num_threads);
    let timer = Timer::new();

    let num_trips = data.num_trips();
    let collected: Mutex<Vec<(StopEventId, Vec<StopEventId>)>> = Mutex::new(Vec::new());
    let next_trip = AtomicUsize::new(0);
    let shared: &TripBasedData = data;

    let pool = thread_pool(parallel);
    pool.scope(|scope| {
        for _ in 0..parallel.num_threads {
            scope.spawn(|_| {
                let mut builder = StopEventGraphBuilder::new(shared);
                loop {
                    let trip = next_trip.fetch_add(1, Ordering::Relaxed);
                    if trip >= num_trips {
                        break;
                    }
                    builder.process_trip(TripId::new(trip));
                }
                collected.lock().unwrap().append(&mut builder.edges);
            });
        }
    });

    let mut adjacency: Vec<Vec<Link>> = vec![Vec::new(); data.num_stop_events()];
    for (origin, targets) in collected.into_inner().unwrap() {
        for target in targets {
            adjacency[origin.id()].push(Link {
                head: Vertex::new(target.id()),
                weight: 0,
            });
        }
    }
    for links in &mut adjacency {
        links.sort_by_key(|link| link.head);
    }
    let graph = FirstOutGraph::from_adjacency_lists(adjacency);
    eprintln!("stop event graph with {} transfers took {}ms", graph.num_edges(), timer.get_passed_ms());
    data.stop_event_graph = graph;
}
