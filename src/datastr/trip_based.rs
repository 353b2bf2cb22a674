//! Trip-Based transit data: every (trip, stop index) pair reified as a global
//! stop event, plus the stop-event transfer graph produced by preprocessing.

use crate::datastr::graph::*;
use crate::datastr::timetable::*;
use crate::io::{Deconstruct, Loader, Reconstruct, Store};
use std::io::Result;
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Arrival time and stop of one stop event, laid out for the query's hot scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct ArrivalEvent {
    pub arrival_time: Weight,
    pub stop: StopId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TripBasedData {
    pub timetable: Timetable,
    /// One entry per route plus a sentinel; trips of a route are contiguous.
    pub first_trip_of_route: Vec<TripId>,
    pub route_of_trip: Vec<RouteId>,
    /// One entry per trip plus a sentinel.
    pub first_stop_event_of_trip: Vec<StopEventId>,
    pub trip_of_stop_event: Vec<TripId>,
    pub index_of_stop_event: Vec<StopIndex>,
    pub arrival_events: Vec<ArrivalEvent>,
    /// Edge (a -> b): after arriving with event a, boarding event b is legal.
    pub stop_event_graph: FirstOutGraph,
}

impl TripBasedData {
    pub fn new(timetable: Timetable) -> TripBasedData {
        assert!(
            timetable.has_implicit_buffer_times(),
            "Trip-Based preprocessing requires implicit departure buffer times"
        );
        let mut first_trip_of_route = Vec::with_capacity(timetable.num_routes() + 1);
        let mut route_of_trip = Vec::new();
        let mut first_stop_event_of_trip = Vec::new();
        let mut trip_of_stop_event = Vec::with_capacity(timetable.num_stop_events());
        let mut index_of_stop_event = Vec::with_capacity(timetable.num_stop_events());
        let mut arrival_events = Vec::with_capacity(timetable.num_stop_events());

        for route in timetable.routes() {
            first_trip_of_route.push(TripId::new(route_of_trip.len()));
            let trip_size = timetable.number_of_stops_in_route(route);
            let stops = timetable.stop_array_of_route(route);
            let first_event = timetable.first_stop_event_of_route(route);
            for trip in 0..timetable.number_of_trips_in_route(route) {
                let trip_id = TripId::new(route_of_trip.len());
                route_of_trip.push(route);
                first_stop_event_of_trip.push(StopEventId::new(first_event + trip * trip_size));
                for index in 0..trip_size {
                    trip_of_stop_event.push(trip_id);
                    index_of_stop_event.push(StopIndex::new(index));
                    arrival_events.push(ArrivalEvent {
                        arrival_time: timetable.events_of_route(route)[trip * trip_size + index].arrival_time,
                        stop: stops[index],
                    });
                }
            }
        }
        first_trip_of_route.push(TripId::new(route_of_trip.len()));
        first_stop_event_of_trip.push(StopEventId::new(arrival_events.len()));

        let num_stop_events = arrival_events.len();
        TripBasedData {
            timetable,
            first_trip_of_route,
            route_of_trip,
            first_stop_event_of_trip,
            trip_of_stop_event,
            index_of_stop_event,
            arrival_events,
            stop_event_graph: FirstOutGraph::empty(num_stop_events),
        }
    }

    pub fn num_trips(&self) -> usize {
        self.route_of_trip.len()
    }

    pub fn num_stop_events(&self) -> usize {
        self.arrival_events.len()
    }

    pub fn trips(&self) -> impl Iterator<Item = TripId> {
        (0..self.num_trips()).map(TripId::new)
    }

    pub fn is_trip(&self, trip: TripId) -> bool {
        trip.id() < self.num_trips()
    }

    #[inline]
    pub fn number_of_stops_in_trip(&self, trip: TripId) -> usize {
        self.first_stop_event_of_trip[trip.id() + 1].id() - self.first_stop_event_of_trip[trip.id()].id()
    }

    pub fn trips_of_route(&self, route: RouteId) -> Range<usize> {
        self.first_trip_of_route[route.id()].id()..self.first_trip_of_route[route.id() + 1].id()
    }

    /// Sentinel trip id delimiting `trip`'s route, for the reached-index fill.
    #[inline]
    pub fn end_trip_of_route_of(&self, trip: TripId) -> TripId {
        self.first_trip_of_route[self.route_of_trip[trip.id()].id() + 1]
    }

    pub fn stop_array_of_trip(&self, trip: TripId) -> &[StopId] {
        self.timetable.stop_array_of_route(self.route_of_trip[trip.id()])
    }

    #[inline]
    pub fn get_stop(&self, trip: TripId, index: StopIndex) -> StopId {
        self.stop_array_of_trip(trip)[index.id()]
    }

    #[inline]
    pub fn stop_event_id(&self, trip: TripId, index: StopIndex) -> StopEventId {
        debug_assert!(index.id() < self.number_of_stops_in_trip(trip));
        StopEventId::new(self.first_stop_event_of_trip[trip.id()].id() + index.id())
    }

    #[inline]
    pub fn get_stop_event(&self, trip: TripId, index: StopIndex) -> &StopEvent {
        self.timetable.stop_event(self.stop_event_id(trip, index))
    }

    /// Earliest trip of the route boardable at `segment` no earlier than `time`.
    pub fn get_earliest_trip(&self, segment: RouteSegment, time: Weight) -> Option<TripId> {
        self.get_earliest_trip_binary(segment, time)
    }

    pub fn get_earliest_trip_linear(&self, segment: RouteSegment, time: Weight) -> Option<TripId> {
        if segment.stop_index.id() + 1 >= self.timetable.number_of_stops_in_route(segment.route_id) {
            return None;
        }
        self.trips_of_route(segment.route_id)
            .map(TripId::new)
            .find(|&trip| self.get_stop_event(trip, segment.stop_index).departure_time >= time)
    }

    pub fn get_earliest_trip_binary(&self, segment: RouteSegment, time: Weight) -> Option<TripId> {
        if segment.stop_index.id() + 1 >= self.timetable.number_of_stops_in_route(segment.route_id) {
            return None;
        }
        let trips = self.trips_of_route(segment.route_id);
        let (mut low, high) = (trips.start, trips.end);
        let mut size = high - low;
        while size > 0 {
            let half = size / 2;
            let mid = low + half;
            if self.get_stop_event(TripId::new(mid), segment.stop_index).departure_time < time {
                low = mid + 1;
                size -= half + 1;
            } else {
                size = half;
            }
        }
        if low < high {
            Some(TripId::new(low))
        } else {
            None
        }
    }

    /// Interpolation-guessing variant; pays off on dense routes.
    pub fn get_earliest_trip_peek(&self, segment: RouteSegment, time: Weight) -> Option<TripId> {
        if segment.stop_index.id() + 1 >= self.timetable.number_of_stops_in_route(segment.route_id) {
            return None;
        }
        let trips = self.trips_of_route(segment.route_id);
        if trips.is_empty() {
            return None;
        }
        let departure = |trip: usize| self.get_stop_event(TripId::new(trip), segment.stop_index).departure_time;
        let first_departure = departure(trips.start);
        let last_departure = departure(trips.end - 1);
        if first_departure >= time {
            return Some(TripId::new(trips.start));
        }
        if last_departure < time {
            return None;
        }
        let span = (last_departure - first_departure) as i64;
        let mut trip = trips.start + (((time - first_departure) as i64 * (trips.len() - 1) as i64) / span) as usize;
        if departure(trip) < time {
            while departure(trip) < time {
                trip += 1;
            }
        } else {
            while trip > trips.start && departure(trip - 1) >= time {
                trip -= 1;
            }
        }
        Some(TripId::new(trip))
    }

    pub fn serialize<P: AsRef<Path>>(&self, base: P) -> Result<()> {
        let base = base.as_ref();
        self.timetable.serialize(sibling(base, ".raptor"))?;
        self.deconstruct_to(base)?;
        self.stop_event_graph.deconstruct_to(sibling(base, ".graph"))
    }

    pub fn deserialize<P: AsRef<Path>>(base: P) -> Result<TripBasedData> {
        let base = base.as_ref();
        let mut data = TripBasedData::reconstruct_from(base)?;
        data.timetable = Timetable::deserialize(sibling(base, ".raptor"))?;
        data.stop_event_graph = FirstOutGraph::reconstruct_from(sibling(base, ".graph"))?;
        Ok(data)
    }
}

fn sibling(base: &Path, suffix: &str) -> PathBuf {
    PathBuf::from(format!("{}{}", base.display(), suffix))
}

impl Deconstruct for TripBasedData {
    fn store_each(&self, store: &dyn Fn(&str, &dyn Store) -> Result<()>) -> Result<()> {
        store("first_trip_of_route", &self.first_trip_of_route)?;
        store("route_of_trip", &self.route_of_trip)?;
        store("first_stop_event_of_trip", &self.first_stop_event_of_trip)?;
        store("trip_of_stop_event", &self.trip_of_stop_event)?;
        store("index_of_stop_event", &self.index_of_stop_event)?;
        store("arrival_events", &self.arrival_events)?;
        Ok(())
    }
}

impl Reconstruct for TripBasedData {
    fn reconstruct_with(loader: Loader) -> Result<TripBasedData> {
        let arrival_events: Vec<ArrivalEvent> = loader.load("arrival_events")?;
        let num_stop_events = arrival_events.len();
        Ok(TripBasedData {
            timetable: TimetableBuilder::new(0, 0).finish(),
            first_trip_of_route: loader.load("first_trip_of_route")?,
            route_of_trip: loader.load("route_of_trip")?,
            first_stop_event_of_trip: loader.load("first_stop_event_of_trip")?,
            trip_of_stop_event: loader.load("trip_of_stop_event")?,
            index_of_stop_event: loader.load("index_of_stop_event")?,
            arrival_events,
            stop_event_graph: FirstOutGraph::empty(num_stop_events),
        })
    }
}
