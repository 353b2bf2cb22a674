//! Read-only timetable view: routes, trips, stops and stop events.
//!
//! A route is an equivalence class of trips sharing the exact same stop
//! sequence. All stop events live in one global array, grouped first by route
//! and then by trip in trip order, so that a trip is a contiguous slice and
//! `first_stop_event_of_route` indexes both trips and events.
//!
//! Stops are a dense prefix of the walking-graph vertex space.

use crate::datastr::graph::*;
use crate::io::{Deconstruct, Loader, Reconstruct, Store};
use crate::tagged_id;
use std::io::Result;
use std::path::Path;

tagged_id!(
    /// A stop of the timetable. Every stop is a vertex, most vertices are no stop.
    StopId
);
tagged_id!(
    /// A route: maximal set of trips sharing one stop sequence.
    RouteId
);
tagged_id!(
    /// One vehicle run along its route.
    TripId
);
tagged_id!(
    /// Position of a stop within a route's stop sequence.
    StopIndex
);
tagged_id!(
    /// One (arrival, departure) pair at one stop of one trip, globally indexed.
    StopEventId
);

impl StopId {
    #[inline]
    pub fn vertex(self) -> Vertex {
        Vertex(self.0)
    }
}

impl Vertex {
    /// Reinterpret as stop. Only valid if `timetable.is_stop(self)`.
    #[inline]
    pub fn stop(self) -> StopId {
        StopId(self.0)
    }
}

/// Time values are seconds; `NEVER` marks unreachable.
pub const NEVER: Weight = INFINITY;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct StopEvent {
    pub arrival_time: Weight,
    pub departure_time: Weight,
}

impl StopEvent {
    pub fn new(arrival_time: Weight, departure_time: Weight) -> StopEvent {
        assert!(departure_time >= arrival_time, "departure before arrival violates the stop event contract");
        StopEvent {
            arrival_time,
            departure_time,
        }
    }
}

/// A (route, position) pair: "route r visits the stop as its i-th stop".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct RouteSegment {
    pub route_id: RouteId,
    pub stop_index: StopIndex,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Timetable {
    // CSR of route segments per stop
    first_route_segment_of_stop: Vec<u32>,
    route_segments: Vec<RouteSegment>,
    // CSR of the stop sequence per route
    first_stop_id_of_route: Vec<u32>,
    stop_ids: Vec<StopId>,
    // CSR of the event array per route (grouped by trip)
    first_stop_event_of_route: Vec<u32>,
    stop_events: Vec<StopEvent>,
    /// Walking graph during preprocessing, shortcut graph at query time.
    pub transfer_graph: FirstOutGraph,
    /// Per-vertex positions, used for geo-rank query generation.
    pub coordinates: Vec<Point>,
    implicit_buffer_times: bool,
    /// Per-stop minimum change time; empty iff buffer times are implicit.
    min_change_times: Vec<Weight>,
}

impl Timetable {
    pub fn num_stops(&self) -> usize {
        self.first_route_segment_of_stop.len() - 1
    }

    pub fn num_routes(&self) -> usize {
        self.first_stop_id_of_route.len() - 1
    }

    pub fn num_vertices(&self) -> usize {
        self.transfer_graph.num_vertices()
    }

    pub fn num_stop_events(&self) -> usize {
        self.stop_events.len()
    }

    pub fn num_trips(&self) -> usize {
        self.routes().map(|route| self.number_of_trips_in_route(route)).sum()
    }

    #[inline]
    pub fn is_stop(&self, vertex: Vertex) -> bool {
        vertex.id() < self.num_stops()
    }

    pub fn is_route(&self, route: RouteId) -> bool {
        route.id() < self.num_routes()
    }

    pub fn routes(&self) -> impl Iterator<Item = RouteId> {
        (0..self.num_routes()).map(RouteId::new)
    }

    pub fn stops(&self) -> impl Iterator<Item = StopId> {
        (0..self.num_stops()).map(StopId::new)
    }

    pub fn routes_containing_stop(&self, stop: StopId) -> &[RouteSegment] {
        let range = self.first_route_segment_of_stop[stop.id()] as usize..self.first_route_segment_of_stop[stop.id() + 1] as usize;
        &self.route_segments[range]
    }

    pub fn stop_array_of_route(&self, route: RouteId) -> &[StopId] {
        let range = self.first_stop_id_of_route[route.id()] as usize..self.first_stop_id_of_route[route.id() + 1] as usize;
        &self.stop_ids[range]
    }

    #[inline]
    pub fn number_of_stops_in_route(&self, route: RouteId) -> usize {
        (self.first_stop_id_of_route[route.id() + 1] - self.first_stop_id_of_route[route.id()]) as usize
    }

    #[inline]
    pub fn number_of_trips_in_route(&self, route: RouteId) -> usize {
        let events = (self.first_stop_event_of_route[route.id() + 1] - self.first_stop_event_of_route[route.id()]) as usize;
        events / self.number_of_stops_in_route(route)
    }

    /// All stop events of the route, grouped by trip.
    pub fn events_of_route(&self, route: RouteId) -> &[StopEvent] {
        let range = self.first_stop_event_of_route[route.id()] as usize..self.first_stop_event_of_route[route.id() + 1] as usize;
        &self.stop_events[range]
    }

    pub fn first_trip_of_route(&self, route: RouteId) -> &[StopEvent] {
        &self.events_of_route(route)[..self.number_of_stops_in_route(route)]
    }

    pub fn last_trip_of_route(&self, route: RouteId) -> &[StopEvent] {
        let size = self.number_of_stops_in_route(route);
        let events = self.events_of_route(route);
        &events[events.len() - size..]
    }

    #[inline]
    pub fn first_stop_event_of_route(&self, route: RouteId) -> usize {
        self.first_stop_event_of_route[route.id()] as usize
    }

    #[inline]
    pub fn stop_event(&self, event: StopEventId) -> &StopEvent {
        &self.stop_events[event.id()]
    }

    pub fn stop_events(&self) -> &[StopEvent] {
        &self.stop_events
    }

    pub fn stop_of_route_segment(&self, segment: RouteSegment) -> StopId {
        self.stop_array_of_route(segment.route_id)[segment.stop_index.id()]
    }

    /// Departure buffer times are folded into the departure times themselves.
    /// ULTRA preprocessing and queries on shortcut graphs require this.
    pub fn has_implicit_buffer_times(&self) -> bool {
        self.implicit_buffer_times
    }

    pub fn min_change_time(&self, stop: StopId) -> Weight {
        if self.implicit_buffer_times {
            0
        } else {
            self.min_change_times[stop.id()]
        }
    }

    /// Earliest departure of any stop event, the lower cutoff for departure enumeration.
    pub fn min_departure_time(&self) -> Weight {
        self.stop_events.iter().map(|event| event.departure_time).min().unwrap_or(NEVER)
    }

    /// Iterator over the trips of `route`, positioned on the last trip at `stop_index`.
    pub fn trip_iterator(&self, route: RouteId, stop_index: StopIndex) -> TripIterator {
        let trip_size = self.number_of_stops_in_route(route);
        let num_trips = self.number_of_trips_in_route(route);
        debug_assert!(num_trips > 0, "route {} has no trips", route);
        debug_assert!(stop_index.id() + 1 < trip_size, "cannot board a route at its last stop");
        TripIterator {
            stops: self.stop_array_of_route(route),
            events: self.events_of_route(route),
            trip_size,
            trip_offset: num_trips - 1,
            stop_index: stop_index.id(),
            first_event_of_route: self.first_stop_event_of_route(route),
        }
    }

    pub fn serialize<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        self.deconstruct_to(dir)?;
        self.transfer_graph.deconstruct_to(dir.join("transfer_graph"))
    }

    pub fn deserialize<P: AsRef<Path>>(dir: P) -> Result<Timetable> {
        let dir = dir.as_ref();
        let mut timetable = Timetable::reconstruct_from(dir)?;
        timetable.transfer_graph = FirstOutGraph::reconstruct_from(dir.join("transfer_graph"))?;
        Ok(timetable)
    }
}

impl Deconstruct for Timetable {
    fn store_each(&self, store: &dyn Fn(&str, &dyn Store) -> Result<()>) -> Result<()> {
        store("first_route_segment_of_stop", &self.first_route_segment_of_stop)?;
        store("route_segments", &self.route_segments)?;
        store("first_stop_id_of_route", &self.first_stop_id_of_route)?;
        store("stop_ids", &self.stop_ids)?;
        store("first_stop_event_of_route", &self.first_stop_event_of_route)?;
        store("stop_events", &self.stop_events)?;
        store("coordinates", &self.coordinates)?;
        store("flags", &vec![self.implicit_buffer_times as u8])?;
        store("min_change_times", &self.min_change_times)?;
        Ok(())
    }
}

impl Reconstruct for Timetable {
    fn reconstruct_with(loader: Loader) -> Result<Timetable> {
        let flags: Vec<u8> = loader.load("flags")?;
        Ok(Timetable {
            first_route_segment_of_stop: loader.load("first_route_segment_of_stop")?,
            route_segments: loader.load("route_segments")?,
            first_stop_id_of_route: loader.load("first_stop_id_of_route")?,
            stop_ids: loader.load("stop_ids")?,
            first_stop_event_of_route: loader.load("first_stop_event_of_route")?,
            stop_events: loader.load("stop_events")?,
            transfer_graph: FirstOutGraph::empty(0),
            coordinates: loader.load("coordinates")?,
            implicit_buffer_times: flags[0] != 0,
            min_change_times: loader.load("min_change_times")?,
        })
    }
}

/// Walks one route: backward over trips (towards earlier departures) and
/// forward over stops. The position identifies one stop event.
#[derive(Debug)]
pub struct TripIterator<'a> {
    stops: &'a [StopId],
    events: &'a [StopEvent],
    trip_size: usize,
    trip_offset: usize,
    stop_index: usize,
    first_event_of_route: usize,
}

impl<'a> TripIterator<'a> {
    #[inline]
    pub fn stop_index(&self) -> StopIndex {
        StopIndex::new(self.stop_index)
    }

    #[inline]
    pub fn has_further_stops(&self) -> bool {
        self.stop_index + 1 < self.trip_size
    }

    #[inline]
    pub fn next_stop(&mut self) {
        debug_assert!(self.has_further_stops());
        self.stop_index += 1;
    }

    #[inline]
    pub fn has_earlier_trip(&self) -> bool {
        self.trip_offset > 0
    }

    #[inline]
    pub fn previous_trip(&mut self) {
        debug_assert!(self.has_earlier_trip());
        self.trip_offset -= 1;
    }

    #[inline]
    pub fn previous_departure_time(&self) -> Weight {
        debug_assert!(self.has_earlier_trip());
        self.events[(self.trip_offset - 1) * self.trip_size + self.stop_index].departure_time
    }

    #[inline]
    pub fn arrival_time(&self) -> Weight {
        self.events[self.trip_offset * self.trip_size + self.stop_index].arrival_time
    }

    #[inline]
    pub fn departure_time(&self) -> Weight {
        self.events[self.trip_offset * self.trip_size + self.stop_index].departure_time
    }

    #[inline]
    pub fn stop(&self) -> StopId {
        self.stops[self.stop_index]
    }

    #[inline]
    pub fn stop_at(&self, index: StopIndex) -> StopId {
        self.stops[index.id()]
    }

    /// Global id of the stop event at the current position.
    #[inline]
    pub fn stop_event_id(&self) -> StopEventId {
        StopEventId::new(self.first_event_of_route + self.trip_offset * self.trip_size + self.stop_index)
    }

    /// Global id of the stop event of the current trip at `index`.
    #[inline]
    pub fn stop_event_id_at(&self, index: StopIndex) -> StopEventId {
        StopEventId::new(self.first_event_of_route + self.trip_offset * self.trip_size + index.id())
    }
}

/// Assembles a `Timetable` from routes and walking edges. GTFS import and
/// network cleanup happen outside this crate; tests and tools construct their
/// networks through this builder.
pub struct TimetableBuilder {
    num_stops: usize,
    num_vertices: usize,
    routes: Vec<(Vec<StopId>, Vec<Vec<StopEvent>>)>,
    transfer_edges: Vec<(Vertex, Vertex, Weight)>,
    coordinates: Vec<Point>,
}

impl TimetableBuilder {
    pub fn new(num_stops: usize, num_vertices: usize) -> TimetableBuilder {
        assert!(num_stops <= num_vertices, "stops must form a prefix of the vertex space");
        TimetableBuilder {
            num_stops,
            num_vertices,
            routes: Vec::new(),
            transfer_edges: Vec::new(),
            coordinates: vec![Point::default(); num_vertices],
        }
    }

    /// Adds a route with the given stop sequence and trips.
    /// Trips are sorted by their first departure; the FIFO property across
    /// trips and the time monotonicity within each trip are mandatory.
    pub fn add_route(&mut self, stops: Vec<StopId>, mut trips: Vec<Vec<StopEvent>>) -> RouteId {
        assert!(!stops.is_empty() && !trips.is_empty(), "empty route");
        if stops.len() < 2 {
            eprintln!("warning: route {} has a single stop and will never be scanned", self.routes.len());
        }
        for stop in &stops {
            assert!(stop.id() < self.num_stops, "stop {} is out of range", stop);
        }
        for trip in &trips {
            assert_eq!(trip.len(), stops.len(), "trip length does not match the stop sequence");
            for window in trip.windows(2) {
                assert!(window[1].arrival_time >= window[0].departure_time, "trip travels backwards in time");
            }
        }
        trips.sort_by_key(|trip| trip[0].departure_time);
        for index in 0..stops.len() {
            for pair in trips.windows(2) {
                assert!(
                    pair[1][index].departure_time >= pair[0][index].departure_time,
                    "trips of a route must not overtake each other"
                );
            }
        }
        self.routes.push((stops, trips));
        RouteId::new(self.routes.len() - 1)
    }

    pub fn add_transfer_edge(&mut self, from: Vertex, to: Vertex, travel_time: Weight) {
        assert!(travel_time >= 0, "travel times are non-negative");
        assert!(from.id() < self.num_vertices && to.id() < self.num_vertices);
        self.transfer_edges.push((from, to, travel_time));
    }

    /// Convenience for the common symmetric walking edge.
    pub fn add_bidirectional_edge(&mut self, a: Vertex, b: Vertex, travel_time: Weight) {
        self.add_transfer_edge(a, b, travel_time);
        self.add_transfer_edge(b, a, travel_time);
    }

    pub fn set_coordinates(&mut self, vertex: Vertex, point: Point) {
        self.coordinates[vertex.id()] = point;
    }

    pub fn finish(self) -> Timetable {
        self.finish_with_buffer_times(true, Vec::new())
    }

    pub fn finish_with_buffer_times(self, implicit_buffer_times: bool, min_change_times: Vec<Weight>) -> Timetable {
        assert!(
            implicit_buffer_times == min_change_times.is_empty(),
            "min change times are given exactly when buffer times are not implicit"
        );

        let mut first_stop_id_of_route = vec![0u32];
        let mut stop_ids = Vec::new();
        let mut first_stop_event_of_route = vec![0u32];
        let mut stop_events = Vec::new();
        let mut segments_per_stop: Vec<Vec<RouteSegment>> = vec![Vec::new(); self.num_stops];

        for (route, (stops, trips)) in self.routes.into_iter().enumerate() {
            for (index, &stop) in stops.iter().enumerate() {
                segments_per_stop[stop.id()].push(RouteSegment {
                    route_id: RouteId::new(route),
                    stop_index: StopIndex::new(index),
                });
            }
            stop_ids.extend_from_slice(&stops);
            first_stop_id_of_route.push(stop_ids.len() as u32);
            for trip in trips {
                stop_events.extend_from_slice(&trip);
            }
            first_stop_event_of_route.push(stop_events.len() as u32);
        }

        let mut first_route_segment_of_stop = vec![0u32];
        let mut route_segments = Vec::new();
        for segments in segments_per_stop {
            route_segments.extend_from_slice(&segments);
            first_route_segment_of_stop.push(route_segments.len() as u32);
        }

        let mut adjacency: Vec<Vec<Link>> = vec![Vec::new(); self.num_vertices];
        for (from, to, travel_time) in self.transfer_edges {
            adjacency[from.id()].push(Link {
                head: to,
                weight: travel_time,
            });
        }

        Timetable {
            first_route_segment_of_stop,
            route_segments,
            first_stop_id_of_route,
            stop_ids,
            first_stop_event_of_route,
            stop_events,
            transfer_graph: FirstOutGraph::from_adjacency_lists(adjacency),
            coordinates: self.coordinates,
            implicit_buffer_times,
            min_change_times,
        }
    }
}

/// Replaces the transfer graph, e.g. by the core graph after `core_ch` or by
/// the shortcut graph after ULTRA preprocessing.
impl Timetable {
    pub fn with_transfer_graph(mut self, transfer_graph: FirstOutGraph) -> Timetable {
        self.transfer_graph = transfer_graph;
        self
    }
}
