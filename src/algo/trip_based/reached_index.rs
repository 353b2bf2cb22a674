//! Per-trip "smallest stop index known reached", the Trip-Based dominance
//! device. Updates are monotonic decreases and, because trips of a route are
//! FIFO-ordered, an update at one trip also bounds all later trips of the
//! same route; the forward fill needs no synchronization since queries are
//! single-threaded.

use crate::datastr::timetable::*;
use crate::datastr::trip_based::TripBasedData;

pub struct ReachedIndex<'a> {
    data: &'a TripBasedData,
    labels: Vec<u8>,
    default_labels: Vec<u8>,
}

impl<'a> ReachedIndex<'a> {
    pub fn new(data: &'a TripBasedData) -> ReachedIndex<'a> {
        let mut default_labels = vec![0u8; data.num_trips()];
        for trip in data.trips() {
            let num_stops = data.number_of_stops_in_trip(trip);
            assert!(
                num_stops <= u8::MAX as usize,
                "trip {} has {} stops, the reached index stores 8-bit stop indices",
                trip,
                num_stops
            );
            default_labels[trip.id()] = num_stops as u8;
        }
        ReachedIndex {
            data,
            labels: default_labels.clone(),
            default_labels,
        }
    }

    pub fn clear(&mut self) {
        self.labels.copy_from_slice(&self.default_labels);
    }

    #[inline]
    pub fn index(&self, trip: TripId) -> usize {
        self.labels[trip.id()] as usize
    }

    #[inline]
    pub fn already_reached(&self, trip: TripId, index: usize) -> bool {
        (self.labels[trip.id()] as usize) <= index
    }

    pub fn update(&mut self, trip: TripId, index: usize) {
        debug_assert!(trip.id() < self.labels.len());
        let route_end = self.data.end_trip_of_route_of(trip);
        for later in trip.id()..route_end.id() {
            if self.labels[later] as usize <= index {
                break;
            }
            self.labels[later] = index as u8;
        }
    }
}
