//! Bucket-CH oracle for initial and final walking transfers.
//!
//! Offline, an upward search from every stop appends a `(stop, distance)`
//! entry to the bucket of each settled vertex (forward overlay), and
//! symmetrically for target buckets on the backward overlay. One online run
//! then yields walking distances from the source to every stop, from every
//! stop to the target, and the direct source-target distance, all in two
//! upward searches.

use super::ContractionHierarchy;
use crate::algo::dijkstra::*;
use crate::datastr::graph::*;
use crate::datastr::indexed_set::IndexedSet;
use crate::datastr::timestamped_vector::TimestampedVector;
use crate::datastr::timetable::StopId;
use crate::report::Timer;

#[derive(Debug, Clone, Copy)]
struct BucketEntry {
    stop: StopId,
    distance: Weight,
}

pub struct BucketChInitialTransfers<'a> {
    ch: &'a ContractionHierarchy,
    forward_bucket_first: Vec<u32>,
    forward_buckets: Vec<BucketEntry>,
    backward_bucket_first: Vec<u32>,
    backward_buckets: Vec<BucketEntry>,
    forward_data: DijkstraData,
    backward_data: DijkstraData,
    forward_distance: TimestampedVector<Weight>,
    backward_distance: TimestampedVector<Weight>,
    forward_pois: IndexedSet<StopId>,
    direct_distance: Weight,
}

impl<'a> BucketChInitialTransfers<'a> {
    pub fn new(ch: &'a ContractionHierarchy, num_stops: usize) -> BucketChInitialTransfers<'a> {
        let n = ch.num_vertices();
        assert!(num_stops <= n);
        let timer = Timer::new();

        // A source bucket entry (s, d) at vertex v certifies a downward path
        // v -> s of length d, so source buckets are filled by upward searches
        // on the backward overlay (and target buckets on the forward one).
        let mut data = DijkstraData::new(n);
        let mut forward: Vec<Vec<BucketEntry>> = vec![Vec::new(); n];
        let mut backward: Vec<Vec<BucketEntry>> = vec![Vec::new(); n];
        for stop in 0..num_stops {
            let stop = StopId::new(stop);
            run_one_to_all(&ch.backward, &mut data, stop.vertex(), |_, _| true, |vertex, distance| {
                forward[vertex.id()].push(BucketEntry { stop, distance });
            });
            run_one_to_all(&ch.forward, &mut data, stop.vertex(), |_, _| true, |vertex, distance| {
                backward[vertex.id()].push(BucketEntry { stop, distance });
            });
        }
        eprintln!("bucket construction for {} stops took {}ms", num_stops, timer.get_passed_ms());

        let (forward_bucket_first, forward_buckets) = flatten(forward);
        let (backward_bucket_first, backward_buckets) = flatten(backward);

        BucketChInitialTransfers {
            ch,
            forward_bucket_first,
            forward_buckets,
            backward_bucket_first,
            backward_buckets,
            forward_data: DijkstraData::new(n),
            backward_data: DijkstraData::new(n),
            forward_distance: TimestampedVector::new(num_stops, INFINITY),
            backward_distance: TimestampedVector::new(num_stops, INFINITY),
            forward_pois: IndexedSet::new(num_stops),
            direct_distance: INFINITY,
        }
    }

    pub fn run(&mut self, source: Vertex, target: Vertex) {
        self.forward_distance.reset();
        self.backward_distance.reset();
        self.forward_pois.clear();
        self.direct_distance = INFINITY;

        let mut forward = DijkstraRun::query(&self.ch.forward, &mut self.forward_data, source);
        while let Some((vertex, distance)) = forward.next() {
            let range = self.forward_bucket_first[vertex.id()] as usize..self.forward_bucket_first[vertex.id() + 1] as usize;
            for entry in &self.forward_buckets[range] {
                let stop_distance = distance + entry.distance;
                if stop_distance < self.forward_distance[entry.stop.id()] {
                    self.forward_distance.set(entry.stop.id(), stop_distance);
                    self.forward_pois.insert(entry.stop);
                }
            }
        }

        let mut backward = DijkstraRun::query(&self.ch.backward, &mut self.backward_data, target);
        while let Some((vertex, distance)) = backward.next() {
            let forward_distance = self.forward_data.distances[vertex.id()];
            if forward_distance < INFINITY {
                self.direct_distance = self.direct_distance.min(forward_distance + distance);
            }
            let range = self.backward_bucket_first[vertex.id()] as usize..self.backward_bucket_first[vertex.id() + 1] as usize;
            for entry in &self.backward_buckets[range] {
                let stop_distance = distance + entry.distance;
                if stop_distance < self.backward_distance[entry.stop.id()] {
                    self.backward_distance.set(entry.stop.id(), stop_distance);
                }
            }
        }
    }

    /// Direct source-target walking distance of the last run.
    pub fn get_distance(&self) -> Weight {
        self.direct_distance
    }

    pub fn get_forward_distance(&self, stop: StopId) -> Weight {
        self.forward_distance[stop.id()]
    }

    pub fn get_backward_distance(&self, stop: StopId) -> Weight {
        self.backward_distance[stop.id()]
    }

    /// Stops with finite source-to-stop walking distance.
    pub fn get_forward_pois(&self) -> &[StopId] {
        self.forward_pois.elements()
    }
}

fn flatten(buckets: Vec<Vec<BucketEntry>>) -> (Vec<u32>, Vec<BucketEntry>) {
    let mut first = Vec::with_capacity(buckets.len() + 1);
    first.push(0u32);
    let mut flat = Vec::new();
    for bucket in buckets {
        flat.extend_from_slice(&bucket);
        first.push(flat.len() as u32);
    }
    (first, flat)
}
