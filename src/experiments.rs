//! Query generation and batch evaluation.

use crate::algo::raptor::UltraRaptor;
use crate::algo::trip_based::TripBasedQuery;
use crate::datastr::graph::*;
use crate::datastr::timetable::NEVER;
use crate::io::{Load, Store};
use crate::report::*;
use rand::prelude::*;
use serde::Serialize;
use std::io::Result;
use std::path::Path;
use std::time::Duration;

/// One evaluated (or to-be-evaluated) point-to-point query.
/// Result fields are filled in by the run commands.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[repr(C)]
pub struct Query {
    pub query_time_ms: f64,
    pub source: Vertex,
    pub target: Vertex,
    pub departure_time: Weight,
    pub earliest_arrival_time: Weight,
    pub number_of_trips: u32,
    pub geo_rank: u32,
}

pub fn save_queries<P: AsRef<Path>>(path: P, queries: &[Query]) -> Result<()> {
    queries.write_to(path.as_ref())
}

pub fn load_queries<P: AsRef<Path>>(path: P) -> Result<Vec<Query>> {
    Vec::load_from(path)
}

/// Uniform random vertex (or stop) pairs with uniform departure times.
pub fn generate_random_queries(
    num_vertices: usize,
    num_stops: usize,
    stop_based: bool,
    num_queries: usize,
    departure_range: (Weight, Weight),
    seed: u64,
) -> Vec<Query> {
    let mut rng = StdRng::seed_from_u64(seed);
    report!("seed", seed);
    let id_range = if stop_based { num_stops } else { num_vertices };
    (0..num_queries)
        .map(|_| Query {
            source: Vertex::new(rng.gen_range(0..id_range)),
            target: Vertex::new(rng.gen_range(0..id_range)),
            departure_time: rng.gen_range(departure_range.0..=departure_range.1),
            earliest_arrival_time: NEVER,
            ..Query::default()
        })
        .collect()
}

/// For every sampled source, targets at ranks 1, 2, 4, 8, ... of the
/// Euclidean-distance ordering around the source.
pub fn generate_geo_rank_queries(
    coordinates: &[Point],
    num_sources: usize,
    max_rank: usize,
    departure_range: (Weight, Weight),
    seed: u64,
) -> Vec<Query> {
    let mut rng = StdRng::seed_from_u64(seed);
    report!("seed", seed);
    let n = coordinates.len();
    let mut queries = Vec::new();
    for _ in 0..num_sources {
        let source = rng.gen_range(0..n);
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| {
            coordinates[source]
                .euclidean_distance(coordinates[a])
                .partial_cmp(&coordinates[source].euclidean_distance(coordinates[b]))
                .unwrap()
        });
        let mut rank = 1;
        let mut geo_rank = 0;
        while rank < n && rank <= max_rank {
            queries.push(Query {
                source: Vertex::new(source),
                target: Vertex::new(order[rank]),
                departure_time: rng.gen_range(departure_range.0..=departure_range.1),
                earliest_arrival_time: NEVER,
                geo_rank,
                ..Query::default()
            });
            rank *= 2;
            geo_rank += 1;
        }
    }
    queries
}

#[derive(Serialize)]
struct RunSummary {
    num_queries: usize,
    total_time_ms: f64,
    avg_time_ms: f64,
}

fn report_summary(num_queries: usize, total: Duration) {
    let total_time_ms = total.as_secs_f64() * 1000.0;
    let summary = RunSummary {
        num_queries,
        total_time_ms,
        avg_time_ms: total_time_ms / num_queries.max(1) as f64,
    };
    report!("summary", serde_json::to_value(&summary).unwrap());
    eprintln!("avg. query time {}ms", summary.avg_time_ms);
}

pub fn run_ultra_raptor_queries(server: &mut UltraRaptor, queries: &mut [Query]) {
    let mut total = Duration::ZERO;
    {
        let mut context = push_collection_context("queries");
        for query in queries.iter_mut() {
            let _item = context.push_collection_item();
            report!("source", query.source.0);
            report!("target", query.target.0);
            report!("departure_time", query.departure_time);
            let ((), time) = measure(|| server.run(query.source, query.departure_time, query.target));
            query.query_time_ms = time.as_secs_f64() * 1000.0;
            query.earliest_arrival_time = server.get_earliest_arrival_time(query.target);
            query.number_of_trips = server.get_arrivals().last().map(|label| label.number_of_trips).unwrap_or(0);
            report!("arrival_time", query.earliest_arrival_time);
            report!("running_time_ms", query.query_time_ms);
            total += time;
        }
    }
    report_summary(queries.len(), total);
}

pub fn run_trip_based_queries(server: &mut TripBasedQuery, queries: &mut [Query]) {
    let mut total = Duration::ZERO;
    {
        let mut context = push_collection_context("queries");
        for query in queries.iter_mut() {
            let _item = context.push_collection_item();
            report!("source", query.source.0);
            report!("target", query.target.0);
            report!("departure_time", query.departure_time);
            let ((), time) = measure(|| server.run(query.source, query.departure_time, query.target));
            query.query_time_ms = time.as_secs_f64() * 1000.0;
            query.earliest_arrival_time = server.get_earliest_arrival_time();
            query.number_of_trips = server
                .get_journeys()
                .last()
                .map(|journey| journey.number_of_used_vehicles)
                .unwrap_or(0);
            report!("arrival_time", query.earliest_arrival_time);
            report!("running_time_ms", query.query_time_ms);
            total += time;
        }
    }
    report_summary(queries.len(), total);
}
