use std::path::PathBuf;

use transit_router::algo::contraction_hierarchy::{contract_graph, ContractionHierarchy};
use transit_router::datastr::graph::*;
use transit_router::datastr::timetable::*;
use transit_router::datastr::trip_based::TripBasedData;
use transit_router::experiments::{load_queries, save_queries, Query};

fn test_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("transit_router_test_{}_{}", std::process::id(), name));
    if dir.exists() {
        std::fs::remove_dir_all(&dir).unwrap();
    }
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn timetable() -> Timetable {
    let mut builder = TimetableBuilder::new(3, 5);
    builder.add_route(
        vec![StopId(0), StopId(1), StopId(2)],
        vec![
            vec![StopEvent::new(100, 120), StopEvent::new(200, 220), StopEvent::new(300, 300)],
            vec![StopEvent::new(700, 720), StopEvent::new(800, 820), StopEvent::new(900, 900)],
        ],
    );
    builder.add_route(vec![StopId(2), StopId(0)], vec![vec![StopEvent::new(400, 420), StopEvent::new(500, 500)]]);
    builder.add_bidirectional_edge(Vertex(0), Vertex(3), 60);
    builder.add_bidirectional_edge(Vertex(3), Vertex(4), 30);
    builder.add_transfer_edge(Vertex(4), Vertex(1), 10);
    builder.set_coordinates(Vertex(3), Point { latitude: 49.0, longitude: 8.4 });
    builder.finish()
}

#[test]
fn timetable_round_trip() {
    let dir = test_dir("timetable");
    let original = timetable();
    original.serialize(dir.join("raptor")).unwrap();
    let restored = Timetable::deserialize(dir.join("raptor")).unwrap();
    assert_eq!(original, restored);
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn contraction_hierarchy_round_trip() {
    let dir = test_dir("ch");
    let original = contract_graph(&timetable().transfer_graph);
    original.serialize(dir.join("ch")).unwrap();
    let restored = ContractionHierarchy::deserialize(dir.join("ch")).unwrap();
    assert_eq!(original, restored);
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn trip_based_data_round_trip() {
    let dir = test_dir("trip_based");
    let original = TripBasedData::new(timetable());
    original.serialize(dir.join("network")).unwrap();
    let restored = TripBasedData::deserialize(dir.join("network")).unwrap();
    assert_eq!(original, restored);
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn query_file_round_trip() {
    let dir = test_dir("queries");
    let original = vec![
        Query {
            query_time_ms: 0.25,
            source: Vertex(3),
            target: Vertex(1),
            departure_time: 28800,
            earliest_arrival_time: 29400,
            number_of_trips: 2,
            geo_rank: 4,
        },
        Query {
            source: Vertex(0),
            target: Vertex(4),
            departure_time: 600,
            earliest_arrival_time: NEVER,
            ..Query::default()
        },
    ];
    save_queries(dir.join("queries"), &original).unwrap();
    let restored = load_queries(dir.join("queries")).unwrap();
    assert_eq!(original, restored);
    std::fs::remove_dir_all(&dir).unwrap();
}
