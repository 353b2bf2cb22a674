use transit_router::algo::contraction_hierarchy::contract_graph;
use transit_router::algo::raptor::builder::{compute_stop_to_stop_shortcuts, ParallelConfig};
use transit_router::algo::raptor::ultra_raptor::{UltraRaptor, UltraRaptorConfig};
use transit_router::algo::raptor::{Shortcut, ShortcutSearchConfig};
use transit_router::algo::ArrivalLabel;
use transit_router::datastr::graph::*;
use transit_router::datastr::timetable::*;

fn hms(hours: Weight, minutes: Weight, seconds: Weight) -> Weight {
    hours * 3600 + minutes * 60 + seconds
}

fn single_thread() -> ParallelConfig {
    ParallelConfig {
        num_threads: 1,
        pin_multiplier: 1,
    }
}

#[test]
fn single_isolated_trip() {
    // one route A -> B, one trip 08:00 -> 08:10, no walking at all
    let mut builder = TimetableBuilder::new(2, 2);
    builder.add_route(
        vec![StopId(0), StopId(1)],
        vec![vec![
            StopEvent::new(hms(8, 0, 0), hms(8, 0, 0)),
            StopEvent::new(hms(8, 10, 0), hms(8, 10, 0)),
        ]],
    );
    let timetable = builder.finish();
    let ch = contract_graph(&timetable.transfer_graph);
    let mut server = UltraRaptor::new(&timetable, &ch, UltraRaptorConfig::default());

    server.run(Vertex(0), hms(8, 0, 0), Vertex(1));
    assert_eq!(
        server.get_arrivals(),
        vec![ArrivalLabel {
            arrival_time: hms(8, 10, 0),
            number_of_trips: 1
        }]
    );
    assert!(server.reachable(Vertex(1)));

    // one second after departure, the trip is gone
    server.run(Vertex(0), hms(8, 0, 1), Vertex(1));
    assert_eq!(server.get_arrivals(), vec![]);
    assert!(!server.reachable(Vertex(1)));
    assert_eq!(server.get_earliest_arrival_time(Vertex(1)), NEVER);

    // no trip in the opposite direction
    server.run(Vertex(1), hms(8, 0, 0), Vertex(0));
    assert_eq!(server.get_arrivals(), vec![]);
}

#[test]
fn direct_walking_dominates_the_transit_journey() {
    // walking A - B takes 300s, the parallel trip arrives later
    let mut builder = TimetableBuilder::new(2, 2);
    builder.add_route(
        vec![StopId(0), StopId(1)],
        vec![vec![
            StopEvent::new(hms(8, 0, 0), hms(8, 0, 0)),
            StopEvent::new(hms(8, 10, 0), hms(8, 10, 0)),
        ]],
    );
    builder.add_bidirectional_edge(Vertex(0), Vertex(1), 300);
    let timetable = builder.finish();
    let ch = contract_graph(&timetable.transfer_graph);
    let mut server = UltraRaptor::new(&timetable, &ch, UltraRaptorConfig::default());

    server.run(Vertex(0), hms(8, 0, 0), Vertex(1));
    // target pruning removes the dominated one-trip arrival at 08:10
    assert_eq!(
        server.get_arrivals(),
        vec![ArrivalLabel {
            arrival_time: hms(8, 5, 0),
            number_of_trips: 0
        }]
    );
}

/// Network of the shortcut necessity scenario: r1: A -> B, r2: C -> D,
/// walking B - C and B - D. Boarding r2 at C after riding r1 reaches D
/// at 09:00; walking from B to D directly takes `b_to_d_walk` seconds.
fn two_route_network(b_to_d_walk: Weight) -> Timetable {
    let mut builder = TimetableBuilder::new(4, 4);
    // A = 0, B = 1, C = 2, D = 3
    builder.add_route(
        vec![StopId(0), StopId(1)],
        vec![vec![
            StopEvent::new(hms(8, 0, 0), hms(8, 0, 0)),
            StopEvent::new(hms(8, 56, 0), hms(8, 56, 0)),
        ]],
    );
    builder.add_route(
        vec![StopId(2), StopId(3)],
        vec![vec![
            StopEvent::new(hms(8, 58, 0), hms(8, 58, 0)),
            StopEvent::new(hms(9, 0, 0), hms(9, 0, 0)),
        ]],
    );
    builder.add_bidirectional_edge(Vertex(1), Vertex(2), 60);
    builder.add_bidirectional_edge(Vertex(1), Vertex(3), b_to_d_walk);
    builder.finish()
}

#[test]
fn necessary_shortcut_is_emitted() {
    let timetable = two_route_network(400);
    let (shortcuts, shortcut_graph) = compute_stop_to_stop_shortcuts(
        &timetable,
        ShortcutSearchConfig::default(),
        single_thread(),
        -INFINITY,
        INFINITY,
    );

    // the B -> C transfer walk is the only shortcut
    assert_eq!(
        shortcuts,
        vec![Shortcut {
            origin: StopId(1),
            destination: StopId(2),
            walking_distance: 60
        }]
    );
    assert_eq!(shortcut_graph.degree(Vertex(1)), 1);
    assert_eq!(shortcut_graph.degree(Vertex(3)), 0);
}

#[test]
fn witness_walking_suppresses_the_shortcut() {
    // with a 50s walk, walking from B reaches D before r2 does
    let timetable = two_route_network(50);
    let (shortcuts, _) = compute_stop_to_stop_shortcuts(
        &timetable,
        ShortcutSearchConfig::default(),
        single_thread(),
        -INFINITY,
        INFINITY,
    );
    assert_eq!(shortcuts, vec![]);
}

#[test]
fn ultra_raptor_uses_the_shortcut_graph() {
    let timetable = two_route_network(400);
    let ch = contract_graph(&timetable.transfer_graph);
    let (_, shortcut_graph) = compute_stop_to_stop_shortcuts(
        &timetable,
        ShortcutSearchConfig::default(),
        single_thread(),
        -INFINITY,
        INFINITY,
    );
    let query_timetable = timetable.with_transfer_graph(shortcut_graph);
    let mut server = UltraRaptor::new(&query_timetable, &ch, UltraRaptorConfig::default());

    server.run(Vertex(0), hms(8, 0, 0), Vertex(3));
    assert_eq!(
        server.get_arrivals(),
        vec![
            ArrivalLabel {
                arrival_time: hms(8, 56, 0) + 400,
                number_of_trips: 1
            },
            ArrivalLabel {
                arrival_time: hms(9, 0, 0),
                number_of_trips: 2
            },
        ]
    );
}

#[test]
fn stations_share_their_arrival_labels() {
    // two stops at the same location (zero-weight walking edge) plus a
    // separate route from the twin stop; both routes must be reachable
    // without an explicit transfer
    let mut builder = TimetableBuilder::new(3, 3);
    // A = 0 and A' = 1 form one station, B = 2
    builder.add_route(
        vec![StopId(1), StopId(2)],
        vec![vec![
            StopEvent::new(hms(8, 0, 0), hms(8, 0, 0)),
            StopEvent::new(hms(8, 30, 0), hms(8, 30, 0)),
        ]],
    );
    builder.add_bidirectional_edge(Vertex(0), Vertex(1), 0);
    let timetable = builder.finish();
    let ch = contract_graph(&timetable.transfer_graph);
    let mut server = UltraRaptor::new(&timetable, &ch, UltraRaptorConfig::default());

    // depart at the station twin A, catch the trip at A'
    server.run(Vertex(0), hms(8, 0, 0), Vertex(2));
    assert_eq!(
        server.get_arrivals(),
        vec![ArrivalLabel {
            arrival_time: hms(8, 30, 0),
            number_of_trips: 1
        }]
    );
}

#[test]
fn shortcut_set_has_no_duplicate_pairs() {
    let timetable = two_route_network(400);
    let (shortcuts, _) = compute_stop_to_stop_shortcuts(
        &timetable,
        ShortcutSearchConfig::default(),
        single_thread(),
        -INFINITY,
        INFINITY,
    );
    let mut pairs: Vec<(StopId, StopId)> = shortcuts.iter().map(|shortcut| (shortcut.origin, shortcut.destination)).collect();
    pairs.sort_unstable();
    pairs.dedup();
    assert_eq!(pairs.len(), shortcuts.len());
}
