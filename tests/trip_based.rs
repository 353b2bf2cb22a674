use transit_router::algo::contraction_hierarchy::contract_graph;
use transit_router::algo::raptor::builder::{compute_stop_to_stop_shortcuts, ParallelConfig};
use transit_router::algo::raptor::ultra_raptor::{UltraRaptor, UltraRaptorConfig};
use transit_router::algo::raptor::ShortcutSearchConfig;
use transit_router::algo::trip_based::reached_index::ReachedIndex;
use transit_router::algo::trip_based::{
    compute_event_to_event_shortcuts, compute_stop_event_graph, EventShortcutSearchConfig, Journey, TripBasedQuery,
};
use transit_router::datastr::graph::*;
use transit_router::datastr::timetable::*;
use transit_router::datastr::trip_based::TripBasedData;

fn hms(hours: Weight, minutes: Weight, seconds: Weight) -> Weight {
    hours * 3600 + minutes * 60 + seconds
}

fn single_thread() -> ParallelConfig {
    ParallelConfig {
        num_threads: 1,
        pin_multiplier: 1,
    }
}

/// r1: A -> B, r2: C -> D, walking B - C (60s) and B - D (400s); the
/// two-trip journey over the B - C transfer reaches D first.
fn two_route_network() -> Timetable {
    let mut builder = TimetableBuilder::new(4, 4);
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
    builder.add_bidirectional_edge(Vertex(1), Vertex(3), 400);
    builder.finish()
}

#[test]
fn event_shortcut_connects_the_right_stop_events() {
    let timetable = two_route_network();
    let mut data = TripBasedData::new(timetable);
    let shortcuts = compute_event_to_event_shortcuts(
        &mut data,
        EventShortcutSearchConfig::default(),
        single_thread(),
        -INFINITY,
        INFINITY,
    );

    // exactly the transfer (r1 arrival at B) -> (r2 departure at C)
    assert_eq!(shortcuts.len(), 1);
    assert_eq!(shortcuts[0].origin, data.stop_event_id(TripId(0), StopIndex(1)));
    assert_eq!(shortcuts[0].destination, data.stop_event_id(TripId(1), StopIndex(0)));
    assert_eq!(shortcuts[0].walking_distance, 60);
    assert_eq!(data.stop_event_graph.num_edges(), 1);
}

#[test]
fn trip_based_query_matches_ultra_raptor() {
    let timetable = two_route_network();
    let ch = contract_graph(&timetable.transfer_graph);

    let (_, shortcut_graph) = compute_stop_to_stop_shortcuts(
        &timetable,
        ShortcutSearchConfig::default(),
        single_thread(),
        -INFINITY,
        INFINITY,
    );
    let raptor_timetable = timetable.clone().with_transfer_graph(shortcut_graph);
    let mut raptor = UltraRaptor::new(&raptor_timetable, &ch, UltraRaptorConfig::default());

    let mut data = TripBasedData::new(timetable);
    compute_event_to_event_shortcuts(
        &mut data,
        EventShortcutSearchConfig::default(),
        single_thread(),
        -INFINITY,
        INFINITY,
    );
    let mut trip_based = TripBasedQuery::new(&data, &ch);

    for source in 0..4 {
        for target in 0..4 {
            for departure_time in [hms(7, 0, 0), hms(8, 0, 0), hms(8, 30, 0), hms(8, 57, 0)] {
                raptor.run(Vertex(source), departure_time, Vertex(target));
                trip_based.run(Vertex(source), departure_time, Vertex(target));

                let raptor_journeys: Vec<Journey> = raptor
                    .get_arrivals()
                    .into_iter()
                    .map(|label| Journey {
                        arrival_time: label.arrival_time,
                        number_of_used_vehicles: label.number_of_trips,
                    })
                    .collect();
                assert_eq!(
                    trip_based.get_journeys(),
                    raptor_journeys,
                    "{} -> {} at {}",
                    source,
                    target,
                    departure_time
                );
            }
        }
    }
}

#[test]
fn staying_seated_dominates_the_back_and_forth_transfer() {
    // r = A -> B -> A, r' = A -> E; transferring at B back to A is useless
    // because the trip itself returns to A no later
    let mut builder = TimetableBuilder::new(3, 3);
    // A = 0, B = 1, E = 2
    builder.add_route(
        vec![StopId(0), StopId(1), StopId(0)],
        vec![vec![
            StopEvent::new(hms(8, 0, 0), hms(8, 0, 0)),
            StopEvent::new(hms(8, 10, 0), hms(8, 11, 0)),
            StopEvent::new(hms(8, 20, 0), hms(8, 20, 0)),
        ]],
    );
    builder.add_route(
        vec![StopId(0), StopId(2)],
        vec![vec![
            StopEvent::new(hms(8, 30, 0), hms(8, 30, 0)),
            StopEvent::new(hms(8, 45, 0), hms(8, 45, 0)),
        ]],
    );
    let timetable = builder.finish();
    let mut data = TripBasedData::new(timetable);
    compute_stop_event_graph(&mut data, single_thread());

    // the event at B has no outgoing transfers; the final event at A keeps
    // the transfer to r'
    let event_at_b = data.stop_event_id(TripId(0), StopIndex(1));
    let event_back_at_a = data.stop_event_id(TripId(0), StopIndex(2));
    let boarding_event = data.stop_event_id(TripId(1), StopIndex(0));
    assert_eq!(data.stop_event_graph.degree(Vertex::new(event_at_b.id())), 0);
    assert_eq!(data.stop_event_graph.degree(Vertex::new(event_back_at_a.id())), 1);
    assert_eq!(
        data.stop_event_graph.link_iter(Vertex::new(event_back_at_a.id())).next().unwrap().head,
        Vertex::new(boarding_event.id())
    );
}

#[test]
fn u_turn_transfers_are_filtered() {
    // r1: C -> B -> A, r2: A -> B -> D; alighting at A and boarding r2 only
    // to ride back over B is a U-turn
    let mut builder = TimetableBuilder::new(4, 4);
    // A = 0, B = 1, C = 2, D = 3
    builder.add_route(
        vec![StopId(2), StopId(1), StopId(0)],
        vec![vec![
            StopEvent::new(hms(8, 0, 0), hms(8, 0, 0)),
            StopEvent::new(hms(8, 5, 0), hms(8, 6, 0)),
            StopEvent::new(hms(8, 10, 0), hms(8, 10, 0)),
        ]],
    );
    builder.add_route(
        vec![StopId(0), StopId(1), StopId(3)],
        vec![vec![
            StopEvent::new(hms(8, 15, 0), hms(8, 15, 0)),
            StopEvent::new(hms(8, 20, 0), hms(8, 21, 0)),
            StopEvent::new(hms(8, 30, 0), hms(8, 30, 0)),
        ]],
    );
    let timetable = builder.finish();
    let mut data = TripBasedData::new(timetable);
    compute_stop_event_graph(&mut data, single_thread());

    // r2 via B is reached earlier by transferring at B directly
    let arrival_at_a = data.stop_event_id(TripId(0), StopIndex(2));
    let boarding_r2_at_a = data.stop_event_id(TripId(1), StopIndex(0));
    let targets: Vec<Vertex> = data
        .stop_event_graph
        .link_iter(Vertex::new(arrival_at_a.id()))
        .map(|link| link.head)
        .collect();
    assert!(
        !targets.contains(&Vertex::new(boarding_r2_at_a.id())),
        "U-turn transfer was not filtered"
    );
}

#[test]
fn reached_index_updates_are_monotonic_and_cover_later_trips() {
    let mut builder = TimetableBuilder::new(2, 2);
    builder.add_route(
        vec![StopId(0), StopId(1)],
        vec![
            vec![
                StopEvent::new(hms(8, 0, 0), hms(8, 0, 0)),
                StopEvent::new(hms(8, 10, 0), hms(8, 10, 0)),
            ],
            vec![
                StopEvent::new(hms(9, 0, 0), hms(9, 0, 0)),
                StopEvent::new(hms(9, 10, 0), hms(9, 10, 0)),
            ],
        ],
    );
    let data = TripBasedData::new(builder.finish());
    let mut reached_index = ReachedIndex::new(&data);

    assert_eq!(reached_index.index(TripId(0)), 2);
    assert_eq!(reached_index.index(TripId(1)), 2);

    // an update also bounds the later trip of the route
    reached_index.update(TripId(0), 1);
    assert_eq!(reached_index.index(TripId(0)), 1);
    assert_eq!(reached_index.index(TripId(1)), 1);

    // updates never increase
    reached_index.update(TripId(0), 2);
    assert_eq!(reached_index.index(TripId(0)), 1);

    // an update on the later trip leaves the earlier one untouched
    reached_index.update(TripId(1), 0);
    assert_eq!(reached_index.index(TripId(0)), 1);
    assert_eq!(reached_index.index(TripId(1)), 0);

    reached_index.clear();
    assert_eq!(reached_index.index(TripId(0)), 2);
}
