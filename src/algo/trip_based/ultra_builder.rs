//! Parallel driver converting a timetable with unlimited walking into the
//! ULTRA stop-event transfer graph: one event search per station, merged and
//! deduplicated like the stop-to-stop builder.

use super::event_shortcut_search::{EventShortcutSearch, EventShortcutSearchConfig};
use super::{event_shortcuts_to_graph, EventShortcut};
use crate::algo::raptor::builder::{thread_pool, ParallelConfig};
use crate::algo::raptor::Stations;
use crate::datastr::graph::*;
use crate::datastr::timetable::*;
use crate::datastr::trip_based::TripBasedData;
use crate::report::Timer;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Computes event-to-event shortcuts and installs the resulting stop-event
/// graph in `data`. Returns the deduplicated shortcut set.
pub fn compute_event_to_event_shortcuts(
    data: &mut TripBasedData,
    search_config: EventShortcutSearchConfig,
    parallel: ParallelConfig,
    min_departure_time: Weight,
    max_departure_time: Weight,
) -> Vec<EventShortcut> {
    eprintln!("computing event-to-event shortcuts with {} threads", parallel.num_threads);
    let timer = Timer::new();
    let stations = Stations::compute(&data.timetable);

    let shortcuts = Mutex::new(Vec::new());
    let next_source = AtomicUsize::new(0);
    let num_stops = data.timetable.num_stops();
    let shared: &TripBasedData = data;

    let pool = thread_pool(parallel);
    pool.scope(|scope| {
        for _ in 0..parallel.num_threads {
            scope.spawn(|_| {
                let mut search = EventShortcutSearch::new(shared, &stations, search_config);
                loop {
                    let source = next_source.fetch_add(1, Ordering::Relaxed);
                    if source >= num_stops {
                        break;
                    }
                    search.run(StopId::new(source), min_departure_time, max_departure_time);
                }
                shortcuts.lock().unwrap().append(&mut search.take_shortcuts());
            });
        }
    });

    let shortcuts = shortcuts.into_inner().unwrap();
    eprintln!("found {} event shortcuts in {}ms", shortcuts.len(), timer.get_passed_ms());
    if shortcuts.is_empty() {
        eprintln!("warning: the event shortcut set is empty");
    }
    let (shortcuts, graph) = event_shortcuts_to_graph(shortcuts, data.num_stop_events());
    data.stop_event_graph = graph;
    shortcuts
}
