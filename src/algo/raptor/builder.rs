//! Parallel driver for the stop-to-stop shortcut computation.
//!
//! One `ShortcutSearch` instance per worker thread, dynamic work distribution
//! over the source stops, merge of the worker-local shortcut vectors under a
//! mutex. The emitted set is a function of the input only; ordering across
//! threads is unobservable because the result is sorted and deduplicated.

use super::shortcut_search::{ShortcutSearch, ShortcutSearchConfig};
use super::{shortcuts_to_transfer_graph, Shortcut, Stations};
use crate::datastr::graph::*;
use crate::datastr::timetable::*;
use crate::report::Timer;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy)]
pub struct ParallelConfig {
    pub num_threads: usize,
    /// Pin worker k to core (k * pin_multiplier) % num_cores; advisory only.
    pub pin_multiplier: usize,
}

impl Default for ParallelConfig {
    fn default() -> ParallelConfig {
        ParallelConfig {
            num_threads: std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
            pin_multiplier: 1,
        }
    }
}

pub fn thread_pool(config: ParallelConfig) -> rayon::ThreadPool {
    let pin_multiplier = config.pin_multiplier;
    rayon::ThreadPoolBuilder::new()
        .num_threads(config.num_threads)
        .start_handler(move |thread_index| {
            if let Some(cores) = core_affinity::get_core_ids() {
                core_affinity::set_for_current(cores[(thread_index * pin_multiplier) % cores.len()]);
            }
        })
        .build()
        .expect("could not build the preprocessing thread pool")
}

/// Computes the stop-to-stop shortcuts of `data` and returns the deduplicated
/// set together with the resulting transfer graph over the stops.
pub fn compute_stop_to_stop_shortcuts(
    data: &Timetable,
    search_config: ShortcutSearchConfig,
    parallel: ParallelConfig,
    min_departure_time: Weight,
    max_departure_time: Weight,
) -> (Vec<Shortcut>, FirstOutGraph) {
    eprintln!("computing stop-to-stop shortcuts with {} threads", parallel.num_threads);
    let timer = Timer::new();
    let stations = Stations::compute(data);

    let shortcuts = Mutex::new(Vec::new());
    let next_source = AtomicUsize::new(0);
    let num_stops = data.num_stops();

    let pool = thread_pool(parallel);
    pool.scope(|scope| {
        for _ in 0..parallel.num_threads {
            scope.spawn(|_| {
                let mut search = ShortcutSearch::new(data, &stations, search_config);
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
    eprintln!("found {} shortcuts in {}ms", shortcuts.len(), timer.get_passed_ms());
    if shortcuts.is_empty() {
        eprintln!("warning: the shortcut set is empty");
    }
    shortcuts_to_transfer_graph(shortcuts, data.num_stops())
}
