//! Trip-Based transit routing: stop-event preprocessing (exhaustive and
//! ULTRA-based) and the query engine with reached-index dominance.

use crate::datastr::graph::*;
use crate::datastr::timetable::*;

pub mod event_shortcut_search;
pub mod query;
pub mod reached_index;
pub mod stop_event_graph;
pub mod ultra_builder;

pub use event_shortcut_search::{EventShortcutSearch, EventShortcutSearchConfig};
pub use query::{Journey, TripBasedQuery};
pub use reached_index::ReachedIndex;
pub use stop_event_graph::compute_stop_event_graph;
pub use ultra_builder::compute_event_to_event_shortcuts;

/// An event-to-event transfer shortcut, deduplicated by (origin, destination).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventShortcut {
    pub origin: StopEventId,
    pub destination: StopEventId,
    pub walking_distance: Weight,
}

/// Sorts, deduplicates and freezes event shortcuts into the stop-event graph.
pub fn event_shortcuts_to_graph(mut shortcuts: Vec<EventShortcut>, num_stop_events: usize) -> (Vec<EventShortcut>, FirstOutGraph) {
    shortcuts.sort_by_key(|shortcut| (shortcut.origin, shortcut.destination));
    shortcuts.dedup_by_key(|shortcut| (shortcut.origin, shortcut.destination));
    let mut adjacency: Vec<Vec<Link>> = vec![Vec::new(); num_stop_events];
    for shortcut in &shortcuts {
        adjacency[shortcut.origin.id()].push(Link {
            head: Vertex::new(shortcut.destination.id()),
            weight: shortcut.walking_distance,
        });
    }
    (shortcuts, FirstOutGraph::from_adjacency_lists(adjacency))
}
