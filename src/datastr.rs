//! Data structures shared by the preprocessing and query algorithms.

pub mod graph;
pub mod index_heap;
pub mod indexed_map;
pub mod indexed_set;
pub mod timestamped_vector;
pub mod timetable;
pub mod trip_based;
