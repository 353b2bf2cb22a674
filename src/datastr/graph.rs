//! Graph types shared by all routing algorithms.
//!
//! Identifiers are `u32` newtypes so that a `StopId` cannot silently stand in
//! for a `Vertex` or a `RouteId`. Conversions are explicit and asserted where
//! they are only valid under an invariant (stops are a dense prefix of the
//! vertex space).

pub mod dynamic_graph;
pub mod first_out_graph;

pub use self::dynamic_graph::DynamicGraph;
pub use self::first_out_graph::FirstOutGraph;

/// Edge weights and all time arithmetic are signed 32bit values.
/// Walking weights are non-negative; departure-time ranges may be negative.
pub type Weight = i32;

/// A sufficiently large infinity constant.
/// Set to `i32::MAX / 2` so that `INFINITY + x` for `x <= INFINITY` does not overflow.
pub const INFINITY: Weight = i32::MAX / 2;

/// Trait connecting the id newtypes to the dense containers
/// (`IndexedSet`, `IndexedMap`, heap positions).
pub trait Id: Copy + Eq {
    fn id(self) -> usize;
    fn from_id(id: usize) -> Self;
}

/// Declares a `u32` identifier newtype with an `INVALID` sentinel.
#[macro_export]
macro_rules! tagged_id {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        #[repr(transparent)]
        pub struct $name(pub u32);

        impl $name {
            pub const INVALID: $name = $name(u32::MAX);

            #[inline]
            pub fn new(id: usize) -> $name {
                debug_assert!(id < u32::MAX as usize);
                $name(id as u32)
            }

            #[inline]
            pub fn id(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub fn is_valid(self) -> bool {
                self != $name::INVALID
            }
        }

        impl $crate::datastr::graph::Id for $name {
            #[inline]
            fn id(self) -> usize {
                self.0 as usize
            }

            #[inline]
            fn from_id(id: usize) -> $name {
                $name::new(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                if self.is_valid() {
                    write!(f, "{}", self.0)
                } else {
                    write!(f, "-")
                }
            }
        }
    };
}

tagged_id!(
    /// A vertex of the walking graph. Stops are the dense prefix `0..num_stops`.
    Vertex
);
tagged_id!(
    /// An edge id, stable within one graph layout.
    Edge
);

/// Simple struct for weighted links.
/// No behaviour, just a pure data struct.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Link {
    pub head: Vertex,
    pub weight: Weight,
}

/// Base trait for graphs.
pub trait Graph {
    fn num_vertices(&self) -> usize;
    fn num_edges(&self) -> usize;
    fn degree(&self, vertex: Vertex) -> usize;
}

/// Trait for graph data structures which allow iterating over the outgoing links of a vertex.
pub trait LinkIterGraph: Graph {
    fn link_iter(&self, vertex: Vertex) -> impl Iterator<Item = Link> + '_;
}

/// Geographic position of a vertex, used for geo-rank query generation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[repr(C)]
pub struct Point {
    pub latitude: f32,
    pub longitude: f32,
}

impl Point {
    #[inline]
    pub fn euclidean_distance(self, other: Point) -> f32 {
        let dx = self.latitude - other.latitude;
        let dy = self.longitude - other.longitude;
        (dx * dx + dy * dy).sqrt()
    }
}

