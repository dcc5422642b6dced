//! Path evaluation.
//!
//! - [`Path`] / [`Paths`]: accumulation of certifications under depth,
//!   amount, and cycle rules.
//! - [`Query`]: the trust search from a set of [`Roots`].
//! - [`WeightedGraph`] / [`ShortestPaths`]: plain Dijkstra over any
//!   graph whose weights implement [`Cost`].

pub mod path;
pub mod paths;
pub mod roots;
pub mod search;
pub mod shortest_path;

mod priority_queue;
mod residual;

pub use path::{NetworkMode, Path};
pub use paths::{PathItem, Paths};
pub use roots::{Root, Roots};
pub use search::{Query, TrustCost};
pub use shortest_path::{Cost, Edge, ShortestPaths, WeightedGraph};
