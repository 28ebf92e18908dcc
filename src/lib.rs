//! A Rust implementation of robust random cut trees over static point sets.
//!
//! A robust random cut tree partitions a fixed set of *d*-dimensional points
//! by recursively choosing a random cut dimension, weighted by each
//! dimension's range over the active points, and a uniform cut value inside
//! that range. Cutting continues until every leaf holds a single unique
//! point. Repeated input rows are collapsed into one leaf whose mass counts
//! the duplicates. Once built, every internal node knows the total mass and
//! the bounding box of its subtree, which is what displacement-based anomaly
//! scores are computed from.
//!
//! ```
//! use rrcflib::TreeBuilder;
//!
//! let points = vec![
//!     vec![0.0, 0.0],
//!     vec![0.0, 1.0],
//!     vec![1.0, 0.0],
//!     vec![1.0, 1.0],
//! ];
//!
//! // build a tree from a seeded random number generator
//! let tree = TreeBuilder::new().seed(42).build(&points).unwrap();
//! assert_eq!(tree.mass(), 4);
//!
//! // every original row is registered against the leaf holding its point
//! let leaf = tree.lookup_leaf(2).unwrap();
//! assert_eq!(tree.point(leaf), &[1.0, 0.0]);
//! ```
//!
//! ### References
//!
//! Sudipto Guha, Nina Mishra, Gourav Roy, and Okke Schrijvers. *"Robust random
//! cut forest based anomaly detection on streams."* International Conference
//! on Machine Learning, pp. 2712-2721. PMLR, 2016.

use std::fmt::Debug;
use std::iter::Sum;

use num::Float;

pub mod errors;
pub use errors::RCFError;

pub mod types;
pub use types::{Label, Mask, NodeKey, Result};

mod util;

mod random;
pub use random::{SequenceSource, UniformSource};

mod pointset;
pub use pointset::{PointSet, DEFAULT_PRECISION, MAX_PRECISION};

mod store;
pub use store::NodeStore;

pub mod tree;
pub use tree::{build_tree, BoundingBox, Branch, Cut, Leaf, Node, NodeTraverser, Tree, TreeBuilder};

/// Numeric types that can be used as point coordinates.
pub trait RCFFloat: Float + Sum + Debug + Send + Sync + 'static {}

impl RCFFloat for f32 {}
impl RCFFloat for f64 {}
