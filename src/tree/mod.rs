//! Submodule containing types and components of a random cut tree.
//!
mod bounding_box;
pub use bounding_box::BoundingBox;

mod cut;
pub use cut::{Cut, Partition, RandomCutPartitioner};

mod node;
pub use node::{Branch, Leaf, Node};

mod annotate;

mod builder;
pub use builder::{build_tree, TreeBuilder};

#[allow(clippy::module_inception)]
mod tree;
pub use tree::{NodeTraverser, Tree};
