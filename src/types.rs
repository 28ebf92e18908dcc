use crate::errors::RCFError;

pub type Result<T> = std::result::Result<T, RCFError>;

/// Position of a row in the caller's original input, preserved through
/// deduplication.
pub type Label = usize;

/// Key of a node inside a tree's node store.
pub type NodeKey = usize;

/// Selection of unique rows still under consideration. One entry per unique
/// row of a [`PointSet`](crate::PointSet).
pub type Mask = Vec<bool>;
