use log::debug;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::random::UniformSource;
use crate::store::NodeStore;
use crate::types::{Label, Mask, NodeKey, Result};
use crate::{PointSet, RCFFloat, DEFAULT_PRECISION};

use super::annotate::SubtreeAnnotator;
use super::cut::RandomCutPartitioner;
use super::node::NULL_NODE;
use super::{Branch, Leaf, Node, Tree};

/// Which child slot of its parent a new node occupies.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Side {
    Left,
    Right,
}

/// An active subset still waiting to be cut.
struct PendingSubset {
    mask: Mask,
    parent: Option<(NodeKey, Side)>,
    depth: usize,
}

/// Configures and builds [`Tree`]s.
///
/// Input rows are rounded to `precision` decimal places (9 by default) and
/// deduplicated before any cut is made. Randomness comes from a ChaCha20
/// generator, seeded from the system's entropy unless a seed is given, or
/// from a caller-supplied [`UniformSource`].
///
/// # Examples
///
/// ```
/// use rrcflib::{SequenceSource, TreeBuilder};
///
/// let points = vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 1.0]];
///
/// // the same seed always yields the same tree
/// let builder = TreeBuilder::new().precision(6).seed(17);
/// let first = builder.build(&points).unwrap();
/// let second = builder.build(&points).unwrap();
/// assert_eq!(
///     first.branches().map(|b| *b.cut()).collect::<Vec<_>>(),
///     second.branches().map(|b| *b.cut()).collect::<Vec<_>>(),
/// );
///
/// // or inject the uniform values directly
/// let mut source = SequenceSource::new(vec![0.5, 0.25, 0.5]);
/// let tree = TreeBuilder::new().build_with_source(&points, &mut source).unwrap();
/// assert_eq!(tree.mass(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    precision: u32,
    seed: Option<u64>,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        TreeBuilder {
            precision: DEFAULT_PRECISION,
            seed: None,
        }
    }
}

impl TreeBuilder {
    pub fn new() -> Self {
        TreeBuilder::default()
    }

    /// Number of decimal places input coordinates are rounded to. Rows equal
    /// within `10^-(precision + 1.5)` after rounding become one leaf.
    pub fn precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    /// Seed for the ChaCha20 generator used by [`build`](TreeBuilder::build).
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Build a tree over `rows` using the configured random number generator.
    pub fn build<T: RCFFloat>(&self, rows: &[Vec<T>]) -> Result<Tree<T>> {
        let mut rng = match self.seed {
            Some(seed) => ChaCha20Rng::seed_from_u64(seed),
            None => ChaCha20Rng::from_entropy(),
        };
        self.build_with_source(rows, &mut rng)
    }

    /// Build a tree over `rows` drawing uniform values from `source`.
    ///
    /// Fails with `InvalidInput` if the rows cannot be prepared and with
    /// `DegenerateSubset` if a subset of distinct rows cannot be cut. No
    /// tree is returned on failure.
    pub fn build_with_source<T, S>(&self, rows: &[Vec<T>], source: &mut S) -> Result<Tree<T>>
    where
        T: RCFFloat,
        S: UniformSource + ?Sized,
    {
        let point_set = PointSet::with_precision(rows, self.precision)?;
        build_from_point_set(point_set, source)
    }
}

/// Build a tree over `rows` with the default configuration, drawing uniform
/// values from `source`.
///
/// # Examples
///
/// ```
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha20Rng;
/// use rrcflib::build_tree;
///
/// let mut rng = ChaCha20Rng::seed_from_u64(0);
/// let tree = build_tree(&vec![vec![5.0, 5.0]], &mut rng).unwrap();
/// assert!(tree.root().is_leaf());
/// ```
pub fn build_tree<T, S>(rows: &[Vec<T>], source: &mut S) -> Result<Tree<T>>
where
    T: RCFFloat,
    S: UniformSource + ?Sized,
{
    TreeBuilder::new().build_with_source(rows, source)
}

/// Grow the tree over a prepared point set, then annotate masses and
/// bounding boxes.
///
/// Subsets are cut depth first, left before right, which fixes the order in
/// which uniform values are drawn. Subsets are kept on an explicit stack, so
/// degenerate inputs producing very deep trees do not exhaust the native
/// stack.
pub(crate) fn build_from_point_set<T, S>(point_set: PointSet<T>, source: &mut S) -> Result<Tree<T>>
where
    T: RCFFloat,
    S: UniformSource + ?Sized,
{
    debug!(
        "building tree over {} rows ({} unique) in {} dimensions",
        point_set.original_len(),
        point_set.len(),
        point_set.dimensions(),
    );

    let mut node_store: NodeStore<T> = NodeStore::with_capacity(2 * point_set.len() - 1);
    let mut leaves: Vec<NodeKey> = vec![NULL_NODE; point_set.original_len()];

    let root = if point_set.len() == 1 {
        let leaf = Leaf::new(0, point_set.row(0), point_set.labels_of(0).to_vec(), 0);
        let key = node_store.insert(Node::Leaf(leaf));
        register(&mut leaves, point_set.labels_of(0), key);
        key
    } else {
        let partitioner = RandomCutPartitioner::new(&point_set);
        let mut root = NULL_NODE;
        let mut stack = vec![PendingSubset {
            mask: point_set.full_mask(),
            parent: None,
            depth: 0,
        }];

        while let Some(subset) = stack.pop() {
            let partition = partitioner.partition(&subset.mask, source)?;
            let branch = Branch::new(NULL_NODE, NULL_NODE, partition.cut);
            let key = node_store.insert(Node::Branch(branch));
            match subset.parent {
                Some((parent, side)) => link(&mut node_store, parent, side, key),
                None => root = key,
            }

            let mut pending = Vec::with_capacity(2);
            for (mask, side) in [(partition.left, Side::Left), (partition.right, Side::Right)] {
                let rows = point_set.indices(&mask);
                if let &[row] = rows.as_slice() {
                    let labels = point_set.labels_of(row);
                    let leaf = Leaf::new(row, point_set.row(row), labels.to_vec(), subset.depth + 1);
                    let leaf_key = node_store.insert(Node::Leaf(leaf));
                    link(&mut node_store, key, side, leaf_key);
                    register(&mut leaves, labels, leaf_key);
                } else {
                    pending.push(PendingSubset {
                        mask,
                        parent: Some((key, side)),
                        depth: subset.depth + 1,
                    });
                }
            }
            // the left subset must be cut first
            stack.extend(pending.into_iter().rev());
        }
        root
    };
    debug_assert!(leaves.iter().all(|&key| key != NULL_NODE));

    let mut annotator = SubtreeAnnotator::new(&mut node_store, root);
    let mass = annotator.count_all_bottom_up();
    annotator.bounding_boxes_bottom_up();
    debug_assert_eq!(mass, point_set.original_len());

    let tree = Tree::from_parts(point_set, node_store, root, leaves);
    debug!(
        "built tree with {} branches, {} leaves, max depth {}",
        tree.branches().count(),
        tree.leaves().count(),
        tree.max_depth(),
    );
    Ok(tree)
}

/// Attach `child` below `parent` and point the child back at it.
fn link<T: RCFFloat>(node_store: &mut NodeStore<T>, parent: NodeKey, side: Side, child: NodeKey) {
    node_store[child].set_parent(Some(parent));
    match &mut node_store[parent] {
        Node::Branch(branch) => match side {
            Side::Left => branch.set_left(child),
            Side::Right => branch.set_right(child),
        },
        Node::Leaf(_) => panic!("Inconsistent node: parent should not be a leaf node"),
    }
}

fn register(leaves: &mut [NodeKey], labels: &[Label], key: NodeKey) {
    for &label in labels {
        leaves[label] = key;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RCFError;
    use crate::{SequenceSource, MAX_PRECISION};

    #[test]
    fn test_single_point() {
        let mut source = SequenceSource::new(vec![0.5]);
        let tree = build_tree(&vec![vec![5.0, 5.0], vec![5.0, 5.0]], &mut source).unwrap();
        assert_eq!(source.draws(), 0);
        let leaf = tree.root().to_leaf().unwrap();
        assert_eq!(leaf.depth(), 0);
        assert_eq!(leaf.mass(), 2);
        assert!(leaf.parent().is_none());
        assert_eq!(tree.mass(), 2);
    }

    #[test]
    fn test_two_points_draws() {
        let mut source = SequenceSource::new(vec![0.5]);
        let tree = build_tree(&vec![vec![0.0, 0.0, 0.0], vec![1.0, 1.0, 1.0]], &mut source).unwrap();
        // one cut: three dimension draws and one value draw
        assert_eq!(source.draws(), 4);
        assert_eq!(tree.branches().count(), 1);
        assert!(tree.leaves().all(|leaf| leaf.depth() == 1));
    }

    #[test]
    fn test_precision_validated() {
        let mut source = SequenceSource::new(vec![0.5]);
        let result = TreeBuilder::new()
            .precision(MAX_PRECISION + 1)
            .build_with_source(&vec![vec![0.0f64]], &mut source);
        assert!(matches!(result, Err(RCFError::InvalidInput { .. })));
    }

    #[test]
    fn test_coarse_precision_collapses() {
        let rows = vec![vec![0.11], vec![0.12], vec![0.5]];
        let tree = TreeBuilder::new().precision(1).seed(0).build(&rows).unwrap();
        assert_eq!(tree.leaves().count(), 2);
        assert_eq!(tree.lookup_leaf(0).unwrap().labels(), &[0, 1]);
        assert_eq!(tree.point(tree.lookup_leaf(1).unwrap()), &[0.1]);
    }

    #[test]
    fn test_rows_further_apart_than_max() {
        let rows = vec![vec![-1.0e308], vec![1.0e308]];
        for value in [0.0, 0.5] {
            let mut source = SequenceSource::new(vec![value]);
            let tree = build_tree(&rows, &mut source).unwrap();
            assert_eq!(tree.leaves().count(), 2);
            assert_eq!(tree.mass(), 2);
            assert_eq!(tree.point(tree.lookup_leaf(1).unwrap()), &[1.0e308]);
        }
    }

    #[test]
    fn test_parent_links() {
        let rows: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64, (i * i) as f64]).collect();
        let tree = TreeBuilder::new().seed(99).build(&rows).unwrap();
        assert!(tree.root().parent().is_none());
        for (key, node) in tree.node_store().iter() {
            if let Node::Branch(branch) = node {
                assert_eq!(tree.node(branch.left()).unwrap().parent(), Some(key));
                assert_eq!(tree.node(branch.right()).unwrap().parent(), Some(key));
            }
        }
    }
}
