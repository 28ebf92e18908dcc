use crate::errors::RCFError;
use crate::store::NodeStore;
use crate::types::{Label, NodeKey, Result};
use crate::util::check_argument;
use crate::{PointSet, RCFFloat};

use super::annotate::post_order;
use super::{BoundingBox, Branch, Leaf, Node};

/// Robust random cut tree over a static point set.
///
/// A random cut tree contains leaf nodes and branch nodes, all living in a
/// [`NodeStore`] and addressed by key. [`Leaf`] nodes represent the unique
/// points of the tree's [`PointSet`]; [`Branch`] nodes hold a random
/// [`Cut`](crate::Cut) together with the mass and the
/// [`BoundingBox`](crate::BoundingBox) of everything below them. Children are
/// owned through the store and refer back to their parent by key only.
///
/// Every original row label is registered against the leaf holding its
/// point, so duplicate rows share one leaf.
///
/// Trees are produced by [`TreeBuilder`](crate::TreeBuilder) and are
/// read-only afterwards.
///
/// # Examples
///
/// ```
/// use rrcflib::{Node, TreeBuilder};
///
/// let points = vec![vec![0.0, 0.0], vec![0.0, 0.0], vec![1.0, 1.0]];
/// let tree = TreeBuilder::new().seed(7).build(&points).unwrap();
///
/// // the duplicated rows share a leaf with mass two
/// let leaf = tree.lookup_leaf(0).unwrap();
/// assert_eq!(leaf.mass(), 2);
/// assert_eq!(leaf.labels(), &[0, 1]);
/// assert_eq!(tree.leaf_key(1), tree.leaf_key(0));
///
/// // the root spans everything
/// assert_eq!(tree.mass(), 3);
/// assert_eq!(tree.root().bounding_box().max_values(), &[1.0, 1.0]);
/// assert!(matches!(tree.root(), Node::Branch(_)));
/// ```
#[derive(Debug, Clone)]
pub struct Tree<T> {
    point_set: PointSet<T>,
    node_store: NodeStore<T>,
    root_node: NodeKey,
    leaves: Vec<NodeKey>,
}

impl<T: RCFFloat> Tree<T> {

    pub(crate) fn from_parts(
        point_set: PointSet<T>,
        node_store: NodeStore<T>,
        root_node: NodeKey,
        leaves: Vec<NodeKey>,
    ) -> Self {
        Tree {
            point_set,
            node_store,
            root_node,
            leaves,
        }
    }

    #[inline(always)]
    pub fn root_key(&self) -> NodeKey { self.root_node }

    /// Returns the root node: a [`Branch`], or a [`Leaf`] when the tree
    /// holds a single unique point.
    #[inline(always)]
    pub fn root(&self) -> &Node<T> { &self.node_store[self.root_node] }

    #[inline(always)]
    pub fn node_store(&self) -> &NodeStore<T> { &self.node_store }

    #[inline(always)]
    pub fn point_set(&self) -> &PointSet<T> { &self.point_set }

    /// Returns the node stored under `key`, if any.
    pub fn node(&self, key: NodeKey) -> Option<&Node<T>> {
        self.node_store.get(key)
    }

    /// Returns the bounding box of the node stored under `key`, if any.
    pub fn bounding_box(&self, key: NodeKey) -> Option<&BoundingBox<T>> {
        self.node(key).map(|node| node.bounding_box())
    }

    /// Returns the dimensionality of the points in the tree.
    pub fn dimensions(&self) -> usize { self.point_set.dimensions() }

    /// Returns the mass of the tree, which equals the number of original
    /// rows the tree was built from.
    pub fn mass(&self) -> usize { self.root().mass() }

    /// Returns the number of original row labels registered in the tree.
    pub fn num_labels(&self) -> usize { self.leaves.len() }

    /// Returns the key of the leaf holding the data of original row `label`.
    pub fn leaf_key(&self, label: Label) -> Result<NodeKey> {
        self.leaves
            .get(label)
            .copied()
            .ok_or(RCFError::LookupMiss { label })
    }

    /// Returns the leaf holding the data of original row `label`.
    ///
    /// Duplicate rows share a leaf, so several labels may return the same
    /// leaf. Fails with `LookupMiss` for labels outside the original input.
    pub fn lookup_leaf(&self, label: Label) -> Result<&Leaf<T>> {
        let key = self.leaf_key(label)?;
        match &self.node_store[key] {
            Node::Leaf(leaf) => Ok(leaf),
            Node::Branch(_) => panic!("Inconsistent node: label registered against a branch"),
        }
    }

    /// Returns the coordinates of the point represented by a leaf.
    pub fn point(&self, leaf: &Leaf<T>) -> &[T] {
        self.point_set.row(leaf.point())
    }

    /// Iterates over the distinct leaves of the tree, left to right.
    pub fn leaves(&self) -> impl Iterator<Item = &Leaf<T>> + '_ {
        post_order(&self.node_store, self.root_node)
            .into_iter()
            .filter_map(move |key| self.node_store[key].to_leaf())
    }

    /// Iterates over the branches of the tree, children before parents.
    pub fn branches(&self) -> impl Iterator<Item = &Branch<T>> + '_ {
        post_order(&self.node_store, self.root_node)
            .into_iter()
            .filter_map(move |key| self.node_store[key].to_branch())
    }

    /// Returns the depth of the deepest leaf.
    pub fn max_depth(&self) -> usize {
        self.leaves().map(|leaf| leaf.depth()).max().unwrap_or(0)
    }

    /// Returns an iterator on the nodes from the root down to a leaf,
    /// following the cut at each branch.
    ///
    /// See [`NodeTraverser`] for more information.
    pub fn traverse<'a>(&'a self, point: &'a [T]) -> NodeTraverser<'a, T> {
        NodeTraverser::new(self, point)
    }

    /// Returns the leaf reached by following the cuts from the root for the
    /// given point. This is the leaf nearest to the point relative to the
    /// random cuts chosen in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use rrcflib::TreeBuilder;
    ///
    /// let points = vec![vec![0.0], vec![10.0], vec![20.0]];
    /// let tree = TreeBuilder::new().seed(3).build(&points).unwrap();
    ///
    /// let leaf = tree.query(&[10.0]).unwrap();
    /// assert_eq!(tree.point(leaf), &[10.0]);
    /// ```
    pub fn query(&self, point: &[T]) -> Result<&Leaf<T>> {
        check_argument(point.len() == self.dimensions(), "query point has the wrong dimension")?;
        let mut key = self.root_node;
        loop {
            match &self.node_store[key] {
                Node::Leaf(leaf) => return Ok(leaf),
                Node::Branch(branch) => key = branch.child_towards(point),
            }
        }
    }

    /// Returns the leaf holding `point`, if the tree contains it.
    ///
    /// The point is rounded the same way the input rows were, so it matches
    /// whenever it would have been collapsed with one of them.
    pub fn find_duplicate(&self, point: &[T]) -> Result<Option<&Leaf<T>>> {
        let rounded = self.point_set.round_row(point);
        let leaf = self.query(&rounded)?;
        if self.point_set.rows_equal(self.point(leaf), &rounded) {
            Ok(Some(leaf))
        } else {
            Ok(None)
        }
    }
}

/// A type for traversing nodes from root to the nearest leaf.
///
/// Given an input data point/vector, this type traces the path from the root
/// node of a tree to the leaf node whose cell contains the input, going left
/// at a branch when the point's component along the cut dimension is at most
/// the cut value. Returned by [`Tree::traverse`].
pub struct NodeTraverser<'a, T> {
    tree: &'a Tree<T>,
    point: &'a [T],
    current_node_key: Option<NodeKey>,
}

impl<'a, T: RCFFloat> NodeTraverser<'a, T> {

    /// Create a new node traverser from a tree and a query point.
    pub fn new(tree: &'a Tree<T>, point: &'a [T]) -> Self {
        NodeTraverser {
            tree,
            point,
            current_node_key: Some(tree.root_key()),
        }
    }
}

impl<'a, T: RCFFloat> Iterator for NodeTraverser<'a, T> {
    type Item = &'a Node<T>;

    fn next(&mut self) -> Option<&'a Node<T>> {
        let node = self.tree.node(self.current_node_key?)?;
        self.current_node_key = match node {
            Node::Leaf(_) => None,
            Node::Branch(branch) => Some(branch.child_towards(self.point)),
        };
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    use super::*;
    use crate::TreeBuilder;

    fn generate_random_uniform(dimension: usize, num_points: usize, seed: u64) -> Vec<Vec<f32>> {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        (0..num_points)
            .map(|_| (0..dimension).map(|_| rng.gen::<f32>()).collect())
            .collect()
    }

    #[test]
    fn test_traversal() {
        let points = generate_random_uniform(4, 32, 11);
        let tree = TreeBuilder::new().seed(0).build(&points).unwrap();

        // every point in the tree is found again by following the cuts
        for (label, point) in points.iter().enumerate() {
            let nodes: Vec<&Node<f32>> = tree.traverse(point).collect();
            assert!(nodes.len() >= 2);
            let leaf = nodes.last().and_then(|n| n.to_leaf()).unwrap();
            assert_eq!(leaf.depth(), nodes.len() - 1);
            assert!(leaf.labels().contains(&label));
            assert_eq!(tree.query(point).unwrap().point(), leaf.point());
        }
    }

    #[test]
    fn test_lookup_miss() {
        let points = generate_random_uniform(2, 5, 1);
        let tree = TreeBuilder::new().seed(0).build(&points).unwrap();
        assert_eq!(tree.num_labels(), 5);
        assert!(tree.lookup_leaf(4).is_ok());
        assert_eq!(tree.lookup_leaf(5).err(), Some(RCFError::LookupMiss { label: 5 }));
        assert_eq!(tree.leaf_key(usize::MAX), Err(RCFError::LookupMiss { label: usize::MAX }));
    }

    #[test]
    fn test_query_dimension_mismatch() {
        let points = generate_random_uniform(3, 5, 2);
        let tree = TreeBuilder::new().seed(0).build(&points).unwrap();
        assert!(matches!(tree.query(&[0.5, 0.5]), Err(RCFError::InvalidInput { .. })));
    }

    #[test]
    fn test_find_duplicate() {
        let points = vec![vec![0.1, 0.2], vec![0.3, 0.4], vec![0.5, 0.6]];
        let tree = TreeBuilder::new().seed(5).build(&points).unwrap();

        let leaf = tree.find_duplicate(&[0.3 + 1.0e-12, 0.4]).unwrap().unwrap();
        assert_eq!(leaf.labels(), &[1]);
        assert!(tree.find_duplicate(&[0.3, 0.41]).unwrap().is_none());
    }

    #[test]
    fn test_bounding_box_by_key() {
        let points = vec![vec![0.0, 3.0], vec![2.0, 1.0], vec![4.0, 2.0]];
        let tree = TreeBuilder::new().seed(2).build(&points).unwrap();

        let root = tree.bounding_box(tree.root_key()).unwrap();
        assert_eq!(root.min_values(), &[0.0, 1.0]);
        assert_eq!(root.max_values(), &[4.0, 3.0]);

        let key = tree.leaf_key(1).unwrap();
        assert_eq!(tree.bounding_box(key).unwrap().min_values(), &[2.0, 1.0]);
        assert!(tree.bounding_box(usize::MAX).is_none());
    }

    #[test]
    fn test_leaves_and_branches() {
        let points = generate_random_uniform(3, 40, 9);
        let tree = TreeBuilder::new().seed(1).build(&points).unwrap();
        assert_eq!(tree.leaves().count(), 40);
        assert_eq!(tree.branches().count(), 39);
        assert_eq!(tree.node_store().len(), 79);
        assert!(tree.max_depth() >= 6);
        assert!(tree.max_depth() <= 39);
    }
}
