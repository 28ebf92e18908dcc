use crate::store::NodeStore;
use crate::types::NodeKey;
use crate::RCFFloat;

use super::{BoundingBox, Node};

/// Bottom-up passes deriving branch data from a finished tree.
///
/// Once every branch has both children linked, the mass and bounding box of
/// each branch follow from those of its children. The two passes are
/// independent: neither reads what the other writes, so they can run in
/// either order. Each pass visits every node exactly once, children before
/// parents, using an explicit stack so that deep trees cannot exhaust the
/// native stack.
pub(crate) struct SubtreeAnnotator<'a, T> {
    node_store: &'a mut NodeStore<T>,
    root: NodeKey,
}

impl<'a, T: RCFFloat> SubtreeAnnotator<'a, T> {
    pub fn new(node_store: &'a mut NodeStore<T>, root: NodeKey) -> Self {
        SubtreeAnnotator { node_store, root }
    }

    /// Set the mass of every branch to the sum of its children's masses.
    /// A leaf's mass is its duplicate count. Returns the root's mass.
    pub fn count_all_bottom_up(&mut self) -> usize {
        for key in post_order(self.node_store, self.root) {
            let (left, right) = match &self.node_store[key] {
                Node::Branch(branch) => (branch.left(), branch.right()),
                Node::Leaf(_) => continue,
            };
            let mass = self.node_store[left].mass() + self.node_store[right].mass();
            if let Node::Branch(branch) = &mut self.node_store[key] {
                branch.set_mass(mass);
            }
        }
        self.node_store[self.root].mass()
    }

    /// Set the bounding box of every branch to the union of its children's
    /// bounding boxes. Leaf boxes are fixed at creation and left untouched.
    pub fn bounding_boxes_bottom_up(&mut self) {
        for key in post_order(self.node_store, self.root) {
            let (left, right) = match &self.node_store[key] {
                Node::Branch(branch) => (branch.left(), branch.right()),
                Node::Leaf(_) => continue,
            };
            let merged = BoundingBox::merged_box_with_box(
                self.node_store[left].bounding_box(),
                self.node_store[right].bounding_box(),
            );
            if let Node::Branch(branch) = &mut self.node_store[key] {
                branch.set_bounding_box(merged);
            }
        }
    }
}

/// Returns the keys below `root` such that every node comes after both of its
/// children. Left subtrees precede right subtrees.
pub(crate) fn post_order<T: RCFFloat>(node_store: &NodeStore<T>, root: NodeKey) -> Vec<NodeKey> {
    let mut order = Vec::with_capacity(node_store.len());
    let mut stack = vec![(root, false)];
    while let Some((key, expanded)) = stack.pop() {
        match &node_store[key] {
            Node::Branch(branch) if !expanded => {
                stack.push((key, true));
                stack.push((branch.right(), false));
                stack.push((branch.left(), false));
            }
            _ => order.push(key),
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Branch, Cut, Leaf};

    /// Builds the tree
    ///
    /// ```text
    ///        b0
    ///       /  \
    ///     b1    c=[5,5] x3
    ///    /  \
    ///   a    b
    /// ```
    fn small_store() -> (NodeStore<f64>, NodeKey) {
        let mut store = NodeStore::new();
        let a = store.insert(Node::Leaf(Leaf::new(0, &[0.0, 1.0], vec![0], 2)));
        let b = store.insert(Node::Leaf(Leaf::new(1, &[2.0, -1.0], vec![1, 4], 2)));
        let c = store.insert(Node::Leaf(Leaf::new(2, &[5.0, 5.0], vec![2, 3, 5], 1)));
        let b1 = store.insert(Node::Branch(Branch::new(a, b, Cut::new(0, 1.0))));
        let b0 = store.insert(Node::Branch(Branch::new(b1, c, Cut::new(0, 3.0))));
        (store, b0)
    }

    #[test]
    fn test_post_order() {
        let (store, root) = small_store();
        assert_eq!(post_order(&store, root), vec![0, 1, 3, 2, 4]);
    }

    #[test]
    fn test_count_all_bottom_up() {
        let (mut store, root) = small_store();
        let mass = SubtreeAnnotator::new(&mut store, root).count_all_bottom_up();
        assert_eq!(mass, 6);
        assert_eq!(store[3].mass(), 3);
        assert_eq!(store[4].mass(), 6);
    }

    #[test]
    fn test_bounding_boxes_bottom_up() {
        let (mut store, root) = small_store();
        SubtreeAnnotator::new(&mut store, root).bounding_boxes_bottom_up();
        assert_eq!(store[3].bounding_box().min_values(), &[0.0, -1.0]);
        assert_eq!(store[3].bounding_box().max_values(), &[2.0, 1.0]);
        assert_eq!(store[4].bounding_box().min_values(), &[0.0, -1.0]);
        assert_eq!(store[4].bounding_box().max_values(), &[5.0, 5.0]);
        assert!(store[4].bounding_box().contains_box(store[3].bounding_box()));
    }

    #[test]
    fn test_single_leaf() {
        let mut store: NodeStore<f64> = NodeStore::new();
        let root = store.insert(Node::Leaf(Leaf::new(0, &[5.0, 5.0], vec![0], 0)));
        let mut annotator = SubtreeAnnotator::new(&mut store, root);
        assert_eq!(annotator.count_all_bottom_up(), 1);
        annotator.bounding_boxes_bottom_up();
        assert_eq!(post_order(&store, root), vec![root]);
    }
}
