use super::BoundingBox;
use super::Cut;
use crate::types::{Label, NodeKey};
use crate::RCFFloat;

/// Child key held by a branch between its creation and the creation of that
/// child. Never observable in a finished tree.
pub(crate) const NULL_NODE: NodeKey = usize::MAX;

/// A leaf node in a random cut tree.
///
/// A leaf represents one unique point of the tree's point set together with
/// every original row collapsed into it. Its mass is the number of those
/// rows, its depth the number of [`Branch`] nodes above it, and its bounding
/// box degenerates to the point itself.
///
/// # Examples
///
/// ```
/// use rrcflib::Leaf;
///
/// // unique row 3 stands for original rows 3 and 8
/// let leaf = Leaf::new(3, &[1.0, 2.0], vec![3, 8], 2);
/// assert_eq!(leaf.point(), 3);
/// assert_eq!(leaf.labels(), &[3, 8]);
/// assert_eq!(leaf.mass(), 2);
/// assert_eq!(leaf.depth(), 2);
/// assert!(leaf.parent().is_none());
/// assert_eq!(leaf.bounding_box().min_values(), &[1.0, 2.0]);
/// ```
#[derive(Debug, Clone)]
pub struct Leaf<T> {
    parent: Option<NodeKey>,
    point: usize,
    labels: Vec<Label>,
    mass: usize,
    depth: usize,
    bounding_box: BoundingBox<T>,
}

impl<T: RCFFloat> Leaf<T> {

    /// Create a new leaf node for unique row `point` with coordinates
    /// `values`. The mass is the number of collapsed labels and the parent is
    /// initialized to `None`.
    pub fn new(point: usize, values: &[T], labels: Vec<Label>, depth: usize) -> Self {
        Leaf {
            parent: None,
            point,
            mass: labels.len(),
            labels,
            depth,
            bounding_box: BoundingBox::new_from_point(values),
        }
    }

    /// Returns the key of the parent [`Branch`] node.
    pub fn parent(&self) -> Option<NodeKey> { self.parent }

    /// Returns the index of the unique row represented by this leaf.
    pub fn point(&self) -> usize { self.point }

    /// Returns the original labels collapsed into this leaf, ascending.
    pub fn labels(&self) -> &[Label] { &self.labels }

    /// Returns the mass of this leaf: its number of duplicate rows.
    pub fn mass(&self) -> usize { self.mass }

    /// Returns the number of branches above this leaf.
    pub fn depth(&self) -> usize { self.depth }

    pub fn bounding_box(&self) -> &BoundingBox<T> { &self.bounding_box }
}

/// A branch node in a random cut tree.
///
/// Branches hold the keys of their left and right children, which must
/// exist, and the cut separating them. Points with a component along the cut
/// dimension less than or equal to the cut value live below the left child.
/// A branch also carries the total mass and the bounding box of its subtree;
/// both are derived from the children once the tree is complete.
///
/// # Examples
///
/// ```
/// use rrcflib::{Branch, Cut};
///
/// let branch: Branch<f64> = Branch::new(4, 7, Cut::new(0, 0.5));
/// assert_eq!(branch.left(), 4);
/// assert_eq!(branch.right(), 7);
/// assert_eq!(branch.cut().dimension(), 0);
/// assert!(branch.parent().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Branch<T> {
    parent: Option<NodeKey>,
    left: NodeKey,
    right: NodeKey,
    mass: usize,
    bounding_box: Option<BoundingBox<T>>,
    cut: Cut<T>,
}

impl<T: RCFFloat> Branch<T> {

    /// Create a new branch node.
    ///
    /// The mass is initialized to `0` and the bounding box is left unset
    /// until the subtree is annotated. The parent is initialized to `None`.
    pub fn new(left: NodeKey, right: NodeKey, cut: Cut<T>) -> Self {
        Branch {
            parent: None,
            left,
            right,
            mass: 0,
            bounding_box: None,
            cut,
        }
    }

    /// Returns the key of the parent [`Branch`] node.
    pub fn parent(&self) -> Option<NodeKey> { self.parent }

    /// Returns the node key of the left child.
    pub fn left(&self) -> NodeKey { self.left }

    pub(crate) fn set_left(&mut self, left: NodeKey) { self.left = left }

    /// Returns the node key of the right child.
    pub fn right(&self) -> NodeKey { self.right }

    pub(crate) fn set_right(&mut self, right: NodeKey) { self.right = right }

    /// Returns a reference to this node's random cut.
    pub fn cut(&self) -> &Cut<T> { &self.cut }

    /// Returns the total mass of the leaves below this branch.
    pub fn mass(&self) -> usize { self.mass }

    pub(crate) fn set_mass(&mut self, mass: usize) { self.mass = mass }

    /// Returns the bounding box of the points below this branch.
    ///
    /// # Panics
    ///
    /// If called on a branch that was never annotated. Branches reachable
    /// from a [`Tree`](crate::Tree) are always annotated.
    pub fn bounding_box(&self) -> &BoundingBox<T> {
        match &self.bounding_box {
            Some(bounding_box) => bounding_box,
            None => panic!("Inconsistent node: branch bounding box was never computed"),
        }
    }

    pub(crate) fn set_bounding_box(&mut self, bounding_box: BoundingBox<T>) {
        self.bounding_box = Some(bounding_box)
    }

    /// Returns the key of the child on the side of `point` relative to the
    /// cut.
    pub fn child_towards(&self, point: &[T]) -> NodeKey {
        if Cut::is_left_of(point, &self.cut) {
            self.left
        } else {
            self.right
        }
    }
}

/// An enum type representing either a [`Branch`] node or a [`Leaf`] node.
///
/// Nodes stored in a random cut tree are all of type `Node`. The methods
/// defined for this enum type are mainly for convenience in working
/// agnostically with either leaves or branches.
#[derive(Debug, Clone)]
pub enum Node<T> {
    Leaf(Leaf<T>),
    Branch(Branch<T>),
}

impl<T: RCFFloat> Node<T> {

    /// Returns the key of the parent [`Branch`] node.
    pub fn parent(&self) -> Option<NodeKey> {
        match self {
            Node::Leaf(n) => n.parent,
            Node::Branch(n) => n.parent,
        }
    }

    /// Set the parent node by node key.
    pub(crate) fn set_parent(&mut self, parent: Option<NodeKey>) {
        match self {
            Node::Leaf(n) => n.parent = parent,
            Node::Branch(n) => n.parent = parent,
        }
    }

    /// Returns the mass of this node.
    pub fn mass(&self) -> usize {
        match self {
            Node::Leaf(n) => n.mass,
            Node::Branch(n) => n.mass,
        }
    }

    /// Returns the bounding box of this node.
    pub fn bounding_box(&self) -> &BoundingBox<T> {
        match self {
            Node::Leaf(n) => n.bounding_box(),
            Node::Branch(n) => n.bounding_box(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    /// Get a reference to the leaf represented by this node, if it is one.
    pub fn to_leaf(&self) -> Option<&Leaf<T>> {
        match self {
            Node::Leaf(n) => Some(n),
            Node::Branch(_) => None,
        }
    }

    /// Get a reference to the branch represented by this node, if it is one.
    pub fn to_branch(&self) -> Option<&Branch<T>> {
        match self {
            Node::Leaf(_) => None,
            Node::Branch(n) => Some(n),
        }
    }
}
