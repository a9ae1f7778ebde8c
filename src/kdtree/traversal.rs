//! Utilities to traverse the KDTree structure.

use crate::kdtree::KDTreeIndex;
use crate::r#type::IndexableNum;
use std::marker::PhantomData;

/// A node in the KDTree.
#[derive(Debug, Clone)]
pub struct Node<'a, N: IndexableNum, T: KDTreeIndex<N>> {
    /// The tree that this node is a reference onto
    tree: &'a T,

    /// Insertion index of the point held by this node
    id: u32,

    /// Distance from the root; the root has depth 0
    depth: usize,

    phantom: PhantomData<N>,
}

impl<'a, N: IndexableNum, T: KDTreeIndex<N>> Node<'a, N, T> {
    pub(crate) fn from_root(tree: &'a T) -> Option<Self> {
        tree.root_index().map(|id| Self::new(tree, id, 0))
    }

    fn new(tree: &'a T, id: u32, depth: usize) -> Self {
        Self {
            tree,
            id,
            depth,
            phantom: PhantomData,
        }
    }

    /// The insertion index of this node's point.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// The depth of this node. The root has depth 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The axis this node splits its children on.
    pub fn axis(&self) -> usize {
        self.depth % self.tree.dims()
    }

    /// The point held by this node.
    pub fn point(&self) -> &'a [N] {
        let dims = self.tree.dims();
        let start = self.id as usize * dims;
        &self.tree.coords()[start..start + dims]
    }

    /// The coordinate of this node's point on its split axis.
    pub fn split_value(&self) -> N {
        self.point()[self.axis()]
    }

    /// The child holding points strictly less than [`split_value`][Self::split_value] on this
    /// node's axis.
    pub fn left_child(&self) -> Option<Node<'a, N, T>> {
        self.tree.links()[self.id as usize]
            .left
            .map(|id| Self::new(self.tree, id, self.depth + 1))
    }

    /// The child holding points greater than or equal to [`split_value`][Self::split_value] on
    /// this node's axis.
    pub fn right_child(&self) -> Option<Node<'a, N, T>> {
        self.tree.links()[self.id as usize]
            .right
            .map(|id| Self::new(self.tree, id, self.depth + 1))
    }

    /// Returns `true` if this is a leaf node without children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        let links = &self.tree.links()[self.id as usize];
        links.left.is_none() && links.right.is_none()
    }

    /// Returns `true` if this is an intermediate node with children.
    #[inline]
    pub fn is_parent(&self) -> bool {
        !self.is_leaf()
    }
}

#[cfg(test)]
mod test {
    use crate::kdtree::{KDTree, KDTreeIndex};

    #[test]
    fn walks_children() {
        let mut tree = KDTree::<f64>::new(2).unwrap();
        tree.build([[0., 0.], [1., 1.], [2., 2.]]).unwrap();

        let root = tree.root().unwrap();
        assert_eq!(root.id(), 1);
        assert_eq!(root.depth(), 0);
        assert_eq!(root.axis(), 0);
        assert_eq!(root.split_value(), 1.);
        assert!(root.is_parent());

        let left = root.left_child().unwrap();
        assert_eq!(left.point(), &[0., 0.]);
        assert_eq!(left.depth(), 1);
        assert_eq!(left.axis(), 1);
        assert!(left.is_leaf());
        assert!(left.left_child().is_none());

        let right = root.right_child().unwrap();
        assert_eq!(right.point(), &[2., 2.]);
        assert!(right.is_leaf());
    }

    #[test]
    fn axis_cycles_through_dims() {
        let mut tree = KDTree::<i32>::new(3).unwrap();
        for i in 0..4 {
            tree.insert(&[i, i, i]).unwrap();
        }
        let mut node = tree.root();
        let mut axes = vec![];
        while let Some(current) = node {
            axes.push(current.axis());
            node = current.right_child();
        }
        assert_eq!(axes, vec![0, 1, 2, 0]);
    }
}
