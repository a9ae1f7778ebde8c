use geo_traits::CoordTrait;

use crate::error::{KdIndexError, Result};
use crate::kdtree::builder::{sort, KDTreeBuilder};
use crate::kdtree::KDTreeIndex;
use crate::r#type::IndexableNum;
use crate::util::{check_point, coord_values, next_index};

/// The child links of one node in a [`KDTree`].
///
/// Nodes are addressed by their insertion index; `left` and `right` hold the insertion indices
/// of the children, if any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeLinks {
    pub(crate) left: Option<u32>,
    pub(crate) right: Option<u32>,
}

impl NodeLinks {
    /// Insertion index of the left child, whose subtree is strictly less on the node's axis.
    #[inline]
    pub fn left(&self) -> Option<u32> {
        self.left
    }

    /// Insertion index of the right child, whose subtree is greater or equal on the node's axis.
    #[inline]
    pub fn right(&self) -> Option<u32> {
        self.right
    }
}

/// An owned, mutable k-d tree over points with a fixed number of coordinates.
///
/// Points live in one interleaved coordinate buffer in insertion order, and the tree structure
/// is a parallel array of [`NodeLinks`]. A point's insertion index is therefore also its node
/// handle.
///
/// Usually this will be created with [`KDTree::new`] and filled with [`KDTree::build`], or
/// created from scratch via [`KDTreeBuilder`].
#[derive(Debug, Clone, PartialEq)]
pub struct KDTree<N: IndexableNum> {
    pub(crate) dims: usize,
    pub(crate) coords: Vec<N>,
    pub(crate) links: Vec<NodeLinks>,
    pub(crate) root: Option<u32>,
}

impl<N: IndexableNum> KDTree<N> {
    /// Create an empty tree for points with `dims` coordinates.
    pub fn new(dims: usize) -> Result<Self> {
        Self::with_capacity(dims, 0)
    }

    /// Create an empty tree for points with `dims` coordinates, reserving space for `num_items`
    /// points.
    pub fn with_capacity(dims: usize, num_items: usize) -> Result<Self> {
        if dims == 0 {
            return Err(KdIndexError::InvalidDimensions);
        }
        Ok(Self {
            dims,
            coords: Vec::with_capacity(num_items.saturating_mul(dims)),
            links: Vec::with_capacity(num_items),
            root: None,
        })
    }

    /// Replace the content of this tree with a balanced tree over `points`.
    ///
    /// Any existing points are discarded. Every point is validated first, so on error the tree
    /// is left unchanged. Insertion indices follow the order of `points`.
    ///
    /// The tree is balanced by median splits. Points equal to a split value stay right of it,
    /// so repeated axis values make the tree deeper than `ceil(log2(n + 1))`; see
    /// [`KDTreeBuilder`] for the cost of heavily duplicated input.
    ///
    /// ```
    /// use kd_index::kdtree::{KDTree, KDTreeIndex};
    ///
    /// let mut tree = KDTree::<f64>::new(2).unwrap();
    /// tree.build([[0., 0.], [1., 1.], [2., 2.]]).unwrap();
    /// let found = tree.range(&[0., 0.], &[1., 1.]).unwrap();
    /// assert_eq!(found.len(), 2);
    /// ```
    pub fn build<P: AsRef<[N]>>(&mut self, points: impl IntoIterator<Item = P>) -> Result<()> {
        let points = points.into_iter();
        let mut builder = KDTreeBuilder::with_capacity(self.dims, points.size_hint().0)?;
        for point in points {
            builder.add(point.as_ref())?;
        }

        #[cfg(feature = "tracing")]
        tracing::event!(
            tracing::Level::DEBUG,
            discarded = self.num_items(),
            "replacing kd-tree content"
        );

        *self = builder.finish();
        Ok(())
    }

    /// Rebalance the tree over its current points.
    ///
    /// Insertion does not rebalance, so inserting points in sorted order degrades the tree
    /// towards a linked list. Rebuilding restores a height of about `log2(n)`. Insertion indices
    /// are preserved.
    pub fn rebuild(&mut self) {
        #[cfg(feature = "tracing")]
        let height_before = self.height();

        self.root = sort(&self.coords, self.dims, &mut self.links);

        #[cfg(feature = "tracing")]
        tracing::event!(
            tracing::Level::DEBUG,
            num_items = self.links.len(),
            height_before,
            height_after = self.height(),
            "rebuilt kd-tree"
        );
    }

    /// Add a single point to the tree and return its insertion index.
    ///
    /// The point descends from the root, going left when its coordinate on the node's axis is
    /// strictly less than the node's and right otherwise, and becomes a new leaf. The rest of the
    /// tree is left untouched.
    pub fn insert(&mut self, point: &[N]) -> Result<u32> {
        check_point(self.dims, point)?;
        let id = next_index(self.links.len())?;
        self.coords.extend_from_slice(point);
        self.links.push(NodeLinks::default());

        let Some(mut current) = self.root else {
            self.root = Some(id);
            return Ok(id);
        };

        let mut depth = 0;
        loop {
            let axis = depth % self.dims;
            let go_left = point[axis] < self.coords[current as usize * self.dims + axis];
            let links = &mut self.links[current as usize];
            let slot = if go_left {
                &mut links.left
            } else {
                &mut links.right
            };
            match *slot {
                Some(next) => {
                    current = next;
                    depth += 1;
                }
                None => {
                    *slot = Some(id);
                    break;
                }
            }
        }

        #[cfg(feature = "tracing")]
        tracing::event!(tracing::Level::TRACE, id, depth = depth + 1, "inserted point");

        Ok(id)
    }

    /// Add a single point given as any [`CoordTrait`].
    pub fn insert_coord(&mut self, coord: &impl CoordTrait<T = N>) -> Result<u32> {
        self.insert(&coord_values(coord))
    }

    /// Remove every point, keeping the dimensionality.
    pub fn clear(&mut self) {
        self.coords.clear();
        self.links.clear();
        self.root = None;
    }

    /// Iterate over all points in insertion order.
    pub fn points(&self) -> impl ExactSizeIterator<Item = &[N]> + '_ {
        self.coords.chunks_exact(self.dims)
    }
}

impl<N: IndexableNum> KDTreeIndex<N> for KDTree<N> {
    fn dims(&self) -> usize {
        self.dims
    }

    fn coords(&self) -> &[N] {
        &self.coords
    }

    fn links(&self) -> &[NodeLinks] {
        &self.links
    }

    fn root_index(&self) -> Option<u32> {
        self.root
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::r#type::Coord;

    #[test]
    fn new_rejects_zero_dims() {
        assert_eq!(
            KDTree::<f64>::new(0).unwrap_err(),
            KdIndexError::InvalidDimensions
        );
    }

    #[test]
    fn insert_into_empty_tree_becomes_root() {
        let mut tree = KDTree::<f64>::new(2).unwrap();
        assert_eq!(tree.insert(&[3., 4.]).unwrap(), 0);
        assert_eq!(tree.root_index(), Some(0));
        assert_eq!(tree.height(), 1);
    }

    #[test]
    fn insert_follows_axis_rule() {
        let mut tree = KDTree::<f64>::new(2).unwrap();
        tree.insert(&[5., 5.]).unwrap();
        // depth 0 compares x
        let left = tree.insert(&[4., 9.]).unwrap();
        let right = tree.insert(&[5., 0.]).unwrap();
        // depth 1 compares y
        let left_left = tree.insert(&[0., 8.]).unwrap();
        let left_right = tree.insert(&[0., 9.]).unwrap();

        assert_eq!(tree.links[0].left(), Some(left));
        assert_eq!(tree.links[0].right(), Some(right));
        assert_eq!(tree.links[left as usize].left(), Some(left_left));
        assert_eq!(tree.links[left as usize].right(), Some(left_right));
        assert_eq!(tree.height(), 3);
    }

    #[test]
    fn insert_rejects_bad_points_without_mutating() {
        let mut tree = KDTree::<f64>::new(2).unwrap();
        tree.insert(&[1., 1.]).unwrap();
        assert_eq!(
            tree.insert(&[1., 1., 1.]).unwrap_err(),
            KdIndexError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        );
        assert_eq!(
            tree.insert(&[f64::NAN, 1.]).unwrap_err(),
            KdIndexError::InvalidCoordinate { axis: 0 }
        );
        assert_eq!(tree.num_items(), 1);
        assert_eq!(tree.coords.len(), 2);
    }

    #[test]
    fn insert_coord() {
        let mut tree = KDTree::<i32>::new(2).unwrap();
        let id = tree.insert_coord(&Coord::new(7, -2)).unwrap();
        assert_eq!(tree.point(id), Some(&[7, -2][..]));
    }

    #[test]
    fn build_replaces_content() {
        let mut tree = KDTree::<f64>::new(2).unwrap();
        tree.insert(&[100., 100.]).unwrap();
        tree.build(vec![vec![0., 0.], vec![1., 1.]]).unwrap();
        assert_eq!(tree.num_items(), 2);
        assert_eq!(tree.point(0), Some(&[0., 0.][..]));
        assert!(tree.range(&[99., 99.], &[101., 101.]).unwrap().is_empty());
    }

    #[test]
    fn failed_build_keeps_content() {
        let mut tree = KDTree::<f64>::new(2).unwrap();
        tree.build([[0., 0.], [1., 1.]]).unwrap();
        let before = tree.clone();

        let err = tree.build(vec![vec![2., 2.], vec![3.]]).unwrap_err();
        assert_eq!(
            err,
            KdIndexError::DimensionMismatch {
                expected: 2,
                actual: 1
            }
        );
        assert_eq!(tree, before);
    }

    #[test]
    fn build_empty_clears() {
        let mut tree = KDTree::<f64>::new(3).unwrap();
        tree.build([[0., 0., 0.]]).unwrap();
        tree.build(Vec::<[f64; 3]>::new()).unwrap();
        assert!(tree.is_empty());
        assert_eq!(tree.dims(), 3);
        assert!(tree.root().is_none());
    }

    #[test]
    fn rebuild_preserves_insertion_indices() {
        let mut tree = KDTree::<f64>::new(1).unwrap();
        for i in 0..64 {
            tree.insert(&[i as f64]).unwrap();
        }
        assert_eq!(tree.height(), 64);

        tree.rebuild();
        assert_eq!(tree.height(), 7);
        for i in 0..64u32 {
            assert_eq!(tree.point(i), Some(&[i as f64][..]));
        }
        assert_eq!(tree.range_ids(&[10.], &[12.]).unwrap().len(), 3);
    }

    #[test]
    fn clear_keeps_dims() {
        let mut tree = KDTree::<u8>::new(2).unwrap();
        tree.insert(&[1, 2]).unwrap();
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.insert(&[3, 4]).unwrap(), 0);
    }

    #[test]
    fn points_in_insertion_order() {
        let mut tree = KDTree::<i16>::new(2).unwrap();
        tree.build([[3, 3], [1, 1], [2, 2]]).unwrap();
        tree.insert(&[0, 0]).unwrap();
        let points: Vec<&[i16]> = tree.points().collect();
        assert_eq!(points, vec![&[3, 3][..], &[1, 1][..], &[2, 2][..], &[0, 0][..]]);
    }
}
