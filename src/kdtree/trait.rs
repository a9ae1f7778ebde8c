use std::cmp::Ordering;

use geo_traits::{CoordTrait, RectTrait};
use tinyvec::TinyVec;

use crate::error::{KdIndexError, Result};
use crate::kdtree::{Node, NodeLinks};
use crate::r#type::IndexableNum;
use crate::util::{as_f64, check_dims, check_point, coord_values};

/// A trait for searching and accessing data out of a KDTree.
///
/// All queries return points in pre-order: a node before its left subtree, and its left subtree
/// before its right subtree.
pub trait KDTreeIndex<N: IndexableNum>: Sized {
    /// The number of coordinates per point.
    fn dims(&self) -> usize;

    /// The underlying interleaved coordinate buffer of this tree, in insertion order.
    fn coords(&self) -> &[N];

    /// The child links of every node, indexed by insertion index.
    fn links(&self) -> &[NodeLinks];

    /// Insertion index of the root node, or `None` for an empty tree.
    fn root_index(&self) -> Option<u32>;

    /// The number of items in this KDTree
    fn num_items(&self) -> usize {
        self.links().len()
    }

    /// Returns `true` if the tree holds no points.
    fn is_empty(&self) -> bool {
        self.root_index().is_none()
    }

    /// Access the point with the given insertion index.
    fn point(&self, index: u32) -> Option<&[N]> {
        let dims = self.dims();
        let start = (index as usize).checked_mul(dims)?;
        self.coords().get(start..start + dims)
    }

    /// The number of levels in the tree. An empty tree has height 0 and a single point height 1.
    fn height(&self) -> usize {
        let links = self.links();
        let mut stack: TinyVec<[(u32, usize); 32]> = TinyVec::new();
        stack.extend(self.root_index().map(|root| (root, 1)));

        let mut height = 0;
        while let Some((id, level)) = stack.pop() {
            height = height.max(level);
            let node = &links[id as usize];
            stack.extend(node.left.map(|left| (left, level + 1)));
            stack.extend(node.right.map(|right| (right, level + 1)));
        }
        height
    }

    /// Search the index for points within an axis-aligned box.
    ///
    /// - lower: per-axis inclusive minimum
    /// - upper: per-axis inclusive maximum
    ///
    /// Returns insertion indices of found items
    fn range_ids(&self, lower: &[N], upper: &[N]) -> Result<Vec<u32>> {
        let dims = self.dims();
        check_dims(dims, lower)?;
        check_dims(dims, upper)?;
        for axis in 0..dims {
            match lower[axis].partial_cmp(&upper[axis]) {
                Some(Ordering::Less | Ordering::Equal) => {}
                _ => return Err(KdIndexError::InvalidBounds { axis }),
            }
        }

        let coords = self.coords();
        let links = self.links();

        // Use TinyVec to avoid heap allocations
        let mut stack: TinyVec<[(u32, usize); 32]> = TinyVec::new();
        stack.extend(self.root_index().map(|root| (root, 0)));

        let mut result: Vec<u32> = vec![];

        while let Some((id, depth)) = stack.pop() {
            let start = id as usize * dims;
            let point = &coords[start..start + dims];

            let inside = point
                .iter()
                .zip(lower.iter().zip(upper))
                .all(|(c, (lo, hi))| lo <= c && c <= hi);
            if inside {
                result.push(id);
            }

            // queue the halves that may intersect the query. Right goes on the stack first so
            // that the left half is popped first.
            let axis = depth % dims;
            let node = &links[id as usize];
            if upper[axis] >= point[axis] {
                stack.extend(node.right.map(|right| (right, depth + 1)));
            }
            if lower[axis] <= point[axis] {
                stack.extend(node.left.map(|left| (left, depth + 1)));
            }
        }

        Ok(result)
    }

    /// Search the index for points within an axis-aligned box.
    ///
    /// Returns the found points
    fn range(&self, lower: &[N], upper: &[N]) -> Result<Vec<&[N]>> {
        let ids = self.range_ids(lower, upper)?;
        Ok(resolve(self.coords(), self.dims(), ids))
    }

    /// Search the index for points within a given rectangle.
    ///
    /// The rectangle's dimension must match the tree's.
    fn range_rect(&self, rect: &impl RectTrait<T = N>) -> Result<Vec<&[N]>> {
        let lower = coord_values(&rect.min());
        let upper = coord_values(&rect.max());
        self.range(&lower, &upper)
    }

    /// Search the index for points within a given Euclidean radius.
    ///
    /// - center: query point
    /// - radius: inclusive, must be non-negative, independent of the coordinate type
    ///
    /// Distances are evaluated in `f64`, with one square root per visited node.
    ///
    /// Returns insertion indices of found items
    fn within_ids(&self, center: &[N], radius: f64) -> Result<Vec<u32>> {
        let dims = self.dims();
        check_point(dims, center)?;
        match radius.partial_cmp(&0.0) {
            Some(Ordering::Greater | Ordering::Equal) => {}
            _ => return Err(KdIndexError::InvalidRadius),
        }

        let r = radius;
        let center: TinyVec<[f64; 4]> = center.iter().map(|c| as_f64(*c)).collect();
        let coords = self.coords();
        let links = self.links();

        // Use TinyVec to avoid heap allocations
        let mut stack: TinyVec<[(u32, usize); 32]> = TinyVec::new();
        stack.extend(self.root_index().map(|root| (root, 0)));

        let mut result: Vec<u32> = vec![];

        while let Some((id, depth)) = stack.pop() {
            let start = id as usize * dims;
            let point = &coords[start..start + dims];

            if dist(point, &center) <= r {
                result.push(id);
            }

            // queue the halves whose side of the split the ball's bounding box reaches
            let axis = depth % dims;
            let split = as_f64(point[axis]);
            let node = &links[id as usize];
            if center[axis] + r >= split {
                stack.extend(node.right.map(|right| (right, depth + 1)));
            }
            if center[axis] - r <= split {
                stack.extend(node.left.map(|left| (left, depth + 1)));
            }
        }

        Ok(result)
    }

    /// Search the index for points within a given Euclidean radius.
    ///
    /// Returns the found points
    fn within(&self, center: &[N], radius: f64) -> Result<Vec<&[N]>> {
        let ids = self.within_ids(center, radius)?;
        Ok(resolve(self.coords(), self.dims(), ids))
    }

    /// Search the index for points within a given radius of a coordinate.
    fn within_coord(&self, coord: &impl CoordTrait<T = N>, radius: f64) -> Result<Vec<&[N]>> {
        self.within(&coord_values(coord), radius)
    }

    /// Access the root node of the KDTree for manual traversal.
    fn root(&self) -> Option<Node<'_, N, Self>> {
        Node::from_root(self)
    }
}

/// Euclidean distance between a stored point and an `f64` query point.
#[inline]
pub(crate) fn dist<N: IndexableNum>(point: &[N], center: &[f64]) -> f64 {
    point
        .iter()
        .zip(center)
        .map(|(p, c)| {
            let d = as_f64(*p) - c;
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

/// Map insertion indices to their points.
fn resolve<N>(coords: &[N], dims: usize, ids: Vec<u32>) -> Vec<&[N]> {
    ids.into_iter()
        .map(|id| {
            let start = id as usize * dims;
            &coords[start..start + dims]
        })
        .collect()
}
