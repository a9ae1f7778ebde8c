use std::cmp::Ordering;
use std::ops::Range;

use geo_traits::CoordTrait;

use crate::error::{KdIndexError, Result};
use crate::kdtree::{KDTree, NodeLinks};
use crate::r#type::IndexableNum;
use crate::util::{check_point, coord_values, next_index, reserve_indices};

/// A builder to create a balanced [`KDTree`].
///
/// With distinct values on every axis the tree has height `ceil(log2(n + 1))`. Points equal to
/// a node's split value always go to its right subtree, so ties lengthen the tree: points
/// sharing one axis value cost an extra level per cycle of the axes, and `n` identical points
/// form a chain of height `n` that takes `O(n^2 log n)` to build.
///
/// ```
/// use kd_index::kdtree::{KDTreeBuilder, KDTreeIndex};
///
/// let mut builder = KDTreeBuilder::<f64>::new(2).unwrap();
/// builder.add(&[0., 0.]).unwrap();
/// builder.add(&[1., 1.]).unwrap();
/// builder.add(&[2., 2.]).unwrap();
/// let tree = builder.finish();
/// assert_eq!(tree.num_items(), 3);
/// assert_eq!(tree.height(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct KDTreeBuilder<N: IndexableNum> {
    dims: usize,
    /// Interleaved coordinates, `dims` values per point, in insertion order.
    coords: Vec<N>,
}

impl<N: IndexableNum> KDTreeBuilder<N> {
    /// Create a new builder for points with `dims` coordinates.
    pub fn new(dims: usize) -> Result<Self> {
        Self::with_capacity(dims, 0)
    }

    /// Create a new builder for points with `dims` coordinates, reserving space for `num_items`
    /// points.
    pub fn with_capacity(dims: usize, num_items: usize) -> Result<Self> {
        if dims == 0 {
            return Err(KdIndexError::InvalidDimensions);
        }
        Ok(Self {
            dims,
            coords: Vec::with_capacity(num_items.saturating_mul(dims)),
        })
    }

    /// The dimensionality of the points this builder accepts.
    pub fn dims(&self) -> usize {
        self.dims
    }

    /// The number of points added so far.
    pub fn num_items(&self) -> usize {
        self.coords.len() / self.dims
    }

    /// Add a point to the index.
    ///
    /// This returns the insertion index, which provides a lookup back into the original data.
    pub fn add(&mut self, point: &[N]) -> Result<u32> {
        check_point(self.dims, point)?;
        let index = next_index(self.num_items())?;
        self.coords.extend_from_slice(point);
        Ok(index)
    }

    /// Add a point given as any [`CoordTrait`].
    pub fn add_coord(&mut self, coord: &impl CoordTrait<T = N>) -> Result<u32> {
        self.add(&coord_values(coord))
    }

    /// Add many points from a flat buffer holding `dims` coordinates per point.
    ///
    /// Returns the range of insertion indices assigned. Nothing is added if any point is
    /// invalid.
    pub fn add_interleaved(&mut self, coords: &[N]) -> Result<Range<u32>> {
        if coords.len() % self.dims != 0 {
            // reports the length of the trailing partial point
            return Err(KdIndexError::DimensionMismatch {
                expected: self.dims,
                actual: coords.len() % self.dims,
            });
        }
        for point in coords.chunks_exact(self.dims) {
            check_point(self.dims, point)?;
        }

        let ids = reserve_indices(self.num_items(), coords.len() / self.dims)?;
        self.coords.extend_from_slice(coords);
        Ok(ids)
    }

    /// Consume this builder, performing the k-d sort and generating a KDTree ready for queries.
    pub fn finish(self) -> KDTree<N> {
        let mut links = vec![NodeLinks::default(); self.num_items()];
        let root = sort(&self.coords, self.dims, &mut links);

        #[cfg(feature = "tracing")]
        tracing::event!(
            tracing::Level::DEBUG,
            num_items = links.len(),
            dims = self.dims,
            "built kd-tree"
        );

        KDTree {
            dims: self.dims,
            coords: self.coords,
            links,
            root,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Side {
    Left,
    Right,
}

/// A pending subtree: a slice of the id array and where to hang its median.
#[derive(Debug, Clone, Copy)]
struct Task {
    start: usize,
    end: usize,
    depth: usize,
    parent: Option<(u32, Side)>,
}

/// kd-sort the points in `coords` into a tree, writing child links into `links` and returning
/// the root.
///
/// Every link is overwritten. At each level the sub-collection is sorted on the level's axis and
/// split at its median; the median moves left past equal values so that the whole left side is
/// strictly less than the split on that axis.
pub(crate) fn sort<N: IndexableNum>(
    coords: &[N],
    dims: usize,
    links: &mut [NodeLinks],
) -> Option<u32> {
    links.fill(NodeLinks::default());
    if links.is_empty() {
        return None;
    }

    // links.len() fits in u32: ids come from `next_index`/`reserve_indices`, capped at u32::MAX
    let mut ids: Vec<u32> = (0..links.len() as u32).collect();
    let value = |id: u32, axis: usize| coords[id as usize * dims + axis];

    let mut root = None;
    let mut stack = vec![Task {
        start: 0,
        end: ids.len(),
        depth: 0,
        parent: None,
    }];

    while let Some(task) = stack.pop() {
        let axis = task.depth % dims;
        let slice = &mut ids[task.start..task.end];
        slice.sort_by(|a, b| {
            value(*a, axis)
                .partial_cmp(&value(*b, axis))
                .unwrap_or(Ordering::Equal)
        });

        let mid = slice.len() / 2;
        let split = value(slice[mid], axis);
        let m = slice[..mid].partition_point(|id| value(*id, axis) < split);
        let id = slice[m];

        match task.parent {
            None => root = Some(id),
            Some((parent, Side::Left)) => links[parent as usize].left = Some(id),
            Some((parent, Side::Right)) => links[parent as usize].right = Some(id),
        }

        let m = task.start + m;
        if m + 1 < task.end {
            stack.push(Task {
                start: m + 1,
                end: task.end,
                depth: task.depth + 1,
                parent: Some((id, Side::Right)),
            });
        }
        if task.start < m {
            stack.push(Task {
                start: task.start,
                end: m,
                depth: task.depth + 1,
                parent: Some((id, Side::Left)),
            });
        }
    }

    root
}
