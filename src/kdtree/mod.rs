//! An implementation of a mutable k-d tree over points of any fixed dimensionality.
//!
//! Trees are built balanced from a point collection with [`KDTree::build`] or
//! [`KDTreeBuilder`], grown one point at a time with [`KDTree::insert`], and queried through
//! the [`KDTreeIndex`] trait.

#![warn(missing_docs)]

mod builder;
mod index;
mod r#trait;
mod traversal;

pub use builder::KDTreeBuilder;
pub use index::{KDTree, NodeLinks};
pub use r#trait::KDTreeIndex;
pub use traversal::Node;
