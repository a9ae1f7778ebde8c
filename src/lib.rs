#![doc = include_str!("../README.md")]

mod error;
pub mod kdtree;
mod r#type;
mod util;

pub use error::{KdIndexError, Result};
pub use r#type::{Coord, IndexableNum};
