use std::fmt::Debug;

use geo_traits::CoordTrait;
use num_traits::{Bounded, Num, NumCast, ToPrimitive};

/// A trait for types that can be used for indexed coordinates.
///
/// This trait is sealed and cannot be implemented for external types. Every implementor converts
/// to `f64` without loss, which is the precision radius queries are evaluated in.
pub trait IndexableNum:
    private::Sealed
    + Num
    + NumCast
    + ToPrimitive
    + PartialOrd
    + Copy
    + Default
    + Debug
    + Send
    + Sync
    + Bounded
{
}

impl IndexableNum for i8 {}
impl IndexableNum for u8 {}
impl IndexableNum for i16 {}
impl IndexableNum for u16 {}
impl IndexableNum for i32 {}
impl IndexableNum for u32 {}
impl IndexableNum for f32 {}
impl IndexableNum for f64 {}

/// A single two-dimensional coordinate.
///
/// Used as a lightweight [`CoordTrait`] implementation for callers that don't already carry a
/// geometry library.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord<N: IndexableNum> {
    pub x: N,
    pub y: N,
}

impl<N: IndexableNum> Coord<N> {
    /// Create a new coordinate.
    pub fn new(x: N, y: N) -> Self {
        Self { x, y }
    }
}

impl<N: IndexableNum> CoordTrait for Coord<N> {
    type T = N;

    fn dim(&self) -> geo_traits::Dimensions {
        geo_traits::Dimensions::Xy
    }

    fn nth_or_panic(&self, n: usize) -> Self::T {
        match n {
            0 => self.x,
            1 => self.y,
            _ => panic!("Coord only has 2 dimensions"),
        }
    }

    fn x(&self) -> Self::T {
        self.x
    }

    fn y(&self) -> Self::T {
        self.y
    }
}

// https://rust-lang.github.io/api-guidelines/future-proofing.html#sealed-traits-protect-against-downstream-implementations-c-sealed
mod private {
    pub trait Sealed {}

    impl Sealed for i8 {}
    impl Sealed for u8 {}
    impl Sealed for i16 {}
    impl Sealed for u16 {}
    impl Sealed for i32 {}
    impl Sealed for u32 {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}
