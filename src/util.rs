use std::ops::Range;

use geo_traits::CoordTrait;
use tinyvec::TinyVec;

use crate::error::{KdIndexError, Result};
use crate::r#type::IndexableNum;

/// Check that a supplied coordinate sequence has exactly `dims` entries.
#[inline]
pub(crate) fn check_dims<N>(dims: usize, coords: &[N]) -> Result<()> {
    if coords.len() != dims {
        return Err(KdIndexError::DimensionMismatch {
            expected: dims,
            actual: coords.len(),
        });
    }
    Ok(())
}

/// Check that a point has `dims` coordinates, all of them orderable.
pub(crate) fn check_point<N: IndexableNum>(dims: usize, point: &[N]) -> Result<()> {
    check_dims(dims, point)?;
    if let Some(axis) = point.iter().position(|c| is_incomparable(*c)) {
        return Err(KdIndexError::InvalidCoordinate { axis });
    }
    Ok(())
}

/// Returns `true` if the value cannot be ordered against itself, i.e. it is NaN.
#[inline]
pub(crate) fn is_incomparable<N: IndexableNum>(value: N) -> bool {
    value.partial_cmp(&value).is_none()
}

/// Widen a coordinate to `f64`. Every [`IndexableNum`] fits, so the fallback is never taken.
#[inline]
pub(crate) fn as_f64<N: IndexableNum>(value: N) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

/// Insertion indices for `count` points appended to a buffer holding `num_items` points.
///
/// A tree holds at most `u32::MAX` points, so both every id and the exclusive end of the
/// returned range fit in a `u32`.
pub(crate) fn reserve_indices(num_items: usize, count: usize) -> Result<Range<u32>> {
    let end = num_items
        .checked_add(count)
        .and_then(|end| u32::try_from(end).ok());
    match (u32::try_from(num_items), end) {
        (Ok(start), Some(end)) => Ok(start..end),
        _ => Err(KdIndexError::General(format!(
            "Cannot index more than {} points.",
            u32::MAX
        ))),
    }
}

/// Insertion index of the next point appended to a buffer holding `num_items` points.
#[inline]
pub(crate) fn next_index(num_items: usize) -> Result<u32> {
    reserve_indices(num_items, 1).map(|ids| ids.start)
}

/// Collect the coordinates of a [`CoordTrait`] into a small inline buffer.
pub(crate) fn coord_values<N: IndexableNum>(coord: &impl CoordTrait<T = N>) -> TinyVec<[N; 4]> {
    (0..coord.dim().size())
        .map(|n| coord.nth_or_panic(n))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::r#type::Coord;

    #[test]
    fn rejects_wrong_length() {
        assert_eq!(
            check_dims(3, &[1.0f64, 2.0]),
            Err(KdIndexError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        );
        assert!(check_dims(2, &[1.0f64, 2.0]).is_ok());
    }

    #[test]
    fn rejects_nan_coordinates() {
        assert_eq!(
            check_point(3, &[1.0f64, f64::NAN, 2.0]),
            Err(KdIndexError::InvalidCoordinate { axis: 1 })
        );
        assert!(check_point(3, &[1.0f64, f64::INFINITY, 2.0]).is_ok());
    }

    #[test]
    fn nan_is_incomparable() {
        assert!(is_incomparable(f64::NAN));
        assert!(is_incomparable(f32::NAN));
        assert!(!is_incomparable(0.0f64));
        assert!(!is_incomparable(7u8));
    }

    #[test]
    fn widens_integers() {
        assert_eq!(as_f64(200u8), 200.0);
        assert_eq!(as_f64(-3i16), -3.0);
        assert_eq!(as_f64(0.5f32), 0.5);
    }

    #[test]
    fn collects_coord_values() {
        let values = coord_values(&Coord::new(1i32, 2));
        assert_eq!(values.as_slice(), &[1, 2]);
    }

    #[test]
    fn next_index_bounds() {
        assert_eq!(next_index(0), Ok(0));
        assert_eq!(next_index(u32::MAX as usize - 1), Ok(u32::MAX - 1));
        assert!(next_index(u32::MAX as usize).is_err());
    }

    #[test]
    fn reserve_indices_bounds() {
        assert_eq!(reserve_indices(3, 2), Ok(3..5));
        assert_eq!(reserve_indices(3, 0), Ok(3..3));

        // a batch may end exactly at the capacity
        let max = u32::MAX as usize;
        assert_eq!(reserve_indices(max - 2, 2), Ok(u32::MAX - 2..u32::MAX));
        assert_eq!(reserve_indices(max, 0), Ok(u32::MAX..u32::MAX));
        assert!(reserve_indices(max - 2, 3).is_err());
        assert!(reserve_indices(usize::MAX, 1).is_err());
    }
}
