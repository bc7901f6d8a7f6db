//! Flat buffer encoding of a table.
//!
//! A table is serialized as a single run of `f64` values:
//!
//! ```text
//! [rank, dims[0], ..., dims[rank-1], axis_0[..], ..., axis_{rank-1}[..], data[prod(dims)]]
//! ```
//!
//! so its length is always `1 + rank + sum(dims) + prod(dims)`.
//!
//! ```rust
//! use ndtable::codec;
//!
//! // rank 2, dims [2, 3]
//! let buffer = [
//!     2.0, 2.0, 3.0,
//!     0.0, 1.0, // axis 0
//!     0.0, 10.0, 20.0, // axis 1
//!     1.0, 2.0, 3.0, 4.0, 5.0, 6.0, // data
//! ];
//! let table = codec::decode(2, &buffer).unwrap();
//! assert_eq!(table.dims(), &[2, 3]);
//! assert_eq!(codec::encode(&table), buffer.to_vec());
//! ```
use log::debug;
use num_traits::{Float, NumCast};

use crate::error::{Result, TableError};
use crate::table::NdTable;
use crate::MAX_RANK;

/// Decode and validate a flat buffer, copying axes and data into a new table.
///
/// Validation is fail-fast, and checks run in this order:
/// 1. the buffer holds at least 2 elements
/// 2. the rank is an integer in `[1, MAX_RANK]`
/// 3. the rank equals `ndims`
/// 4. the buffer holds the full header
/// 5. every dimension is an integer >= 1
/// 6. the buffer length is exactly `1 + rank + sum(dims) + prod(dims)`
///
/// # Errors
/// * `InvalidSize` for checks 1 and 4
/// * `InvalidRank`, `RankMismatch`, `InvalidDimension`, `SizeMismatch` respectively
pub fn decode(ndims: usize, buffer: &[f64]) -> Result<NdTable> {
    let len = buffer.len();
    if len < 2 {
        return Err(TableError::InvalidSize { len, required: 2 });
    }

    let rank = header_int(buffer[0])
        .filter(|r| (1..=MAX_RANK).contains(r))
        .ok_or(TableError::InvalidRank { value: buffer[0] })?;

    if rank != ndims {
        return Err(TableError::RankMismatch {
            expected: ndims,
            found: rank,
        });
    }

    if len < 1 + rank {
        return Err(TableError::InvalidSize {
            len,
            required: 1 + rank,
        });
    }

    let mut dims = Vec::with_capacity(rank);
    for (axis, &value) in buffer[1..1 + rank].iter().enumerate() {
        match header_int(value) {
            Some(n) if n >= 1 => dims.push(n),
            _ => return Err(TableError::InvalidDimension { axis, value }),
        }
    }

    // An overflowing length can never match a real buffer
    let expected = expected_len(&dims).unwrap_or(usize::MAX);
    if len != expected {
        return Err(TableError::SizeMismatch {
            expected,
            found: len,
        });
    }

    let mut rest = &buffer[1 + rank..];
    let mut axes = Vec::with_capacity(rank);
    for &n in &dims {
        let (axis, tail) = rest.split_at(n);
        axes.push(axis.to_vec());
        rest = tail;
    }
    let data = rest.to_vec();

    debug!("decoded table of rank {rank} with dims {dims:?}");

    Ok(NdTable::from_parts(axes, data))
}

/// Serialize a table into the flat buffer layout.
pub fn encode(table: &NdTable) -> Vec<f64> {
    let axes: Vec<&[f64]> = table.axes.iter().map(|a| &a[..]).collect();
    assemble(&axes, &table.data)
}

/// Concatenate `[rank] + dims + axes + data` without validating anything.
pub fn assemble(axes: &[&[f64]], data: &[f64]) -> Vec<f64> {
    let rank = axes.len();
    let nbreaks: usize = axes.iter().map(|a| a.len()).sum();

    let mut buffer = Vec::with_capacity(1 + rank + nbreaks + data.len());
    buffer.push(rank as f64);
    buffer.extend(axes.iter().map(|a| a.len() as f64));
    for axis in axes {
        buffer.extend_from_slice(axis);
    }
    buffer.extend_from_slice(data);

    buffer
}

/// Length of the flat buffer for a table with these dimensions,
/// or `None` if it is not representable.
pub fn expected_len(dims: &[usize]) -> Option<usize> {
    let nvals = dims.iter().try_fold(1_usize, |acc, &n| acc.checked_mul(n))?;
    let nbreaks = dims.iter().try_fold(0_usize, |acc, &n| acc.checked_add(n))?;
    nvals
        .checked_add(nbreaks)?
        .checked_add(dims.len())?
        .checked_add(1)
}

/// Read a header entry as a nonnegative integer.
/// Fractional, negative, and non-finite values are rejected.
#[inline]
fn header_int(v: f64) -> Option<usize> {
    if v.fract() != 0.0 {
        return None;
    }
    <usize as NumCast>::from(Float::trunc(v))
}

#[cfg(test)]
mod test {
    use super::{assemble, decode, encode, expected_len};
    use crate::error::TableError;
    use crate::testing::*;
    use crate::utils::linspace;

    /// rank=2, dims=[2,3]
    fn sample_buffer() -> Vec<f64> {
        vec![
            2.0, 2.0, 3.0, // header
            0.0, 1.0, // axis 0
            0.0, 10.0, 20.0, // axis 1
            1.0, 2.0, 3.0, 4.0, 5.0, 6.0, // data
        ]
    }

    #[test]
    fn test_decode_2d() {
        init_logging();
        let table = decode(2, &sample_buffer()).unwrap();
        assert_eq!(table.rank(), 2);
        assert_eq!(table.dims(), &[2, 3]);
        assert_eq!(table.axis(0).unwrap(), &[0.0, 1.0]);
        assert_eq!(table.axis(1).unwrap(), &[0.0, 10.0, 20.0]);
        assert_eq!(table.data(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    /// Tables of random shape survive an encode/decode cycle unchanged
    #[test]
    fn test_round_trip() {
        let mut rng = rng_fixed_seed();
        for ndims in 1..=5 {
            let dims: Vec<usize> = (0..ndims).map(|i| 1 + (i * 2) % 5).collect();
            let axes: Vec<Vec<f64>> = dims
                .iter()
                .map(|&n| linspace(-1.0, 1.0 + n as f64, n.max(2))[..n].to_vec())
                .collect();
            let nvals: usize = dims.iter().product();
            let data = randn::<f64>(&mut rng, nvals);

            let axes_ref: Vec<&[f64]> = axes.iter().map(|a| &a[..]).collect();
            let buffer = assemble(&axes_ref, &data);
            assert_eq!(Some(buffer.len()), expected_len(&dims));

            let table = decode(ndims, &buffer).unwrap();
            assert_eq!(table.dims(), &dims[..]);
            assert_eq!(table.axes(), &axes[..]);
            assert_eq!(table.data(), &data[..]);
            assert_eq!(encode(&table), buffer);
        }
    }

    #[test]
    fn test_too_short() {
        for buffer in [&[][..], &[1.0][..]] {
            assert!(matches!(
                decode(1, buffer),
                Err(TableError::InvalidSize { required: 2, .. })
            ));
        }
    }

    #[test]
    fn test_invalid_rank() {
        for rank in [-1.0, 0.0, 33.0, 1.5, f64::NAN, f64::INFINITY] {
            let buffer = [rank, 1.0, 0.0, 0.0];
            assert!(
                matches!(decode(1, &buffer), Err(TableError::InvalidRank { .. })),
                "rank {rank} should be rejected"
            );
        }
    }

    /// A well-formed buffer is still rejected when the caller expects another rank
    #[test]
    fn test_rank_mismatch() {
        let buffer = sample_buffer();
        for ndims in [1, 3, 32] {
            assert!(matches!(
                decode(ndims, &buffer),
                Err(TableError::RankMismatch { expected, found: 2 }) if expected == ndims
            ));
        }
    }

    /// Rank is checked against the caller before the header length
    #[test]
    fn test_check_order() {
        assert!(matches!(
            decode(2, &[3.0, 1.0]),
            Err(TableError::RankMismatch { .. })
        ));
        assert!(matches!(
            decode(3, &[3.0, 1.0]),
            Err(TableError::InvalidSize { required: 4, .. })
        ));
        // Bad dimension wins over bad total length
        assert!(matches!(
            decode(2, &[2.0, 0.0, 3.0, 1.0]),
            Err(TableError::InvalidDimension { axis: 0, .. })
        ));
    }

    #[test]
    fn test_invalid_dimension() {
        for dim in [0.0, -2.0, 2.5, f64::NAN] {
            let mut buffer = sample_buffer();
            buffer[2] = dim;
            assert!(matches!(
                decode(2, &buffer),
                Err(TableError::InvalidDimension { axis: 1, .. })
            ));
        }
    }

    /// Adding or removing a single element anywhere is detected
    #[test]
    fn test_size_mismatch() {
        let buffer = sample_buffer();
        let n = buffer.len();

        let mut longer = buffer.clone();
        longer.push(7.0);
        assert!(matches!(
            decode(2, &longer),
            Err(TableError::SizeMismatch { expected, found }) if expected == n && found == n + 1
        ));

        for i in 3..n {
            let mut shorter = buffer.clone();
            shorter.remove(i);
            assert!(matches!(
                decode(2, &shorter),
                Err(TableError::SizeMismatch { found, .. }) if found == n - 1
            ));
        }
    }

    /// Absurd dimensions overflow the length calculation instead of panicking
    #[test]
    fn test_overflowing_dims() {
        let buffer = [2.0, 1e10, 1e10, 0.0, 0.0];
        assert!(matches!(
            decode(2, &buffer),
            Err(TableError::SizeMismatch { .. })
        ));
    }

    /// Decoding copies out of the buffer
    #[test]
    fn test_decode_owns_data() {
        let mut buffer = sample_buffer();
        let table = decode(2, &buffer).unwrap();
        buffer.iter_mut().for_each(|x| *x = -1.0);
        assert_eq!(table.data()[0], 1.0);
        assert_eq!(table.axis(1).unwrap()[2], 20.0);
    }
}
