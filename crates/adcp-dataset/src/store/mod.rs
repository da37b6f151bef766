//! Array store abstraction.
//!
//! The loader talks to an [`ArrayStore`]: something that can describe a named
//! array and read a rectangular selection of it as `f64`. Two implementations
//! are provided:
//!
//! - [`ZarrStore`]: any `zarrs` readable storage (HTTP, filesystem, ...)
//! - [`MemoryStore`]: in-memory arrays for tests and offline use

pub mod http;
mod memory;
mod zarr;

use std::ops::Range;

pub use memory::MemoryStore;
pub use zarr::ZarrStore;

use crate::error::{DatasetError, Result};
use crate::types::VariableInfo;

/// Read-only access to named n-dimensional arrays.
pub trait ArrayStore {
    /// Human-readable location of the store (URL or path).
    fn location(&self) -> &str;

    /// Describe an array.
    ///
    /// Returns `Ok(None)` when the store has no array of that name and an
    /// error when the store itself cannot be reached.
    fn describe(&self, name: &str) -> Result<Option<VariableInfo>>;

    /// Read a selection (one half-open range per axis) in row-major order.
    fn read(&self, name: &str, selection: &[Range<u64>]) -> Result<Vec<f64>>;
}

impl<T: ArrayStore + ?Sized> ArrayStore for Box<T> {
    fn location(&self) -> &str {
        (**self).location()
    }

    fn describe(&self, name: &str) -> Result<Option<VariableInfo>> {
        (**self).describe(name)
    }

    fn read(&self, name: &str, selection: &[Range<u64>]) -> Result<Vec<f64>> {
        (**self).read(name, selection)
    }
}

/// Selection covering a whole array.
pub fn full_selection(shape: &[u64]) -> Vec<Range<u64>> {
    shape.iter().map(|&len| 0..len).collect()
}

/// Check a selection against an array shape.
pub(crate) fn validate_selection(
    name: &str,
    shape: &[u64],
    selection: &[Range<u64>],
) -> Result<()> {
    if selection.len() != shape.len() {
        return Err(DatasetError::read_failed(
            name,
            format!(
                "selection has {} axes, array has {}",
                selection.len(),
                shape.len()
            ),
        ));
    }
    for (axis, (range, &len)) in selection.iter().zip(shape).enumerate() {
        if range.start > range.end || range.end > len {
            return Err(DatasetError::read_failed(
                name,
                format!("range {:?} out of bounds for axis {} (len {})", range, axis, len),
            ));
        }
    }
    Ok(())
}

/// Copy a selection out of a row-major buffer.
pub(crate) fn select_ranges(values: &[f64], shape: &[u64], selection: &[Range<u64>]) -> Vec<f64> {
    let out_shape: Vec<u64> = selection.iter().map(|r| r.end - r.start).collect();
    let total: u64 = out_shape.iter().product();
    let mut out = Vec::with_capacity(total as usize);
    if total == 0 {
        return out;
    }

    let mut strides = vec![1u64; shape.len()];
    for axis in (0..shape.len().saturating_sub(1)).rev() {
        strides[axis] = strides[axis + 1] * shape[axis + 1];
    }

    // Odometer over the output index space
    let mut idx = vec![0u64; shape.len()];
    loop {
        let flat: u64 = idx
            .iter()
            .zip(selection)
            .zip(&strides)
            .map(|((i, range), stride)| (range.start + i) * stride)
            .sum();
        out.push(values.get(flat as usize).copied().unwrap_or(f64::NAN));

        let mut axis = idx.len();
        loop {
            if axis == 0 {
                return out;
            }
            axis -= 1;
            idx[axis] += 1;
            if idx[axis] < out_shape[axis] {
                break;
            }
            idx[axis] = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_ranges_2d() {
        // 3 x 4, value = row * 10 + col
        let values: Vec<f64> = (0..3)
            .flat_map(|r| (0..4).map(move |c| (r * 10 + c) as f64))
            .collect();
        let out = select_ranges(&values, &[3, 4], &[1..3, 1..3]);
        assert_eq!(out, vec![11.0, 12.0, 21.0, 22.0]);
    }

    #[test]
    fn test_select_ranges_scalar_and_empty() {
        assert_eq!(select_ranges(&[7.0], &[], &[]), vec![7.0]);
        assert!(select_ranges(&[1.0, 2.0], &[2], &[1..1]).is_empty());
    }

    #[test]
    fn test_validate_selection() {
        assert!(validate_selection("x", &[3, 4], &[0..3, 0..4]).is_ok());
        assert!(validate_selection("x", &[3, 4], &[0..3]).is_err());
        assert!(validate_selection("x", &[3, 4], &[0..4, 0..4]).is_err());
    }
}
