//! Zarr array store.
//!
//! Each variable is a Zarr array at `/<name>` below the store root. Both V3
//! (`zarr.json`) and V2 (`.zarray`) metadata are read; dimension names come
//! from the array metadata or, failing that, the `_ARRAY_DIMENSIONS`
//! attribute written by xarray.

use std::ops::Range;
use std::sync::Arc;

use zarrs::array::{Array, DataType};
use zarrs::array_subset::ArraySubset;
use zarrs::storage::{ReadableStorageTraits, StoreKey};

use super::{validate_selection, ArrayStore};
use crate::error::{DatasetError, Result};
use crate::types::VariableInfo;

/// Metadata documents that mark a key prefix as an array.
const ARRAY_METADATA_KEYS: &[&str] = &["zarr.json", ".zarray"];

/// Attribute carrying dimension names in xarray-written stores.
const XARRAY_DIMENSIONS_ATTR: &str = "_ARRAY_DIMENSIONS";

/// Array store backed by a `zarrs` storage.
pub struct ZarrStore<S: ?Sized> {
    storage: Arc<S>,
    location: String,
}

impl<S: ReadableStorageTraits + ?Sized + 'static> ZarrStore<S> {
    /// Wrap a storage backend.
    ///
    /// # Arguments
    /// * `storage` - The storage backend rooted at the dataset
    /// * `location` - Description used in logs and errors
    pub fn new(storage: Arc<S>, location: impl Into<String>) -> Self {
        Self {
            storage,
            location: location.into(),
        }
    }

    /// Whether array metadata exists for `name`.
    fn exists(&self, name: &str) -> Result<bool> {
        for doc in ARRAY_METADATA_KEYS {
            let key = StoreKey::new(format!("{}/{}", name, doc))
                .map_err(|e| DatasetError::invalid_metadata(e.to_string()))?;
            let found = self
                .storage
                .get(&key)
                .map_err(|e| DatasetError::storage(format!("{}: {}", self.location, e)))?;
            if found.is_some() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn open(&self, name: &str) -> Result<Array<S>> {
        Array::open(self.storage.clone(), &format!("/{}", name))
            .map_err(|e| DatasetError::read_failed(name, e.to_string()))
    }
}

impl<S: ReadableStorageTraits + ?Sized + 'static> ArrayStore for ZarrStore<S> {
    fn location(&self) -> &str {
        &self.location
    }

    fn describe(&self, name: &str) -> Result<Option<VariableInfo>> {
        if !self.exists(name)? {
            return Ok(None);
        }

        let array = self.open(name)?;
        let shape = array.shape().to_vec();

        Ok(Some(VariableInfo {
            name: name.to_string(),
            dims: dimension_names(&array),
            shape,
            attributes: array.attributes().clone(),
            fill_value: fill_value_as_f64(&array),
        }))
    }

    fn read(&self, name: &str, selection: &[Range<u64>]) -> Result<Vec<f64>> {
        let array = self.open(name)?;
        validate_selection(name, array.shape(), selection)?;

        let subset = ArraySubset::new_with_ranges(selection);

        tracing::debug!(
            store = %self.location,
            variable = name,
            selection = ?selection,
            "Reading array subset"
        );

        retrieve_as_f64(&array, &subset).map_err(|reason| DatasetError::read_failed(name, reason))
    }
}

/// Dimension names from metadata, the xarray attribute, or positional names.
fn dimension_names<S: ?Sized>(array: &Array<S>) -> Vec<String> {
    let ndim = array.shape().len();

    if let Some(names) = array.dimension_names() {
        let named: Option<Vec<String>> = names
            .iter()
            .map(|d| d.as_str().map(str::to_string))
            .collect();
        if let Some(named) = named.filter(|n| n.len() == ndim) {
            return named;
        }
    }

    if let Some(names) = array
        .attributes()
        .get(XARRAY_DIMENSIONS_ATTR)
        .and_then(|v| v.as_array())
    {
        let named: Option<Vec<String>> = names
            .iter()
            .map(|v| v.as_str().map(str::to_string))
            .collect();
        if let Some(named) = named.filter(|n| n.len() == ndim) {
            return named;
        }
    }

    (0..ndim).map(|i| format!("dim_{}", i)).collect()
}

/// The array's fill value as `f64`, for numeric data types.
fn fill_value_as_f64<S: ?Sized>(array: &Array<S>) -> Option<f64> {
    let bytes = array.fill_value().as_ne_bytes();

    macro_rules! decode {
        ($t:ty) => {
            bytes.try_into().ok().map(<$t>::from_ne_bytes).map(|v| v as f64)
        };
    }

    match array.data_type() {
        DataType::Float32 => decode!(f32),
        DataType::Float64 => decode!(f64),
        DataType::Int8 => decode!(i8),
        DataType::Int16 => decode!(i16),
        DataType::Int32 => decode!(i32),
        DataType::Int64 => decode!(i64),
        DataType::UInt8 => decode!(u8),
        DataType::UInt16 => decode!(u16),
        DataType::UInt32 => decode!(u32),
        DataType::UInt64 => decode!(u64),
        _ => None,
    }
}

/// Retrieve a subset, widening any numeric element type to `f64`.
fn retrieve_as_f64<S: ReadableStorageTraits + ?Sized + 'static>(
    array: &Array<S>,
    subset: &ArraySubset,
) -> std::result::Result<Vec<f64>, String> {
    macro_rules! retrieve {
        ($t:ty) => {
            array
                .retrieve_array_subset_elements::<$t>(subset)
                .map(|values| values.into_iter().map(|v| v as f64).collect())
                .map_err(|e| e.to_string())
        };
    }

    match array.data_type() {
        DataType::Float32 => retrieve!(f32),
        DataType::Float64 => retrieve!(f64),
        DataType::Int8 => retrieve!(i8),
        DataType::Int16 => retrieve!(i16),
        DataType::Int32 => retrieve!(i32),
        DataType::Int64 => retrieve!(i64),
        DataType::UInt8 => retrieve!(u8),
        DataType::UInt16 => retrieve!(u16),
        DataType::UInt32 => retrieve!(u32),
        DataType::UInt64 => retrieve!(u64),
        other => Err(format!("unsupported data type {:?}", other)),
    }
}
