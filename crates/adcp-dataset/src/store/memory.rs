//! In-memory array store.

use std::collections::BTreeMap;
use std::ops::Range;

use serde_json::{Map, Value};

use super::{select_ranges, validate_selection, ArrayStore};
use crate::error::{DatasetError, Result};
use crate::types::VariableInfo;

/// Arrays held in memory, addressed by name.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    location: String,
    arrays: BTreeMap<String, (VariableInfo, Vec<f64>)>,
    offline: bool,
}

impl MemoryStore {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            ..Default::default()
        }
    }

    /// A store whose every call fails, standing in for an unreachable server.
    pub fn unreachable(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            offline: true,
            ..Default::default()
        }
    }

    /// Add an array. Values are row-major over `shape`.
    pub fn with_array(mut self, name: &str, dims: &[&str], shape: &[u64], values: Vec<f64>) -> Self {
        self.insert(name, dims, shape, values);
        self
    }

    pub fn insert(&mut self, name: &str, dims: &[&str], shape: &[u64], values: Vec<f64>) {
        let info = VariableInfo {
            name: name.to_string(),
            dims: dims.iter().map(|d| d.to_string()).collect(),
            shape: shape.to_vec(),
            attributes: Map::new(),
            fill_value: None,
        };
        self.arrays.insert(name.to_string(), (info, values));
    }

    /// Set an attribute on an existing array.
    pub fn with_attribute(mut self, name: &str, key: &str, value: Value) -> Self {
        if let Some((info, _)) = self.arrays.get_mut(name) {
            info.attributes.insert(key.to_string(), value);
        }
        self
    }

    fn check_online(&self) -> Result<()> {
        if self.offline {
            return Err(DatasetError::storage(format!(
                "cannot reach store at {}",
                self.location
            )));
        }
        Ok(())
    }
}

impl ArrayStore for MemoryStore {
    fn location(&self) -> &str {
        &self.location
    }

    fn describe(&self, name: &str) -> Result<Option<VariableInfo>> {
        self.check_online()?;
        Ok(self.arrays.get(name).map(|(info, _)| info.clone()))
    }

    fn read(&self, name: &str, selection: &[Range<u64>]) -> Result<Vec<f64>> {
        self.check_online()?;
        let (info, values) = self
            .arrays
            .get(name)
            .ok_or_else(|| DatasetError::read_failed(name, "no such array"))?;

        validate_selection(name, &info.shape, selection)?;
        if values.len() as u64 != info.num_elements() {
            return Err(DatasetError::invalid_metadata(format!(
                "array '{}' holds {} values for shape {:?}",
                name,
                values.len(),
                info.shape
            )));
        }

        Ok(select_ranges(values, &info.shape, selection))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_describe_and_read() {
        let store = MemoryStore::new("memory://test")
            .with_array("depth", &["depth"], &[3], vec![2.0, 4.0, 6.0])
            .with_attribute("depth", "units", json!("m"));

        let info = store.describe("depth").unwrap().unwrap();
        assert_eq!(info.dims, vec!["depth"]);
        assert_eq!(info.attr_str("units"), Some("m"));

        assert_eq!(store.read("depth", &[1..3]).unwrap(), vec![4.0, 6.0]);
        assert!(store.describe("speed").unwrap().is_none());
    }

    #[test]
    fn test_unreachable_store_fails() {
        let store = MemoryStore::unreachable("http://nowhere/zarr/");
        assert!(matches!(
            store.describe("time"),
            Err(DatasetError::Storage(_))
        ));
    }
}
