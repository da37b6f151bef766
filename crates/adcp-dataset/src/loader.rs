//! Dataset loading: variable selection and time-window slicing.

use std::ops::Range;

use tracing::{debug, info, warn};

use adcp_common::TimeWindow;

use crate::cf_time::decode_times;
use crate::error::{DatasetError, Result};
use crate::store::{full_selection, ArrayStore};
use crate::types::{Dataset, Variable, VariableInfo, TIME_DIM};

/// Load the requested variables for a time window.
///
/// Only the time indices inside `window` (both ends inclusive) are read from
/// the store. Names the store does not hold are skipped, as are variables
/// outside `required` that cannot be read as numbers. At least one name in
/// `required` must be loaded; with an empty `required`, any variable will do.
///
/// # Errors
/// `DataUnavailable` when the store cannot be reached, has no `time`
/// coordinate, or holds none of the required variables.
pub fn load<S: ArrayStore + ?Sized>(
    store: &S,
    window: &TimeWindow,
    variable_names: &[String],
    required: &[String],
) -> Result<Dataset> {
    let location = store.location().to_string();
    let unavailable =
        |e: DatasetError| DatasetError::unavailable(format!("{}: {}", location, e));

    let time_info = store
        .describe(TIME_DIM)
        .map_err(unavailable)?
        .ok_or_else(|| {
            DatasetError::unavailable(format!("no '{}' coordinate in {}", TIME_DIM, location))
        })?;

    if time_info.shape.len() != 1 {
        return Err(DatasetError::invalid_metadata(format!(
            "time coordinate must be 1-D, found shape {:?}",
            time_info.shape
        )));
    }

    let raw_times = read_masked(store, &time_info, &full_selection(&time_info.shape))
        .map_err(unavailable)?;
    let axis = decode_times(&raw_times, time_info.attr_str("units"))?;
    let range = window.index_range(&axis);

    info!(
        store = %location,
        start = %window.start,
        end = %window.end,
        available = axis.len(),
        selected = range.len(),
        "Selected time window"
    );

    let mut dataset = Dataset::new(axis[range.clone()].to_vec());

    for name in variable_names {
        if name == TIME_DIM {
            continue;
        }

        let Some(info) = store.describe(name).map_err(unavailable)? else {
            debug!(variable = %name, "Variable not in store, skipping");
            continue;
        };

        let variable = match read_variable(store, &info, &range, axis.len()) {
            Ok(variable) => variable,
            Err(e) if !required.contains(name) && !matches!(e, DatasetError::Storage(_)) => {
                debug!(variable = %name, error = %e, "Variable not readable, skipping");
                continue;
            }
            Err(e @ DatasetError::InvalidMetadata(_)) => return Err(e),
            Err(e) => return Err(unavailable(e)),
        };
        dataset.insert(name.clone(), variable);
    }

    let found_required = if required.is_empty() {
        !dataset.variables.is_empty()
    } else {
        required.iter().any(|name| dataset.contains(name))
    };
    if !found_required {
        let wanted = if required.is_empty() { variable_names } else { required };
        return Err(DatasetError::unavailable(format!(
            "none of the variables {:?} exist in {}",
            wanted, location
        )));
    }

    if dataset.times.is_empty() {
        warn!(store = %location, "No time steps inside the requested window");
    }

    Ok(dataset)
}

/// Read one variable restricted to the selected time steps.
fn read_variable<S: ArrayStore + ?Sized>(
    store: &S,
    info: &VariableInfo,
    range: &Range<usize>,
    time_len: usize,
) -> Result<Variable> {
    let selection = time_selection(info, range, time_len)?;
    let values = read_masked(store, info, &selection)?;
    let shape = selection.iter().map(|r| (r.end - r.start) as usize).collect();

    let mut variable = Variable::new(info.dims.clone(), shape, values)?;
    variable.attributes = info.attributes.clone();
    Ok(variable)
}

/// Selection restricting the time axis of `info` to `range`.
fn time_selection(
    info: &VariableInfo,
    range: &Range<usize>,
    time_len: usize,
) -> Result<Vec<Range<u64>>> {
    info.dims
        .iter()
        .zip(&info.shape)
        .map(|(dim, &len)| {
            if dim != TIME_DIM {
                return Ok(0..len);
            }
            if len != time_len as u64 {
                return Err(DatasetError::invalid_metadata(format!(
                    "'{}' has {} time steps, coordinate has {}",
                    info.name, len, time_len
                )));
            }
            Ok(range.start as u64..range.end as u64)
        })
        .collect()
}

/// Read a selection with sentinel values replaced by NaN.
fn read_masked<S: ArrayStore + ?Sized>(
    store: &S,
    info: &VariableInfo,
    selection: &[Range<u64>],
) -> Result<Vec<f64>> {
    let mut values = store.read(&info.name, selection)?;
    let missing = info.missing_values();
    if !missing.is_empty() {
        for v in values.iter_mut() {
            if missing.contains(v) {
                *v = f64::NAN;
            }
        }
    }
    Ok(values)
}
