//! Dataset access for ADCP current profiles.
//!
//! This crate covers the first two stages of the stick-plot pipeline:
//!
//! - **Loading**: open a Zarr store (HTTP, filesystem or in-memory), keep the
//!   requested variables that exist and slice them to a time window
//! - **Flattening**: turn the narrowed `[time, depth]` arrays into
//!   `FlatRecord`s grouped by depth
//!
//! # Architecture
//!
//! ```text
//! ArrayStore (ZarrStore / MemoryStore)
//!      │
//!      ▼
//! loader::load(store, window, names, required) ──► Dataset
//!                                          │
//!                                          ▼
//!                          table::flatten(dataset, suffix, depths)
//!                                          │
//!                                          ▼
//!                                  Vec<DepthGroup> (deepest first)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use adcp_dataset::{http, loader, table};
//!
//! let store = http::open_http_store("http://0.0.0.0:9000/zarr/")?;
//! let names = table::variables_for_instrument("1");
//! let required = table::required_variables("1");
//! let dataset = loader::load(&store, &window, &names, &required)?;
//! let groups = table::flatten(&dataset, "1", &DepthRange::new(0.0, 50.0));
//! ```

pub mod cf_time;
pub mod error;
pub mod loader;
pub mod store;
pub mod table;
pub mod types;

pub use error::{DatasetError, Result};
pub use loader::load;
pub use store::http;
pub use store::{ArrayStore, MemoryStore, ZarrStore};
pub use table::{flatten, required_variables, to_records, variables_for_instrument};
pub use types::{Dataset, Variable, VariableInfo, DEPTH_DIM, TIME_DIM};
