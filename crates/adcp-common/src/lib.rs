//! Common types and utilities shared across the stick-plot crates.

pub mod records;
pub mod time;

pub use records::{format_depth, group_by_depth, sort_deepest_first, DepthGroup, DepthRange, FlatRecord};
pub use time::{date_num, from_date_num, parse_naive_utc, strip_zone_suffix, TimeParseError, TimeWindow};
