//! Shared test utilities for the ADCP stick-plot workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Synthetic ADCP profile generators
//! - Common fixtures (depth ranges, palettes, config dates)
//! - Temporary output paths
//!
//! It holds plain data only, so any crate in the workspace can use it as a
//! dev-dependency without a cycle.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! ```ignore
//! use test_utils::{create_adcp_profile, assert_approx_eq};
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;
pub use paths::*;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(0.2501_f64, 0.25_f64, 0.001_f64); // passes
/// assert_approx_eq!(0.3_f32, 0.25_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Macro for approximate equality of (east, north) component pairs.
///
/// ```ignore
/// use test_utils::assert_components_approx_eq;
///
/// assert_components_approx_eq!((0.25, 0.0), (0.2500001, 0.0), 1e-6);
/// ```
#[macro_export]
macro_rules! assert_components_approx_eq {
    (($e1:expr, $n1:expr), ($e2:expr, $n2:expr), $epsilon:expr) => {{
        $crate::assert_approx_eq!($e1, $e2, $epsilon);
        $crate::assert_approx_eq!($n1, $n2, $epsilon);
    }};
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let (e1, n1) = $left;
        let (e2, n2) = $right;
        $crate::assert_approx_eq!(e1, e2, $epsilon);
        $crate::assert_approx_eq!(n1, n2, $epsilon);
    }};
}
