//! Generators for synthetic ADCP current profiles.
//!
//! The patterns are predictable so tests can check individual cells after
//! loading, flattening or rendering.

/// CF units for generated time coordinates.
pub const PROFILE_TIME_UNITS: &str = "hours since 2024-05-01 00:00:00";

/// A synthetic `[time, depth]` current profile.
///
/// Speeds are in cm/s and directions in degrees clockwise from north, both
/// row-major with time as the outer axis.
#[derive(Debug, Clone, PartialEq)]
pub struct AdcpProfile {
    /// Hours since the reference in [`PROFILE_TIME_UNITS`].
    pub hours: Vec<f64>,
    pub depths: Vec<f64>,
    pub speed_cm_s: Vec<f64>,
    pub direction_deg: Vec<f64>,
}

impl AdcpProfile {
    pub fn n_times(&self) -> usize {
        self.hours.len()
    }

    pub fn n_depths(&self) -> usize {
        self.depths.len()
    }

    /// Row-major index of a (time, depth) cell.
    pub fn index(&self, time_idx: usize, depth_idx: usize) -> usize {
        time_idx * self.depths.len() + depth_idx
    }

    /// Mark a cell's speed as missing.
    pub fn with_missing_speed(mut self, time_idx: usize, depth_idx: usize) -> Self {
        let i = self.index(time_idx, depth_idx);
        self.speed_cm_s[i] = f64::NAN;
        self
    }

    /// Mark a cell's direction as missing.
    pub fn with_missing_direction(mut self, time_idx: usize, depth_idx: usize) -> Self {
        let i = self.index(time_idx, depth_idx);
        self.direction_deg[i] = f64::NAN;
        self
    }

    /// Shape as stored: `[time, depth]`.
    pub fn shape(&self) -> [u64; 2] {
        [self.hours.len() as u64, self.depths.len() as u64]
    }
}

/// Creates an hourly profile over the given depths.
///
/// Cell values:
/// - speed (cm/s) = `5 + 10 * (t % 6) + d`, cycling through every colour
///   bucket from 0.05 m/s up to 0.55 m/s
/// - direction (deg) = `(45 * t + 10 * d) % 360`
///
/// # Example
///
/// ```
/// use test_utils::create_adcp_profile;
///
/// let p = create_adcp_profile(3, &[5.0, 10.0]);
/// assert_eq!(p.speed_cm_s.len(), 6);
/// assert_eq!(p.speed_cm_s[0], 5.0);  // t=0, d=0
/// assert_eq!(p.speed_cm_s[3], 16.0); // t=1, d=1
/// ```
pub fn create_adcp_profile(n_times: usize, depths: &[f64]) -> AdcpProfile {
    let n_depths = depths.len();
    let mut speed = Vec::with_capacity(n_times * n_depths);
    let mut direction = Vec::with_capacity(n_times * n_depths);

    for t in 0..n_times {
        for d in 0..n_depths {
            speed.push(5.0 + 10.0 * (t % 6) as f64 + d as f64);
            direction.push(((45 * t + 10 * d) % 360) as f64);
        }
    }

    AdcpProfile {
        hours: (0..n_times).map(|t| t as f64).collect(),
        depths: depths.to_vec(),
        speed_cm_s: speed,
        direction_deg: direction,
    }
}

/// Creates a profile where every cell has the same speed and direction.
pub fn create_uniform_profile(
    n_times: usize,
    depths: &[f64],
    speed_cm_s: f64,
    direction_deg: f64,
) -> AdcpProfile {
    let cells = n_times * depths.len();
    AdcpProfile {
        hours: (0..n_times).map(|t| t as f64).collect(),
        depths: depths.to_vec(),
        speed_cm_s: vec![speed_cm_s; cells],
        direction_deg: vec![direction_deg; cells],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_layout() {
        let p = create_adcp_profile(7, &[5.0, 10.0, 15.0]);
        assert_eq!(p.shape(), [7, 3]);
        assert_eq!(p.speed_cm_s.len(), 21);
        assert_eq!(p.speed_cm_s[p.index(6, 0)], 5.0); // t % 6 wraps
        assert_eq!(p.direction_deg[p.index(1, 2)], 65.0);
    }

    #[test]
    fn test_missing_cells() {
        let p = create_adcp_profile(2, &[5.0])
            .with_missing_speed(0, 0)
            .with_missing_direction(1, 0);
        assert!(p.speed_cm_s[0].is_nan());
        assert!(p.direction_deg[1].is_nan());
    }

    #[test]
    fn test_uniform_profile() {
        let p = create_uniform_profile(4, &[1.0, 2.0], 25.0, 90.0);
        assert!(p.speed_cm_s.iter().all(|&s| s == 25.0));
        assert_eq!(p.hours, vec![0.0, 1.0, 2.0, 3.0]);
    }
}
