//! Common test fixtures for stick-plot tests.

/// Configured date strings as they appear in config files.
pub mod dates {
    /// Start of the generated profile's first day.
    pub const START: &str = "2024-05-01T00:00:00Z";

    /// End of the first day.
    pub const END: &str = "2024-05-01T23:59:59Z";

    /// Start with an explicit offset instead of `Z`.
    pub const START_WITH_OFFSET: &str = "2024-05-01T00:00:00+00:00";

    /// A window entirely after the generated data.
    pub const LATE_START: &str = "2025-01-01T00:00:00Z";
    pub const LATE_END: &str = "2025-01-02T00:00:00Z";
}

/// Depth bins and ranges in metres.
pub mod depths {
    /// Three bins, shallowest first as stored.
    pub const BINS: [f64; 3] = [5.0, 10.0, 15.0];

    /// Range covering every bin.
    pub const ALL: (f64, f64) = (0.0, 50.0);

    /// Range whose maximum is exactly the middle bin.
    pub const UPPER_TWO: (f64, f64) = (0.0, 10.0);

    /// Range containing no bins.
    pub const NONE: (f64, f64) = (100.0, 200.0);
}

/// Colour palettes, slowest bucket first.
pub mod palettes {
    /// Named-colour palette.
    pub const NAMED: [&str; 6] = ["blue", "green", "yellow", "orange", "red", "purple"];

    /// Hex palette.
    pub const HEX: [&str; 6] = [
        "#0000ff", "#00ff00", "#ffff00", "#ffa500", "#ff0000", "#800080",
    ];
}

/// Instrument suffixes.
pub mod instruments {
    pub const PRIMARY: &str = "1";
    pub const SECONDARY: &str = "2";
}
