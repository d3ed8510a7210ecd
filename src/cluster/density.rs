use serde::Serialize;
use strum::{Display, EnumIter, IntoStaticStr};

/**
 * How concentrated the reports in a cluster are relative to all the reports that were clustered.
 *
 * Each tier has a fixed color, a fixed real world radius for the circle drawn around the cluster,
 * and a scale factor used instead of the fixed radius when the map is zoomed far out.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr, Serialize)]
pub enum DensityTier {
    /// More than 40% of all reports.
    Critical,
    /// From 20% to 40% of all reports, inclusive.
    Moderate,
    /// Less than 20% of all reports.
    Low,
}

impl DensityTier {
    /// Classify a cluster by the percentage of all reports it holds.
    ///
    /// Anything that doesn't qualify for a higher tier, including NaN, is `Low`.
    pub fn from_percentage(percentage: f64) -> Self {
        use DensityTier::*;

        if percentage > 40.0 {
            Critical
        } else if percentage >= 20.0 {
            Moderate
        } else {
            Low
        }
    }

    /// Hex RGB color for this tier.
    pub fn color(&self) -> &'static str {
        use DensityTier::*;

        match self {
            Critical => "#FF4500",
            Moderate => "#FFD166",
            Low => "#4DB6AC",
        }
    }

    /// Radius of the circle drawn for a cluster in meters.
    pub fn fixed_radius(&self) -> f64 {
        use DensityTier::*;

        match self {
            Critical => 50_000.0,
            Moderate => 30_000.0,
            Low => 15_000.0,
        }
    }

    /// Multiplied by the viewport latitude span to get a radius in meters when zoomed out.
    pub fn zoom_scale_factor(&self) -> f64 {
        use DensityTier::*;

        match self {
            Critical => 10_000.0,
            Moderate => 6_000.0,
            Low => 3_000.0,
        }
    }

    /// Legend text.
    pub fn legend(&self) -> &'static str {
        use DensityTier::*;

        match self {
            Critical => "Critical (>40%)",
            Moderate => "Moderate (20-40%)",
            Low => "Low (<20%)",
        }
    }
}
