pub use cluster::{
    cluster_reports, Cluster, ClusterList, DensityTier, DEFAULT_DISTANCE_THRESHOLD, ZOOM_THRESHOLD,
};
pub use dashboard::{most_recent_first, DashboardStats};
pub use database::{ReportDatabase, ReportDatabaseAddReports};
pub use error::{ArchiveError, ReportError};
pub use geo::{BoundingBox, Coord, Geo};
pub use report::{display_hazard_type, Report, ReportList, ReportSource};

/// Result type used throughout the crate and by the command line tools.
pub type HotspotResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/**************************************************************************************************
 * Private Implementation
 *************************************************************************************************/
mod cluster;
mod dashboard;
mod database;
mod error;
mod geo;
mod report;
