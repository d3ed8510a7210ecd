/*!
 * Types and functions for working with clusters.
 *
 * A cluster describes the aggregate properties of a group of hazard reports that lie close to
 * the first report (the seed) that started the group. Clusters are rebuilt from scratch every
 * time the reports or the threshold change, they are never updated in place.
 */

pub use cluster::{cluster_reports, Cluster};
pub use cluster_list::ClusterList;
pub use density::DensityTier;

/// Default distance threshold, in degrees, used to group reports on the map.
pub const DEFAULT_DISTANCE_THRESHOLD: f64 = 0.5;

/// Viewport latitude span, in degrees, above which circles are scaled with the zoom level.
pub const ZOOM_THRESHOLD: f64 = 0.5;

mod cluster;
mod cluster_list;
mod density;
