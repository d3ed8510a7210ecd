use super::{DensityTier, ZOOM_THRESHOLD};
use crate::{
    geo::{Coord, Geo},
    report::Report,
};
use serde::Serialize;

/**
 * The aggregate properties of a group of reports close to a common seed report.
 */
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    /// Derived from the centroid, so the same input always produces the same id.
    ///
    /// Clusters with the same centroid share an id. That happens when identical points end up in
    /// separate clusters, e.g. duplicates with a threshold of zero or less.
    pub id: String,
    /// Average latitude and longitude of the members.
    #[serde(rename = "center")]
    pub centroid: Coord,
    /// The number of reports in this cluster.
    pub count: usize,
    /// Share of all the clustered reports that are in this cluster, 0 to 100.
    pub percentage: f64,
    pub tier: DensityTier,
    /// Hex RGB color for the tier.
    pub color: &'static str,
    /// Radius of the circle to draw in meters.
    pub fixed_radius: f64,
    /// Radius per degree of viewport latitude span, used when zoomed out.
    pub zoom_scale_factor: f64,
    /// The distance from the centroid to the farthest member in kilometers.
    pub extent_km: f64,
    /// Indexes of the members in the clustered slice, the seed is first.
    pub members: Vec<usize>,
}

static_assertions::assert_impl_all!(Cluster: Send, Sync);

impl Cluster {
    /**
     * Group points into clusters around seed points.
     *
     * Points are visited in order. The first point not yet in a cluster becomes the seed of a new
     * cluster, and every later point not yet in a cluster that is strictly closer than
     * `distance_threshold` to the seed joins it. Distance is always measured from the seed, so
     * two members can be farther apart than the threshold, and membership never chains through
     * other members. Distances are planar, in degrees.
     *
     * A threshold that is zero, negative, or NaN puts every point in its own cluster.
     *
     * #Arguments
     * points - anything with a location.
     * distance_threshold - the grouping distance in degrees.
     *
     * #Returns
     * The clusters in the order their seeds were found.
     */
    pub fn from_points<T: Geo>(points: &[T], distance_threshold: f64) -> Vec<Self> {
        let total = points.len();
        let mut clusters: Vec<Self> = vec![];
        let mut visited = vec![false; total];
        let mut members: Vec<usize> = vec![];

        for i in 0..total {
            if visited[i] {
                continue;
            }

            visited[i] = true;
            members.push(i);
            let seed = points[i].centroid();

            for j in (i + 1)..total {
                if visited[j] {
                    continue;
                }

                if seed.planar_distance(points[j].centroid()) < distance_threshold {
                    visited[j] = true;
                    members.push(j);
                }
            }

            clusters.push(Self::summarize(points, std::mem::take(&mut members), total));
        }

        clusters
    }

    fn summarize<T: Geo>(points: &[T], members: Vec<usize>, total: usize) -> Self {
        let count = members.len();

        let mut centroid = Coord { lat: 0.0, lon: 0.0 };
        for &m in &members {
            let Coord { lat, lon } = points[m].centroid();
            centroid.lat += lat;
            centroid.lon += lon;
        }
        centroid.lat /= count as f64;
        centroid.lon /= count as f64;

        let extent_km = members
            .iter()
            .map(|&m| centroid.great_circle_distance(points[m].centroid()))
            .fold(0.0, f64::max);

        // Multiply first so whole number shares like 2 of 10 come out exact.
        let percentage = count as f64 * 100.0 / total as f64;
        let tier = DensityTier::from_percentage(percentage);

        Cluster {
            id: format!("cluster-{}-{}", centroid.lat, centroid.lon),
            centroid,
            count,
            percentage,
            tier,
            color: tier.color(),
            fixed_radius: tier.fixed_radius(),
            zoom_scale_factor: tier.zoom_scale_factor(),
            extent_km,
            members,
        }
    }

    /**
     * The radius of the circle to draw for the current viewport.
     *
     * When the map is zoomed out past [ZOOM_THRESHOLD] the fixed radius would be too small to
     * see, so the zoom scale factor is multiplied by the viewport's latitude span instead.
     *
     * #Arguments
     * latitude_delta - the latitude span of the viewport in degrees.
     *
     * #Returns
     * The radius in meters.
     */
    pub fn render_radius(&self, latitude_delta: f64) -> f64 {
        if latitude_delta > ZOOM_THRESHOLD {
            self.zoom_scale_factor * latitude_delta
        } else {
            self.fixed_radius
        }
    }
}

/// Cluster reports for display on the map.
///
/// See [Cluster::from_points] for how the grouping works.
pub fn cluster_reports(reports: &[Report], distance_threshold: f64) -> Vec<Cluster> {
    Cluster::from_points(reports, distance_threshold)
}
