use super::{Cluster, DensityTier};
use crate::report::Report;
use serde::Serialize;
use std::fmt::{self, Display};

/**
 * Keep a cluster list with the parameters it was derived from.
 */
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterList {
    /// Grouping distance in degrees.
    threshold: f64,
    /// The number of reports that were clustered.
    total_reports: usize,
    /// Clusters in the order their seeds were found.
    clusters: Vec<Cluster>,
}

static_assertions::assert_impl_all!(ClusterList: Send, Sync);

impl ClusterList {
    /**
     * Cluster a list of reports and keep the metadata.
     *
     * #Arguments
     * reports - the reports to group.
     * threshold - the grouping distance in degrees.
     */
    pub fn from_reports(reports: &[Report], threshold: f64) -> Self {
        let clusters = Cluster::from_points(reports, threshold);

        log::debug!(
            "clustered {} reports into {} clusters at threshold {}",
            reports.len(),
            clusters.len(),
            threshold
        );

        ClusterList {
            threshold,
            total_reports: reports.len(),
            clusters,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn total_reports(&self) -> usize {
        self.total_reports
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn take_clusters(self) -> Vec<Cluster> {
        self.clusters
    }

    /// The cluster with the most reports, the earliest seed wins ties.
    pub fn hottest(&self) -> Option<&Cluster> {
        self.clusters
            .iter()
            .fold(None, |best: Option<&Cluster>, c| match best {
                Some(b) if b.count >= c.count => Some(b),
                _ => Some(c),
            })
    }

    /// How many clusters fall in a tier.
    pub fn count_in_tier(&self, tier: DensityTier) -> usize {
        self.clusters.iter().filter(|c| c.tier == tier).count()
    }

    /// The reports that make up a cluster, `reports` must be the slice that was clustered.
    pub fn members_of<'a>(
        cluster: &'a Cluster,
        reports: &'a [Report],
    ) -> impl Iterator<Item = &'a Report> + 'a {
        cluster.members.iter().filter_map(move |&m| reports.get(m))
    }
}

impl Display for ClusterList {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        writeln!(f, "{:>8} {:>6} {:>7} {:>11} {:>12} {:>8} {:>10}",
            "Tier", "Count", "Share", "Latitude", "Longitude", "Color", "Extent")?;

        for c in &self.clusters {
            writeln!(f, "{:>8} {:>6} {:>6.1}% {:>11.6} {:>12.6} {:>8} {:>7.1} km",
                c.tier, c.count, c.percentage, c.centroid.lat, c.centroid.lon, c.color,
                c.extent_km)?;
        }

        write!(f, "{} reports in {} clusters (threshold {} deg)",
            self.total_reports, self.clusters.len(), self.threshold)
    }
}
