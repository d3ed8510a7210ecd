use hazardspots::{
    cluster_reports, BoundingBox, Cluster, ClusterList, Coord, DashboardStats, DensityTier,
    ReportDatabase, ReportList, DEFAULT_DISTANCE_THRESHOLD,
};
use proptest::prelude::*;

/*-------------------------------------------------------------------------------------------------
 *
 *                              Reports endpoint to map hotspots
 *
 *-----------------------------------------------------------------------------------------------*/
const RESPONSE: &str = r#"{
    "reports": [
        { "_id": "r1", "hazardType": "oil_spill", "source": "user", "isVerified": true,
          "createdAt": "2025-09-20T08:00:00Z",
          "location": { "type": "Point", "coordinates": [80.27, 13.08] } },
        { "_id": "r2", "hazardType": "oil_spill", "source": "user",
          "createdAt": "2025-09-20T09:00:00Z",
          "location": { "type": "Point", "coordinates": [80.30, 13.10] } },
        { "_id": "r3", "hazardType": "storm_surge", "source": "social_media",
          "createdAt": "2025-09-21T09:00:00Z",
          "location": { "type": "Point", "coordinates": [80.10, 12.90] } },
        { "_id": "r4", "hazardType": "coastal_flooding", "source": "user",
          "createdAt": "2025-09-22T09:00:00Z",
          "location": { "type": "Point", "coordinates": [72.87, 19.07] } },
        { "_id": "r5", "hazardType": "coastal_flooding", "source": "social_media",
          "isVerified": true,
          "createdAt": "2025-09-23T09:00:00Z",
          "location": { "type": "Point", "coordinates": [72.80, 19.00] } },
        { "_id": "broken", "hazardType": "shipwreck",
          "createdAt": "2025-09-23T10:00:00Z" }
    ]
}"#;

#[test]
fn test_endpoint_response_to_hotspots() {
    let reports = ReportList::from_json_str(RESPONSE).unwrap();
    assert_eq!(reports.len(), 5);
    assert_eq!(reports.skipped(), 1);

    let clusters = ClusterList::from_reports(reports.reports(), DEFAULT_DISTANCE_THRESHOLD);
    assert_eq!(clusters.total_reports(), 5);
    assert_eq!(clusters.len(), 2);

    let chennai = &clusters.clusters()[0];
    assert_eq!(chennai.count, 3);
    assert_eq!(chennai.members, vec![0, 1, 2]);
    assert_eq!(chennai.percentage, 60.0);
    assert_eq!(chennai.tier, DensityTier::Critical);
    assert!(chennai.centroid.is_close(
        Coord {
            lat: (13.08 + 13.10 + 12.90) / 3.0,
            lon: (80.27 + 80.30 + 80.10) / 3.0
        },
        1.0e-9
    ));

    let mumbai = &clusters.clusters()[1];
    assert_eq!(mumbai.count, 2);
    assert_eq!(mumbai.percentage, 40.0);
    assert_eq!(mumbai.tier, DensityTier::Moderate);

    let stats = DashboardStats::from_reports(reports.reports());
    assert_eq!(stats.total, 5);
    assert_eq!(stats.user, 3);
    assert_eq!(stats.social_media, 2);
    assert_eq!(stats.verified, 2);
}

#[test]
fn test_archive_to_hotspots() {
    let reports = ReportList::from_json_str(RESPONSE).unwrap();

    let db = ReportDatabase::connect(":memory:").unwrap();
    db.prepare_to_add_reports()
        .unwrap()
        .add_all(reports.reports())
        .unwrap();

    let start = "2025-09-01T00:00:00Z".parse().unwrap();
    let end = "2025-10-01T00:00:00Z".parse().unwrap();
    let west_coast: BoundingBox = "15,70,22,75".parse().unwrap();

    let west = db.query_reports(start, end, west_coast).unwrap();
    assert_eq!(west.len(), 2);

    let clusters = cluster_reports(west.reports(), DEFAULT_DISTANCE_THRESHOLD);
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].count, 2);
    assert_eq!(clusters[0].percentage, 100.0);
    assert_eq!(clusters[0].tier, DensityTier::Critical);
}

/*-------------------------------------------------------------------------------------------------
 *
 *                                    Clustering properties
 *
 *-----------------------------------------------------------------------------------------------*/
fn to_coords(pairs: &[(f64, f64)]) -> Vec<Coord> {
    pairs.iter().map(|&(lat, lon)| Coord { lat, lon }).collect()
}

fn check_partition(clusters: &[Cluster], n: usize) -> Result<(), TestCaseError> {
    let mut seen = vec![0u32; n];
    for cluster in clusters {
        prop_assert_eq!(cluster.count, cluster.members.len());
        for &m in &cluster.members {
            prop_assert!(m < n);
            seen[m] += 1;
        }
    }

    prop_assert!(seen.iter().all(|&times| times == 1));
    prop_assert_eq!(clusters.iter().map(|c| c.count).sum::<usize>(), n);

    Ok(())
}

proptest! {
    #[test]
    fn every_report_lands_in_exactly_one_cluster(
        pairs in prop::collection::vec((-5.0f64..5.0, -5.0f64..5.0), 0..60),
        threshold in 0.0f64..3.0,
    ) {
        let pts = to_coords(&pairs);
        let clusters = Cluster::from_points(&pts, threshold);

        check_partition(&clusters, pts.len())?;

        if pts.is_empty() {
            prop_assert!(clusters.is_empty());
        }
    }

    #[test]
    fn members_are_within_threshold_of_their_seed(
        pairs in prop::collection::vec((-5.0f64..5.0, -5.0f64..5.0), 1..60),
        threshold in 0.01f64..3.0,
    ) {
        let pts = to_coords(&pairs);
        let clusters = Cluster::from_points(&pts, threshold);

        for cluster in &clusters {
            let seed = pts[cluster.members[0]];
            for &m in &cluster.members[1..] {
                prop_assert!(m > cluster.members[0]);
                prop_assert!(seed.planar_distance(pts[m]) < threshold);
            }
        }

        // Seeds are found in input order.
        let seeds: Vec<usize> = clusters.iter().map(|c| c.members[0]).collect();
        prop_assert!(seeds.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn reordering_keeps_a_valid_partition(
        pairs in prop::collection::vec((-5.0f64..5.0, -5.0f64..5.0), 0..40),
        threshold in 0.0f64..3.0,
    ) {
        let pts = to_coords(&pairs);
        let mut reversed = pts.clone();
        reversed.reverse();

        let forward = Cluster::from_points(&pts, threshold);
        let backward = Cluster::from_points(&reversed, threshold);

        check_partition(&forward, pts.len())?;
        check_partition(&backward, reversed.len())?;

        let total = |clusters: &[Cluster]| clusters.iter().map(|c| c.count).sum::<usize>();
        prop_assert_eq!(total(&forward), total(&backward));
    }

    #[test]
    fn percentages_and_tiers_are_consistent(
        pairs in prop::collection::vec((-5.0f64..5.0, -5.0f64..5.0), 1..60),
        threshold in 0.0f64..3.0,
    ) {
        let pts = to_coords(&pairs);
        let clusters = Cluster::from_points(&pts, threshold);

        let share: f64 = clusters.iter().map(|c| c.percentage).sum();
        prop_assert!((share - 100.0).abs() < 1.0e-6);

        for c in &clusters {
            prop_assert_eq!(c.tier, DensityTier::from_percentage(c.percentage));
            prop_assert_eq!(c.color, c.tier.color());
            prop_assert_eq!(c.fixed_radius, c.tier.fixed_radius());
        }
    }

    #[test]
    fn clustering_is_repeatable(
        pairs in prop::collection::vec((-5.0f64..5.0, -5.0f64..5.0), 0..40),
        threshold in 0.0f64..3.0,
    ) {
        let pts = to_coords(&pairs);
        prop_assert_eq!(
            Cluster::from_points(&pts, threshold),
            Cluster::from_points(&pts, threshold)
        );
    }
}
