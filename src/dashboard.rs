/*! Summary statistics shown on the dashboard. */

use crate::report::{display_hazard_type, Report, ReportSource};
use rustc_hash::FxHashMap as HashMap;
use std::{
    cmp::Reverse,
    fmt::{self, Display},
};

/// Counts over a set of reports.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardStats {
    pub total: usize,
    /// Reports submitted through the app.
    pub user: usize,
    pub social_media: usize,
    pub verified: usize,
    /// Report counts keyed by the backend hazard value.
    pub by_hazard: HashMap<String, usize>,
}

impl DashboardStats {
    pub fn from_reports(reports: &[Report]) -> Self {
        let mut stats = DashboardStats {
            total: reports.len(),
            ..DashboardStats::default()
        };

        for report in reports {
            match report.source {
                ReportSource::User => stats.user += 1,
                ReportSource::SocialMedia => stats.social_media += 1,
                ReportSource::Other => {}
            }

            if report.is_verified {
                stats.verified += 1;
            }

            *stats
                .by_hazard
                .entry(report.hazard_type.clone())
                .or_insert(0) += 1;
        }

        stats
    }

    /// Hazards from most to least reported, ties in alphabetical order.
    pub fn hazards_by_count(&self) -> Vec<(&str, usize)> {
        let mut hazards: Vec<(&str, usize)> = self
            .by_hazard
            .iter()
            .map(|(hazard, &count)| (hazard.as_str(), count))
            .collect();

        hazards.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        hazards
    }
}

impl Display for DashboardStats {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        writeln!(f, "       Total Reports: {:>6}", self.total)?;
        writeln!(f, "        User Reports: {:>6}", self.user)?;
        writeln!(f, "Social Media Reports: {:>6}", self.social_media)?;
        write!(f,   "    Verified Reports: {:>6}", self.verified)?;

        for (hazard, count) in self.hazards_by_count() {
            write!(f, "\n{:>40}: {:>6}", display_hazard_type(hazard), count)?;
        }

        Ok(())
    }
}

/// Sort reports so the newest comes first, reports created at the same time keep their order.
pub fn most_recent_first(reports: &mut [Report]) {
    reports.sort_by_key(|r| Reverse(r.created_at));
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geo::Coord;
    use chrono::{TimeZone, Utc};

    fn report(id: &str, hazard: &str, source: ReportSource, verified: bool, day: u32) -> Report {
        let mut r = Report::new(id, Coord { lat: 0.0, lon: 0.0 });
        r.hazard_type = hazard.to_owned();
        r.source = source;
        r.is_verified = verified;
        r.created_at = Utc.with_ymd_and_hms(2025, 9, day, 12, 0, 0).unwrap();
        r
    }

    #[test]
    fn test_dashboard_counts() {
        let reports = vec![
            report("1", "oil_spill", ReportSource::User, true, 1),
            report("2", "oil_spill", ReportSource::SocialMedia, false, 2),
            report("3", "storm_surge", ReportSource::User, false, 3),
            report("4", "coastal_flooding", ReportSource::Other, true, 4),
            report("5", "storm_surge", ReportSource::User, true, 5),
        ];

        let stats = DashboardStats::from_reports(&reports);
        assert_eq!(stats.total, 5);
        assert_eq!(stats.user, 3);
        assert_eq!(stats.social_media, 1);
        assert_eq!(stats.verified, 3);
        assert_eq!(
            stats.hazards_by_count(),
            vec![("oil_spill", 2), ("storm_surge", 2), ("coastal_flooding", 1)]
        );

        let text = stats.to_string();
        assert!(text.contains("Total Reports:      5"));
        assert!(text.contains("Oil Spill:      2"));
    }

    #[test]
    fn test_empty_dashboard() {
        let stats = DashboardStats::from_reports(&[]);
        assert_eq!(stats, DashboardStats::default());
        assert!(stats.hazards_by_count().is_empty());
    }

    #[test]
    fn test_most_recent_first() {
        let mut reports = vec![
            report("old", "oil_spill", ReportSource::User, false, 1),
            report("new", "oil_spill", ReportSource::User, false, 9),
            report("mid-a", "oil_spill", ReportSource::User, false, 5),
            report("mid-b", "oil_spill", ReportSource::User, false, 5),
        ];

        most_recent_first(&mut reports);
        let ids: Vec<&str> = reports.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["new", "mid-a", "mid-b", "old"]);
    }
}
