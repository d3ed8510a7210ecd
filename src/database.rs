use crate::{
    geo::{BoundingBox, Coord},
    report::{Report, ReportList, ReportSource},
    ArchiveError, HotspotResult,
};
use chrono::{DateTime, TimeZone, Utc};
use log::warn;
use rusqlite::{params, Connection, OpenFlags};
use std::path::Path;

/// Represents a connection to the archive where hazard reports are stored.
pub struct ReportDatabase {
    conn: Connection,
}

impl ReportDatabase {
    /// Open a connection to the archive, creating it if needed.
    ///
    /// The path ":memory:" opens a temporary in memory archive.
    pub fn connect<P: AsRef<Path>>(path: P) -> HotspotResult<Self> {
        let path = path.as_ref();

        let conn = Self::open_database_to_write(path)?;
        Ok(ReportDatabase { conn })
    }

    fn open_database_to_write(path: &Path) -> HotspotResult<Connection> {
        let conn = rusqlite::Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        // Only one writer is expected, waiting longer than this means something is stuck.
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        const QUERY: &str = include_str!("database/create_report_db.sql");
        conn.execute_batch(QUERY)?;

        Ok(conn)
    }

    /// Prepare to add reports to the archive.
    pub fn prepare_to_add_reports(&self) -> HotspotResult<ReportDatabaseAddReports> {
        const ADD_REPORT_QUERY: &str = include_str!("database/add_report.sql");

        let add_stmt = self.conn.prepare(ADD_REPORT_QUERY)?;

        Ok(ReportDatabaseAddReports {
            add_stmt,
            conn: &self.conn,
        })
    }

    /// The creation time of the newest report in the archive, if there are any.
    pub fn newest_report_time(&self) -> HotspotResult<Option<DateTime<Utc>>> {
        const QUERY: &str = include_str!("database/query_newest_report.sql");

        let newest: Option<i64> = self.conn.query_row(QUERY, [], |row| row.get(0))?;

        Ok(newest.and_then(|millis| Utc.timestamp_millis_opt(millis).single()))
    }

    /// The number of reports in the archive.
    pub fn count(&self) -> HotspotResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM reports", [], |row| row.get(0))?;

        Ok(count as usize)
    }

    /**
     * Query reports from the archive.
     *
     * #Arguments
     * start - the earliest creation time to include.
     * end - reports created at or after this time are excluded.
     * area - only reports located inside this box, edges included.
     *
     * #Returns
     * The reports ordered from oldest to newest.
     */
    pub fn query_reports(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        area: BoundingBox,
    ) -> HotspotResult<ReportList> {
        if start >= end {
            return Err(ArchiveError {
                msg: "the start of the time window must be before the end",
            }
            .into());
        }

        const QUERY: &str = include_str!("database/query_reports.sql");
        let mut stmt = self.conn.prepare(QUERY)?;

        let rows = stmt.query_map(
            params![
                start.timestamp_millis(),
                end.timestamp_millis(),
                area.ll.lat,
                area.ur.lat,
                area.ll.lon,
                area.ur.lon
            ],
            |row| {
                Ok(ReportRow {
                    id: row.get(0)?,
                    hazard_type: row.get(1)?,
                    description: row.get(2)?,
                    media_url: row.get(3)?,
                    is_verified: row.get(4)?,
                    source: row.get(5)?,
                    created_at: row.get(6)?,
                    lat: row.get(7)?,
                    lon: row.get(8)?,
                })
            },
        )?;

        let mut reports = vec![];
        let mut skipped = 0;
        for row in rows {
            match row?.into_report() {
                Some(report) => reports.push(report),
                None => skipped += 1,
            }
        }

        Ok(ReportList::with_skipped(reports, skipped))
    }
}

struct ReportRow {
    id: String,
    hazard_type: String,
    description: String,
    media_url: Option<String>,
    is_verified: bool,
    source: String,
    created_at: i64,
    lat: f64,
    lon: f64,
}

impl ReportRow {
    fn into_report(self) -> Option<Report> {
        let created_at = match Utc.timestamp_millis_opt(self.created_at).single() {
            Some(created_at) => created_at,
            None => {
                warn!(
                    "stored report {} has an invalid timestamp: {}",
                    self.id, self.created_at
                );
                return None;
            }
        };

        Some(Report {
            id: self.id,
            location: Coord {
                lat: self.lat,
                lon: self.lon,
            },
            hazard_type: self.hazard_type,
            description: self.description,
            media_url: self.media_url,
            is_verified: self.is_verified,
            source: ReportSource::from_name(&self.source),
            created_at,
        })
    }
}

pub struct ReportDatabaseAddReports<'a> {
    add_stmt: rusqlite::Statement<'a>,
    conn: &'a Connection,
}

impl<'a> ReportDatabaseAddReports<'a> {
    /// Add or replace a single report.
    pub fn add(&mut self, report: &Report) -> HotspotResult<()> {
        let _ = self.add_stmt.execute(params![
            report.id,
            report.hazard_type,
            report.description,
            report.media_url.as_deref(),
            report.is_verified,
            report.source.name(),
            report.created_at.timestamp_millis(),
            report.location.lat,
            report.location.lon,
        ])?;

        Ok(())
    }

    /// Adds a whole list of reports in a single transaction.
    pub fn add_all(&mut self, reports: &[Report]) -> HotspotResult<usize> {
        self.conn.execute("BEGIN TRANSACTION", [])?;

        for report in reports {
            if let Err(err) = self.add(report) {
                let _ = self.conn.execute("ROLLBACK", []);
                return Err(err);
            }
        }

        self.conn.execute("COMMIT", [])?;

        Ok(reports.len())
    }
}
