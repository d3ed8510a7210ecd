use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use clap::Parser;
use hazardspots::{
    display_hazard_type, most_recent_first, BoundingBox, DashboardStats, HotspotResult,
    ReportDatabase, ReportList,
};
use log::{info, LevelFilter};
use simple_logger::SimpleLogger;
use std::{
    fmt::{self, Display},
    path::PathBuf,
};

/*-------------------------------------------------------------------------------------------------
 *                                     Command Line Options
 *-----------------------------------------------------------------------------------------------*/

///
/// Summarize hazard reports the way the app dashboard does.
///
/// Prints the report totals by source and verification, the count per hazard type, and the most
/// recent reports.
///
#[derive(Debug, Parser)]
#[clap(bin_name = "dashboard")]
#[clap(author, version, about)]
struct DashboardOptionsInit {
    /// The path to the report archive.
    ///
    /// If this is not specified, then the program will check for it in the "HOTSPOTS_DB"
    /// environment variable.
    #[clap(short, long)]
    #[clap(env = "HOTSPOTS_DB")]
    db: Option<PathBuf>,

    /// Read reports from this backend response file instead of the archive.
    #[clap(short, long)]
    json: Option<PathBuf>,

    /// Only reports created after this time (UTC) in the format YYYY-MM-DD-HH.
    #[clap(short, long, parse(try_from_str=parse_datetime))]
    since: Option<DateTime<Utc>>,

    /// How many of the most recent reports to list.
    #[clap(short, long, default_value_t = 5)]
    recent: usize,

    /// Verbose output
    #[clap(short, long)]
    verbose: bool,
}

/// Parse a command line datetime
fn parse_datetime(dt_str: &str) -> HotspotResult<DateTime<Utc>> {
    const TIME_FORMAT: &str = "%Y-%m-%d-%H:%M:%S";
    let t_str = format!("{}:00:00", dt_str);

    let naive = NaiveDateTime::parse_from_str(&t_str, TIME_FORMAT)?;
    Ok(Utc.from_utc_datetime(&naive))
}

impl Display for DashboardOptionsInit {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        writeln!(f, "\n")?; // yes, two blank lines.
        if let Some(json) = &self.json {
            writeln!(f, "JSON File: {}", json.display())?;
        } else if let Some(db) = &self.db {
            writeln!(f, "  Archive: {}", db.display())?;
        }
        if let Some(since) = self.since {
            writeln!(f, "    Since: {}", since)?;
        }
        writeln!(f, "   Recent: {}", self.recent)?;
        writeln!(f, "\n")?; // yes, two blank lines.

        Ok(())
    }
}

/*-------------------------------------------------------------------------------------------------
 *                                             Main
 *-----------------------------------------------------------------------------------------------*/
fn main() -> HotspotResult<()> {
    let opts = DashboardOptionsInit::parse();

    let level = if opts.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    SimpleLogger::new().with_level(level).init()?;

    if opts.verbose {
        info!(target: "startup", "{}", opts);
    }

    let mut reports = if let Some(json) = &opts.json {
        ReportList::from_json_file(json)?
    } else if let Some(db) = &opts.db {
        let start = opts.since.unwrap_or_else(DateTime::<Utc>::default);
        let end = Utc::now() + Duration::days(1);

        let db = ReportDatabase::connect(db)?;
        db.query_reports(start, end, BoundingBox::WORLD)?
    } else {
        return Err("Either --json or --db (or HOTSPOTS_DB) must be given".into());
    };

    if let Some(since) = opts.since {
        reports.retain_newer_than(since);
    }

    if reports.skipped() > 0 {
        info!("Skipped {} malformed reports.", reports.skipped());
    }

    let mut reports = reports.into_vec();
    let stats = DashboardStats::from_reports(&reports);
    println!("{}", stats);

    most_recent_first(&mut reports);

    println!("\nMost Recent Reports:");
    for report in reports.iter().take(opts.recent) {
        println!(
            "{}  {:<40} Lat: {:.4}, Lon: {:.4}{}",
            report.created_at.format("%Y-%m-%d %H:%M"),
            display_hazard_type(&report.hazard_type),
            report.location.lat,
            report.location.lon,
            if report.is_verified { "  (verified)" } else { "" }
        );
    }

    Ok(())
}
