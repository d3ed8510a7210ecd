use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use clap::Parser;
use hazardspots::{
    BoundingBox, ClusterList, DensityTier, HotspotResult, ReportDatabase, ReportList,
    DEFAULT_DISTANCE_THRESHOLD,
};
use log::{debug, info, LevelFilter};
use simple_logger::SimpleLogger;
use std::{
    fmt::{self, Display},
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};
use strum::IntoEnumIterator;

/*-------------------------------------------------------------------------------------------------
 *                               Parse Command Line Arguments
 *-----------------------------------------------------------------------------------------------*/
///
/// Group hazard reports into map hotspots.
///
/// Reports come from the report archive, or from a file saved from the backend reports endpoint
/// if one is given. Every cluster is printed with its density tier, and the clusters can also be
/// saved as JSON for a map to draw.
///
#[derive(Debug, Parser)]
#[clap(bin_name = "hotspots")]
#[clap(author, version, about)]
struct HotspotsOptionsInit {
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

    /// The start time (UTC) in the format YYYY-MM-DD-HH, defaults to the beginning of time.
    #[clap(short, long, parse(try_from_str=parse_datetime))]
    start: Option<DateTime<Utc>>,

    /// The end time (UTC) in the format YYYY-MM-DD-HH, defaults to tomorrow.
    #[clap(short, long, parse(try_from_str=parse_datetime))]
    end: Option<DateTime<Utc>>,

    /// Bounding Box where as bottom_lat,left_lon,top_lat,right_lon
    #[clap(short, long)]
    bbox: Option<BoundingBox>,

    /// Grouping distance in degrees.
    #[clap(short, long, default_value_t=DEFAULT_DISTANCE_THRESHOLD)]
    threshold: f64,

    /// Viewport latitude span in degrees, prints the circle radius a map would draw.
    #[clap(short, long)]
    zoom: Option<f64>,

    /// Save the clusters as JSON to this file.
    #[clap(short, long)]
    out: Option<PathBuf>,

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

/// Where the reports come from.
#[derive(Debug)]
enum ReportSourceFile {
    Archive(PathBuf),
    Json(PathBuf),
}

#[derive(Debug)]
struct HotspotsOptionsChecked {
    /// Where to load reports from.
    input: ReportSourceFile,

    /// The start time.
    start: DateTime<Utc>,

    /// The end time.
    end: DateTime<Utc>,

    /// Bounding Box
    bbox: BoundingBox,

    /// Grouping distance in degrees.
    threshold: f64,

    /// Viewport latitude span.
    zoom: Option<f64>,

    /// Save the clusters here.
    out: Option<PathBuf>,

    /// Verbose output
    verbose: bool,
}

impl Display for HotspotsOptionsChecked {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        writeln!(f, "\n")?; // yes, two blank lines.
        match &self.input {
            ReportSourceFile::Archive(pth) => writeln!(f, "     Archive: {}", pth.display())?,
            ReportSourceFile::Json(pth) => writeln!(f, "   JSON File: {}", pth.display())?,
        }
        writeln!(f, "       Start: {}", self.start)?;
        writeln!(f, "         End: {}", self.end)?;
        writeln!(f, "Bounding Box: {}", self.bbox)?;
        writeln!(f, "   Threshold: {} deg", self.threshold)?;
        if let Some(zoom) = self.zoom {
            writeln!(f, "        Zoom: {} deg", zoom)?;
        }
        if let Some(out) = &self.out {
            writeln!(f, " Output JSON: {}", out.display())?;
        }
        writeln!(f, "\n")?; // yes, two blank lines.

        Ok(())
    }
}

/// Get the command line arguments and check them.
///
/// If there is missing data, try to fill it in with environment variables.
fn parse_args() -> HotspotResult<HotspotsOptionsChecked> {
    let HotspotsOptionsInit {
        db,
        json,
        start,
        end,
        bbox,
        threshold,
        zoom,
        out,
        verbose,
    } = HotspotsOptionsInit::parse();

    let input = match (json, db) {
        (Some(json), _) => ReportSourceFile::Json(json),
        (None, Some(db)) => ReportSourceFile::Archive(db),
        (None, None) => {
            return Err("Either --json or --db (or HOTSPOTS_DB) must be given".into());
        }
    };

    let start = start.unwrap_or_else(DateTime::<Utc>::default);
    let end = end.unwrap_or_else(|| Utc::now() + Duration::days(1));
    if start >= end {
        return Err(format!("Start {} is not before end {}", start, end).into());
    }

    if let Some(zoom) = zoom {
        if !(zoom > 0.0) {
            return Err(format!("Zoom must be positive: {}", zoom).into());
        }
    }

    Ok(HotspotsOptionsChecked {
        input,
        start,
        end,
        bbox: bbox.unwrap_or(BoundingBox::WORLD),
        threshold,
        zoom,
        out,
        verbose,
    })
}

/*-------------------------------------------------------------------------------------------------
 *                                             MAIN
 *-----------------------------------------------------------------------------------------------*/
fn main() -> HotspotResult<()> {
    let opts = parse_args()?;

    let level = if opts.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    SimpleLogger::new().with_level(level).init()?;

    if opts.verbose {
        info!(target: "startup", "{}", opts);
    }

    let reports = load_reports(&opts)?;
    if reports.skipped() > 0 {
        info!("Skipped {} malformed reports.", reports.skipped());
    }
    debug!("Loaded {} reports.", reports.len());

    let clusters = ClusterList::from_reports(reports.reports(), opts.threshold);

    println!("{}", clusters);

    for tier in DensityTier::iter() {
        println!("{:>20}: {}", tier.legend(), clusters.count_in_tier(tier));
    }

    if let Some(zoom) = opts.zoom {
        println!("\nCircle radius at a {} deg viewport:", zoom);
        for cluster in clusters.clusters() {
            println!(
                "{:>48} {:>10.1} km",
                cluster.id,
                cluster.render_radius(zoom) / 1000.0
            );
        }
    }

    if let Some(out) = &opts.out {
        let mut f = BufWriter::new(File::create(out)?);
        serde_json::to_writer_pretty(&mut f, &clusters)?;
        f.flush()?;
        info!("Saved {} clusters to {}", clusters.len(), out.display());
    }

    Ok(())
}

fn load_reports(opts: &HotspotsOptionsChecked) -> HotspotResult<ReportList> {
    match &opts.input {
        ReportSourceFile::Archive(db) => {
            let db = ReportDatabase::connect(db)?;
            db.query_reports(opts.start, opts.end, opts.bbox)
        }
        ReportSourceFile::Json(pth) => {
            let mut reports = ReportList::from_json_file(pth)?;
            reports.retain_within(opts.start, opts.end, opts.bbox);
            Ok(reports)
        }
    }
}
