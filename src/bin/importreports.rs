//! Documentation for the binary is with the definition of `ImportReportsOptionsInit` below.

use chrono::{DateTime, Utc};
use clap::Parser;
use crossbeam_channel::{bounded, Receiver, Sender};
use hazardspots::{HotspotResult, ReportDatabase, ReportList};
use log::{debug, info, warn, LevelFilter};
use simple_logger::SimpleLogger;
use std::{
    fmt::{self, Display},
    path::{Path, PathBuf},
    thread::JoinHandle,
};

/*-------------------------------------------------------------------------------------------------
 *                               Parse Command Line Arguments
 *-----------------------------------------------------------------------------------------------*/
///
/// Import hazard reports saved from the backend into the report archive.
///
/// Every "*.json" file below the data directory is read as a reports endpoint response. Reports
/// without a usable location are skipped with a warning.
///
#[derive(Debug, Parser)]
#[clap(bin_name = "importreports")]
#[clap(author, version, about)]
struct ImportReportsOptionsInit {
    /// The directory that will be walked to find report files.
    data_dir: PathBuf,

    /// The path to the report archive.
    ///
    /// If this is not specified, then the program will check for it in the "HOTSPOTS_DB"
    /// environment variable.
    #[clap(short, long)]
    #[clap(env = "HOTSPOTS_DB")]
    db: PathBuf,

    /// Only import reports newer than the newest report already in the archive.
    #[clap(short, long)]
    newer_only: bool,

    /// Verbose output
    #[clap(short, long)]
    verbose: bool,
}

#[derive(Debug)]
struct ImportReportsOptionsChecked {
    /// The directory that will be walked to find report files.
    data_dir: PathBuf,

    /// The path to the report archive.
    db: PathBuf,

    /// Skip anything at or before this time.
    cutoff: Option<DateTime<Utc>>,

    /// Verbose output
    verbose: bool,
}

impl Display for ImportReportsOptionsChecked {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        writeln!(f, "\n")?; // yes, two blank lines.
        writeln!(f, "  Data Directory: {}", self.data_dir.display())?;
        writeln!(f, "  Report Archive: {}", self.db.display())?;
        match self.cutoff {
            Some(cutoff) => writeln!(f, "    Newer Than: {}", cutoff)?,
            None => writeln!(f, "    Newer Than: (everything)")?,
        }
        writeln!(f, "\n")?; // yes, two blank lines.

        Ok(())
    }
}

/// Get the command line arguments and check them.
///
/// If there is missing data, try to fill it in with environment variables.
fn parse_args() -> HotspotResult<ImportReportsOptionsChecked> {
    let ImportReportsOptionsInit {
        data_dir,
        db,
        newer_only,
        verbose,
    } = ImportReportsOptionsInit::parse();

    if !data_dir.is_dir() {
        return Err(format!("Not a directory: {}", data_dir.display()).into());
    }

    // Creates the archive if needed, so later connections from other threads find the tables.
    let archive = ReportDatabase::connect(&db)?;
    let cutoff = if newer_only {
        archive.newest_report_time()?
    } else {
        None
    };
    drop(archive);

    Ok(ImportReportsOptionsChecked {
        data_dir,
        db,
        cutoff,
        verbose,
    })
}

/*-------------------------------------------------------------------------------------------------
 *                                            Main
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
        debug!(target: "startup", "Debug logging active.");
    }

    let summary = import_reports(&opts.data_dir, &opts.db, opts.cutoff)?;

    info!(target: "summary", "{}", summary);

    Ok(())
}

/// Run the walker, parser, and database threads to completion.
///
/// When the database thread fails, the other threads stop on their closed channels, so its error
/// is returned ahead of theirs.
fn import_reports(
    data_dir: &Path,
    db: &Path,
    cutoff: Option<DateTime<Utc>>,
) -> HotspotResult<ImportSummary> {
    let (to_parsers, from_dir_walker) = bounded(128);
    let (to_database, from_parsers) = bounded(16);

    let walk_dir = dir_walker(data_dir, to_parsers)?;
    let parsers = start_parser_threads(from_dir_walker, to_database, cutoff)?;
    let database = start_database_thread(db, from_parsers)?;

    let walk_dir = join(walk_dir, "dir walker");
    let parsers: Vec<_> = parsers.into_iter().map(|jh| join(jh, "parser")).collect();
    let summary = join(database, "database")?;

    walk_dir?;
    for res in parsers {
        res?;
    }

    Ok(summary)
}

fn join<T>(jh: JoinHandle<HotspotResult<T>>, name: &str) -> HotspotResult<T> {
    jh.join()
        .map_err(|_| format!("Error joining {} thread", name))?
}

/*-------------------------------------------------------------------------------------------------
 *                           Threads - Functions that start threads
 *-----------------------------------------------------------------------------------------------*/
fn dir_walker<P: AsRef<Path>>(
    data_dir: P,
    to_parsers: Sender<PathBuf>,
) -> HotspotResult<JoinHandle<HotspotResult<()>>> {
    let data_dir = data_dir.as_ref().to_path_buf();

    let jh = std::thread::Builder::new()
        .name("import-walker".to_owned())
        .spawn(move || {
            for entry in walkdir::WalkDir::new(data_dir)
                .sort_by_file_name()
                .into_iter()
                // Skip errors silently
                .filter_map(|res| res.ok())
                // Ignore directories, WalkDir will take care of recursing into them.
                .filter(|entry| entry.path().is_file())
                .filter(|entry| {
                    entry
                        .path()
                        .extension()
                        .map(|ex| ex == "json")
                        .unwrap_or(false)
                })
            {
                debug!(target: "dir-walker", "Found: {}", entry.path().display());
                to_parsers.send(entry.into_path())?;
            }

            Ok(())
        })?;

    Ok(jh)
}

fn start_parser_threads(
    from_dir_walker: Receiver<PathBuf>,
    to_database: Sender<(PathBuf, ReportList)>,
    cutoff: Option<DateTime<Utc>>,
) -> HotspotResult<Vec<JoinHandle<HotspotResult<()>>>> {
    let mut handles = Vec::with_capacity(num_cpus::get());

    for _ in 0..num_cpus::get() {
        let to_database_clone = to_database.clone();
        let from_dir_walker_clone = from_dir_walker.clone();

        let jh = std::thread::Builder::new()
            .name("import-parser".to_owned())
            .spawn(move || {
                for path in from_dir_walker_clone {
                    let mut reports = match ReportList::from_json_file(&path) {
                        Ok(reports) => reports,
                        Err(err) => {
                            warn!(target: "parser", "Error reading {} :: {}", path.display(), err);
                            continue;
                        }
                    };

                    if let Some(cutoff) = cutoff {
                        reports.retain_newer_than(cutoff);
                    }

                    to_database_clone.send((path, reports))?;
                }

                Ok(())
            })?;

        handles.push(jh);
    }

    Ok(handles)
}

fn start_database_thread<P: AsRef<Path>>(
    db: P,
    from_parsers: Receiver<(PathBuf, ReportList)>,
) -> HotspotResult<JoinHandle<HotspotResult<ImportSummary>>> {
    let db = db.as_ref().to_path_buf();

    let jh = std::thread::Builder::new()
        .name("import-database".to_owned())
        .spawn(move || {
            let archive = ReportDatabase::connect(db)?;
            let mut add = archive.prepare_to_add_reports()?;

            let mut summary = ImportSummary::default();

            for (path, reports) in from_parsers {
                let stored = add.add_all(reports.reports())?;

                debug!(target: "database", "{} :: stored {} skipped {}",
                    path.display(), stored, reports.skipped());

                summary.files += 1;
                summary.stored += stored;
                summary.skipped += reports.skipped();
            }

            drop(add);
            summary.in_archive = archive.count()?;

            Ok(summary)
        })?;

    Ok(jh)
}

/*-------------------------------------------------------------------------------------------------
 *                                         Summary
 *-----------------------------------------------------------------------------------------------*/
#[derive(Debug, Default)]
struct ImportSummary {
    files: usize,
    stored: usize,
    skipped: usize,
    in_archive: usize,
}

impl Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(
            f,
            "read {} files, stored {} reports, skipped {} malformed, {} reports in the archive",
            self.files, self.stored, self.skipped, self.in_archive
        )
    }
}

/*-------------------------------------------------------------------------------------------------
 *                                          Tests
 *-----------------------------------------------------------------------------------------------*/
