use log::{debug, info, warn};

use roster_sessions::*;
use snafu::{prelude::*, Snafu};

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::unhrc::config_reader::*;
use crate::unhrc::io_sessions::{build_summary_js, write_session_tables};

pub mod config_reader;
mod io_common;
mod io_marc;
mod io_sessions;
mod io_store;
mod io_xlsx;

/// A decision recorded for one country on one resolution.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Vote {
    No,
    Yes,
    Abstain,
    /// The country is a member but did not vote.
    NoVote,
}

impl Vote {
    /// Reads the one-letter codes of the library records, or the names written in the vote store.
    pub fn from_record_value(val: &str) -> Option<Vote> {
        match val.trim().to_uppercase().as_str() {
            "N" | "NO" => Some(Vote::No),
            "Y" | "YES" => Some(Vote::Yes),
            "A" | "ABSTAIN" => Some(Vote::Abstain),
            "." | "NO_VOTE" => Some(Vote::NoVote),
            _ => None,
        }
    }

    pub fn record_name(&self) -> &'static str {
        match self {
            Vote::No => "NO",
            Vote::Yes => "YES",
            Vote::Abstain => "ABSTAIN",
            Vote::NoVote => "NO_VOTE",
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CountryVote {
    pub country: String,
    pub vote: Vote,
}

/// A resolution with all its recorded votes, as read from one of the sources.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Resolution {
    pub name: String,
    pub date: NaiveDate,
    pub summary: String,
    pub agenda: String,
    // In the order of the source
    pub votes: Vec<CountryVote>,
}

impl Resolution {
    pub fn new(name: &str, date: NaiveDate, summary: &str, agenda: &str) -> Resolution {
        Resolution {
            name: name.to_string(),
            date,
            summary: summary.to_string(),
            agenda: agenda.to_string(),
            votes: Vec::new(),
        }
    }

    /// Records the vote of a country. Returns false (and keeps the first vote) if the
    /// country already voted on this resolution.
    pub fn add_vote(&mut self, country: &str, vote: Vote) -> bool {
        if self.votes.iter().any(|cv| cv.country == country) {
            return false;
        }
        self.votes.push(CountryVote {
            country: country.to_string(),
            vote,
        });
        true
    }

    /// All the countries that cast any vote, including abstentions.
    pub fn roster(&self) -> ResolutionRoster {
        let countries: BTreeSet<String> = self.votes.iter().map(|cv| cv.country.clone()).collect();
        ResolutionRoster {
            resolution_id: self.name.clone(),
            date: self.date,
            roster: countries,
        }
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum UnhrcError {
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing file {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error parsing XML records"))]
    ParsingXml { source: quick_xml::de::DeError },
    #[snafu(display("Record #{record_idx}: missing field {tag}${code}"))]
    MissingMarcField {
        record_idx: usize,
        tag: String,
        code: String,
    },
    #[snafu(display("Invalid date {value:?}"))]
    InvalidDate {
        source: chrono::ParseError,
        value: String,
    },
    #[snafu(display("Resolution {resolution}: unknown vote {value:?} for {country}"))]
    UnknownVoteCode {
        resolution: String,
        country: String,
        value: String,
    },
    #[snafu(display("Error reading a CSV line"))]
    CsvLineParse { source: csv::Error },
    #[snafu(display("CSV line {lineno} is too short"))]
    CsvLineToShort { lineno: usize },
    #[snafu(display("Error writing CSV file {path}"))]
    CsvWrite { source: csv::Error, path: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Missing worksheet {name}"))]
    MissingWorksheet { name: String },
    #[snafu(display("Worksheet {name}: wrong cell type at line {lineno}: {content}"))]
    ExcelWrongCellType {
        name: String,
        lineno: usize,
        content: String,
    },
    #[snafu(display("Unknown input provider {provider:?}"))]
    UnknownProvider { provider: String },
    #[snafu(display("Unknown roster regression policy {policy:?}"))]
    UnknownPolicy { policy: String },
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},
    #[snafu(display("Session reconstruction failed"))]
    SessionReconstruction { source: SessionErrors },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type UnhrcResult<T> = Result<T, UnhrcError>;

/// Everything needed for one run, after merging the configuration file and the command line.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RunSettings {
    pub provider: String,
    pub input: String,
    pub store: Option<String>,
    pub out: Option<String>,
    pub reference: Option<String>,
    pub resolutions_worksheet: String,
    pub votes_worksheet: String,
    pub rules: SessionRules,
}

fn join_path(root: &Path, p: &str) -> String {
    let pb: PathBuf = [root, Path::new(p)].iter().collect();
    pb.as_path().display().to_string()
}

fn resolve_settings(args: &Args) -> UnhrcResult<RunSettings> {
    let config: UnhrcConfig = match args.config.clone() {
        Some(config_path) => {
            let mut config = read_config(&config_path)?;
            // The paths of the configuration are relative to its location.
            let root_p = Path::new(config_path.as_str())
                .parent()
                .context(MissingParentDirSnafu {})?;
            if let Some(src) = config.input_source.as_mut() {
                src.file_path = join_path(root_p, &src.file_path);
            }
            let os = &mut config.output_settings;
            os.summary_file = os.summary_file.as_ref().map(|p| match p.as_str() {
                "stdout" => p.clone(),
                _ => join_path(root_p, p),
            });
            os.store_directory = os.store_directory.as_ref().map(|p| join_path(root_p, p));
            config
        }
        None => UnhrcConfig::default(),
    };
    debug!("resolve_settings: config: {:?}", config);

    let source = config.input_source.clone();
    let input = match (args.input.clone(), source.as_ref()) {
        (Some(x), _) => x,
        (None, Some(src)) => src.file_path.clone(),
        (None, None) => whatever!("No input provided: use --input or the inputSource section of the configuration"),
    };
    let provider = args
        .input_type
        .clone()
        .or_else(|| source.as_ref().map(|s| s.provider.clone()))
        .unwrap_or_else(|| "marc".to_string());

    let policy = match args.on_regression.clone() {
        Some(p) => parse_regression_policy(&p)?,
        None => config.rules.regression_policy()?,
    };

    Ok(RunSettings {
        provider,
        input,
        store: args
            .store
            .clone()
            .or(config.output_settings.store_directory),
        out: args.out.clone().or(config.output_settings.summary_file),
        reference: args.reference.clone(),
        resolutions_worksheet: source
            .as_ref()
            .and_then(|s| s.resolutions_worksheet_name.clone())
            .unwrap_or_else(|| "resolutions".to_string()),
        votes_worksheet: source
            .as_ref()
            .and_then(|s| s.votes_worksheet_name.clone())
            .unwrap_or_else(|| "votes".to_string()),
        rules: SessionRules {
            regression_policy: policy,
        },
    })
}

/// Drops the resolutions seen twice and sorts them by date.
///
/// The sort is stable: resolutions voted on the same day keep the order of the source.
fn normalize_resolutions(resolutions: Vec<Resolution>) -> Vec<Resolution> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut res: Vec<Resolution> = Vec::new();
    for r in resolutions {
        if seen.contains(&r.name) {
            warn!(
                "Resolution {} already seen, is it a duplicate? Ignoring it",
                r.name
            );
            continue;
        }
        seen.insert(r.name.clone());
        res.push(r);
    }
    res.sort_by_key(|r| r.date);
    res
}

fn read_resolutions(settings: &RunSettings) -> UnhrcResult<Vec<Resolution>> {
    info!(
        "Attempting to read {} records from {:?}",
        settings.provider, settings.input
    );
    let resolutions = match settings.provider.as_str() {
        "marc" => io_marc::read_marc(&settings.input),
        "csv" => io_store::read_store(&settings.input),
        "xlsx" => io_xlsx::read_workbook(
            &settings.input,
            &settings.resolutions_worksheet,
            &settings.votes_worksheet,
        ),
        x => UnknownProviderSnafu { provider: x }.fail(),
    }?;
    Ok(normalize_resolutions(resolutions))
}

/// Runs the whole pipeline: reads the votes, reconstructs the sessions and writes them out.
pub fn run_sessions(args: &Args) -> UnhrcResult<()> {
    let settings = resolve_settings(args)?;
    info!("settings: {:?}", settings);

    let resolutions = read_resolutions(&settings)?;
    info!("Read {} resolutions", resolutions.len());

    if let Some(store) = settings.store.as_ref() {
        // Do not rewrite a store onto itself.
        if settings.provider != "csv" || Path::new(store) != Path::new(&settings.input) {
            io_store::write_store(store, &resolutions)?;
        }
    }

    let result = reconstruct_sessions(resolutions.iter().map(|r| r.roster()), &settings.rules)
        .context(SessionReconstructionSnafu {})?;
    info!(
        "{} of {} resolutions attributed to {} sessions",
        result.num_resolutions(),
        resolutions.len(),
        result.sessions.len()
    );
    for f in result.flagged.iter() {
        warn!(
            "Resolution {} ({}) was not attributed: its roster is the one of session #{}",
            f.resolution_id, f.date, f.conflicting_session
        );
    }

    if let Some(store) = settings.store.as_ref() {
        write_session_tables(store, &result)?;
    }

    let summary_js = build_summary_js(&settings, &result);
    let pretty_js_summary = serde_json::to_string_pretty(&summary_js).context(ParsingJsonSnafu {})?;
    match settings.out.as_deref() {
        None | Some("stdout") => {
            println!("{}", pretty_js_summary);
        }
        Some(path) => {
            info!("Writing summary to {:?}", path);
            fs::write(path, &pretty_js_summary).context(WritingFileSnafu { path })?;
        }
    }

    // The reference summary, if provided for comparison
    if let Some(reference_p) = settings.reference.as_ref() {
        let summary_ref: JSValue = read_summary(reference_p)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_summary {
            warn!("Found differences with the reference summary");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_summary.as_str(),
                "\n",
            );
            whatever!("Difference detected between computed summary and reference summary")
        }
    }

    Ok(())
}

#[cfg(test)]
fn test_args(test_name: &str) -> Args {
    let test_dir = format!("{}/tests/data/{}", env!("CARGO_MANIFEST_DIR"), test_name);
    let reference = format!("{}/{}_expected_summary.json", test_dir, test_name);
    Args {
        config: Some(format!("{}/{}_config.json", test_dir, test_name)),
        reference: if Path::new(&reference).exists() {
            Some(reference)
        } else {
            None
        },
        out: None,
        input: None,
        input_type: None,
        store: None,
        on_regression: None,
        verbose: false,
    }
}

#[cfg(test)]
pub fn test_wrapper(test_name: &str) -> UnhrcResult<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    info!("Running test {}", test_name);
    run_sessions(&test_args(test_name))
}
