//! Forecast cycle discovery.
//!
//! A watershed's output folder holds one subdirectory per forecast cycle
//! (`YYYYMMDD.HHMM`), each holding one file per ensemble member and subbasin.
//! Scanning is best effort: a directory with a bad name, no readable listing
//! or no files for the subbasin is skipped and the scan moves on.

use super::cycle::ForecastCycle;
use super::reach_index::resolve_in_files;
use crate::config::{EnumerateOptions, ProductConfig, ReachCheck, MOST_RECENT};
use crate::error::{FlowcastError, Result};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Member files of one cycle for one subbasin.
#[derive(Debug, Clone)]
pub struct CycleFiles {
    /// The cycle the files belong to.
    pub cycle: ForecastCycle,
    /// Matching member files, sorted by path.
    pub files: Vec<PathBuf>,
}

/// Why a candidate directory was passed over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Directory name is not a cycle token.
    BadToken(String),
    /// Directory does not exist.
    MissingDirectory,
    /// Directory listing failed.
    Unreadable(String),
    /// No file in the directory names the subbasin.
    NoMatchingFiles,
    /// Files exist but the requested reach could not be resolved in them.
    ReachUnresolved(String),
    /// Start time does not precede the previously accepted cycle.
    OutOfOrder,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::BadToken(reason) => write!(f, "bad cycle name: {}", reason),
            SkipReason::MissingDirectory => write!(f, "directory missing"),
            SkipReason::Unreadable(reason) => write!(f, "unreadable: {}", reason),
            SkipReason::NoMatchingFiles => write!(f, "no files for subbasin"),
            SkipReason::ReachUnresolved(reason) => write!(f, "reach unresolved: {}", reason),
            SkipReason::OutOfOrder => write!(f, "duplicate cycle start time"),
        }
    }
}

/// Result of examining one candidate cycle directory.
#[derive(Debug, Clone)]
pub enum CandidateOutcome {
    /// The directory holds member files for the subbasin.
    Found(CycleFiles),
    /// The directory was passed over.
    Skipped {
        /// Directory name.
        token: String,
        /// Why.
        reason: SkipReason,
    },
}

impl CandidateOutcome {
    fn skipped(token: &str, reason: SkipReason) -> Self {
        CandidateOutcome::Skipped {
            token: token.to_string(),
            reason,
        }
    }
}

/// Names of the subdirectories of `root`, newest cycle first.
///
/// Cycle tokens put the date before the hour, so reverse lexical order is
/// reverse chronological order.
pub fn cycle_directories(root: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(root).map_err(|e| FlowcastError::io(root, e))?;

    let mut names: Vec<String> = entries
        .flatten()
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .collect();
    names.sort_by(|a, b| b.cmp(a));

    Ok(names)
}

/// Examine one cycle directory for files belonging to `basin_name`.
pub fn scan_candidate(
    root: &Path,
    token: &str,
    basin_name: &str,
    config: &ProductConfig,
) -> CandidateOutcome {
    let cycle = match ForecastCycle::from_token(token) {
        Ok(cycle) => cycle,
        Err(e) => return CandidateOutcome::skipped(token, SkipReason::BadToken(e.to_string())),
    };

    let dir = root.join(token);
    let entries = match fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return CandidateOutcome::skipped(token, SkipReason::MissingDirectory);
        }
        Err(e) => return CandidateOutcome::skipped(token, SkipReason::Unreadable(e.to_string())),
    };

    let suffix = format!(".{}", config.file_extension);
    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .and_then(|name| {
                    if name.starts_with('.') {
                        return None;
                    }
                    name.strip_suffix(suffix.as_str())
                })
                .is_some_and(|stem| stem.contains(basin_name))
        })
        .collect();

    if files.is_empty() {
        return CandidateOutcome::skipped(token, SkipReason::NoMatchingFiles);
    }
    files.sort();

    CandidateOutcome::Found(CycleFiles { cycle, files })
}

/// Find the member files for a cycle.
///
/// With the `most_recent` selector every cycle directory is tried newest
/// first and the first one holding files for `basin_name` wins. Any other
/// selector names a single cycle directory.
pub fn locate(
    root: &Path,
    basin_name: &str,
    selector: &str,
    config: &ProductConfig,
) -> Result<CycleFiles> {
    let candidates = if selector == MOST_RECENT {
        cycle_directories(root)?
    } else {
        validate_selector(selector)?;
        vec![selector.to_string()]
    };

    for token in &candidates {
        match scan_candidate(root, token, basin_name, config) {
            CandidateOutcome::Found(found) => {
                debug!(cycle = %found.cycle, files = found.files.len(), "Located forecast cycle");
                return Ok(found);
            }
            CandidateOutcome::Skipped { token, reason } => {
                debug!(%token, %reason, "Skipping cycle directory");
            }
        }
    }

    Err(FlowcastError::not_found(format!(
        "No forecast cycle with files for '{}' in {}",
        basin_name,
        root.display()
    )))
}

/// List cycles holding data for `basin_name`, newest first.
///
/// Stops after `options.max_results` cycles. With [`ReachCheck::ResolveReach`]
/// a cycle only counts if `reach_id` resolves in its member files.
pub fn enumerate_cycles(
    root: &Path,
    basin_name: &str,
    reach_id: i64,
    options: &EnumerateOptions,
    config: &ProductConfig,
) -> Result<Vec<ForecastCycle>> {
    let mut cycles: Vec<ForecastCycle> = Vec::new();

    for token in cycle_directories(root)? {
        if cycles.len() >= options.max_results {
            break;
        }

        let outcome = match scan_candidate(root, &token, basin_name, config) {
            CandidateOutcome::Found(found) => verify_candidate(found, reach_id, options, config),
            skipped => skipped,
        };

        match outcome {
            CandidateOutcome::Found(found) => {
                let in_order = cycles
                    .last()
                    .map_or(true, |prev| found.cycle.start_time < prev.start_time);
                if in_order {
                    cycles.push(found.cycle);
                } else {
                    debug!(%token, reason = %SkipReason::OutOfOrder, "Skipping cycle directory");
                }
            }
            CandidateOutcome::Skipped { token, reason } => {
                debug!(%token, %reason, "Skipping cycle directory");
            }
        }
    }

    if cycles.is_empty() {
        return Err(FlowcastError::not_found(format!(
            "Recent forecasts for reach with id: {} not found.",
            reach_id
        )));
    }

    Ok(cycles)
}

fn verify_candidate(
    found: CycleFiles,
    reach_id: i64,
    options: &EnumerateOptions,
    config: &ProductConfig,
) -> CandidateOutcome {
    if options.reach_check == ReachCheck::FilesOnly {
        return CandidateOutcome::Found(found);
    }

    match resolve_in_files(&found.files, reach_id, None, config) {
        Ok(_) => CandidateOutcome::Found(found),
        Err(e) => CandidateOutcome::skipped(
            &found.cycle.token,
            SkipReason::ReachUnresolved(e.to_string()),
        ),
    }
}

/// A selector must name a direct child directory of the watershed folder.
fn validate_selector(selector: &str) -> Result<()> {
    if selector.is_empty()
        || selector == "."
        || selector == ".."
        || selector.contains('/')
        || selector.contains('\\')
    {
        return Err(FlowcastError::invalid_input(format!(
            "cycle selector '{}' is not a cycle directory name",
            selector
        )));
    }
    Ok(())
}
