//! Reach identifier to column index resolution.

use crate::config::ProductConfig;
use crate::data::ForecastFile;
use crate::error::{FlowcastError, Result};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Name of the reach identifier variable present in `file`.
pub fn reach_id_variable<'a>(file: &ForecastFile, config: &'a ProductConfig) -> Result<&'a str> {
    config
        .reach_id_variables
        .iter()
        .map(String::as_str)
        .find(|name| file.has_variable(name))
        .ok_or_else(|| {
            FlowcastError::file_format(
                file.path(),
                format!(
                    "no reach identifier variable (tried {})",
                    config.reach_id_variables.join(", ")
                ),
            )
        })
}

/// Find the position of `target_id` in the reach identifier vector `id_variable`.
///
/// A `cached_guess` is checked with a single element read and trusted only if
/// the identifier stored there equals `target_id`; otherwise the whole vector
/// is scanned for the first match.
pub fn resolve_index(
    target_id: i64,
    cached_guess: Option<usize>,
    file: &ForecastFile,
    id_variable: &str,
) -> Result<usize> {
    if let Some(guess) = cached_guess {
        match file.read_element(id_variable, guess) {
            Ok(value) if id_matches(value, target_id) => return Ok(guess),
            Ok(value) => debug!(guess, value, target_id, "Stale reach index guess"),
            Err(e) => debug!(guess, error = %e, "Unusable reach index guess"),
        }
    }

    let ids = file.read_vector(id_variable)?;
    ids.iter()
        .position(|&value| id_matches(value, target_id))
        .ok_or_else(|| reach_not_found(target_id))
}

/// Resolve the reach index from the first member file that can be opened.
///
/// All member files of one basin share the same identifier ordering, so one
/// readable file decides the answer.
pub fn resolve_in_files(
    files: &[PathBuf],
    target_id: i64,
    cached_guess: Option<usize>,
    config: &ProductConfig,
) -> Result<usize> {
    let mut last_error = None;

    for path in files {
        let resolved = ForecastFile::open(path).and_then(|file| {
            let id_variable = reach_id_variable(&file, config)?;
            resolve_index(target_id, cached_guess, &file, id_variable)
        });

        match resolved {
            Ok(index) => return Ok(index),
            Err(e @ FlowcastError::NotFound(_)) => return Err(e),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping unreadable member file");
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| reach_not_found(target_id)))
}

/// Identifiers are integral; floating point storage is truncated before comparing.
fn id_matches(value: f64, target_id: i64) -> bool {
    value.is_finite() && value.trunc() as i64 == target_id
}

fn reach_not_found(target_id: i64) -> FlowcastError {
    FlowcastError::not_found(format!("Reach with id: {} not found.", target_id))
}
