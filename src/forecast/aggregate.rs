//! Cross-ensemble aggregation of one reach's discharge.
//!
//! Ensemble members share a fine-step head; only members below
//! [`ProductConfig::coarse_member_limit`] continue into the coarse tail.
//! Statistics are computed on the head and tail separately and concatenated
//! onto one split-step time axis. The deterministic run and the auxiliary
//! nowcast are carried alongside, outside the statistics.

use super::member::MemberKind;
use super::reach_index::reach_id_variable;
use super::series::{split_axis, uniform_axis, TimeSeries};
use crate::config::ProductConfig;
use crate::data::ForecastFile;
use crate::error::{FlowcastError, Result};
use crate::util::clamp_non_negative;
use chrono::NaiveDateTime;
use ndarray::{Array2, Axis};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Per-timestep statistics across ensemble members.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnsembleStatistics {
    /// Arithmetic mean.
    pub mean: Vec<f64>,
    /// Population standard deviation.
    pub std_dev: Vec<f64>,
    /// Smallest member value.
    pub min: Vec<f64>,
    /// Largest member value.
    pub max: Vec<f64>,
}

impl EnsembleStatistics {
    /// Number of timesteps.
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    /// Whether there are no timesteps.
    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    /// Append another segment's statistics.
    pub fn extend(&mut self, other: EnsembleStatistics) {
        self.mean.extend(other.mean);
        self.std_dev.extend(other.std_dev);
        self.min.extend(other.min);
        self.max.extend(other.max);
    }

    /// Compute statistics per timestep over `columns`.
    ///
    /// Columns may differ in length; each timestep uses the members that have
    /// a finite value there. Timesteps with no such member are NaN.
    pub fn from_columns(columns: &[Vec<f64>]) -> Self {
        let width = columns.iter().map(Vec::len).max().unwrap_or(0);
        let mut matrix = Array2::from_elem((columns.len(), width), f64::NAN);
        for (mut row, column) in matrix.axis_iter_mut(Axis(0)).zip(columns) {
            for (cell, value) in row.iter_mut().zip(column) {
                *cell = *value;
            }
        }

        let mut stats = EnsembleStatistics::default();
        for timestep in matrix.axis_iter(Axis(1)) {
            let mut count = 0usize;
            let mut sum = 0.0f64;
            let mut min = f64::INFINITY;
            let mut max = f64::NEG_INFINITY;
            for &v in timestep.iter().filter(|v| v.is_finite()) {
                count += 1;
                sum += v;
                min = min.min(v);
                max = max.max(v);
            }

            if count == 0 {
                stats.mean.push(f64::NAN);
                stats.std_dev.push(f64::NAN);
                stats.min.push(f64::NAN);
                stats.max.push(f64::NAN);
                continue;
            }

            let mean = sum / count as f64;
            let ssd: f64 = timestep
                .iter()
                .filter(|v| v.is_finite())
                .map(|v| (v - mean) * (v - mean))
                .sum();

            stats.mean.push(mean);
            stats.std_dev.push((ssd / count as f64).sqrt());
            stats.min.push(min);
            stats.max.push(max);
        }

        stats
    }
}

/// Ensemble summary series on the shared split-step axis.
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleSeries {
    /// Mean across members.
    pub mean: TimeSeries,
    /// Minimum across members.
    pub min: TimeSeries,
    /// Maximum across members.
    pub max: TimeSeries,
    /// Mean plus one standard deviation.
    pub mean_plus_spread: TimeSeries,
    /// Mean minus one standard deviation, floored at zero.
    pub mean_minus_spread: TimeSeries,
    /// Number of fine-step timesteps.
    pub fine_len: usize,
    /// Number of coarse-step timesteps.
    pub coarse_len: usize,
    /// Members contributing to the fine segment.
    pub fine_members: usize,
    /// Members contributing to the coarse segment.
    pub coarse_members: usize,
}

/// A member file left out of the aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedMember {
    /// The member file.
    pub path: PathBuf,
    /// Why it was left out.
    pub reason: String,
}

/// Every series produced for one reach and cycle.
#[derive(Debug, Clone, Default)]
pub struct AggregatedSeries {
    /// Ensemble statistics, absent when no ensemble member was readable.
    pub ensemble: Option<EnsembleSeries>,
    /// Deterministic high-resolution run.
    pub high_res: Option<TimeSeries>,
    /// Auxiliary nowcast, converted to ensemble units.
    pub auxiliary: Option<TimeSeries>,
    /// Member files left out.
    pub skipped: Vec<SkippedMember>,
}

#[derive(Debug, Default)]
struct MemberColumns {
    fine: Vec<Vec<f64>>,
    coarse: Vec<Vec<f64>>,
    high_res: Option<Vec<f64>>,
    auxiliary: Option<Vec<f64>>,
    axis_len: usize,
    skipped: Vec<SkippedMember>,
}

impl MemberColumns {
    fn skip(&mut self, path: &Path, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(path = %path.display(), %reason, "Skipping forecast member");
        self.skipped.push(SkippedMember {
            path: path.to_path_buf(),
            reason,
        });
    }

    fn route(&mut self, path: &Path, kind: MemberKind, column: Vec<f64>, config: &ProductConfig) {
        match kind {
            MemberKind::Ensemble(index) => {
                self.axis_len = self.axis_len.max(column.len());
                let split = config.fine_prefix_len.min(column.len());
                let (fine, coarse) = column.split_at(split);
                if kind.has_coarse_segment(config) && !coarse.is_empty() {
                    self.coarse.push(coarse.to_vec());
                }
                self.fine.push(fine.to_vec());
                debug!(index, len = column.len(), "Routed ensemble member");
            }
            MemberKind::HighRes => {
                if self.high_res.is_some() {
                    self.skip(path, "duplicate high resolution member");
                    return;
                }
                self.axis_len = self.axis_len.max(column.len());
                self.high_res = Some(column);
            }
            MemberKind::Auxiliary => {
                if self.auxiliary.is_some() {
                    self.skip(path, "duplicate auxiliary member");
                    return;
                }
                let factor = config.auxiliary_unit_factor;
                self.auxiliary = Some(column.into_iter().map(|v| v * factor).collect());
            }
        }
    }

    fn is_empty(&self) -> bool {
        self.fine.is_empty() && self.high_res.is_none() && self.auxiliary.is_none()
    }
}

/// Aggregate one reach's discharge across the member files of a cycle.
///
/// Unreadable or unrecognized members are skipped and listed in
/// [`AggregatedSeries::skipped`]; the call fails only when nothing at all was
/// read.
pub fn aggregate(
    member_files: &[PathBuf],
    reach_index: usize,
    cycle_start: NaiveDateTime,
    config: &ProductConfig,
) -> Result<AggregatedSeries> {
    let mut columns = MemberColumns::default();

    for path in member_files {
        let Some(kind) = MemberKind::classify(path, config) else {
            columns.skip(path, "unrecognized member token");
            continue;
        };

        match read_discharge(path, reach_index, config) {
            Ok(mut column) => {
                column.iter_mut().for_each(|v| *v = clamp_non_negative(*v));
                columns.route(path, kind, column, config);
            }
            Err(e) => columns.skip(path, e.to_string()),
        }
    }

    if columns.is_empty() {
        let reason = columns
            .skipped
            .last()
            .map(|s| s.reason.clone())
            .unwrap_or_else(|| "no member files".to_string());
        return Err(FlowcastError::PartialFailure {
            skipped: columns.skipped.len(),
            reason,
        });
    }

    let axis = split_axis(
        cycle_start,
        columns.axis_len,
        config.fine_prefix_len,
        config.fine_step,
        config.coarse_step,
    );

    let ensemble = if columns.fine.is_empty() {
        None
    } else {
        Some(ensemble_series(&columns.fine, &columns.coarse, &axis))
    };

    let high_res = columns
        .high_res
        .as_deref()
        .map(|values| TimeSeries::zip(&axis, values));

    let auxiliary = columns.auxiliary.as_deref().map(|values| {
        let aux_axis = uniform_axis(cycle_start, values.len(), config.auxiliary_step);
        TimeSeries::zip(&aux_axis, values)
    });

    Ok(AggregatedSeries {
        ensemble,
        high_res,
        auxiliary,
        skipped: columns.skipped,
    })
}

fn ensemble_series(fine: &[Vec<f64>], coarse: &[Vec<f64>], axis: &[i64]) -> EnsembleSeries {
    let mut stats = EnsembleStatistics::from_columns(fine);
    let fine_len = stats.len();
    let coarse_stats = EnsembleStatistics::from_columns(coarse);
    let coarse_len = coarse_stats.len();
    stats.extend(coarse_stats);

    let plus: Vec<f64> = stats
        .mean
        .iter()
        .zip(&stats.std_dev)
        .map(|(m, s)| m + s)
        .collect();
    let minus: Vec<f64> = stats
        .mean
        .iter()
        .zip(&stats.std_dev)
        .map(|(m, s)| clamp_non_negative(m - s))
        .collect();

    EnsembleSeries {
        mean: TimeSeries::zip(axis, &stats.mean),
        min: TimeSeries::zip(axis, &stats.min),
        max: TimeSeries::zip(axis, &stats.max),
        mean_plus_spread: TimeSeries::zip(axis, &plus),
        mean_minus_spread: TimeSeries::zip(axis, &minus),
        fine_len,
        coarse_len,
        fine_members: fine.len(),
        coarse_members: coarse.len(),
    }
}

/// Read the discharge time series of one reach from a member file.
///
/// Discharge is normally stored time × reach; files written reach × time are
/// recognized by the reach identifier dimension leading.
pub fn read_discharge(path: &Path, reach_index: usize, config: &ProductConfig) -> Result<Vec<f64>> {
    let file = ForecastFile::open(path)?;
    let name = config.discharge_variable.as_str();

    let dims = file.dimension_names(name)?;
    let reach_dim = reach_id_variable(&file, config)
        .ok()
        .and_then(|id_var| file.dimension_names(id_var).ok())
        .and_then(|d| d.into_iter().next());

    let reach_leads = dims.len() == 2
        && reach_dim.as_deref() == Some(dims[0].as_str())
        && dims[1] != dims[0];

    let column = if reach_leads {
        file.read_matrix_line(name, 0, reach_index)?
    } else {
        file.read_matrix_column(name, reach_index)?
    };
    file.close();

    Ok(column)
}
