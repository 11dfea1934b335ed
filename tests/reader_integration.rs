//! Forecast file reading and reach index resolution against real netCDF files.

mod common;

use common::*;
use flowcast::config::{ProductConfig, MOST_RECENT};
use flowcast::data::ForecastFile;
use flowcast::forecast::{read_discharge, reach_id_variable, resolve_in_files, resolve_index};
use flowcast::query::get_hydrograph;
use flowcast::FlowcastError;
use std::fs;
use tempfile::TempDir;

fn sample_file(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("Qout_basin_0.nc");
    let series: Vec<Vec<f32>> = (0..REACH_IDS.len())
        .map(|r| (0..5).map(|t| (r * 10 + t) as f32).collect())
        .collect();
    write_member(&path, &REACH_IDS, &series);
    path
}

#[test]
fn reads_vector_and_column() {
    let dir = TempDir::new().unwrap();
    let path = sample_file(&dir);

    let file = ForecastFile::open(&path).unwrap();
    let ids = file.read_vector("rivid").unwrap();
    assert_eq!(ids, vec![900120.0, 900121.0, 900123.0, 900125.0]);

    let column = file.read_matrix_column("Qout", 2).unwrap();
    assert_eq!(column, vec![20.0, 21.0, 22.0, 23.0, 24.0]);
    assert_eq!(file.read_element("rivid", 3).unwrap(), 900125.0);
    file.close();
}

#[test]
fn rejects_missing_and_misshapen_variables() {
    let dir = TempDir::new().unwrap();
    let path = sample_file(&dir);
    let file = ForecastFile::open(&path).unwrap();

    assert!(matches!(
        file.read_vector("COMID"),
        Err(FlowcastError::FileFormat { .. })
    ));
    assert!(matches!(
        file.read_vector("Qout"),
        Err(FlowcastError::FileFormat { .. })
    ));
    assert!(matches!(
        file.read_matrix_column("rivid", 0),
        Err(FlowcastError::FileFormat { .. })
    ));
    assert!(matches!(
        file.read_matrix_column("Qout", 4),
        Err(FlowcastError::FileFormat { .. })
    ));
}

#[test]
fn open_distinguishes_missing_from_corrupt() {
    let dir = TempDir::new().unwrap();

    let missing = ForecastFile::open(&dir.path().join("absent.nc")).unwrap_err();
    assert!(matches!(missing, FlowcastError::Io { .. }));

    let garbage = dir.path().join("garbage.nc");
    fs::write(&garbage, b"this is not netcdf").unwrap();
    let corrupt = ForecastFile::open(&garbage).unwrap_err();
    assert!(matches!(corrupt, FlowcastError::FileFormat { .. }));
}

#[test]
fn resolves_with_full_scan() {
    let dir = TempDir::new().unwrap();
    let path = sample_file(&dir);
    let file = ForecastFile::open(&path).unwrap();

    assert_eq!(resolve_index(900123, None, &file, "rivid").unwrap(), 2);
    assert_eq!(resolve_index(900120, None, &file, "rivid").unwrap(), 0);

    let err = resolve_index(123, None, &file, "rivid").unwrap_err();
    assert_eq!(err.to_string(), "Reach with id: 123 not found.");
}

#[test]
fn cached_guess_matches_full_scan() {
    let dir = TempDir::new().unwrap();
    let path = sample_file(&dir);
    let file = ForecastFile::open(&path).unwrap();

    let scanned = resolve_index(900123, None, &file, "rivid").unwrap();
    assert_eq!(resolve_index(900123, Some(scanned), &file, "rivid").unwrap(), scanned);

    // Stale and out-of-range guesses fall back to the scan.
    assert_eq!(resolve_index(900123, Some(0), &file, "rivid").unwrap(), scanned);
    assert_eq!(resolve_index(900123, Some(99), &file, "rivid").unwrap(), scanned);
    assert!(matches!(
        resolve_index(555, Some(2), &file, "rivid"),
        Err(FlowcastError::NotFound(_))
    ));
}

#[test]
fn verified_guess_is_trusted_without_scanning() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dupes.nc");
    let ids = [7, 8, 7];
    let series = vec![vec![0.0f32; 2]; 3];
    write_member(&path, &ids, &series);
    let file = ForecastFile::open(&path).unwrap();

    // A scan finds the first occurrence; a verified guess is returned as is.
    assert_eq!(resolve_index(7, None, &file, "rivid").unwrap(), 0);
    assert_eq!(resolve_index(7, Some(2), &file, "rivid").unwrap(), 2);
}

#[test]
fn reach_major_float_ids() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Qout_basin_3.nc");
    let ids = [11.0, 22.0, 33.0];
    let series = vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]];
    write_member_reach_major(&path, &ids, &series);

    let config = ProductConfig::default();
    let file = ForecastFile::open(&path).unwrap();
    let id_variable = reach_id_variable(&file, &config).unwrap();
    assert_eq!(id_variable, "COMID");
    assert_eq!(resolve_index(22, None, &file, id_variable).unwrap(), 1);
    file.close();

    assert_eq!(read_discharge(&path, 1, &config).unwrap(), vec![3.0, 4.0]);
}

#[test]
fn resolve_in_files_skips_unreadable_leaders() {
    let dir = TempDir::new().unwrap();
    let garbage = dir.path().join("Qout_basin_0.nc");
    fs::write(&garbage, b"truncated").unwrap();
    let good = dir.path().join("Qout_basin_1.nc");
    write_target_member(&good, &[1.0, 2.0]);

    let config = ProductConfig::default();
    let files = vec![garbage.clone(), good];
    assert_eq!(resolve_in_files(&files, 900123, None, &config).unwrap(), TARGET_INDEX);

    let err = resolve_in_files(&[garbage], 900123, None, &config).unwrap_err();
    assert!(matches!(err, FlowcastError::FileFormat { .. }));
}

const FILL: i16 = -9999;

#[test]
fn packed_values_are_unpacked() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Qout_basin_0.nc");
    write_packed_member(&path, &[10, FILL, 30], FILL, 0.5, 1.0);

    let file = ForecastFile::open(&path).unwrap();
    let column = file.read_matrix_column("Qout", TARGET_INDEX).unwrap();
    assert_eq!(column.len(), 3);
    assert_eq!(column[0], 6.0);
    assert!(column[1].is_nan());
    assert_eq!(column[2], 16.0);

    let other = file.read_matrix_column("Qout", 0).unwrap();
    assert!(other.iter().all(|v| v.is_nan()));
}

#[test]
fn fill_values_drop_out_of_hydrograph() {
    let root = TempDir::new().unwrap();
    let dir = cycle_dir(root.path(), "texas_gulf", "20230601.0000");
    let member = |token: &str| dir.join(member_name("upper_basin", token));
    write_packed_member(&member("0"), &[10, FILL, 30], FILL, 0.5, 1.0);
    write_target_member(&member("1"), &[2.0, 4.0, 6.0]);
    write_packed_member(&member("51"), &[4, FILL, 8], FILL, 0.5, 1.0);

    let response = get_hydrograph(
        root.path(),
        "texas_gulf",
        "upper_basin",
        "900123",
        MOST_RECENT,
        None,
        &ProductConfig::default(),
    );
    let hydrograph = response.success().unwrap();

    let mean: Vec<f64> = hydrograph.mean.as_ref().unwrap().values().collect();
    assert_eq!(mean, vec![4.0, 4.0, 11.0]);
    let min: Vec<f64> = hydrograph.min.as_ref().unwrap().values().collect();
    assert_eq!(min, vec![2.0, 4.0, 6.0]);

    let json = serde_json::to_value(&hydrograph).unwrap();
    assert_eq!(json["high_res"][0][1], 3.0);
    assert!(json["high_res"][1][1].is_null());
    assert_eq!(json["high_res"][2][1], 5.0);
    assert_eq!(json["mean"][1][1], 4.0);
}
