//! Fixture builders for forecast output trees.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Reach identifiers used by every fixture file.
pub const REACH_IDS: [i32; 4] = [900120, 900121, 900123, 900125];

/// Position of reach 900123 in [`REACH_IDS`].
pub const TARGET_INDEX: usize = 2;

/// Write a member file with `Qout` stored time × reach.
///
/// `series[r][t]` is the discharge of reach `r` at timestep `t`.
pub fn write_member(path: &Path, ids: &[i32], series: &[Vec<f32>]) {
    let n_time = series.first().map_or(0, Vec::len);
    let mut flat = Vec::with_capacity(n_time * ids.len());
    for t in 0..n_time {
        for reach in series {
            flat.push(reach[t]);
        }
    }

    let mut file = netcdf::create(path).unwrap();
    file.add_dimension("time", n_time).unwrap();
    file.add_dimension("rivid", ids.len()).unwrap();

    let mut rivid = file.add_variable::<i32>("rivid", &["rivid"]).unwrap();
    rivid.put_values(ids, ..).unwrap();

    let mut qout = file.add_variable::<f32>("Qout", &["time", "rivid"]).unwrap();
    qout.put_values(&flat, ..).unwrap();
}

/// Write a member file with `Qout` stored reach × time and float `COMID` ids.
pub fn write_member_reach_major(path: &Path, ids: &[f64], series: &[Vec<f64>]) {
    let n_time = series.first().map_or(0, Vec::len);
    let flat: Vec<f64> = series.iter().flatten().copied().collect();

    let mut file = netcdf::create(path).unwrap();
    file.add_dimension("COMID", ids.len()).unwrap();
    file.add_dimension("Time", n_time).unwrap();

    let mut comid = file.add_variable::<f64>("COMID", &["COMID"]).unwrap();
    comid.put_values(ids, ..).unwrap();

    let mut qout = file.add_variable::<f64>("Qout", &["COMID", "Time"]).unwrap();
    qout.put_values(&flat, ..).unwrap();
}

/// Write a member file with packed `i16` discharge and CF packing attributes.
///
/// The target reach holds `raw`; every other reach is `fill`.
pub fn write_packed_member(path: &Path, raw: &[i16], fill: i16, scale: f32, offset: f32) {
    let n_time = raw.len();
    let mut flat = Vec::with_capacity(n_time * REACH_IDS.len());
    for value in raw {
        for r in 0..REACH_IDS.len() {
            flat.push(if r == TARGET_INDEX { *value } else { fill });
        }
    }

    let mut file = netcdf::create(path).unwrap();
    file.add_dimension("time", n_time).unwrap();
    file.add_dimension("rivid", REACH_IDS.len()).unwrap();

    let mut rivid = file.add_variable::<i32>("rivid", &["rivid"]).unwrap();
    rivid.put_values(&REACH_IDS, ..).unwrap();

    let mut qout = file.add_variable::<i16>("Qout", &["time", "rivid"]).unwrap();
    qout.put_attribute("_FillValue", fill).unwrap();
    qout.put_attribute("scale_factor", scale).unwrap();
    qout.put_attribute("add_offset", offset).unwrap();
    qout.put_values(&flat, ..).unwrap();
}

/// Write a member file where only the target reach varies; other reaches are zero.
pub fn write_target_member(path: &Path, values: &[f32]) {
    let series: Vec<Vec<f32>> = (0..REACH_IDS.len())
        .map(|r| {
            if r == TARGET_INDEX {
                values.to_vec()
            } else {
                vec![0.0; values.len()]
            }
        })
        .collect();
    write_member(path, &REACH_IDS, &series);
}

/// Create `root/<watershed>/<cycle>` and return its path.
pub fn cycle_dir(root: &Path, watershed: &str, cycle: &str) -> PathBuf {
    let dir = root.join(watershed).join(cycle);
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// Member file name for a subbasin and member token.
pub fn member_name(subbasin: &str, token: &str) -> String {
    format!("Qout_{}_{}.nc", subbasin, token)
}

/// Scenario discharge for member `m` at timestep `t`; the first members go negative.
pub fn scenario_value(member: u32, t: usize) -> f32 {
    member as f32 - 5.0 + t as f32 * 0.1
}

/// Auxiliary product discharge, in cubic feet per second.
pub const AUX_CFS: f32 = 100.0;

/// Timesteps in the auxiliary product.
pub const AUX_LEN: usize = 18;

/// Build the 52-member scenario cycle `20230601.0000` for `texas_gulf/upper_basin`.
///
/// Members 0..=29 and 51 run 60 steps, members 30..=50 stop after the
/// 40-step fine segment, plus one 18-step auxiliary file.
pub fn scenario_tree() -> TempDir {
    let root = TempDir::new().unwrap();
    let dir = cycle_dir(root.path(), "texas_gulf", "20230601.0000");

    for member in 0..=51u32 {
        let len = if member < 30 || member == 51 { 60 } else { 40 };
        let values: Vec<f32> = (0..len).map(|t| scenario_value(member, t)).collect();
        write_target_member(&dir.join(member_name("upper_basin", &member.to_string())), &values);
    }
    write_target_member(&dir.join(member_name("upper_basin", "hrrr")), &[AUX_CFS; AUX_LEN]);

    root
}
