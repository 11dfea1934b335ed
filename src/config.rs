//! Forecast product configuration.
//!
//! The member layout of a forecast product (how many fine timesteps every
//! member shares, which members extend into the coarse segment, which index is
//! the deterministic run) is specific to the model configuration that wrote
//! the files, so it lives here instead of in the aggregation code.

use chrono::Duration;

/// Default number of results returned when listing cycles.
pub const DEFAULT_MAX_RESULTS: usize = 64;

/// Selector value meaning "newest cycle with usable data".
pub const MOST_RECENT: &str = "most_recent";

/// Cubic feet per second to cubic meters per second.
pub const CFS_TO_CMS: f64 = 0.0283168;

/// Constants describing the layout of one forecast product.
#[derive(Debug, Clone)]
pub struct ProductConfig {
    /// Number of fine-step values at the head of every ensemble column.
    pub fine_prefix_len: usize,
    /// Members with an index below this contribute to the coarse segment.
    pub coarse_member_limit: u32,
    /// Member index of the high-resolution deterministic run.
    pub high_res_member: u32,
    /// Non-numeric member tokens that also mean the deterministic run.
    pub high_res_tokens: Vec<String>,
    /// Member tokens identifying the auxiliary nowcast product.
    pub auxiliary_tokens: Vec<String>,
    /// Spacing of the fine segment.
    pub fine_step: Duration,
    /// Spacing of the coarse segment.
    pub coarse_step: Duration,
    /// Spacing of the auxiliary product.
    pub auxiliary_step: Duration,
    /// Multiplier bringing auxiliary discharge into ensemble units.
    pub auxiliary_unit_factor: f64,
    /// Candidate names of the reach identifier variable, tried in order.
    pub reach_id_variables: Vec<String>,
    /// Name of the discharge variable.
    pub discharge_variable: String,
    /// File extension of member files.
    pub file_extension: String,
}

impl Default for ProductConfig {
    fn default() -> Self {
        Self {
            fine_prefix_len: 40,
            coarse_member_limit: 52,
            high_res_member: 51,
            high_res_tokens: vec!["hres".to_string(), "highres".to_string()],
            auxiliary_tokens: vec!["hrrr".to_string()],
            fine_step: Duration::hours(6),
            coarse_step: Duration::hours(6),
            auxiliary_step: Duration::hours(1),
            auxiliary_unit_factor: CFS_TO_CMS,
            reach_id_variables: vec!["rivid".to_string(), "COMID".to_string()],
            discharge_variable: "Qout".to_string(),
            file_extension: "nc".to_string(),
        }
    }
}

/// How strictly cycle enumeration checks a candidate directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReachCheck {
    /// Accept a directory as soon as it holds a file for the subbasin.
    #[default]
    FilesOnly,
    /// Also open a member file and require the reach to resolve.
    ResolveReach,
}

/// Options for cycle enumeration.
#[derive(Debug, Clone)]
pub struct EnumerateOptions {
    /// Upper bound on returned cycles.
    pub max_results: usize,
    /// Per-candidate verification level.
    pub reach_check: ReachCheck,
}

impl Default for EnumerateOptions {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            reach_check: ReachCheck::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_product_layout() {
        let config = ProductConfig::default();
        assert_eq!(config.fine_prefix_len, 40);
        assert_eq!(config.coarse_member_limit, 52);
        assert_eq!(config.high_res_member, 51);
        assert_eq!(config.fine_step, Duration::hours(6));
        assert_eq!(config.auxiliary_step, Duration::hours(1));
        assert_eq!(config.reach_id_variables[0], "rivid");
    }

    #[test]
    fn test_enumerate_defaults() {
        let options = EnumerateOptions::default();
        assert_eq!(options.max_results, DEFAULT_MAX_RESULTS);
        assert_eq!(options.reach_check, ReachCheck::FilesOnly);
    }
}
