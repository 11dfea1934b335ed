//! Ensemble member classification from file names.

use crate::config::ProductConfig;
use std::path::Path;

/// Role of a member file within a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// Numbered ensemble realization.
    Ensemble(u32),
    /// High-resolution deterministic run.
    HighRes,
    /// Auxiliary nowcast product on its own cadence and units.
    Auxiliary,
}

impl MemberKind {
    /// Classify a member file by the token after the last underscore of its stem.
    ///
    /// `..._12.nc` is ensemble member 12, `..._hrrr.nc` the auxiliary product.
    /// Returns `None` for tokens that identify no known member.
    pub fn classify(path: &Path, config: &ProductConfig) -> Option<Self> {
        let token = member_token(path, &config.file_extension)?;

        if let Ok(index) = token.parse::<u32>() {
            return Some(if index == config.high_res_member {
                MemberKind::HighRes
            } else {
                MemberKind::Ensemble(index)
            });
        }

        let token = token.to_lowercase();
        if config.high_res_tokens.iter().any(|t| t.to_lowercase() == token) {
            Some(MemberKind::HighRes)
        } else if config.auxiliary_tokens.iter().any(|t| t.to_lowercase() == token) {
            Some(MemberKind::Auxiliary)
        } else {
            None
        }
    }

    /// Whether this member's tail extends into the coarse segment.
    pub fn has_coarse_segment(self, config: &ProductConfig) -> bool {
        matches!(self, MemberKind::Ensemble(index) if index < config.coarse_member_limit)
    }
}

/// Trailing underscore-delimited token of a file stem.
pub fn member_token<'a>(path: &'a Path, extension: &str) -> Option<&'a str> {
    let name = path.file_name()?.to_str()?;
    let stem = name
        .strip_suffix(extension)
        .and_then(|s| s.strip_suffix('.'))
        .unwrap_or(name);
    stem.rsplit('_').next().filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(name: &str) -> Option<MemberKind> {
        MemberKind::classify(Path::new(name), &ProductConfig::default())
    }

    #[test]
    fn test_numbered_members() {
        assert_eq!(classify("Qout_texas_gulf_0.nc"), Some(MemberKind::Ensemble(0)));
        assert_eq!(classify("Qout_texas_gulf_50.nc"), Some(MemberKind::Ensemble(50)));
        assert_eq!(classify("Qout_texas_gulf_51.nc"), Some(MemberKind::HighRes));
        assert_eq!(classify("Qout_texas_gulf_52.nc"), Some(MemberKind::Ensemble(52)));
    }

    #[test]
    fn test_sentinel_members() {
        assert_eq!(classify("Qout_texas_gulf_hrrr.nc"), Some(MemberKind::Auxiliary));
        assert_eq!(classify("Qout_texas_gulf_HRRR.nc"), Some(MemberKind::Auxiliary));
        assert_eq!(classify("Qout_texas_gulf_hres.nc"), Some(MemberKind::HighRes));
    }

    #[test]
    fn test_unknown_tokens_are_rejected() {
        assert_eq!(classify("Qout_texas_gulf_mean.nc"), None);
        assert_eq!(classify("Qout_texas_gulf_.nc"), None);
        assert_eq!(classify("Qout_texas_gulf_-3.nc"), None);
    }

    #[test]
    fn test_member_token() {
        assert_eq!(member_token(Path::new("/a/b/Qout_x_7.nc"), "nc"), Some("7"));
        assert_eq!(member_token(Path::new("Qout_x_hrrr.nc"), "nc"), Some("hrrr"));
        assert_eq!(member_token(Path::new("plain.nc"), "nc"), Some("plain"));
    }

    #[test]
    fn test_coarse_segment_membership() {
        let config = ProductConfig {
            coarse_member_limit: 30,
            ..ProductConfig::default()
        };
        assert!(MemberKind::Ensemble(0).has_coarse_segment(&config));
        assert!(MemberKind::Ensemble(29).has_coarse_segment(&config));
        assert!(!MemberKind::Ensemble(30).has_coarse_segment(&config));
        assert!(!MemberKind::HighRes.has_coarse_segment(&config));
        assert!(!MemberKind::Auxiliary.has_coarse_segment(&config));
    }
}
