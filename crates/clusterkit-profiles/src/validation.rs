//! Profile validity checks
//!
//! A profile is usable once it names a driver and a Kubernetes version. These
//! checks never touch the filesystem.

use crate::config::ClusterConfig;
use std::fmt;

/// Reason a decoded config is not usable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// `MachineConfig.VMDriver` is empty
    MissingDriver,
    /// `KubernetesConfig.KubernetesVersion` is empty
    MissingKubernetesVersion,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingDriver => write!(f, "driver is not set"),
            Self::MissingKubernetesVersion => write!(f, "Kubernetes version is not set"),
        }
    }
}

/// Collect every reason `config` is not usable
///
/// # Errors
///
/// Returns the list of missing fields, in field order, if any is empty.
pub fn validate(config: &ClusterConfig) -> Result<(), Vec<InvalidReason>> {
    let mut reasons = Vec::new();
    if config.driver().is_empty() {
        reasons.push(InvalidReason::MissingDriver);
    }
    if config.kubernetes_version().is_empty() {
        reasons.push(InvalidReason::MissingKubernetesVersion);
    }

    if reasons.is_empty() {
        Ok(())
    } else {
        Err(reasons)
    }
}

/// True iff both the driver and the Kubernetes version are set
pub fn is_valid(config: &ClusterConfig) -> bool {
    validate(config).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validity_table() {
        let cases = [
            ("", "", false),
            ("kvm2", "", false),
            ("", "v1.18.0", false),
            ("kvm2", "v1.18.0", true),
        ];

        for (driver, version, expected) in cases {
            let config = ClusterConfig::new(driver, version);
            assert_eq!(
                is_valid(&config),
                expected,
                "driver={driver:?} version={version:?}"
            );
        }
    }

    #[test]
    fn test_validate_reports_all_reasons() {
        let reasons = validate(&ClusterConfig::default()).err();
        assert_eq!(
            reasons,
            Some(vec![
                InvalidReason::MissingDriver,
                InvalidReason::MissingKubernetesVersion
            ])
        );
    }

    #[test]
    fn test_whitespace_counts_as_set() {
        assert!(is_valid(&ClusterConfig::new(" ", " ")));
    }

    #[test]
    fn test_reason_display() {
        assert_eq!(InvalidReason::MissingDriver.to_string(), "driver is not set");
    }
}
