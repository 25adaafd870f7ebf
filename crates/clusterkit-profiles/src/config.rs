//! Cluster config record and profile types
//!
//! Only the driver and Kubernetes version fields are interpreted by this crate.
//! Every other key in the on-disk JSON is kept in the `extra` maps so that a
//! load followed by a save never drops data written by other tools.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Persisted configuration of a single cluster profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Machine (VM or container host) settings
    #[serde(rename = "MachineConfig")]
    pub machine: MachineConfig,
    /// Kubernetes settings
    #[serde(rename = "KubernetesConfig")]
    pub kubernetes: KubernetesConfig,
    /// Unrecognised top-level keys
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ClusterConfig {
    /// Config with the two fields required for a usable profile
    pub fn new(driver: impl Into<String>, kubernetes_version: impl Into<String>) -> Self {
        Self {
            machine: MachineConfig {
                driver: driver.into(),
                ..Default::default()
            },
            kubernetes: KubernetesConfig {
                version: kubernetes_version.into(),
                ..Default::default()
            },
            extra: Map::new(),
        }
    }

    /// Driver identifier, e.g. `kvm2` or `docker`
    pub fn driver(&self) -> &str {
        &self.machine.driver
    }

    /// Kubernetes version string, e.g. `v1.18.0`
    pub fn kubernetes_version(&self) -> &str {
        &self.kubernetes.version
    }
}

/// Machine section of [`ClusterConfig`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Driver identifier
    #[serde(rename = "VMDriver")]
    pub driver: String,
    /// Unrecognised machine keys
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Kubernetes section of [`ClusterConfig`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KubernetesConfig {
    /// Kubernetes version
    #[serde(rename = "KubernetesVersion")]
    pub version: String,
    /// Unrecognised Kubernetes keys
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A named profile and its decoded config
///
/// Profiles that failed to load carry a default config.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    /// Profile name, identical to its directory name
    pub name: String,
    /// Decoded config
    pub config: ClusterConfig,
}

impl Profile {
    /// Create a profile from a name and config
    pub fn new(name: impl Into<String>, config: ClusterConfig) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }

    /// Profile with a default config, used for entries that could not be loaded
    pub fn unloaded(name: impl Into<String>) -> Self {
        Self::new(name, ClusterConfig::default())
    }
}
