//! Configuration loading
//!
//! Settings come from an optional YAML file overlaid with command-line and
//! environment values. [`RawConfig::resolve`] validates the merged result
//! before anything touches the network.

use crate::client::{SvcRestConfig, DEFAULT_REST_PORT};
use crate::domain::category::GatherSubset;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

// =============================================================================
// Gather State
// =============================================================================

/// Requested module state. Only `info` is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GatherState {
    #[default]
    Info,
}

impl FromStr for GatherState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "info" => Ok(GatherState::Info),
            other => Err(Error::Configuration(format!(
                "unsupported state '{}' (expected: info)",
                other
            ))),
        }
    }
}

// =============================================================================
// Raw Configuration
// =============================================================================

/// Unvalidated settings, as read from a file or the command line
#[derive(Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawConfig {
    pub clustername: Option<String>,
    pub domain: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub validate_certs: Option<bool>,
    pub log_path: Option<PathBuf>,
    pub gather_subset: Option<Vec<String>>,
    pub name: Option<String>,
    pub state: Option<String>,
    pub port: Option<u16>,
    pub timeout_secs: Option<u64>,
    pub max_retry_secs: Option<u64>,
    pub endpoint: Option<String>,
}

impl RawConfig {
    /// Parse settings from a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load settings from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Overlay `other` on top of `self`; values set in `other` win
    pub fn overlay(self, other: RawConfig) -> RawConfig {
        RawConfig {
            clustername: other.clustername.or(self.clustername),
            domain: other.domain.or(self.domain),
            username: other.username.or(self.username),
            password: other.password.or(self.password),
            validate_certs: other.validate_certs.or(self.validate_certs),
            log_path: other.log_path.or(self.log_path),
            gather_subset: other.gather_subset.or(self.gather_subset),
            name: other.name.or(self.name),
            state: other.state.or(self.state),
            port: other.port.or(self.port),
            timeout_secs: other.timeout_secs.or(self.timeout_secs),
            max_retry_secs: other.max_retry_secs.or(self.max_retry_secs),
            endpoint: other.endpoint.or(self.endpoint),
        }
    }

    /// Validate and convert into an [`InfoConfig`]
    pub fn resolve(self) -> Result<InfoConfig> {
        let clustername = required("clustername", self.clustername)?;
        let username = required("username", self.username)?;
        let password = required("password", self.password)?;

        let state = match self.state {
            Some(state) => state.parse()?,
            None => GatherState::default(),
        };

        let subset = match self.gather_subset {
            Some(tags) => GatherSubset::parse(tags)?,
            None => GatherSubset::all(),
        };

        let defaults = SvcRestConfig::default();
        let timeout = match self.timeout_secs {
            Some(0) => {
                return Err(Error::Configuration(
                    "timeout_secs must be greater than zero".into(),
                ))
            }
            Some(secs) => Duration::from_secs(secs),
            None => defaults.timeout,
        };

        let connection = SvcRestConfig {
            clustername,
            domain: self.domain.filter(|d| !d.trim().is_empty()),
            port: self.port.unwrap_or(DEFAULT_REST_PORT),
            username,
            password,
            validate_certs: self.validate_certs.unwrap_or(false),
            timeout,
            max_retry: self
                .max_retry_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.max_retry),
            endpoint: self.endpoint.filter(|e| !e.trim().is_empty()),
        };

        Ok(InfoConfig {
            name: self.name,
            state,
            connection,
            log_path: self.log_path,
            subset,
        })
    }
}

impl std::fmt::Debug for RawConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawConfig")
            .field("clustername", &self.clustername)
            .field("domain", &self.domain)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("validate_certs", &self.validate_certs)
            .field("log_path", &self.log_path)
            .field("gather_subset", &self.gather_subset)
            .field("name", &self.name)
            .field("state", &self.state)
            .field("port", &self.port)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retry_secs", &self.max_retry_secs)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

fn required(field: &str, value: Option<String>) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(Error::Configuration(format!("{} is required", field))),
    }
}

// =============================================================================
// Validated Configuration
// =============================================================================

/// Validated settings for one gather run
#[derive(Debug, Clone)]
pub struct InfoConfig {
    /// Optional label echoed into the report
    pub name: Option<String>,
    pub state: GatherState,
    pub connection: SvcRestConfig,
    /// Log destination; stderr when unset
    pub log_path: Option<PathBuf>,
    pub subset: GatherSubset,
}
