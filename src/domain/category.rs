//! Entity categories and gather subsets
//!
//! Each [`Category`] maps to exactly one read-only CLI command on the
//! storage system and one key in the aggregate report.

use crate::error::{Error, Result};
use std::str::FromStr;

/// Wildcard tag that selects every category
pub const ALL_TAG: &str = "all";

// =============================================================================
// Category
// =============================================================================

/// Storage entity type that can be gathered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Volume,
    Pool,
    Node,
    IoGroup,
    Host,
    HostCluster,
    FcConnectivity,
    FcPort,
    IscsiPort,
    FcMap,
    FcConsistGroup,
    VdiskCopy,
    TargetPortFc,
    Array,
    System,
}

impl Category {
    /// Every category, in expansion and execution order
    pub const ALL: [Category; 15] = [
        Category::Volume,
        Category::Pool,
        Category::Node,
        Category::IoGroup,
        Category::Host,
        Category::HostCluster,
        Category::FcConnectivity,
        Category::FcPort,
        Category::IscsiPort,
        Category::FcMap,
        Category::FcConsistGroup,
        Category::VdiskCopy,
        Category::TargetPortFc,
        Category::Array,
        Category::System,
    ];

    /// Tag accepted in `gather_subset`
    pub fn tag(&self) -> &'static str {
        match self {
            Category::Volume => "vol",
            Category::Pool => "pool",
            Category::Node => "node",
            Category::IoGroup => "iog",
            Category::Host => "host",
            Category::HostCluster => "hc",
            Category::FcConnectivity => "fc",
            Category::FcPort => "fcport",
            Category::IscsiPort => "iscsiport",
            Category::FcMap => "fcmap",
            Category::FcConsistGroup => "fcconsistgrp",
            Category::VdiskCopy => "vdiskcopy",
            Category::TargetPortFc => "targetportfc",
            Category::Array => "array",
            Category::System => "system",
        }
    }

    /// Read-only command executed for this category
    pub fn command(&self) -> &'static str {
        match self {
            Category::Volume => "lsvdisk",
            Category::Pool => "lsmdiskgrp",
            Category::Node => "lsnode",
            Category::IoGroup => "lsiogrp",
            Category::Host => "lshost",
            Category::HostCluster => "lshostcluster",
            Category::FcConnectivity => "lsfabric",
            Category::FcPort => "lsportfc",
            Category::IscsiPort => "lsportip",
            Category::FcMap => "lsfcmap",
            Category::FcConsistGroup => "lsfcconsistgrp",
            Category::VdiskCopy => "lsvdiskcopy",
            Category::TargetPortFc => "lstargetportfc",
            Category::Array => "lsarray",
            Category::System => "lssystem",
        }
    }

    /// Key under which results appear in the report
    pub fn report_key(&self) -> &'static str {
        match self {
            Category::Volume => "Volumes",
            Category::Pool => "Pools",
            Category::Node => "Nodes",
            Category::IoGroup => "IOGroup",
            Category::Host => "Hosts",
            Category::HostCluster => "HostClusters",
            Category::FcConnectivity => "FCConnectivity",
            Category::FcPort => "FCPorts",
            Category::IscsiPort => "iSCSIPorts",
            Category::FcMap => "FCMaps",
            Category::FcConsistGroup => "FCConsistgrp",
            Category::VdiskCopy => "VdiskCopy",
            Category::TargetPortFc => "TargetPortFC",
            Category::Array => "Array",
            Category::System => "System",
        }
    }

    /// Human-readable name used in log lines
    pub fn description(&self) -> &'static str {
        match self {
            Category::Volume => "volumes",
            Category::Pool => "pools",
            Category::Node => "nodes",
            Category::IoGroup => "I/O groups",
            Category::Host => "hosts",
            Category::HostCluster => "host clusters",
            Category::FcConnectivity => "FC connectivity entries",
            Category::FcPort => "FC ports",
            Category::IscsiPort => "iSCSI ports",
            Category::FcMap => "FC maps",
            Category::FcConsistGroup => "FC consistency groups",
            Category::VdiskCopy => "volume copies",
            Category::TargetPortFc => "target port FC entries",
            Category::Array => "arrays",
            Category::System => "system entries",
        }
    }

    fn valid_tags() -> String {
        Category::ALL
            .iter()
            .map(|c| c.tag())
            .chain(std::iter::once(ALL_TAG))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let tag = s.trim();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.tag() == tag)
            .ok_or_else(|| {
                Error::Configuration(format!(
                    "unknown gather_subset value '{}' (expected one of: {})",
                    tag,
                    Category::valid_tags()
                ))
            })
    }
}

// =============================================================================
// Gather Subset
// =============================================================================

/// Validated set of categories requested in one invocation.
///
/// Always held in [`Category::ALL`] order with no duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatherSubset {
    categories: Vec<Category>,
}

impl GatherSubset {
    /// Subset containing every category
    pub fn all() -> Self {
        Self {
            categories: Category::ALL.to_vec(),
        }
    }

    /// Parse a list of tags. An empty list or any `all` tag selects everything.
    pub fn parse<I, S>(tags: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut requested = Vec::new();
        let mut wildcard = false;

        for tag in tags {
            let tag = tag.as_ref().trim();
            if tag == ALL_TAG {
                wildcard = true;
                continue;
            }
            requested.push(tag.parse::<Category>()?);
        }

        if wildcard || requested.is_empty() {
            return Ok(Self::all());
        }

        Ok(Self::from_categories(requested))
    }

    /// Build a subset from already-typed categories
    fn from_categories(categories: impl IntoIterator<Item = Category>) -> Self {
        let mut categories: Vec<Category> = categories.into_iter().collect();
        if categories.is_empty() {
            return Self::all();
        }
        categories.sort();
        categories.dedup();
        Self { categories }
    }

    /// Categories in execution order
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Whether every category is selected
    pub fn is_all(&self) -> bool {
        self.categories.len() == Category::ALL.len()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }
}

impl Default for GatherSubset {
    fn default() -> Self {
        Self::all()
    }
}
