// ─── Product Version ───
// Dotted numeric versions as reported by the catalog, the registry and
// the executable's file version.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::error::{HostError, HostResult};

/// A `major.minor[.build[.revision]]` version with 2 to 4 numeric parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProductVersion {
    pub major: u32,
    pub minor: u32,
    pub build: Option<u32>,
    pub revision: Option<u32>,
}

impl ProductVersion {
    /// Parse a dotted version string.
    ///
    /// ```
    /// use revit_hosts::ProductVersion;
    /// let v = ProductVersion::parse("19.0.0.405").unwrap();
    /// assert_eq!(v.major, 19);
    /// assert_eq!(v.revision, Some(405));
    /// ```
    pub fn parse(raw: &str) -> HostResult<Self> {
        let trimmed = raw.trim();
        let parts = trimmed
            .split('.')
            .map(|part| {
                if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                part.parse::<u32>().ok()
            })
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| HostError::InvalidVersion(raw.to_string()))?;

        match parts.as_slice() {
            [major, minor] => Ok(Self::new(*major, *minor, None, None)),
            [major, minor, build] => Ok(Self::new(*major, *minor, Some(*build), None)),
            [major, minor, build, revision] => {
                Ok(Self::new(*major, *minor, Some(*build), Some(*revision)))
            }
            _ => Err(HostError::InvalidVersion(raw.to_string())),
        }
    }

    pub fn new(major: u32, minor: u32, build: Option<u32>, revision: Option<u32>) -> Self {
        // a revision without a build component cannot be written back out
        let build = build.or(revision.map(|_| 0));
        Self {
            major,
            minor,
            build,
            revision,
        }
    }
}

impl FromStr for ProductVersion {
    type Err = HostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ProductVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if let Some(build) = self.build {
            write!(f, ".{}", build)?;
        }
        if let Some(revision) = self.revision {
            write!(f, ".{}", revision)?;
        }
        Ok(())
    }
}

impl Serialize for ProductVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ProductVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
