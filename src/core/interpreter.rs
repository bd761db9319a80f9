//! Python interpreter versions and the compatibility policy keyed on them.
//!
//! Only the `(major, minor)` pair matters for every decision this crate
//! makes, so patch levels and pre-release tags are parsed and discarded.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::error::SetupError;

/// A two-component interpreter version, ordered as a tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PythonVersion {
    pub major: u32,
    pub minor: u32,
}

impl PythonVersion {
    /// Create a new version.
    pub const fn new(major: u32, minor: u32) -> Self {
        PythonVersion { major, minor }
    }

    /// Extract a version from `python --version` output (e.g. `Python 3.11.4`).
    pub fn from_version_output(output: &str) -> Option<Self> {
        output
            .split_whitespace()
            .find(|word| word.starts_with(|c: char| c.is_ascii_digit()))
            .and_then(|word| word.parse().ok())
    }
}

impl fmt::Display for PythonVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for PythonVersion {
    type Err = SetupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SetupError::InvalidPythonVersion(s.to_string());

        let trimmed = s.trim();
        let trimmed = trimmed
            .strip_prefix("Python ")
            .unwrap_or(trimmed)
            .trim();

        let mut parts = trimmed.split('.');
        let major = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(invalid)?;

        // "3.12.0rc1" still has a clean minor component
        let minor = parts
            .next()
            .map(|p| {
                p.chars()
                    .take_while(|c| c.is_ascii_digit())
                    .collect::<String>()
            })
            .and_then(|p| p.parse().ok())
            .ok_or_else(invalid)?;

        Ok(PythonVersion { major, minor })
    }
}

impl Serialize for PythonVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PythonVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Interpreter thresholds that gate compatibility behaviour.
///
/// Defaults match the newest validated release series; config files may
/// override each field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompatPolicy {
    /// Oldest interpreter the package can be built for.
    pub require_python: PythonVersion,

    /// Newest interpreter the generated C code has been validated against.
    pub maxknown_python: PythonVersion,

    /// Interpreters older than this skip the newest package-data patterns.
    pub package_data_min_python: PythonVersion,
}

impl CompatPolicy {
    /// The `python_requires` specifier for this policy.
    pub fn python_requires(&self) -> String {
        format!(">={}", self.require_python)
    }

    /// Check whether the interpreter meets the minimum version.
    pub fn check_supported(&self, python: PythonVersion) -> Result<(), SetupError> {
        if python < self.require_python {
            return Err(SetupError::UnsupportedPython {
                found: python,
                required: self.python_requires(),
            });
        }
        Ok(())
    }

    /// Whether the interpreter is newer than anything validated.
    pub fn is_beyond_known(&self, python: PythonVersion) -> bool {
        python > self.maxknown_python
    }
}

impl Default for CompatPolicy {
    fn default() -> Self {
        CompatPolicy {
            require_python: PythonVersion::new(3, 6),
            maxknown_python: PythonVersion::new(3, 11),
            package_data_min_python: PythonVersion::new(3, 7),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_versions() {
        assert_eq!("3.11".parse::<PythonVersion>().unwrap(), PythonVersion::new(3, 11));
        assert_eq!("3.11.4".parse::<PythonVersion>().unwrap(), PythonVersion::new(3, 11));
        assert_eq!(
            "Python 3.12.0rc1".parse::<PythonVersion>().unwrap(),
            PythonVersion::new(3, 12)
        );
        assert!("3".parse::<PythonVersion>().is_err());
        assert!("three.eleven".parse::<PythonVersion>().is_err());
    }

    #[test]
    fn test_from_version_output() {
        assert_eq!(
            PythonVersion::from_version_output("Python 3.10.12\n"),
            Some(PythonVersion::new(3, 10))
        );
        assert_eq!(PythonVersion::from_version_output("garbage"), None);
    }

    #[test]
    fn test_tuple_ordering() {
        assert!(PythonVersion::new(3, 12) > PythonVersion::new(3, 11));
        assert!(PythonVersion::new(3, 9) < PythonVersion::new(3, 10));
        assert!(PythonVersion::new(4, 0) > PythonVersion::new(3, 99));
    }

    #[test]
    fn test_policy_guard() {
        let policy = CompatPolicy::default();
        assert!(policy.check_supported(PythonVersion::new(3, 6)).is_ok());

        let err = policy.check_supported(PythonVersion::new(3, 5)).unwrap_err();
        assert!(err.to_string().contains(">=3.6"));
    }

    #[test]
    fn test_beyond_known_is_strict() {
        let policy = CompatPolicy::default();
        assert!(!policy.is_beyond_known(PythonVersion::new(3, 11)));
        assert!(policy.is_beyond_known(PythonVersion::new(3, 12)));
    }

    #[test]
    fn test_policy_from_toml() {
        let policy: CompatPolicy = toml::from_str("maxknown_python = \"3.12\"").unwrap();
        assert_eq!(policy.maxknown_python, PythonVersion::new(3, 12));
        assert_eq!(policy.require_python, PythonVersion::new(3, 6));
    }
}
