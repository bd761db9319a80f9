//! Packaging toolchain capabilities.
//!
//! Plain distutils accepts only the core metadata fields; setuptools also
//! understands `project_urls`, `python_requires`, the long description
//! content type, and `zip_safe`. Which one is in play is decided once, by
//! [`select_toolchain`], and passed around as a trait object.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::SetupError;
use crate::core::metadata::MetadataRecord;

/// What the packaging toolchain is able to accept.
pub trait PackagingToolchain {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Whether the extended metadata field set is understood.
    fn is_enhanced(&self) -> bool;

    /// Merge the extended metadata fields if supported.
    fn extend_metadata(&self, record: &mut MetadataRecord, extra: MetadataRecord) {
        if self.is_enhanced() {
            record.merge_additive(extra);
        }
    }

    /// Whether builds should be marked as not zip-safe.
    fn supports_zip_safe(&self) -> bool {
        self.is_enhanced()
    }
}

/// distutils-only toolchain.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicToolchain;

impl PackagingToolchain for BasicToolchain {
    fn name(&self) -> &'static str {
        "distutils"
    }

    fn is_enhanced(&self) -> bool {
        false
    }
}

/// setuptools toolchain.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnhancedToolchain;

impl PackagingToolchain for EnhancedToolchain {
    fn name(&self) -> &'static str {
        "setuptools"
    }

    fn is_enhanced(&self) -> bool {
        true
    }
}

/// Toolchain selection, as configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolchainPreference {
    Basic,
    Enhanced,
    /// Probe the interpreter for setuptools.
    #[default]
    Auto,
}

impl fmt::Display for ToolchainPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ToolchainPreference::Basic => "basic",
            ToolchainPreference::Enhanced => "enhanced",
            ToolchainPreference::Auto => "auto",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for ToolchainPreference {
    type Err = SetupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basic" | "distutils" => Ok(ToolchainPreference::Basic),
            "enhanced" | "setuptools" => Ok(ToolchainPreference::Enhanced),
            "auto" => Ok(ToolchainPreference::Auto),
            _ => Err(SetupError::InvalidToolchain(s.to_string())),
        }
    }
}

/// Pick a toolchain implementation.
///
/// `probe` is only called for [`ToolchainPreference::Auto`] and reports
/// whether the enhanced toolchain is available.
pub fn select_toolchain<F>(preference: ToolchainPreference, probe: F) -> Box<dyn PackagingToolchain>
where
    F: FnOnce() -> bool,
{
    let enhanced = match preference {
        ToolchainPreference::Basic => false,
        ToolchainPreference::Enhanced => true,
        ToolchainPreference::Auto => probe(),
    };

    if enhanced {
        Box::new(EnhancedToolchain)
    } else {
        Box::new(BasicToolchain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_explicit_preferences_skip_probe() {
        let tc = select_toolchain(ToolchainPreference::Basic, || panic!("probed"));
        assert!(!tc.is_enhanced());

        let tc = select_toolchain(ToolchainPreference::Enhanced, || panic!("probed"));
        assert!(tc.is_enhanced());
    }

    #[test]
    fn test_select_auto_uses_probe() {
        assert!(select_toolchain(ToolchainPreference::Auto, || true).is_enhanced());
        assert!(!select_toolchain(ToolchainPreference::Auto, || false).is_enhanced());
    }

    #[test]
    fn test_parse_preference() {
        assert_eq!("Enhanced".parse::<ToolchainPreference>().unwrap(), ToolchainPreference::Enhanced);
        assert_eq!("setuptools".parse::<ToolchainPreference>().unwrap(), ToolchainPreference::Enhanced);
        assert_eq!("basic".parse::<ToolchainPreference>().unwrap(), ToolchainPreference::Basic);
        assert!("fancy".parse::<ToolchainPreference>().is_err());
    }

    #[test]
    fn test_zip_safe_follows_capability() {
        assert!(EnhancedToolchain.supports_zip_safe());
        assert!(!BasicToolchain.supports_zip_safe());
    }
}
