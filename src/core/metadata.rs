//! Package metadata.
//!
//! The record handed to the backend is built from static templates plus
//! the resolved version. Keys are a closed enum so a field can only ever
//! appear once, whatever toolchain contributed it.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use serde::{Serialize, Serializer};
use url::Url;

use crate::core::interpreter::CompatPolicy;
use crate::core::toolchain::PackagingToolchain;
use crate::core::version::{public_version, VersionResolver};

pub const NAME: &str = "mpi4py";
pub const DESCRIPTION: &str = "Python bindings for MPI";
pub const HOMEPAGE: &str = "https://mpi4py.github.io";
pub const LICENSE: &str = "BSD-2-Clause";
pub const AUTHOR: &str = "Lisandro Dalcin";
pub const AUTHOR_EMAIL: &str = "dalcinl@gmail.com";
pub const LONG_DESCRIPTION_CONTENT_TYPE: &str = "text/rst";

/// Marker that identifies development snapshots.
pub const DEV_MARKER: &str = ".dev";

/// Documents stitched together into the long description.
pub const LONG_DESCRIPTION_FILES: [&str; 3] = ["DESCRIPTION.rst", "CITATION.rst", "INSTALL.rst"];

static GITHUB_BASE: LazyLock<Url> =
    LazyLock::new(|| Url::parse("https://github.com/mpi4py/mpi4py").expect("valid GitHub URL"));

static READTHEDOCS_BASE: LazyLock<Url> =
    LazyLock::new(|| Url::parse("https://mpi4py.readthedocs.io").expect("valid ReadTheDocs URL"));

const CLASSIFIERS: &str = "
Development Status :: 5 - Production/Stable
Intended Audience :: Developers
Intended Audience :: Science/Research
License :: OSI Approved :: BSD License
Operating System :: MacOS
Operating System :: MacOS :: MacOS X
Operating System :: Microsoft :: Windows
Operating System :: POSIX
Operating System :: POSIX :: BSD
Operating System :: POSIX :: Linux
Operating System :: Unix
Programming Language :: C
Programming Language :: Cython
Programming Language :: Python
Programming Language :: Python :: 3
Programming Language :: Python :: 3.6
Programming Language :: Python :: 3.7
Programming Language :: Python :: 3.8
Programming Language :: Python :: 3.9
Programming Language :: Python :: 3.10
Programming Language :: Python :: 3.11
Programming Language :: Python :: 3.12
Programming Language :: Python :: Implementation :: CPython
Programming Language :: Python :: Implementation :: PyPy
Topic :: Scientific/Engineering
Topic :: Software Development :: Libraries :: Python Modules
Topic :: System :: Distributed Computing
";

const KEYWORDS: &str = "
scientific computing
parallel computing
message passing interface
MPI
";

const PLATFORMS: &str = "
POSIX
Linux
macOS
FreeBSD
Windows
";

/// Metadata field names, in the order they are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataKey {
    Name,
    Version,
    Description,
    LongDescription,
    Url,
    DownloadUrl,
    Classifiers,
    Keywords,
    Platforms,
    License,
    Author,
    AuthorEmail,
    ProjectUrls,
    PythonRequires,
    LongDescriptionContentType,
}

/// A metadata value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Text(String),
    List(Vec<String>),
    /// Ordered label/value pairs, emitted as a mapping.
    #[serde(serialize_with = "serialize_table")]
    Table(Vec<(String, String)>),
}

fn serialize_table<S: Serializer>(table: &[(String, String)], s: S) -> Result<S::Ok, S::Error> {
    s.collect_map(table.iter().map(|(k, v)| (k, v)))
}

impl MetadataValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MetadataValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            MetadataValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(s: &str) -> Self {
        MetadataValue::Text(s.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(s: String) -> Self {
        MetadataValue::Text(s)
    }
}

/// The descriptive record for the package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MetadataRecord {
    fields: BTreeMap<MetadataKey, MetadataValue>,
}

impl MetadataRecord {
    pub fn new() -> Self {
        MetadataRecord::default()
    }

    pub fn insert(&mut self, key: MetadataKey, value: impl Into<MetadataValue>) {
        self.fields.insert(key, value.into());
    }

    pub fn get(&self, key: MetadataKey) -> Option<&MetadataValue> {
        self.fields.get(&key)
    }

    pub fn contains(&self, key: MetadataKey) -> bool {
        self.fields.contains_key(&key)
    }

    /// Merge fields from `other` that are not already present.
    ///
    /// Existing values are never replaced, so merging the same record
    /// twice is a no-op.
    pub fn merge_additive(&mut self, other: MetadataRecord) {
        for (key, value) in other.fields {
            self.fields.entry(key).or_insert(value);
        }
    }
}

/// Split a multi-line template into its non-empty lines.
pub fn template_lines(template: &str) -> Vec<String> {
    template
        .trim()
        .lines()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

fn join_url(base: &Url, segments: &[&str]) -> String {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.extend(segments);
    }
    url.to_string()
}

/// A URL under the GitHub repository.
pub fn github(segments: &[&str]) -> String {
    join_url(&GITHUB_BASE, segments)
}

/// A URL under the ReadTheDocs site.
pub fn readthedocs(segments: &[&str]) -> String {
    join_url(&READTHEDOCS_BASE, segments)
}

fn is_dev(version: &str) -> bool {
    public_version(version).contains(DEV_MARKER)
}

/// Source archive location for a version.
pub fn download_url(version: &str) -> String {
    let public = public_version(version);
    if is_dev(public) {
        github(&["tarball", "master"])
    } else {
        let archive = format!("{}-{}.tar.gz", NAME, public);
        github(&["releases", "download", public, &archive])
    }
}

/// Documentation location for a version.
pub fn documentation_url(version: &str) -> String {
    let public = public_version(version);
    let location = if is_dev(public) { "latest" } else { public };
    readthedocs(&["en", location, ""])
}

/// Fields only understood by the enhanced toolchain.
pub fn extra_metadata(version: &str, python_requires: &str) -> MetadataRecord {
    let mut record = MetadataRecord::new();
    record.insert(
        MetadataKey::ProjectUrls,
        MetadataValue::Table(vec![
            ("Source Code".to_string(), github(&[])),
            ("Bug Tracker".to_string(), github(&["issues"])),
            ("Discussions".to_string(), github(&["discussions"])),
            ("Documentation".to_string(), documentation_url(version)),
        ]),
    );
    record.insert(MetadataKey::PythonRequires, python_requires);
    record.insert(
        MetadataKey::LongDescriptionContentType,
        LONG_DESCRIPTION_CONTENT_TYPE,
    );
    record
}

fn include_directive(filename: &str) -> String {
    format!("See `{0} <{0}>`_.\n\n.. include:: {0}\n", filename)
}

/// Build the long description from the reStructuredText documents.
///
/// Each document may pull in the next through the same include block;
/// every block is replaced by the referenced file's contents.
pub fn long_description(project_root: &Path) -> Result<String> {
    let mut text = include_directive(LONG_DESCRIPTION_FILES[0]);
    for filename in LONG_DESCRIPTION_FILES {
        let path = project_root.join(filename);
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        text = text.replace(&include_directive(filename), &contents);
    }
    Ok(text)
}

/// Assembles the metadata record for one invocation.
pub struct MetadataAssembler<'a> {
    resolver: &'a VersionResolver,
    policy: CompatPolicy,
    long_description: Option<String>,
}

impl<'a> MetadataAssembler<'a> {
    pub fn new(resolver: &'a VersionResolver, policy: CompatPolicy) -> Self {
        MetadataAssembler {
            resolver,
            policy,
            long_description: None,
        }
    }

    /// Attach a pre-read long description.
    pub fn with_long_description(mut self, text: Option<String>) -> Self {
        self.long_description = text;
        self
    }

    /// Base record, plus the extended fields when the toolchain supports them.
    pub fn build(&self, toolchain: &dyn PackagingToolchain) -> Result<MetadataRecord> {
        let version = self.resolver.resolve()?;

        let mut record = MetadataRecord::new();
        record.insert(MetadataKey::Name, NAME);
        record.insert(MetadataKey::Version, version);
        record.insert(MetadataKey::Description, DESCRIPTION);
        if let Some(ref text) = self.long_description {
            record.insert(MetadataKey::LongDescription, text.clone());
        }
        record.insert(MetadataKey::Url, HOMEPAGE);
        record.insert(MetadataKey::DownloadUrl, download_url(version));
        record.insert(MetadataKey::Classifiers, MetadataValue::List(template_lines(CLASSIFIERS)));
        record.insert(MetadataKey::Keywords, MetadataValue::List(template_lines(KEYWORDS)));
        record.insert(MetadataKey::Platforms, MetadataValue::List(template_lines(PLATFORMS)));
        record.insert(MetadataKey::License, LICENSE);
        record.insert(MetadataKey::Author, AUTHOR);
        record.insert(MetadataKey::AuthorEmail, AUTHOR_EMAIL);

        tracing::debug!("Packaging toolchain: {}", toolchain.name());
        toolchain.extend_metadata(&mut record, self.extra()?);

        Ok(record)
    }

    /// The extended field set for the resolved version.
    pub fn extra(&self) -> Result<MetadataRecord> {
        let version = self.resolver.resolve()?;
        Ok(extra_metadata(version, &self.policy.python_requires()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::toolchain::{BasicToolchain, EnhancedToolchain};
    use crate::core::version::StaticVersionSource;
    use tempfile::TempDir;

    fn resolver(version: &str) -> VersionResolver {
        VersionResolver::new(Box::new(StaticVersionSource(version.to_string())))
    }

    #[test]
    fn test_download_url_release() {
        assert_eq!(
            download_url("3.1.0"),
            "https://github.com/mpi4py/mpi4py/releases/download/3.1.0/mpi4py-3.1.0.tar.gz"
        );
    }

    #[test]
    fn test_download_url_dev() {
        let url = download_url("4.0.0.dev0");
        assert!(url.ends_with("/tarball/master"), "{}", url);
    }

    #[test]
    fn test_download_url_ignores_local_label() {
        assert!(download_url("3.1.0+abc").ends_with("/releases/download/3.1.0/mpi4py-3.1.0.tar.gz"));
        // only the public part is inspected for the marker
        assert!(!download_url("3.1.0+local.dev").ends_with("/tarball/master"));
    }

    #[test]
    fn test_documentation_url() {
        assert_eq!(documentation_url("3.1.0"), "https://mpi4py.readthedocs.io/en/3.1.0/");
        assert_eq!(documentation_url("4.0.0.dev1"), "https://mpi4py.readthedocs.io/en/latest/");
    }

    #[test]
    fn test_github_urls() {
        assert_eq!(github(&[]), "https://github.com/mpi4py/mpi4py");
        assert_eq!(github(&["issues"]), "https://github.com/mpi4py/mpi4py/issues");
    }

    #[test]
    fn test_template_lines() {
        let keywords = template_lines(KEYWORDS);
        assert_eq!(
            keywords,
            vec![
                "scientific computing",
                "parallel computing",
                "message passing interface",
                "MPI"
            ]
        );
        assert_eq!(template_lines(PLATFORMS).len(), 5);
    }

    #[test]
    fn test_basic_record_has_no_extended_fields() {
        let resolver = resolver("3.1.0");
        let record = MetadataAssembler::new(&resolver, CompatPolicy::default())
            .build(&BasicToolchain)
            .unwrap();

        assert_eq!(record.get(MetadataKey::Name).and_then(|v| v.as_text()), Some("mpi4py"));
        assert_eq!(record.get(MetadataKey::Version).and_then(|v| v.as_text()), Some("3.1.0"));
        assert!(!record.contains(MetadataKey::ProjectUrls));
        assert!(!record.contains(MetadataKey::PythonRequires));
        assert!(!record.contains(MetadataKey::LongDescriptionContentType));
        assert!(!record.contains(MetadataKey::LongDescription));
    }

    #[test]
    fn test_enhanced_record_has_extended_fields() {
        let resolver = resolver("3.1.0");
        let record = MetadataAssembler::new(&resolver, CompatPolicy::default())
            .build(&EnhancedToolchain)
            .unwrap();

        assert_eq!(
            record.get(MetadataKey::PythonRequires).and_then(|v| v.as_text()),
            Some(">=3.6")
        );
        assert_eq!(
            record
                .get(MetadataKey::LongDescriptionContentType)
                .and_then(|v| v.as_text()),
            Some("text/rst")
        );

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json["project_urls"]["Documentation"],
            "https://mpi4py.readthedocs.io/en/3.1.0/"
        );
        assert_eq!(json["project_urls"]["Bug Tracker"], "https://github.com/mpi4py/mpi4py/issues");
    }

    #[test]
    fn test_merge_additive_is_idempotent() {
        let resolver = resolver("3.1.0");
        let assembler = MetadataAssembler::new(&resolver, CompatPolicy::default());
        let mut record = assembler.build(&EnhancedToolchain).unwrap();
        let before = record.clone();

        record.merge_additive(assembler.extra().unwrap());

        assert_eq!(record, before);
    }

    #[test]
    fn test_merge_additive_keeps_existing() {
        let mut record = MetadataRecord::new();
        record.insert(MetadataKey::PythonRequires, ">=3.8");

        let mut extra = MetadataRecord::new();
        extra.insert(MetadataKey::PythonRequires, ">=3.6");
        extra.insert(MetadataKey::License, "MIT");
        record.merge_additive(extra);

        assert_eq!(
            record.get(MetadataKey::PythonRequires).and_then(|v| v.as_text()),
            Some(">=3.8")
        );
        assert!(record.contains(MetadataKey::License));
    }

    #[test]
    fn test_classifier_order_preserved() {
        let resolver = resolver("3.1.0");
        let record = MetadataAssembler::new(&resolver, CompatPolicy::default())
            .build(&BasicToolchain)
            .unwrap();

        let classifiers = record
            .get(MetadataKey::Classifiers)
            .and_then(|v| v.as_list())
            .unwrap();
        assert_eq!(classifiers.first().map(String::as_str), Some("Development Status :: 5 - Production/Stable"));
        assert_eq!(classifiers.last().map(String::as_str), Some("Topic :: System :: Distributed Computing"));
    }

    #[test]
    fn test_long_description_inlines_includes() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("DESCRIPTION.rst"),
            format!("MPI for Python\n\n{}", include_directive("CITATION.rst")),
        )
        .unwrap();
        std::fs::write(tmp.path().join("CITATION.rst"), "Cite us.\n").unwrap();
        std::fs::write(tmp.path().join("INSTALL.rst"), "pip install mpi4py\n").unwrap();

        let text = long_description(tmp.path()).unwrap();
        assert_eq!(text, "MPI for Python\n\nCite us.\n");
    }

    #[test]
    fn test_long_description_missing_file() {
        let tmp = TempDir::new().unwrap();
        assert!(long_description(tmp.path()).is_err());
    }

    #[test]
    fn test_long_description_attached() {
        let resolver = resolver("3.1.0");
        let record = MetadataAssembler::new(&resolver, CompatPolicy::default())
            .with_long_description(Some("Hello".to_string()))
            .build(&BasicToolchain)
            .unwrap();
        assert_eq!(
            record.get(MetadataKey::LongDescription).and_then(|v| v.as_text()),
            Some("Hello")
        );
    }
}
