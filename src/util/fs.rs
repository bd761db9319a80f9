//! Filesystem utilities.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::{glob, Pattern};

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir(parent)?;
        }
    }
    fs::write(path, contents)
        .with_context(|| format!("failed to write file: {}", path.display()))
}

/// Find files matching glob patterns under a base directory.
///
/// Results are relative to `base`, sorted, and deduplicated. Patterns that
/// match nothing contribute nothing.
pub fn glob_files(base: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut results = Vec::new();

    // The base is a literal path; only `pattern` may carry wildcards.
    let escaped_base = PathBuf::from(Pattern::escape(&base.to_string_lossy()));

    for pattern in patterns {
        let full_pattern = escaped_base.join(pattern);
        let pattern_str = full_pattern.to_string_lossy();

        for entry in glob(&pattern_str)
            .with_context(|| format!("invalid glob pattern: {}", pattern))?
        {
            match entry {
                Ok(path) => {
                    if path.is_file() {
                        let relative = path.strip_prefix(base).unwrap_or(&path).to_path_buf();
                        results.push(relative);
                    }
                }
                Err(e) => {
                    tracing::warn!("glob error: {}", e);
                }
            }
        }
    }

    results.sort();
    results.dedup();
    Ok(results)
}

/// Render a relative path with forward slashes, as the backends expect.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_glob_files_relative_and_sorted() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(src.join("lib-mpi")).unwrap();
        fs::write(src.join("pympi.h"), "").unwrap();
        fs::write(src.join("config.h"), "").unwrap();
        fs::write(src.join("lib-mpi").join("mpiapi.h"), "").unwrap();
        fs::write(src.join("readme.txt"), "readme").unwrap();

        let files = glob_files(
            tmp.path(),
            &["src/*.h".to_string(), "src/lib-mpi/*.h".to_string(), "src/*.h".to_string()],
        )
        .unwrap();

        let files: Vec<String> = files.iter().map(|p| to_slash(p)).collect();
        assert_eq!(files, vec!["src/config.h", "src/lib-mpi/mpiapi.h", "src/pympi.h"]);
    }

    #[test]
    fn test_glob_files_base_with_glob_characters() {
        let tmp = TempDir::new().unwrap();
        let base = tmp.path().join("mpi4py[dev]");
        fs::create_dir_all(base.join("src")).unwrap();
        fs::write(base.join("src").join("pympi.h"), "").unwrap();

        let files = glob_files(&base, &["src/*.h".to_string()]).unwrap();

        let files: Vec<String> = files.iter().map(|p| to_slash(p)).collect();
        assert_eq!(files, vec!["src/pympi.h"]);
    }

    #[test]
    fn test_glob_files_no_matches() {
        let tmp = TempDir::new().unwrap();
        let files = glob_files(tmp.path(), &["src/lib-mpi/compat/*.h".to_string()]).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_write_string_creates_parents() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out").join("setup.json");
        write_string(&path, "{}").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "{}");
    }
}
