//! Descriptor discovery and the `.pom-lint-ignore` module list.

use anyhow::{Context, Result};
use glob::Pattern;
use std::path::{Path, PathBuf};

/// File name of a build descriptor.
pub const DESCRIPTOR_NAME: &str = "pom.xml";

/// File listing module directory names that are never walked.
pub const IGNORE_FILE: &str = ".pom-lint-ignore";

/// Finds every `pom.xml` under `root`, honouring `.gitignore`, sorted.
///
/// `exclude` holds glob patterns matched against the path relative to `root`.
pub fn descriptors(root: &Path, exclude: &[String]) -> Result<Vec<PathBuf>> {
    let patterns = exclude
        .iter()
        .map(|p| Pattern::new(p).with_context(|| format!("Invalid exclude pattern: {p}")))
        .collect::<Result<Vec<_>>>()?;

    let mut builder = ignore::WalkBuilder::new(root);
    builder.hidden(false).git_ignore(true);

    let mut files = Vec::new();
    for entry in builder.build() {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() || path.file_name().and_then(|n| n.to_str()) != Some(DESCRIPTOR_NAME) {
            continue;
        }

        let relative = path.strip_prefix(root).unwrap_or(path);
        if let Some(pattern) = patterns.iter().find(|p| p.matches_path(relative)) {
            tracing::debug!("Excluding {} ({})", relative.display(), pattern);
            continue;
        }
        files.push(path.to_path_buf());
    }

    files.sort();
    tracing::debug!("Discovered {} descriptor(s) under {}", files.len(), root.display());
    Ok(files)
}

/// Reads `.pom-lint-ignore` from `root`: one module name per line,
/// blank lines and `#` comments skipped. A missing file yields nothing.
pub fn ignore_file(root: &Path) -> Result<Vec<String>> {
    let path = root.join(IGNORE_FILE);
    if !path.is_file() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(parse_ignore_list(&content))
}

fn parse_ignore_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}
