//! Check command implementation.

use anyhow::Result;
use std::path::Path;

use super::RunOptions;
use crate::OutputFormat;

/// Runs the check command.
///
/// Exits with status 1 when any violation is reported.
pub fn run(
    path: &Path,
    format: OutputFormat,
    options: RunOptions,
    config_path: Option<&Path>,
) -> Result<()> {
    let prepared = super::prepare(path, options, config_path)?;

    tracing::info!(
        "Checking {} descriptor(s) under {:?} with {} checker(s)",
        prepared.descriptors.len(),
        path,
        prepared.walker.checker_count()
    );

    let result = prepared
        .walker
        .check(&prepared.descriptors)
        .unwrap_or_else(|err| super::fail(err));

    super::output::print(&result, format)?;

    if !result.is_clean() {
        std::process::exit(1);
    }

    Ok(())
}
