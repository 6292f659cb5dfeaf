//! Fix command implementation.

use anyhow::Result;
use std::path::Path;

use super::RunOptions;

/// Runs the fix command, rewriting descriptors in place.
pub fn run(path: &Path, options: RunOptions, config_path: Option<&Path>) -> Result<()> {
    let prepared = super::prepare(path, options, config_path)?;

    tracing::info!(
        "Fixing {} descriptor(s) under {:?}",
        prepared.descriptors.len(),
        path
    );

    let report = prepared
        .walker
        .fix(&prepared.descriptors)
        .unwrap_or_else(|err| super::fail(err));

    super::output::print_fix(&report);
    Ok(())
}
