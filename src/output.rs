//! Output formatting and export for gradebook statistics.
//!
//! Debug logging of values, JSON rendering and CSV export.

use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::Serialize;
use std::path::Path;
use tracing::debug;

use crate::stats::CourseSummary;

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty<T: std::fmt::Debug>(value: &T) {
    debug!("{:#?}", value);
}

/// Renders a value as pretty-printed JSON.
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Writes one CSV row per course summary, replacing any existing file.
pub fn write_course_summaries(path: impl AsRef<Path>, summaries: &[CourseSummary]) -> Result<()> {
    let path = path.as_ref();
    debug!(path = %path.display(), rows = summaries.len(), "Writing course summaries");

    let mut writer = WriterBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("failed to create '{}'", path.display()))?;

    for summary in summaries {
        writer.serialize(summary)?;
    }
    writer.flush()?;

    Ok(())
}
