//! Changelog preview: show the release payload without sending it.

use crate::cli::RuntimeConfig;
use crate::error::Result;
use crate::pipeline::{ReleaseContext, build_release_request};

/// Print the payload `release-full` would send as pretty JSON
pub(super) fn execute_preview(ctx: &ReleaseContext, config: &RuntimeConfig) -> Result<()> {
    let request = build_release_request(ctx)?;
    config.verbose_println(&format!("Changelog: {}", ctx.changelog().display()));
    config.output().data(&serde_json::to_string_pretty(&request)?)?;
    Ok(())
}
