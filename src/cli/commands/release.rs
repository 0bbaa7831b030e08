//! Release command execution.

use crate::cli::RuntimeConfig;
use crate::error::Result;
use crate::pipeline::{self, ReleaseContext, ReleaseOutcome, Step};

/// Run every step up to `target` and summarize
pub(super) async fn execute_release(
    ctx: &ReleaseContext,
    target: Step,
    config: &RuntimeConfig,
) -> Result<()> {
    config.verbose_println(&format!("Project: {}", ctx.root.display()));
    config.verbose_println(&format!(
        "Steps: {}",
        Step::plan(target)
            .iter()
            .map(Step::to_string)
            .collect::<Vec<_>>()
            .join(" → ")
    ));

    let report = pipeline::run_task(ctx, config, target).await?;

    config.section("Release summary");
    if let Some(bump) = &report.bump {
        config.indent(&format!("Version: {}", bump.new_version));
    }
    if let Some(commit) = &report.commit {
        config.indent(&format!("Commit:  {}", commit.short_hash));
    }
    if let Some(tag) = &report.tag {
        config.indent(&format!("Tag:     {}", tag.name));
    }
    if let Some(push) = report.pushes.first() {
        config.indent(&format!("Pushed:  {}/{}", push.remote_name, push.branch));
    }
    match &report.release {
        Some(ReleaseOutcome::Created(created)) => {
            config.indent(&format!("Release: {}", created.html_url));
        }
        Some(ReleaseOutcome::Failed(reason)) => {
            config.warning_println(&format!("Release was not created: {}", reason));
        }
        None => {}
    }

    Ok(())
}
