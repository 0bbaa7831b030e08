//! Command execution functions coordinating all release operations.

mod preview;
mod release;

use crate::cli::{Args, Command, RuntimeConfig};
use crate::config::{EnvConfig, ReleaseConfig};
use crate::error::Result;
use crate::github::Credentials;
use crate::pipeline::{self, ReleaseContext};
use std::path::{Path, PathBuf};

use preview::execute_preview;
use release::execute_release;

/// Execute the main command based on parsed arguments
pub async fn execute_command(args: Args, env: &EnvConfig) -> Result<i32> {
    if let Err(validation_error) = args.validate() {
        let output = super::OutputManager::new(false, false);
        output.error(&format!("Invalid arguments: {}", validation_error));
        return Ok(1);
    }

    let config = RuntimeConfig::from(&args);

    let result = match build_context(&args, env) {
        Ok(ctx) => match args.command.target_step() {
            Some(target) => execute_release(&ctx, target, &config).await,
            None => execute_preview(&ctx, &config),
        },
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => Ok(0),
        Err(e) => {
            config.error_println(&format!("Command '{}' failed: {}", args.command.name(), e));
            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() && !config.is_quiet() {
                config.println("\n💡 Recovery suggestions:");
                for suggestion in suggestions {
                    config.println(&format!("  • {}", suggestion));
                }
            }
            Ok(1)
        }
    }
}

/// `--config` relative paths are taken from the project root
fn config_path(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Resolve project root, config, bump request and credentials
fn build_context(args: &Args, env: &EnvConfig) -> Result<ReleaseContext> {
    let root = pipeline::project_root(&args.project)?;
    let config = match &args.config {
        Some(path) => ReleaseConfig::from_file(&config_path(&root, path))?,
        None => ReleaseConfig::discover(&root)?,
    };

    if args.username.is_some() != args.password.is_some() {
        log::warn!("--username and --password must be given together; ignoring them");
    }
    let credentials =
        Credentials::resolve(args.username.as_deref(), args.password.as_deref(), env);

    let request = if args.command == Command::ChangelogPreview {
        Default::default()
    } else {
        args.bump_request(env)?
    };

    Ok(ReleaseContext {
        root,
        config,
        request,
        credentials,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_config_path_resolves_against_project() {
        let root = Path::new("/work/app");
        assert_eq!(
            config_path(root, Path::new("ci/release.toml")),
            PathBuf::from("/work/app/ci/release.toml")
        );
        assert_eq!(
            config_path(root, Path::new("/etc/release.toml")),
            PathBuf::from("/etc/release.toml")
        );
    }
}
