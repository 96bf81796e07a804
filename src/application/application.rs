use snafu::prelude::*;
use tracing::{debug, info};

use crate::application::{
    Gardener, PublishError, PublishSummary, RuntimeConfig, RuntimeConfigError,
};
use crate::cli::Cli;
use crate::config::{ConfigError, GardenerConfig};

pub struct Application;

impl Application {
    /// Resolves the configuration and publishes the site once.
    pub async fn run(cli_args: Cli) -> Result<PublishSummary, ApplicationError> {
        let runtime = RuntimeConfig::try_from(cli_args).context(RuntimeConfigSnafu)?;
        Self::run_with(runtime).await
    }

    pub async fn run_with(runtime: RuntimeConfig) -> Result<PublishSummary, ApplicationError> {
        let config = GardenerConfig::load(
            &runtime.project_root,
            runtime.config_file.as_deref(),
            &runtime.overrides,
        )
        .await
        .context(ConfigSnafu)?;
        debug!("Loaded config: {:?}", config);

        let summary = Gardener::new(config)
            .clean(runtime.clean)
            .publish()
            .await
            .context(PublishSnafu)?;
        info!(
            "Copied {} asset files, processed {} content entries",
            summary.asset_files, summary.content_nodes
        );

        Ok(summary)
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered while reading the command line"))]
    RuntimeConfigError { source: RuntimeConfigError },
    #[snafu(display("Critical failure encountered during configuration stage"))]
    ConfigError { source: ConfigError },
    #[snafu(display("Critical failure encountered while publishing"))]
    PublishError { source: PublishError },
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::*;
    use crate::application::data::LogLevel;
    use crate::config::ConfigLayer;
    use tempfile::TempDir;

    fn runtime(root: &Path) -> RuntimeConfig {
        RuntimeConfig {
            project_root: root.to_path_buf(),
            config_file: None,
            overrides: ConfigLayer::default(),
            clean: false,
            log_level: LogLevel::Silent,
        }
    }

    #[compio::test]
    async fn publishes_using_config_file_dirs() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::create_dir_all(root.join("src/pages")).expect("mkdir");
        fs::create_dir_all(root.join("src/static")).expect("mkdir");
        fs::write(root.join("src/static/site.css"), "body {}").expect("write");
        fs::write(
            root.join("gardener.yaml"),
            format!(
                "src:\n  contentDir: {}\n  assetsDir: {}\ndist: {}\n",
                root.join("src/pages").display(),
                root.join("src/static").display(),
                root.join("public").display()
            ),
        )
        .expect("write");

        let summary = Application::run_with(runtime(root))
            .await
            .expect("Run should succeed");

        assert_eq!(summary.dist, root.join("public"));
        assert!(root.join("public/site.css").is_file());
    }

    #[compio::test]
    async fn relative_override_is_a_config_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let mut runtime = runtime(temp_dir.path());
        runtime.overrides.dist = Some("dist".into());

        let result = Application::run_with(runtime).await;

        assert!(matches!(
            result,
            Err(ApplicationError::ConfigError {
                source: ConfigError::RelativePath { key: "dist", .. }
            })
        ));
    }

    #[compio::test]
    async fn missing_sources_are_a_publish_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");

        let result = Application::run_with(runtime(temp_dir.path())).await;

        assert!(matches!(result, Err(ApplicationError::PublishError { .. })));
    }
}
