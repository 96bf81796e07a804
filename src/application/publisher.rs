use std::path::PathBuf;

use snafu::{ResultExt, Snafu, ensure};
use tracing::info;

use crate::config::GardenerConfig;
use crate::filesystem::{Node, RegistryError, RegistryInitializer};
use crate::pipeline::{Pipeline, PipelineBuilder, PipelineError};
use crate::plugins::{
    AssetNode, DeleteFolder, DeleteFolderConfig, default_asset_stages, default_content_stages,
};

/// What a publish run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishSummary {
    pub dist: PathBuf,
    pub asset_files: usize,
    pub content_nodes: usize,
    pub cleaned: bool,
}

/// Builds the registry once and runs the asset pipeline followed by the content
/// pipeline over it.
#[derive(Debug, Clone)]
pub struct Gardener {
    config: GardenerConfig,
    clean: bool,
}

impl Gardener {
    pub fn new(config: GardenerConfig) -> Self {
        Self {
            config,
            clean: false,
        }
    }

    /// Delete the output directory before copying anything into it.
    pub fn clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }

    pub async fn publish(&self) -> Result<PublishSummary, PublishError> {
        self.publish_with(|content| content).await
    }

    /// Publishes with extra content stages appended after the default ones, e.g. a
    /// markdown renderer.
    pub async fn publish_with<F>(&self, extend_content: F) -> Result<PublishSummary, PublishError>
    where
        F: FnOnce(PipelineBuilder<Node, Node>) -> PipelineBuilder<Node, Node>,
    {
        if self.clean {
            self.ensure_clean_spares_sources()?;
        }

        let mut initializer = RegistryInitializer::new(self.config.source_dirs());
        initializer.initialize().await.context(RegistrySnafu)?;
        let registry = initializer.into_registry().context(RegistrySnafu)?;

        let mut assets = self.asset_pipeline();
        let asset_tree = assets
            .run(registry.assets)
            .await
            .context(AssetPipelineSnafu)?;

        let mut content = extend_content(
            Pipeline::builder("content").then(default_content_stages(
                &self.config.content_dir,
                &self.config.dist,
            )),
        )
        .build();
        let content_tree = content
            .run(registry.content)
            .await
            .context(ContentPipelineSnafu)?;

        let summary = PublishSummary {
            dist: self.config.dist.clone(),
            asset_files: count_files(&asset_tree),
            content_nodes: content_tree.count(),
            cleaned: self.clean,
        };
        info!("Published site to {}", summary.dist.display());
        Ok(summary)
    }

    /// Cleaning an output directory that is, or contains, a source directory would wipe
    /// the sources the run is about to read.
    fn ensure_clean_spares_sources(&self) -> Result<(), PublishError> {
        for source_dir in [&self.config.content_dir, &self.config.assets_dir] {
            ensure!(
                !source_dir.starts_with(&self.config.dist),
                CleanDeletesSourcesSnafu {
                    dist: self.config.dist.clone(),
                    source_dir: source_dir.clone(),
                }
            );
        }
        Ok(())
    }

    fn asset_pipeline(&self) -> Pipeline<Node, AssetNode> {
        let mut builder = Pipeline::builder("assets");
        if self.clean {
            builder = builder.then(DeleteFolder::new(DeleteFolderConfig {
                dir: self.config.dist.clone(),
                project_root: self.config.project_root.clone(),
            }));
        }
        builder
            .then(default_asset_stages(
                &self.config.assets_dir,
                &self.config.dist,
            ))
            .build()
    }
}

fn count_files<P>(node: &Node<P>) -> usize {
    match node.children() {
        Some(children) => children.iter().map(count_files).sum(),
        None => 1,
    }
}

#[derive(Debug, Snafu)]
pub enum PublishError {
    #[snafu(display(
        "Refusing to clean {} because it contains the source directory {}",
        dist.display(),
        source_dir.display()
    ))]
    CleanDeletesSourcesError { dist: PathBuf, source_dir: PathBuf },
    #[snafu(display("Failed to build the source registry"))]
    RegistryError { source: RegistryError },
    #[snafu(display("Asset pipeline failed"))]
    AssetPipelineError { source: PipelineError },
    #[snafu(display("Content pipeline failed"))]
    ContentPipelineError { source: PipelineError },
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::filesystem::{VisitFlow, visit_node};
    use crate::pipeline::{StageError, stage_fn};
    use tempfile::TempDir;

    struct Site {
        _temp_dir: TempDir,
        config: GardenerConfig,
    }

    fn site() -> Site {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = GardenerConfig::defaults(temp_dir.path()).expect("Absolute root");

        fs::create_dir_all(config.content_dir.join("blog")).expect("mkdir");
        fs::write(config.content_dir.join("index.md"), "# Home").expect("write");
        fs::write(config.content_dir.join("blog/first.md"), "# First").expect("write");
        fs::create_dir_all(config.assets_dir.join("images")).expect("mkdir");
        fs::write(config.assets_dir.join("readme.txt"), "hello").expect("write");
        fs::write(config.assets_dir.join("images/logo.svg"), "<svg/>").expect("write");

        Site {
            _temp_dir: temp_dir,
            config,
        }
    }

    #[compio::test]
    async fn publishes_assets_and_content_directories() {
        let site = site();
        let dist = site.config.dist.clone();

        let summary = Gardener::new(site.config.clone())
            .publish()
            .await
            .expect("Publish should succeed");

        assert_eq!(fs::read(dist.join("readme.txt")).ok().as_deref(), Some(&b"hello"[..]));
        assert_eq!(
            fs::read(dist.join("images/logo.svg")).ok().as_deref(),
            Some(&b"<svg/>"[..])
        );
        assert!(dist.join("blog").is_dir());
        assert_eq!(
            summary,
            PublishSummary {
                dist,
                asset_files: 2,
                content_nodes: 4,
                cleaned: false,
            }
        );
    }

    #[compio::test]
    async fn clean_removes_stale_output_first() {
        let site = site();
        let stale = site.config.dist.join("stale.html");
        fs::create_dir_all(&site.config.dist).expect("mkdir");
        fs::write(&stale, "old").expect("write");

        let summary = Gardener::new(site.config.clone())
            .clean(true)
            .publish()
            .await
            .expect("Publish should succeed");

        assert!(summary.cleaned);
        assert!(!stale.exists());
        assert!(site.config.dist.join("readme.txt").is_file());
    }

    #[compio::test]
    async fn clean_refuses_dist_outside_project_root() {
        let site = site();
        let elsewhere = TempDir::new().expect("Failed to create temp directory");
        let mut config = site.config.clone();
        config.dist = elsewhere.path().join("dist");
        fs::create_dir_all(&config.dist).expect("mkdir");

        let result = Gardener::new(config.clone()).clean(true).publish().await;

        assert!(matches!(
            result,
            Err(PublishError::AssetPipelineError {
                source: PipelineError::Stage {
                    source: StageError::UnsafeDelete { .. },
                    ..
                }
            })
        ));
        assert!(config.dist.is_dir());
    }

    #[compio::test]
    async fn clean_refuses_dist_at_project_root() {
        let site = site();
        let mut config = site.config.clone();
        config.dist = config.project_root.clone();

        let result = Gardener::new(config.clone()).clean(true).publish().await;

        match result {
            Err(PublishError::CleanDeletesSourcesError { dist, source_dir }) => {
                assert_eq!(dist, config.project_root);
                assert_eq!(source_dir, config.content_dir);
            }
            other => panic!("Expected CleanDeletesSourcesError, got {other:?}"),
        }
        assert!(config.content_dir.join("index.md").is_file());
        assert!(config.assets_dir.join("readme.txt").is_file());
    }

    #[compio::test]
    async fn clean_refuses_dist_equal_to_a_source_dir() {
        let site = site();
        let mut config = site.config.clone();
        config.dist = config.assets_dir.clone();

        let result = Gardener::new(config.clone()).clean(true).publish().await;

        assert!(matches!(
            result,
            Err(PublishError::CleanDeletesSourcesError { ref source_dir, .. })
                if *source_dir == config.assets_dir
        ));
        assert!(config.assets_dir.join("images/logo.svg").is_file());
    }

    #[compio::test]
    async fn extra_content_stages_run_after_defaults() {
        let site = site();
        let dist = site.config.dist.clone();
        let content_dir = site.config.content_dir.clone();

        Gardener::new(site.config.clone())
            .publish_with(|content| {
                content.then(stage_fn("fake-render", move |root: Node| {
                    let dist = dist.clone();
                    let content_dir = content_dir.clone();
                    async move {
                        let mut writer = |node: &Node, _: Option<&Node>| {
                            if let Ok(rel) = node.path().strip_prefix(&content_dir)
                                && !node.is_directory()
                            {
                                let target = dist.join(rel).with_extension("html");
                                let _ = fs::write(target, "<p>rendered</p>");
                            }
                            VisitFlow::Continue
                        };
                        let _ = visit_node(&root, &mut writer).await;
                        Ok::<_, StageError>(root)
                    }
                }))
            })
            .await
            .expect("Publish should succeed");

        assert!(site.config.dist.join("index.html").is_file());
        assert!(site.config.dist.join("blog/first.html").is_file());
    }

    #[compio::test]
    async fn missing_content_dir_fails_before_any_output() {
        let site = site();
        fs::remove_dir_all(&site.config.content_dir).expect("remove");

        let result = Gardener::new(site.config.clone()).publish().await;

        assert!(matches!(result, Err(PublishError::RegistryError { .. })));
        assert!(!site.config.dist.exists());
    }
}
