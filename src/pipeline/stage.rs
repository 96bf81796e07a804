use std::error::Error;
use std::future::Future;
use std::marker::PhantomData;
use std::path::PathBuf;

use snafu::Snafu;

use crate::filesystem::PathGuardError;

/// A single-input/single-output asynchronous transform over a tree root.
///
/// Stages are parameterised through their constructors (stage factories); `run` may be
/// called any number of times and its result is always awaited before it is used.
pub trait Stage {
    type Input;
    type Output;

    fn name(&self) -> &str;

    async fn run(&self, input: Self::Input) -> Result<Self::Output, StageError>;
}

/// A stage backed by an async closure
pub struct FnStage<F, I, O> {
    name: String,
    f: F,
    _marker: PhantomData<fn(I) -> O>,
}

/// Wraps an async closure as a [`Stage`].
pub fn stage_fn<I, O, F, Fut>(name: impl Into<String>, f: F) -> FnStage<F, I, O>
where
    F: Fn(I) -> Fut,
    Fut: Future<Output = Result<O, StageError>>,
{
    FnStage {
        name: name.into(),
        f,
        _marker: PhantomData,
    }
}

impl<I, O, F, Fut> Stage for FnStage<F, I, O>
where
    F: Fn(I) -> Fut,
    Fut: Future<Output = Result<O, StageError>>,
{
    type Input = I;
    type Output = O;

    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, input: I) -> Result<O, StageError> {
        (self.f)(input).await
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StageError {
    #[snafu(display("Failed to create directory {}", path.display()))]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to copy {} to {}", from.display(), to.display()))]
    CopyFile {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("{} is not inside the source directory {}", path.display(), root.display()))]
    OutsideSourceDir { path: PathBuf, root: PathBuf },
    #[snafu(display("Refusing to delete folder"))]
    UnsafeDelete { source: PathGuardError },
    #[snafu(display("Failed to delete folder {}", path.display()))]
    DeleteFolder {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Plugin '{}' failed", stage))]
    Plugin {
        stage: String,
        source: Box<dyn Error + Send + Sync>,
    },
}

impl StageError {
    /// Error raised by a stage implemented outside this crate.
    pub fn plugin(
        stage: impl Into<String>,
        error: impl Into<Box<dyn Error + Send + Sync>>,
    ) -> Self {
        StageError::Plugin {
            stage: stage.into(),
            source: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[compio::test]
    async fn fn_stage_runs_closure() {
        let double = stage_fn("double", |x: u32| async move { Ok::<_, StageError>(x * 2) });

        assert_eq!(double.name(), "double");
        assert_eq!(double.run(21).await.ok(), Some(42));
    }

    #[compio::test]
    async fn fn_stage_can_be_called_repeatedly() {
        let describe = stage_fn("describe", |x: u32| async move { Ok::<_, StageError>(format!("#{x}")) });

        assert_eq!(describe.run(1).await.ok().as_deref(), Some("#1"));
        assert_eq!(describe.run(2).await.ok().as_deref(), Some("#2"));
    }

    #[test]
    fn plugin_error_keeps_source_message() {
        let error = StageError::plugin("render", "template missing");

        assert_eq!(error.to_string(), "Plugin 'render' failed");
        let source = error.source().map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("template missing"));
    }
}
