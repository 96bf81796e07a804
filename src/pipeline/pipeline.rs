use std::any::{Any, type_name};
use std::marker::PhantomData;

use derive_more::Display;
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use snafu::{ResultExt, Snafu};
use tracing::{debug, error, info};

use crate::pipeline::{Stage, StageError};

/// Lifecycle of a single pipeline run
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
}

/// Type-erased view of a stage, only reachable through [`PipelineBuilder::then`],
/// which has already checked that adjacent stages agree on their interface type.
trait ErasedStage {
    fn name(&self) -> &str;

    fn run_erased<'a>(
        &'a self,
        input: Box<dyn Any>,
    ) -> LocalBoxFuture<'a, Result<Box<dyn Any>, PipelineError>>;
}

struct Erased<S>(S);

impl<S> ErasedStage for Erased<S>
where
    S: Stage,
    S::Input: 'static,
    S::Output: 'static,
{
    fn name(&self) -> &str {
        self.0.name()
    }

    fn run_erased<'a>(
        &'a self,
        input: Box<dyn Any>,
    ) -> LocalBoxFuture<'a, Result<Box<dyn Any>, PipelineError>> {
        async move {
            let input = input
                .downcast::<S::Input>()
                .map_err(|_| PipelineError::InterfaceMismatch {
                    stage: self.name().to_string(),
                    expected: type_name::<S::Input>(),
                })?;
            let output = self.0.run(*input).await.context(StageSnafu {
                stage: self.name().to_string(),
            })?;
            Ok(Box::new(output) as Box<dyn Any>)
        }
        .boxed_local()
    }
}

/// Collects stages for a [`Pipeline`], tracking the output type of the last stage added.
pub struct PipelineBuilder<I, O> {
    name: String,
    stages: Vec<Box<dyn ErasedStage>>,
    _marker: PhantomData<fn(I) -> O>,
}

impl<I: 'static> PipelineBuilder<I, I> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
            _marker: PhantomData,
        }
    }
}

impl<I: 'static, O: 'static> PipelineBuilder<I, O> {
    /// Appends a stage whose input type is the current output type.
    pub fn then<S>(mut self, stage: S) -> PipelineBuilder<I, S::Output>
    where
        S: Stage<Input = O> + 'static,
        S::Output: 'static,
    {
        self.stages.push(Box::new(Erased(stage)));
        PipelineBuilder {
            name: self.name,
            stages: self.stages,
            _marker: PhantomData,
        }
    }

    pub fn build(self) -> Pipeline<I, O> {
        Pipeline {
            name: self.name,
            stages: self.stages,
            state: RunState::Idle,
            _marker: PhantomData,
        }
    }
}

/// Runs an ordered list of stages over one root value.
///
/// Stages run strictly one after another; the first failure aborts the run and is
/// returned unchanged to the caller. Nothing is cached between runs.
pub struct Pipeline<I, O> {
    name: String,
    stages: Vec<Box<dyn ErasedStage>>,
    state: RunState,
    _marker: PhantomData<fn(I) -> O>,
}

impl<I: 'static> Pipeline<I, I> {
    pub fn builder(name: impl Into<String>) -> PipelineBuilder<I, I> {
        PipelineBuilder::new(name)
    }
}

impl<I: 'static, O: 'static> Pipeline<I, O> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stage_names(&self) -> impl Iterator<Item = &str> {
        self.stages.iter().map(|stage| stage.name())
    }

    /// Executes every stage over `root` and returns the final tree.
    pub async fn run(&mut self, root: I) -> Result<O, PipelineError> {
        self.state = RunState::Running;
        info!(
            "Pipeline '{}' running {} stage(s)",
            self.name,
            self.stages.len()
        );

        let result = self.run_stages(root).await;
        self.state = match &result {
            Ok(_) => RunState::Completed,
            Err(err) => {
                error!("Pipeline '{}' failed: {}", self.name, err);
                RunState::Failed
            }
        };
        info!("Pipeline '{}' is {}", self.name, self.state);

        result
    }

    async fn run_stages(&self, root: I) -> Result<O, PipelineError> {
        let mut value: Box<dyn Any> = Box::new(root);
        for stage in &self.stages {
            debug!("Pipeline '{}': running stage '{}'", self.name, stage.name());
            value = stage.run_erased(value).await?;
            debug!("Pipeline '{}': stage '{}' finished", self.name, stage.name());
        }

        value
            .downcast::<O>()
            .map(|output| *output)
            .map_err(|_| PipelineError::InterfaceMismatch {
                stage: self.name.clone(),
                expected: type_name::<O>(),
            })
    }
}

#[derive(Debug, Snafu)]
pub enum PipelineError {
    #[snafu(display("Stage '{}' failed", stage))]
    Stage { stage: String, source: StageError },
    #[snafu(display("Stage '{}' received a value that is not a {}", stage, expected))]
    InterfaceMismatch {
        stage: String,
        expected: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::pipeline::stage_fn;

    fn counting_pipeline() -> Pipeline<u32, String> {
        Pipeline::builder("numbers")
            .then(stage_fn("inc", |x: u32| async move { Ok::<_, StageError>(x + 1) }))
            .then(stage_fn("square", |x: u32| async move { Ok::<_, StageError>(u64::from(x * x)) }))
            .then(stage_fn("show", |x: u64| async move { Ok::<_, StageError>(x.to_string()) }))
            .build()
    }

    #[compio::test]
    async fn runs_stages_in_order() {
        let mut pipeline = counting_pipeline();
        assert_eq!(pipeline.state(), RunState::Idle);
        assert_eq!(pipeline.len(), 3);
        assert_eq!(
            pipeline.stage_names().collect::<Vec<_>>(),
            ["inc", "square", "show"]
        );

        let result = pipeline.run(2).await.expect("Pipeline should succeed");

        assert_eq!(result, "9");
        assert_eq!(pipeline.state(), RunState::Completed);
    }

    #[compio::test]
    async fn empty_pipeline_is_identity() {
        let mut pipeline = Pipeline::<String, String>::builder("noop").build();
        assert!(pipeline.is_empty());

        let result = pipeline.run("tree".to_string()).await.expect("Identity");
        assert_eq!(result, "tree");
    }

    #[compio::test]
    async fn failure_aborts_remaining_stages() {
        let later_runs = Rc::new(Cell::new(0));
        let counter = later_runs.clone();
        let mut pipeline = Pipeline::builder("failing")
            .then(stage_fn("ok", |x: u8| async move { Ok::<_, StageError>(x) }))
            .then(stage_fn("broken", |_: u8| async move {
                Err::<u8, _>(StageError::plugin("broken", "no luck"))
            }))
            .then(stage_fn("after", move |x: u8| {
                counter.set(counter.get() + 1);
                async move { Ok::<_, StageError>(x) }
            }))
            .build();

        let result = pipeline.run(1).await;

        match result {
            Err(PipelineError::Stage { stage, source }) => {
                assert_eq!(stage, "broken");
                assert!(matches!(source, StageError::Plugin { .. }));
            }
            other => panic!("Expected stage failure, got {other:?}"),
        }
        assert_eq!(later_runs.get(), 0);
        assert_eq!(pipeline.state(), RunState::Failed);
    }

    #[compio::test]
    async fn failed_pipeline_can_be_rerun() {
        let attempts = Rc::new(Cell::new(0));
        let counter = attempts.clone();
        let mut pipeline = Pipeline::builder("flaky")
            .then(stage_fn("first-fails", move |x: u8| {
                counter.set(counter.get() + 1);
                let attempt = counter.get();
                async move {
                    if attempt == 1 {
                        Err(StageError::plugin("first-fails", "first attempt"))
                    } else {
                        Ok(x)
                    }
                }
            }))
            .build();

        assert!(pipeline.run(7).await.is_err());
        assert_eq!(pipeline.state(), RunState::Failed);

        assert_eq!(pipeline.run(7).await.ok(), Some(7));
        assert_eq!(pipeline.state(), RunState::Completed);
        assert_eq!(attempts.get(), 2);
    }

    #[test]
    fn run_state_display() {
        assert_eq!(RunState::Idle.to_string(), "Idle");
        assert_eq!(RunState::Failed.to_string(), "Failed");
    }
}
