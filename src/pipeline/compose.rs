use tracing::debug;

use crate::pipeline::{Stage, StageError};

/// Two stages run back to back. The output type of the first one is the input type of
/// the second one, which is checked when the chain is built.
pub struct Chain<A, B> {
    first: A,
    second: B,
    name: String,
}

impl<A, B> Chain<A, B>
where
    A: Stage,
    B: Stage<Input = A::Output>,
{
    pub fn new(first: A, second: B) -> Self {
        let name = format!("{} -> {}", first.name(), second.name());
        Self {
            first,
            second,
            name,
        }
    }
}

impl<A, B> Stage for Chain<A, B>
where
    A: Stage,
    B: Stage<Input = A::Output>,
{
    type Input = A::Input;
    type Output = B::Output;

    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, input: Self::Input) -> Result<Self::Output, StageError> {
        debug!("Running stage '{}'", self.first.name());
        let intermediate = self.first.run(input).await?;
        debug!("Running stage '{}'", self.second.name());
        self.second.run(intermediate).await
    }
}

pub trait StageExt: Stage + Sized {
    /// Feeds the output of `self` into `next`.
    fn then<B>(self, next: B) -> Chain<Self, B>
    where
        B: Stage<Input = Self::Output>,
    {
        Chain::new(self, next)
    }
}

impl<S: Stage> StageExt for S {}

/// Composes stages left to right into a single stage.
///
/// The resulting stage takes the input type of the first stage and produces the output
/// type of the last one. Adjacent stages must agree on their interface type.
///
/// ```
/// use gardener::compose_stages;
/// use gardener::pipeline::{Stage, StageError, stage_fn};
///
/// let parse = stage_fn("parse", |s: String| async move { Ok::<_, StageError>(s.len()) });
/// let double = stage_fn("double", |n: usize| async move { Ok::<_, StageError>(n * 2) });
/// let composed = compose_stages!(parse, double);
/// assert_eq!(composed.name(), "parse -> double");
/// ```
#[macro_export]
macro_rules! compose_stages {
    ($only:expr $(,)?) => {
        $only
    };
    ($first:expr, $($rest:expr),+ $(,)?) => {
        $crate::pipeline::StageExt::then($first, $crate::compose_stages!($($rest),+))
    };
}
