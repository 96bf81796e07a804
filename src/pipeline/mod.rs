//! Stages and the machinery that chains them.
//!
//! A stage turns one tree root into another, possibly of a different node type.
//! Stages are composed either statically into a single stage ([`Chain`],
//! [`compose_stages!`](crate::compose_stages)) or collected into a [`Pipeline`]
//! that runs them one after another.

mod compose;
#[allow(clippy::module_inception)]
mod pipeline;
mod stage;

pub use compose::{Chain, StageExt};
pub use pipeline::{Pipeline, PipelineBuilder, PipelineError, RunState};
pub use stage::{FnStage, Stage, StageError, stage_fn};
pub(crate) use stage::{
    CopyFileSnafu, CreateDirectorySnafu, DeleteFolderSnafu, OutsideSourceDirSnafu,
    UnsafeDeleteSnafu,
};
