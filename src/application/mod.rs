#[allow(clippy::module_inception)]
mod application;
pub mod data;
mod publisher;
mod report;
mod runtime_config;

pub use application::{Application, ApplicationError};
pub use publisher::{Gardener, PublishError, PublishSummary};
pub use report::print_summary;
pub use runtime_config::{RuntimeConfig, RuntimeConfigError};
