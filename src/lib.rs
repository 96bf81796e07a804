#![allow(clippy::enum_variant_names)]
//! Publishes a static site from a content tree and an assets tree.
//!
//! Both source directories are scanned into in-memory trees once per run
//! ([`filesystem::RegistryInitializer`]). The trees are then handed to two
//! pipelines of stages: the asset pipeline copies every asset into the output
//! directory, the content pipeline mirrors the content directory layout and is the
//! place to hook rendering stages into ([`application::Gardener::publish_with`]).

pub mod application;
pub mod cli;
pub mod config;
pub mod ext;
pub mod filesystem;
pub mod pipeline;
pub mod plugins;

pub use application::{Gardener, PublishSummary};
pub use filesystem::{Node, Registry};
pub use pipeline::{Pipeline, Stage, StageError};
