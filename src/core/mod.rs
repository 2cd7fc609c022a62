// src/core/mod.rs
//! Clients for the external services and the compilation pipeline built on them

pub mod compiler_client;
pub mod config_manager;
pub mod database;
pub mod error;
pub mod gist_client;
pub mod pipeline;
pub mod snippet;

#[cfg(test)]
pub(crate) mod fakes;

pub use compiler_client::{CompilerClient, LatexCompiler};
pub use config_manager::ConfigManager;
pub use database::{Database, LatexSource, RpcPayload};
pub use error::ServiceError;
pub use gist_client::GistClient;
pub use pipeline::{LatexPipeline, PropagationPolicy};
pub use snippet::{Snippet, SnippetHost, SnippetLease};
