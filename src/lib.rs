//! taucoder - command-line client for the taucoder image encoding service
//!
//! Uploads a batch of images in one job-create request, polls job status at a
//! fixed interval until every job is done or errored, and downloads each
//! finished result.
//!
//! # Architecture
//!
//! - **commands**: CLI command implementations (argument checks, run wiring)
//! - **core**: Core functionality (API client, orchestrator, output paths)
//! - **models**: Data structures (config, job, status)
//! - **error**: Error types

pub mod commands;
pub mod core;
pub mod error;
pub mod models;

pub use error::{ApiError, Result, TaucoderError};
