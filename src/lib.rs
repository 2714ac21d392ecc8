//! Gofile download core library.
//!
//! Resolves Gofile share links to content ids, fetches typed metadata from
//! the API, and downloads files through an ordered chain of transport
//! strategies that verifies every write.
//!
//! # Architecture
//!
//! - [`resolver`] - share link / id normalization
//! - [`api`] - metadata client and typed content descriptors
//! - [`download`] - strategy chain, integrity checks, folder traversal
//! - [`config`] - endpoints, tokens and display settings
//! - [`user_agent`] - user agent strings sent to the service

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod config;
pub mod download;
pub mod resolver;
pub mod user_agent;

// Re-export commonly used types
pub use api::{ApiClient, ApiError, ContentDescriptor, Credentials, FileDescriptor, FolderDescriptor};
pub use config::GofileConfig;
pub use download::{
    BatchError, BatchResult, DownloadEngine, DownloadError, DownloadOutcome, DownloadRequest,
    StrategyChain, StrategyKind, TransportAttempt, TransportStrategy,
};
pub use resolver::{ContentId, resolve};
