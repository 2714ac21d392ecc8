//! Resilient file transfer.
//!
//! A [`StrategyChain`] runs independent [`TransportStrategy`] implementations
//! in priority order until one writes a file that passes verification:
//!
//! 1. `direct`: HEAD probe and a streaming GET
//! 2. `low-level`: minimal HTTP/1.1 transport
//! 3. `session`: cookie session with manual redirects
//! 4. `browser`: full browser simulation with page visits
//!
//! Every strategy streams in fixed-size chunks, verifies what it wrote, and
//! removes its partial file on failure. [`download_folder`] applies the chain
//! to each file of a folder and tallies the results.

mod batch;
mod chain;
mod client;
pub mod constants;
mod engine;
mod error;
pub mod filename;
mod progress;
pub mod strategy;
pub mod verify;

pub use batch::{BatchError, BatchResult, download_folder, effective_destination};
pub use chain::{DownloadOutcome, StrategyChain, TransportAttempt};
pub use engine::DownloadEngine;
pub use error::DownloadError;
pub use progress::TransferProgress;
pub use strategy::{
    BrowserStrategy, DirectStrategy, DownloadRequest, LowLevelStrategy, SessionStrategy,
    StrategyKind, TransportStrategy, default_strategies,
};
pub use verify::{Verdict, VerifyPolicy, verify};
