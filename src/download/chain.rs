//! Ordered fallback over transport strategies.

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;

use futures_util::FutureExt;
use tracing::{info, warn};

use super::DownloadError;
use super::client::remove_partial;
use super::strategy::{DownloadRequest, StrategyKind, TransportStrategy, default_strategies};
use crate::config::GofileConfig;

/// Record of one strategy run against one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportAttempt {
    /// Strategy that ran.
    pub strategy: StrategyKind,
    /// Whether it produced a verified file.
    pub succeeded: bool,
    /// Bytes written when it succeeded.
    pub bytes: Option<u64>,
    /// Failure reason, empty on success.
    pub detail: String,
}

impl fmt::Display for TransportAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.succeeded {
            write!(f, "{}: ok ({} bytes)", self.strategy, self.bytes.unwrap_or(0))
        } else {
            write!(f, "{}: {}", self.strategy, self.detail)
        }
    }
}

/// Per-file result of running the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// A strategy wrote and verified the file.
    Completed {
        /// Final on-disk path.
        path: PathBuf,
        /// Final on-disk size.
        bytes: u64,
        /// Strategy that succeeded.
        strategy: StrategyKind,
        /// Every attempt made, the successful one last.
        attempts: Vec<TransportAttempt>,
    },
    /// Every strategy failed; no file was left behind.
    Failed {
        /// Summary of why.
        reason: String,
        /// Every attempt made.
        attempts: Vec<TransportAttempt>,
    },
}

impl DownloadOutcome {
    /// Returns true for [`DownloadOutcome::Completed`].
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    /// Attempts made, in order.
    #[must_use]
    pub fn attempts(&self) -> &[TransportAttempt] {
        match self {
            Self::Completed { attempts, .. } | Self::Failed { attempts, .. } => attempts,
        }
    }

    /// Bytes on disk for a completed download.
    #[must_use]
    pub fn bytes(&self) -> Option<u64> {
        match self {
            Self::Completed { bytes, .. } => Some(*bytes),
            Self::Failed { .. } => None,
        }
    }

    /// Failure reason for a failed download.
    #[must_use]
    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            Self::Completed { .. } => None,
            Self::Failed { reason, .. } => Some(reason),
        }
    }
}

/// Runs strategies in order until one succeeds.
///
/// Strategy failures and panics are recorded and never propagated.
pub struct StrategyChain {
    strategies: Vec<Box<dyn TransportStrategy>>,
}

impl fmt::Debug for StrategyChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyChain")
            .field("strategies", &self.kinds())
            .finish()
    }
}

impl StrategyChain {
    /// Creates a chain over `strategies`, tried in the given order.
    #[must_use]
    pub fn new(strategies: Vec<Box<dyn TransportStrategy>>) -> Self {
        Self { strategies }
    }

    /// Creates the default four-strategy chain.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::ClientBuild`] if a strategy client cannot be built.
    pub fn from_config(config: &GofileConfig) -> Result<Self, DownloadError> {
        Ok(Self::new(default_strategies(config)?))
    }

    /// Strategy order.
    #[must_use]
    pub fn kinds(&self) -> Vec<StrategyKind> {
        self.strategies.iter().map(|s| s.kind()).collect()
    }

    /// Downloads `request`, falling through strategies on failure.
    pub async fn download(&self, request: &DownloadRequest) -> DownloadOutcome {
        let mut attempts = Vec::with_capacity(self.strategies.len());

        for strategy in &self.strategies {
            let kind = strategy.kind();
            info!(strategy = %kind, file = %request.display_name, "trying download strategy");

            let result = AssertUnwindSafe(strategy.attempt(request))
                .catch_unwind()
                .await;

            match result {
                Ok(Ok(bytes)) => {
                    info!(
                        strategy = %kind,
                        path = %request.destination.display(),
                        bytes,
                        "download complete"
                    );
                    attempts.push(TransportAttempt {
                        strategy: kind,
                        succeeded: true,
                        bytes: Some(bytes),
                        detail: String::new(),
                    });
                    return DownloadOutcome::Completed {
                        path: request.destination.clone(),
                        bytes,
                        strategy: kind,
                        attempts,
                    };
                }
                Ok(Err(error)) => {
                    warn!(strategy = %kind, error = %error, "download strategy failed");
                    attempts.push(failed_attempt(kind, error.to_string()));
                }
                Err(payload) => {
                    let detail = format!("strategy panicked: {}", panic_message(payload.as_ref()));
                    warn!(strategy = %kind, "{detail}");
                    remove_partial(&request.destination).await;
                    attempts.push(failed_attempt(kind, detail));
                }
            }
        }

        let reason = if attempts.is_empty() {
            "no download strategies configured".to_string()
        } else {
            format!("all {} download strategies failed", attempts.len())
        };
        DownloadOutcome::Failed { reason, attempts }
    }
}

fn failed_attempt(strategy: StrategyKind, detail: String) -> TransportAttempt {
    TransportAttempt {
        strategy,
        succeeded: false,
        bytes: None,
        detail,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
