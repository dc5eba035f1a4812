use metrics::counter;
use tracing::{info, warn};

use crate::domain::fragments::FragmentId;

pub(crate) const METRIC_FRAGMENTS_LOADED: &str = "hydrator_fragments_loaded_total";
pub(crate) const METRIC_FETCH_FAILURES: &str = "hydrator_fetch_failures_total";
pub(crate) const METRIC_FRAGMENTS_PENDING: &str = "hydrator_fragments_pending";
pub(crate) const METRIC_POLL_PASS_MS: &str = "hydrator_poll_pass_ms";

/// Structured diagnostics produced by a poll pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadEvent {
    Loaded { fragment: FragmentId, bytes: usize },
    LoadedEmpty { fragment: FragmentId },
    NotFound { fragment: FragmentId },
    TransportError { fragment: FragmentId, message: String },
    Unmapped { fragment: FragmentId, reason: String },
    BindFailed { fragment: FragmentId, message: String },
    Complete { loaded: usize, total: usize },
}

impl LoadEvent {
    pub fn name(&self) -> &'static str {
        match self {
            LoadEvent::Loaded { .. } => "loaded",
            LoadEvent::LoadedEmpty { .. } => "loaded-empty",
            LoadEvent::NotFound { .. } => "not-found",
            LoadEvent::TransportError { .. } => "transport-error",
            LoadEvent::Unmapped { .. } => "unmapped",
            LoadEvent::BindFailed { .. } => "bind-failed",
            LoadEvent::Complete { .. } => "complete",
        }
    }

    pub(crate) fn emit(&self) {
        let event = self.name();
        match self {
            LoadEvent::Loaded { fragment, bytes } => {
                counter!(METRIC_FRAGMENTS_LOADED).increment(1);
                info!(
                    target: "hydrator::loader",
                    event,
                    fragment = %fragment,
                    bytes,
                    "fragment loaded"
                );
            }
            LoadEvent::LoadedEmpty { fragment } => {
                counter!(METRIC_FRAGMENTS_LOADED).increment(1);
                warn!(
                    target: "hydrator::loader",
                    event,
                    fragment = %fragment,
                    "fragment is empty, settled as plain"
                );
            }
            LoadEvent::NotFound { fragment } => {
                info!(
                    target: "hydrator::loader",
                    event,
                    fragment = %fragment,
                    "fragment not found, create it to see content"
                );
            }
            LoadEvent::TransportError { fragment, message } => {
                warn!(
                    target: "hydrator::loader",
                    event,
                    fragment = %fragment,
                    error = %message,
                    "fragment fetch failed"
                );
            }
            LoadEvent::Unmapped { fragment, reason } => {
                warn!(
                    target: "hydrator::loader",
                    event,
                    fragment = %fragment,
                    reason = %reason,
                    "no target for fragment"
                );
            }
            LoadEvent::BindFailed { fragment, message } => {
                warn!(
                    target: "hydrator::loader",
                    event,
                    fragment = %fragment,
                    error = %message,
                    "fragment could not be written into the page"
                );
            }
            LoadEvent::Complete { loaded, total } => {
                info!(
                    target: "hydrator::loader",
                    event,
                    loaded,
                    total,
                    "fragment loading complete"
                );
            }
        }
    }
}
