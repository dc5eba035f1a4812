//! Polling orchestrator that hydrates page targets from fragment files.
//!
//! A pass visits every fragment not yet loaded, in catalog order, awaiting
//! one fetch at a time. Passes never overlap: [`FragmentLoader::poll_once`]
//! takes `&mut self`, and [`FragmentLoader::run`] schedules the next pass
//! only after the current one has finished.
//!
//! Diagnostics for failures are only emitted on the first pass so repeated
//! polls do not flood the log with identical lines.

mod events;
mod state;

use std::time::{Duration, Instant};

use metrics::{counter, gauge, histogram};
use tracing::{debug, instrument};

use crate::{
    application::{
        ports::{BindError, BoundContent, ContentSource, FetchError, TargetBinder},
        render::{MarkdownRenderService, RenderService},
    },
    domain::fragments::{FragmentCatalog, FragmentId, TargetId},
};

pub use events::LoadEvent;
pub(crate) use events::{
    METRIC_FETCH_FAILURES, METRIC_FRAGMENTS_LOADED, METRIC_FRAGMENTS_PENDING, METRIC_POLL_PASS_MS,
};
pub use state::{LoadedSet, LoaderStatus, PollOutcome, PollState};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3000);

const NO_TARGET_REASON: &str = "no target registered for fragment";

pub struct FragmentLoader<S, B, R = MarkdownRenderService> {
    catalog: FragmentCatalog,
    source: S,
    binder: B,
    renderer: R,
    poll_interval: Duration,
    loaded: LoadedSet,
    state: PollState,
    finished: bool,
}

impl<S, B> FragmentLoader<S, B, MarkdownRenderService>
where
    S: ContentSource,
    B: TargetBinder,
{
    pub fn new(catalog: FragmentCatalog, source: S, binder: B) -> Self {
        Self::with_renderer(catalog, source, binder, MarkdownRenderService::new())
    }
}

impl<S, B, R> FragmentLoader<S, B, R>
where
    S: ContentSource,
    B: TargetBinder,
    R: RenderService,
{
    pub fn with_renderer(catalog: FragmentCatalog, source: S, binder: B, renderer: R) -> Self {
        let state = PollState::new(catalog.len());
        Self {
            catalog,
            source,
            binder,
            renderer,
            poll_interval: DEFAULT_POLL_INTERVAL,
            loaded: LoadedSet::default(),
            state,
            finished: false,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Run one pass over the fragments that are not loaded yet.
    ///
    /// Once polling has finished, further calls fetch nothing.
    #[instrument(skip(self), fields(pass = self.state.passes + 1))]
    pub async fn poll_once(&mut self) -> PollOutcome {
        if self.finished {
            return PollOutcome::idle();
        }

        let started = Instant::now();
        let initial = self.state.is_initial_pass;
        let mut gained = 0;
        let mut events = Vec::new();

        let fragments = self.catalog.fragments().to_vec();
        for fragment in fragments {
            if self.loaded.contains(&fragment) {
                continue;
            }

            let Some(target) = self.catalog.target(&fragment).cloned() else {
                if initial {
                    events.push(LoadEvent::Unmapped {
                        fragment,
                        reason: NO_TARGET_REASON.to_string(),
                    });
                }
                continue;
            };

            if let Some(event) = self.load_fragment(fragment, &target, initial).await {
                if matches!(
                    event,
                    LoadEvent::Loaded { .. } | LoadEvent::LoadedEmpty { .. }
                ) {
                    gained += 1;
                }
                events.push(event);
            }
        }

        self.state.passes += 1;
        self.state.remaining = self.catalog.len() - self.loaded.len();
        if gained == 0 {
            self.state.attempts_since_last_gain += 1;
        } else {
            self.state.attempts_since_last_gain = 0;
        }

        let finished = self.state.remaining == 0 || (initial && gained == 0);
        if finished {
            self.finished = true;
            events.push(LoadEvent::Complete {
                loaded: self.loaded.len(),
                total: self.catalog.len(),
            });
        }
        self.state.is_initial_pass = false;

        for event in &events {
            event.emit();
        }
        histogram!(METRIC_POLL_PASS_MS).record(started.elapsed().as_secs_f64() * 1000.0);
        gauge!(METRIC_FRAGMENTS_PENDING).set(self.state.remaining as f64);
        debug!(
            target: "hydrator::loader",
            gained,
            remaining = self.state.remaining,
            finished,
            "poll pass finished"
        );

        PollOutcome {
            gained,
            finished,
            events,
        }
    }

    /// Fetch, render and bind one fragment. Returns the diagnostic to emit,
    /// if any; failures after the first pass stay silent.
    async fn load_fragment(
        &mut self,
        fragment: FragmentId,
        target: &TargetId,
        initial: bool,
    ) -> Option<LoadEvent> {
        let body = match self.source.fetch(&fragment).await {
            Ok(body) => body,
            Err(error) => {
                counter!(METRIC_FETCH_FAILURES, "kind" => error.kind()).increment(1);
                return match error {
                    _ if !initial => None,
                    FetchError::NotFound => Some(LoadEvent::NotFound { fragment }),
                    FetchError::Transport { message } => {
                        Some(LoadEvent::TransportError { fragment, message })
                    }
                };
            }
        };

        let (content, loaded_event) = if body.trim().is_empty() {
            // Empty is terminal, but only discovered on the first pass.
            if !initial {
                return None;
            }
            (
                BoundContent::Plain,
                LoadEvent::LoadedEmpty {
                    fragment: fragment.clone(),
                },
            )
        } else {
            (
                BoundContent::Html(self.renderer.render(&body)),
                LoadEvent::Loaded {
                    fragment: fragment.clone(),
                    bytes: body.len(),
                },
            )
        };

        match self.binder.bind(&fragment, target, content) {
            Ok(()) => {
                self.loaded.insert(fragment);
                Some(loaded_event)
            }
            Err(_) if !initial => None,
            Err(BindError::Rewrite { message }) => Some(LoadEvent::BindFailed { fragment, message }),
            Err(error) => Some(LoadEvent::Unmapped {
                fragment,
                reason: error.to_string(),
            }),
        }
    }

    /// Poll until nothing more can be gained, sleeping `poll_interval`
    /// between passes.
    pub async fn run(&mut self) -> LoaderStatus {
        while !self.poll_once().await.finished {
            tokio::time::sleep(self.poll_interval).await;
        }
        self.status()
    }

    pub fn status(&self) -> LoaderStatus {
        LoaderStatus {
            loaded: self.loaded.iter().cloned().collect(),
            total: self.catalog.len(),
            finished: self.finished,
        }
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    pub fn loaded(&self) -> &LoadedSet {
        &self.loaded
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn binder(&self) -> &B {
        &self.binder
    }

    pub fn into_binder(self) -> B {
        self.binder
    }
}

#[cfg(test)]
mod tests;
