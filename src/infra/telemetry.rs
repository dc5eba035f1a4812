use std::sync::Once;

use metrics::{Unit, describe_counter, describe_gauge, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::application::loader::{
    METRIC_FETCH_FAILURES, METRIC_FRAGMENTS_LOADED, METRIC_FRAGMENTS_PENDING, METRIC_POLL_PASS_MS,
};
use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
///
/// Logs go to stderr so `hydrate` can stream the page to stdout.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            METRIC_FRAGMENTS_LOADED,
            Unit::Count,
            "Total number of fragments rendered and bound, empty ones included."
        );
        describe_counter!(
            METRIC_FETCH_FAILURES,
            Unit::Count,
            "Total number of failed fragment fetches, labelled by kind."
        );
        describe_gauge!(
            METRIC_FRAGMENTS_PENDING,
            Unit::Count,
            "Fragments not yet loaded after the latest poll pass."
        );
        describe_histogram!(
            METRIC_POLL_PASS_MS,
            Unit::Milliseconds,
            "Duration of one poll pass in milliseconds."
        );
    });
}
