//! Tracing subscriber and metric descriptions.

use std::sync::Once;

use metrics::{Unit, describe_counter};
use tracing::{Subscriber, info};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    registry::LookupSpan,
    util::SubscriberInitExt,
};

use crate::cache::{LOAD_TOTAL, STORE_QUERY_TOTAL};
use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install the global subscriber. `RUST_LOG` directives refine `logging.level`.
///
/// Fails if another subscriber is already installed.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer(logging.format))
        .try_init()
        .map_err(|err| InfraError::telemetry(format!("subscriber already installed: {err}")))?;

    info!(
        level = %logging.level,
        json = matches!(logging.format, LogFormat::Json),
        "telemetry initialised"
    );
    Ok(())
}

fn fmt_layer<S>(format: LogFormat) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'span> LookupSpan<'span> + 'static,
{
    match format {
        // Loader spans carry `kind` and `parent_id`; keep them on every event.
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    }
}

/// Register descriptions for the loader counters with the installed recorder.
pub fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            LOAD_TOTAL,
            Unit::Count,
            "Loader calls per resource kind, cached or not."
        );
        describe_counter!(
            STORE_QUERY_TOTAL,
            Unit::Count,
            "Backing-store queries issued by loaders per resource kind."
        );
    });
}
