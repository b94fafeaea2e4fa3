//! Subscriber setup for the `deploygate` binary.
//!
//! The engine itself only emits events (see [`crate::obs`]): one span per
//! validation run, a per-cluster summary, one debug event per required
//! action, the gate verdict, and warnings for blocked changes and ignored
//! override entries. This module decides where those go.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber, writing to stderr.
///
/// `RUST_LOG` wins over `level` when set. With `json`, each event becomes one
/// JSON line carrying the span fields (cluster counts) so pipelines can
/// attach verdicts to a deployment. Stdout is left to reports and override
/// requests. Later calls in the same process are no-ops.
pub fn init_tracing(json: bool, level: Level) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let (json_layer, text_layer) = if json {
        let layer = fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(false)
            .with_writer(std::io::stderr);
        (Some(layer), None)
    } else {
        let layer = fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(std::io::stderr);
        (None, Some(layer))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
        .ok();
}
