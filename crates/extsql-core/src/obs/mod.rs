//! Observability: pushdown and scan counters and the sink abstraction that
//! feeds them.
//!
//! Decode, compile and scan logic only ever emit `MetricsEvent`s; nothing
//! outside this module touches the counter state.

pub(crate) mod metrics;
pub(crate) mod sink;


// re-exports
pub use metrics::{EventOps, EventReport, TableCounters};
pub use sink::{
    MetricsEvent, MetricsSink, PushdownOutcome, metrics_report, metrics_reset_all,
    with_metrics_sink,
};
