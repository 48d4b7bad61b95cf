//! Metrics sink boundary.
//!
//! Core logic MUST NOT depend on obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.
//!
//! This module is the only allowed bridge between execution logic
//! and the thread-local metrics state.
use crate::obs::metrics::{self, EventReport};
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = RefCell::new(None);
}

///
/// PushdownOutcome
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PushdownOutcome {
    Accepted,
    Declined,
    Failed,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent<'a> {
    Pushdown {
        outcome: PushdownOutcome,
    },
    ScanOpened {
        table: &'a str,
        batch_size: usize,
    },
    BatchFetched {
        table: &'a str,
        rows: u64,
        bytes: u64,
    },
    ScanFailed {
        table: &'a str,
    },
    ScanClosed {
        table: &'a str,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent<'_>);
}

/// GlobalMetricsSink
/// Default sink that writes into the thread-local metrics state.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent<'_>) {
        match event {
            MetricsEvent::Pushdown { outcome } => metrics::with_state_mut(|m| {
                m.ops.filters_offered = m.ops.filters_offered.saturating_add(1);
                let counter = match outcome {
                    PushdownOutcome::Accepted => &mut m.ops.filters_accepted,
                    PushdownOutcome::Declined => &mut m.ops.filters_declined,
                    PushdownOutcome::Failed => &mut m.ops.filters_failed,
                };
                *counter = counter.saturating_add(1);
            }),

            MetricsEvent::ScanOpened { table, .. } => metrics::with_state_mut(|m| {
                m.ops.scans_opened = m.ops.scans_opened.saturating_add(1);

                let entry = m.tables.entry(table.to_string()).or_default();
                entry.scans_opened = entry.scans_opened.saturating_add(1);
            }),

            MetricsEvent::BatchFetched { table, rows, bytes } => metrics::with_state_mut(|m| {
                m.ops.batches_fetched = m.ops.batches_fetched.saturating_add(1);
                m.ops.rows_fetched = m.ops.rows_fetched.saturating_add(rows);
                m.ops.bytes_fetched = m.ops.bytes_fetched.saturating_add(bytes);

                let entry = m.tables.entry(table.to_string()).or_default();
                entry.rows_fetched = entry.rows_fetched.saturating_add(rows);
                entry.bytes_fetched = entry.bytes_fetched.saturating_add(bytes);
            }),

            MetricsEvent::ScanFailed { .. } => metrics::with_state_mut(|m| {
                m.ops.scan_errors = m.ops.scan_errors.saturating_add(1);
            }),

            MetricsEvent::ScanClosed { .. } => metrics::with_state_mut(|m| {
                m.ops.scans_closed = m.ops.scans_closed.saturating_add(1);
            }),
        }
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

/// Route one event to the scoped override, or the global sink when none is set.
pub(crate) fn record(event: MetricsEvent<'_>) {
    let override_sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());

    match override_sink {
        Some(sink) => sink.record(event),
        None => GLOBAL_METRICS_SINK.record(event),
    }
}

/// Snapshot the current metrics state.
#[must_use]
pub fn metrics_report() -> EventReport {
    metrics::report()
}

/// Reset all metrics state.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override.
///
/// The previous sink is restored on every exit, including unwinding.
pub fn with_metrics_sink<T>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let prev = self.0.take();
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = prev;
            });
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(prev);

    f()
}
