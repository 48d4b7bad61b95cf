use std::{cell::RefCell, collections::BTreeMap};

///
/// Metrics
/// Ephemeral, in-memory counters for pushdown decisions and scans.
/// State is thread-local: a scan runs entirely on the thread that drives it.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct EventState {
    pub(crate) ops: EventOps,
    pub(crate) tables: BTreeMap<String, TableCounters>,
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EventOps {
    // Pushdown decisions
    pub filters_offered: u64,
    pub filters_accepted: u64,
    pub filters_declined: u64,
    pub filters_failed: u64,

    // Scan lifecycle
    pub scans_opened: u64,
    pub scans_closed: u64,
    pub scan_errors: u64,

    // Materialized data
    pub batches_fetched: u64,
    pub rows_fetched: u64,
    pub bytes_fetched: u64,
}

///
/// TableCounters
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TableCounters {
    pub scans_opened: u64,
    pub rows_fetched: u64,
    pub bytes_fetched: u64,
}

///
/// EventReport
/// Point-in-time copy of the counters.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EventReport {
    pub ops: EventOps,
    pub tables: BTreeMap<String, TableCounters>,
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Reset all counters (useful in tests).
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

/// Copy the current counters out.
pub(crate) fn report() -> EventReport {
    with_state(|m| EventReport {
        ops: m.ops.clone(),
        tables: m.tables.clone(),
    })
}
