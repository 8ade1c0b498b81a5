use metriken::*;

#[metric(
    name = "hwidwatch_polls",
    description = "The number of fingerprint polls completed by the change monitor"
)]
pub static POLLS: LazyCounter = LazyCounter::new(Counter::default);

#[metric(
    name = "hwidwatch_settle_samples",
    description = "The number of fingerprints sampled during settle windows"
)]
pub static SETTLE_SAMPLES: LazyCounter = LazyCounter::new(Counter::default);

#[metric(
    name = "hwidwatch_identifier_unavailable",
    description = "The number of identifier queries recorded as unavailable"
)]
pub static IDENTIFIER_UNAVAILABLE: LazyCounter = LazyCounter::new(Counter::default);

#[metric(
    name = "hwidwatch_identifier_timeout",
    description = "The number of identifier queries abandoned after the query timeout"
)]
pub static IDENTIFIER_TIMEOUT: LazyCounter = LazyCounter::new(Counter::default);

#[metric(
    name = "hwidwatch_changes",
    description = "The number of hardware identity changes",
    metadata = { state = "suspected" }
)]
pub static CHANGES_SUSPECTED: LazyCounter = LazyCounter::new(Counter::default);

#[metric(
    name = "hwidwatch_changes",
    description = "The number of hardware identity changes",
    metadata = { state = "confirmed" }
)]
pub static CHANGES_CONFIRMED: LazyCounter = LazyCounter::new(Counter::default);

#[metric(
    name = "hwidwatch_changes",
    description = "The number of hardware identity changes",
    metadata = { state = "reverted" }
)]
pub static CHANGES_REVERTED: LazyCounter = LazyCounter::new(Counter::default);

#[metric(
    name = "hwidwatch_poll_faults",
    description = "The number of poll iterations which faulted and were skipped"
)]
pub static POLL_FAULTS: LazyCounter = LazyCounter::new(Counter::default);

#[metric(
    name = "hwidwatch_notification_failures",
    description = "The number of notifications a notifier failed to deliver"
)]
pub static NOTIFICATION_FAILURES: LazyCounter = LazyCounter::new(Counter::default);

#[metric(
    name = "hwidwatch_inventory_refreshes",
    description = "The number of inventory display refreshes"
)]
pub static INVENTORY_REFRESHES: LazyCounter = LazyCounter::new(Counter::default);
