use once_cell::sync::Lazy;
use prometheus::{register_int_counter, IntCounter};

pub static SYNC_PASSES: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "indexer_sync_passes_total",
        "Number of sync passes started"
    )
    .expect("metric can be registered")
});

pub static EVENTS_PROCESSED: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "indexer_events_processed_total",
        "Events whose handler completed successfully"
    )
    .expect("metric can be registered")
});

pub static EVENTS_FAILED: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "indexer_events_failed_total",
        "Events dropped because their handler failed"
    )
    .expect("metric can be registered")
});
