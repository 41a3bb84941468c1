use metrics::{describe_counter, describe_gauge};
use tracing_subscriber::EnvFilter;

/// RUST_LOG wins; otherwise `default_filter` applies.
pub fn init_tracing(default_filter: &str, json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).compact().init();
    }
}

/// Registers descriptions once a recorder is installed.
pub fn describe_metrics() {
    describe_counter!(
        "desk_book_polls_total",
        "Order book poll responses by outcome (applied, failed, superseded)"
    );
    describe_counter!(
        "desk_orders_total",
        "Order submissions by outcome (accepted, failed)"
    );
    describe_gauge!("desk_sessions_active", "Number of open trading sessions");
}
