//! Metrics declaration and initialization.

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
lazy_static! {
    // Fetch outcome metrics

    /// Track number of fetch operations resolved with a payload.
    pub static ref FETCH_SUCCESS_COUNTER: &'static str = {
        metrics::describe_counter!(
            "relaybox_fetch_success_total",
            "Total number of fetch operations that resolved successfully."
        );
        "relaybox_fetch_success_total"
    };
    /// Track number of fetch operations that exhausted every path.
    pub static ref FETCH_EXHAUSTED_COUNTER: &'static str = {
        metrics::describe_counter!(
            "relaybox_fetch_exhausted_total",
            "Total number of fetch operations that exhausted all relay paths."
        );
        "relaybox_fetch_exhausted_total"
    };
    /// Track number of individual attempts, across all stages.
    pub static ref ATTEMPT_COUNTER: &'static str = {
        metrics::describe_counter!(
            "relaybox_attempt_total",
            "Total number of direct and relayed fetch attempts."
        );
        "relaybox_attempt_total"
    };

    // Cache metrics

    /// Track number of cache hit events.
    pub static ref CACHE_HIT_COUNTER: &'static str = {
        metrics::describe_counter!(
            "relaybox_cache_hit_total",
            "Total number of cache hit events."
        );
        "relaybox_cache_hit_total"
    };
    /// Track number of cache miss events.
    pub static ref CACHE_MISS_COUNTER: &'static str = {
        metrics::describe_counter!(
            "relaybox_cache_miss_total",
            "Total number of cache miss events."
        );
        "relaybox_cache_miss_total"
    };
}
