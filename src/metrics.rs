use lazy_static::lazy_static;
use prometheus::{Counter, Encoder, Histogram, HistogramOpts, Registry, TextEncoder};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    pub static ref API_CALLS: Counter = Counter::new(
        "api_calls_total",
        "Total number of upstream API calls"
    ).expect("valid metric");

    pub static ref API_ERRORS: Counter = Counter::new(
        "api_errors_total",
        "Total number of failed upstream API calls"
    ).expect("valid metric");

    pub static ref CACHE_HITS: Counter = Counter::new(
        "cache_hits_total",
        "Total number of responses served from the cache"
    ).expect("valid metric");

    pub static ref TOKENS_SCORED: Counter = Counter::new(
        "tokens_scored_total",
        "Total number of tokens evaluated"
    ).expect("valid metric");

    pub static ref API_LATENCY: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "api_latency_seconds",
            "Upstream API call latency in seconds"
        ).buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0])
    ).expect("valid metric");
}

pub fn init() -> Result<(), prometheus::Error> {
    REGISTRY.register(Box::new(API_CALLS.clone()))?;
    REGISTRY.register(Box::new(API_ERRORS.clone()))?;
    REGISTRY.register(Box::new(CACHE_HITS.clone()))?;
    REGISTRY.register(Box::new(TOKENS_SCORED.clone()))?;
    REGISTRY.register(Box::new(API_LATENCY.clone()))?;
    Ok(())
}

/// Prometheus text exposition of everything registered.
pub fn render() -> Result<String, prometheus::Error> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
