pub mod cache;
pub mod format;
pub mod rate_limit;

pub use cache::Cache;
pub use rate_limit::RateLimiter;
