//! Batch evaluation on top of a [`TokenDataProvider`].
//!
//! Tokens are processed one at a time so the shared rate limiter sees a
//! steady stream of requests. A token whose record cannot be fetched is
//! reported as an error without being scored; a token whose price history
//! cannot be fetched is still scored, with a zero pattern score.

use chrono::Utc;
use log::{info, warn};
use serde_json::Value;

use crate::analysis::extractor::{resolve, TokenField};
use crate::analysis::{AnalysisResult, TokenEvaluator};
use crate::api::{CandleQuery, TokenDataProvider};
use crate::config::ScannerConfig;
use crate::error::Result;
use crate::metrics;

/// Outcome for one requested address.
#[derive(Debug)]
pub struct TokenScan {
    pub address: String,
    pub outcome: Result<AnalysisResult>,
}

pub struct Scanner<P: TokenDataProvider> {
    provider: P,
    evaluator: TokenEvaluator,
    config: ScannerConfig,
}

impl<P: TokenDataProvider> Scanner<P> {
    pub fn new(provider: P, config: ScannerConfig) -> Self {
        Self {
            provider,
            evaluator: TokenEvaluator::new(),
            config,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    fn candle_query(&self) -> CandleQuery {
        CandleQuery::lookback(
            self.config.candle_interval.clone(),
            self.config.lookback_hours,
            Utc::now(),
        )
    }

    /// Scores an already fetched token record.
    pub async fn evaluate_record(&self, address: &str, token: &Value) -> AnalysisResult {
        let history = match self.provider.fetch_candles(address, &self.candle_query()).await {
            Ok(payload) => Some(payload),
            Err(e) => {
                warn!("No price history for {}, scoring without pattern: {}", address, e);
                None
            }
        };

        metrics::TOKENS_SCORED.inc();
        self.evaluator.evaluate_raw(address, token, history.as_ref())
    }

    pub async fn evaluate_address(&self, address: &str) -> Result<AnalysisResult> {
        let token = self.provider.fetch_token(address).await?;
        Ok(self.evaluate_record(address, &token).await)
    }

    /// Evaluates `addresses` in order, one outcome per address.
    pub async fn scan(&self, addresses: &[String]) -> Vec<TokenScan> {
        let mut scans = Vec::with_capacity(addresses.len());
        for address in addresses {
            let outcome = self.evaluate_address(address).await;
            if let Err(e) = &outcome {
                warn!("Skipping {}: {}", address, e);
            }
            scans.push(TokenScan {
                address: address.clone(),
                outcome,
            });
        }
        scans
    }

    /// Scores the provider's token list and returns the results at or above
    /// `min_total_score`, best first.
    pub async fn scan_top(&self, limit: usize) -> Result<Vec<AnalysisResult>> {
        let listed = self.provider.fetch_token_list(limit).await?;
        info!("Scanning {} listed tokens", listed.len());

        let mut results = Vec::with_capacity(listed.len());
        for record in &listed {
            let Some(address) = resolve(record, TokenField::Address).and_then(Value::as_str) else {
                warn!("Listed token without an address, skipping");
                continue;
            };

            let token = match self.provider.fetch_token(address).await {
                Ok(token) => token,
                Err(e) => {
                    warn!("Using list entry for {}: {}", address, e);
                    record.clone()
                }
            };
            results.push(self.evaluate_record(address, &token).await);
        }

        Ok(rank_results(results, self.config.min_total_score))
    }
}

/// Drops results below `min_total_score` and sorts the rest by total score,
/// highest first. Equal scores keep their input order.
pub fn rank_results(results: Vec<AnalysisResult>, min_total_score: u32) -> Vec<AnalysisResult> {
    let mut ranked: Vec<_> = results
        .into_iter()
        .filter(|result| result.scores.total >= min_total_score)
        .collect();
    ranked.sort_by(|a, b| b.scores.total.cmp(&a.scores.total));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockTokenDataProvider;
    use crate::error::Error;
    use crate::tests::common::{candle_payload, metrics_with_ratios, token_record};
    use mockall::predicate::eq;
    use serde_json::json;

    const BOUNCE_CLOSES: [f64; 13] = [1.0, 2.0, 4.0, 7.0, 10.0, 6.0, 6.2, 6.4, 6.6, 6.8, 7.0, 9.2, 9.0];

    fn scanner(provider: MockTokenDataProvider, min_total_score: u32) -> Scanner<MockTokenDataProvider> {
        let config = ScannerConfig {
            min_total_score,
            ..ScannerConfig::default()
        };
        Scanner::new(provider, config)
    }

    #[tokio::test]
    async fn test_scan_keeps_input_order_and_isolates_failures() {
        let mut provider = MockTokenDataProvider::new();
        provider
            .expect_fetch_token()
            .with(eq("good"))
            .returning(|a| Ok(token_record(a, "GOOD", 1_000_000.0, 200_000.0, 300_000.0)));
        provider
            .expect_fetch_token()
            .with(eq("bad"))
            .returning(|_| Err(Error::ApiError("boom".to_string())));
        provider
            .expect_fetch_candles()
            .times(1)
            .returning(|_, _| Ok(candle_payload(&BOUNCE_CLOSES)));

        let scans = scanner(provider, 0)
            .scan(&["bad".to_string(), "good".to_string()])
            .await;

        assert_eq!(scans.len(), 2);
        assert_eq!(scans[0].address, "bad");
        assert!(scans[0].outcome.is_err());
        let good = scans[1].outcome.as_ref().unwrap();
        assert_eq!(good.metrics.symbol, "GOOD");
        assert!(good.bounce_detected);
    }

    #[tokio::test]
    async fn test_candle_failure_degrades() {
        let mut provider = MockTokenDataProvider::new();
        provider
            .expect_fetch_token()
            .returning(|a| Ok(token_record(a, "NOHIST", 1_000_000.0, 200_000.0, 300_000.0)));
        provider
            .expect_fetch_candles()
            .returning(|_, _| Err(Error::NetworkError("timeout".to_string())));

        let result = scanner(provider, 0).evaluate_address("nohist").await.unwrap();
        assert_eq!(result.scores.pattern, 0);
        assert!(result.reasons[0].contains("Insufficient historical data"));
        assert_eq!(result.scores.volume, 35);
        assert_eq!(result.scores.rugpull, 8);
    }

    #[tokio::test]
    async fn test_scan_top_filters_and_ranks() {
        let mut provider = MockTokenDataProvider::new();
        provider.expect_fetch_token_list().with(eq(3)).returning(|_| {
            Ok(vec![
                json!({ "address": "weak" }),
                json!({ "symbol": "NOADDR" }),
                json!({ "address": "strong" }),
            ])
        });
        provider.expect_fetch_token().returning(|a| {
            if a == "strong" {
                Ok(token_record(a, "STRONG", 1_000_000.0, 350_000.0, 350_000.0))
            } else {
                Ok(token_record(a, "WEAK", 1_000_000.0, 10_000.0, 5_000.0))
            }
        });
        provider.expect_fetch_candles().returning(|address, _| {
            if address == "strong" {
                Ok(candle_payload(&BOUNCE_CLOSES))
            } else {
                Ok(candle_payload(&[1.0; 12]))
            }
        });

        let results = scanner(provider, 40).scan_top(3).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].metrics.symbol, "STRONG");
        assert_eq!(results[0].scores.total, 100);
    }

    #[tokio::test]
    async fn test_scan_top_falls_back_to_list_entry() {
        let mut provider = MockTokenDataProvider::new();
        provider
            .expect_fetch_token_list()
            .returning(|_| Ok(vec![json!({ "address": "listed", "symbol": "LIST", "mc": 100.0 })]));
        provider
            .expect_fetch_token()
            .returning(|_| Err(Error::RateLimitExceeded("birdeye".to_string())));
        provider.expect_fetch_candles().returning(|_, _| Ok(json!([])));

        let results = scanner(provider, 0).scan_top(1).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].metrics.symbol, "LIST");
    }

    #[tokio::test]
    async fn test_scan_top_propagates_list_failure() {
        let mut provider = MockTokenDataProvider::new();
        provider
            .expect_fetch_token_list()
            .returning(|_| Err(Error::ApiAuthFailed("birdeye".to_string())));

        assert!(scanner(provider, 0).scan_top(5).await.is_err());
    }

    #[test]
    fn test_rank_results_is_stable() {
        let evaluator = TokenEvaluator::new();
        let mut first = evaluator.evaluate(&metrics_with_ratios(0.1, 0.1), None);
        first.metrics.symbol = "FIRST".to_string();
        let mut second = first.clone();
        second.metrics.symbol = "SECOND".to_string();
        let best = evaluator.evaluate(&metrics_with_ratios(0.4, 0.4), None);
        let worst = evaluator.evaluate(&metrics_with_ratios(0.0, 0.0), None);

        let ranked = rank_results(vec![first, worst, best.clone(), second], 1);
        let symbols: Vec<_> = ranked.iter().map(|r| r.metrics.symbol.as_str()).collect();
        assert_eq!(ranked[0].scores.total, best.scores.total);
        assert_eq!(&symbols[1..], &["FIRST", "SECOND"]);
    }
}
