//! Metrics collection and exposition.
//!
//! # Metrics
//! - `faucet_sessions_started_total` (counter)
//! - `faucet_session_resets_total` (counter): by wallet event
//! - `faucet_account_queries_total` (counter): by outcome
//! - `faucet_balance_queries_total` (counter): by outcome
//! - `faucet_transactions_total` (counter): by kind, outcome
//! - `faucet_contract_balance_ether` (gauge): last loaded balance

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

fn outcome(ok: bool) -> &'static str {
    if ok {
        "success"
    } else {
        "failure"
    }
}

/// Serve a Prometheus scrape endpoint. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_session_started() {
    metrics::counter!("faucet_sessions_started_total").increment(1);
}

pub fn record_session_reset(event: &'static str) {
    metrics::counter!("faucet_session_resets_total", "event" => event).increment(1);
}

pub fn record_account_query(ok: bool) {
    metrics::counter!("faucet_account_queries_total", "outcome" => outcome(ok)).increment(1);
}

pub fn record_balance_query(ok: bool) {
    metrics::counter!("faucet_balance_queries_total", "outcome" => outcome(ok)).increment(1);
}

pub fn record_transaction(kind: &'static str, ok: bool) {
    metrics::counter!("faucet_transactions_total", "kind" => kind, "outcome" => outcome(ok))
        .increment(1);
}

pub fn record_contract_balance(ether: f64) {
    metrics::gauge!("faucet_contract_balance_ether").set(ether);
}
