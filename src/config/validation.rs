//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals > 0, attempts > 0)
//! - Check RPC URLs parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: TrackerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::{ChainConfig, TrackerConfig};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("network key must not be empty")]
    EmptyNetworkKey,

    #[error("{field} is not a valid URL: {url}")]
    InvalidUrl { field: &'static str, url: String },

    #[error("retries.base_delay_ms ({base}) exceeds retries.max_delay_ms ({max})")]
    BackoffRange { base: u64, max: u64 },
}

/// Validate a parsed configuration.
pub fn validate_config(config: &TrackerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.network.key.trim().is_empty() {
        errors.push(ValidationError::EmptyNetworkKey);
    }

    let polling = &config.polling;
    check_nonzero(&mut errors, "polling.deposit_interval_ms", polling.deposit_interval_ms);
    check_nonzero(&mut errors, "polling.withdrawal_interval_ms", polling.withdrawal_interval_ms);
    check_nonzero(&mut errors, "polling.transfer_interval_ms", polling.transfer_interval_ms);
    check_nonzero(&mut errors, "polling.max_concurrent_rounds", polling.max_concurrent_rounds as u64);

    check_nonzero(&mut errors, "retries.max_attempts", config.retries.max_attempts as u64);
    if config.retries.base_delay_ms > config.retries.max_delay_ms {
        errors.push(ValidationError::BackoffRange {
            base: config.retries.base_delay_ms,
            max: config.retries.max_delay_ms,
        });
    }

    check_chain(&mut errors, "l1", &config.l1);
    check_chain(&mut errors, "l2", &config.l2);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_nonzero(errors: &mut Vec<ValidationError>, field: &'static str, value: u64) {
    if value == 0 {
        errors.push(ValidationError::Zero { field });
    }
}

fn check_chain(errors: &mut Vec<ValidationError>, layer: &'static str, chain: &ChainConfig) {
    let (url_field, failover_field, timeout_field, poll_field) = match layer {
        "l1" => ("l1.rpc_url", "l1.failover_urls", "l1.rpc_timeout_secs", "l1.receipt_poll_interval_ms"),
        _ => ("l2.rpc_url", "l2.failover_urls", "l2.rpc_timeout_secs", "l2.receipt_poll_interval_ms"),
    };

    if url::Url::parse(&chain.rpc_url).is_err() {
        errors.push(ValidationError::InvalidUrl {
            field: url_field,
            url: chain.rpc_url.clone(),
        });
    }
    for failover in &chain.failover_urls {
        if url::Url::parse(failover).is_err() {
            errors.push(ValidationError::InvalidUrl {
                field: failover_field,
                url: failover.clone(),
            });
        }
    }
    check_nonzero(errors, timeout_field, chain.rpc_timeout_secs);
    check_nonzero(errors, poll_field, chain.receipt_poll_interval_ms);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&TrackerConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = TrackerConfig::default();
        config.network.key = "  ".to_string();
        config.polling.transfer_interval_ms = 0;
        config.l2.rpc_url = "not a url".to_string();
        config.retries.base_delay_ms = 10_000;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::EmptyNetworkKey));
        assert!(errors.contains(&ValidationError::Zero {
            field: "polling.transfer_interval_ms"
        }));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidUrl { field: "l2.rpc_url", .. })));
    }
}
