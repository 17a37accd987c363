//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate address formats and endpoint URLs
//! - Validate value ranges (timeouts > 0, bet limits ordered)
//! - The HTTP request timeout must outlast a full commit-reveal round, or
//!   the client would get a bare 408 instead of the pending transaction id
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Empty contract/treasury addresses are allowed here and rejected per request

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::RelayConfig;
use crate::ledger::types::FlowAddress;

/// One failed semantic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if !value.is_empty() && value.parse::<FlowAddress>().is_err() {
        errors.push(ValidationError::new(field, format!("'{}' is not 0x + 16 hex digits", value)));
    }
}

fn check_positive(errors: &mut Vec<ValidationError>, field: &str, value: u64) {
    if value == 0 {
        errors.push(ValidationError::new(field, "must be greater than zero"));
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new("server.bind_address", "not a socket address"));
    }
    check_positive(&mut errors, "server.request_timeout_secs", config.server.request_timeout_secs);

    if config.ledger.access_endpoints.is_empty() {
        errors.push(ValidationError::new("ledger.access_endpoints", "at least one endpoint is required"));
    }
    for (i, endpoint) in config.ledger.access_endpoints.iter().enumerate() {
        if url::Url::parse(endpoint).is_err() {
            errors.push(ValidationError::new(
                &format!("ledger.access_endpoints[{}]", i),
                format!("'{}' is not a valid URL", endpoint),
            ));
        }
    }
    check_positive(&mut errors, "ledger.request_timeout_secs", config.ledger.request_timeout_secs);
    check_positive(&mut errors, "ledger.gas_limit", config.ledger.gas_limit);

    check_address(&mut errors, "contracts.casino_games", &config.contracts.casino_games);
    check_address(&mut errors, "contracts.flow_vrf", &config.contracts.flow_vrf);
    check_address(&mut errors, "contracts.fungible_token", &config.contracts.fungible_token);
    check_address(&mut errors, "contracts.flow_token", &config.contracts.flow_token);
    check_address(&mut errors, "treasury.address", &config.treasury.address);
    if !config.treasury.vault_balance_path.starts_with("/public/") {
        errors.push(ValidationError::new("treasury.vault_balance_path", "must be a /public/ path"));
    }

    if config.retries.enabled && config.retries.max_attempts == 0 {
        errors.push(ValidationError::new("retries.max_attempts", "must be at least 1"));
    }
    if config.retries.base_delay_ms > config.retries.max_delay_ms {
        errors.push(ValidationError::new("retries.base_delay_ms", "must not exceed max_delay_ms"));
    }

    check_positive(&mut errors, "sealing.poll_interval_ms", config.sealing.poll_interval_ms);
    check_positive(&mut errors, "sealing.timeout_secs", config.sealing.timeout_secs);

    check_positive(
        &mut errors,
        "entropy.reveal_delay_timeout_secs",
        config.entropy.reveal_delay_timeout_secs,
    );
    let round_secs = config
        .sealing
        .timeout_secs
        .saturating_mul(2)
        .saturating_add(config.entropy.reveal_delay_timeout_secs);
    if config.server.request_timeout_secs <= round_secs {
        errors.push(ValidationError::new(
            "server.request_timeout_secs",
            format!(
                "must exceed 2 x sealing.timeout_secs + entropy.reveal_delay_timeout_secs ({}s)",
                round_secs
            ),
        ));
    }
    if config.entropy.seed_length_bytes < 16 {
        errors.push(ValidationError::new("entropy.seed_length_bytes", "must be at least 16"));
    }

    let games = &config.games;
    if !(games.min_bet.is_finite() && games.max_bet.is_finite()) || games.min_bet < 0.0 {
        errors.push(ValidationError::new("games", "bet limits must be finite and non-negative"));
    } else if games.min_bet > games.max_bet {
        errors.push(ValidationError::new("games.min_bet", "must not exceed max_bet"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new("observability.metrics_address", "not a socket address"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&RelayConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = RelayConfig::default();
        config.treasury.address = "0123456789abcdef".into();
        config.ledger.access_endpoints.clear();
        config.sealing.timeout_secs = 0;
        config.games.min_bet = 5.0;
        config.games.max_bet = 1.0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"treasury.address"));
        assert!(fields.contains(&"ledger.access_endpoints"));
        assert!(fields.contains(&"sealing.timeout_secs"));
        assert!(fields.contains(&"games.min_bet"));
    }

    #[test]
    fn test_request_timeout_must_cover_commit_reveal_round() {
        let mut config = RelayConfig::default();
        config.sealing.timeout_secs = 30;
        config.entropy.reveal_delay_timeout_secs = 30;

        config.server.request_timeout_secs = 90;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "server.request_timeout_secs");
        assert!(errors[0].message.contains("90s"));

        config.server.request_timeout_secs = 91;
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_bad_endpoint_url() {
        let mut config = RelayConfig::default();
        config.ledger.access_endpoints = vec!["::not a url".into()];
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "ledger.access_endpoints[0]");
    }
}
