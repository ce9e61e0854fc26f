//! Retry policy and backoff validators

use super::trait_def::Validate;
use crate::core::backoff::BackoffConfig;
use crate::core::retry::RetryPolicy;
use tracing::debug;

fn check_unit_interval(value: f64, name: &str) -> Result<(), String> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(format!("{} must be between 0 and 1, got {}", name, value));
    }
    Ok(())
}

impl Validate for BackoffConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating backoff configuration");

        if !self.initial_delay_secs.is_finite() || self.initial_delay_secs <= 0.0 {
            return Err("Backoff initial delay must be greater than 0".to_string());
        }

        if !self.max_delay_secs.is_finite() || self.max_delay_secs < self.initial_delay_secs {
            return Err("Backoff max delay must not be below the initial delay".to_string());
        }

        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err("Backoff multiplier must be at least 1.0".to_string());
        }

        check_unit_interval(self.jitter, "Backoff jitter")?;
        check_unit_interval(self.resource_threshold, "Resource threshold")?;

        if self.history_size == 0 {
            return Err("Backoff history size must be greater than 0".to_string());
        }

        if self.min_pattern_outcomes < 4 {
            return Err("Pattern detection needs at least 4 outcomes".to_string());
        }

        Ok(())
    }
}

impl Validate for RetryPolicy {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating retry policy");

        if self.max_attempts == 0 {
            return Err("Retry max attempts must be greater than 0".to_string());
        }

        if self.base_delay_ms == 0 {
            return Err("Retry base delay must be greater than 0".to_string());
        }

        if self.max_delay_ms < self.base_delay_ms {
            return Err("Retry max delay must not be below the base delay".to_string());
        }

        check_unit_interval(self.jitter_factor, "Retry jitter factor")?;

        if self.error_window_secs == 0 {
            return Err("Error window must be greater than 0".to_string());
        }

        if self.rate_limit_backoff_threshold == 0 || self.resource_exhausted_redirect_threshold == 0
        {
            return Err("Error window thresholds must be greater than 0".to_string());
        }

        if let Some(method) = self
            .method_limits
            .keys()
            .find(|m| m.trim().is_empty() || **m != m.to_uppercase())
        {
            return Err(format!("Invalid method limit key: '{}'", method));
        }

        Ok(())
    }
}
