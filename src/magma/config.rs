//! Validated bounds for one [`super::MagmaExecutor`], derived from
//! [`crate::config::MagmaConfig`].

use std::time::Duration;

use crate::config::MagmaConfig;
use crate::error::AppError;

/// Validated executor bounds. Constructed once at startup; never mutated.
#[derive(Debug, Clone, Copy)]
pub struct ExecutorOptions {
    pub semantic_top_k: usize,
    pub min_semantic_score: f64,
    pub timeout: Duration,
}

impl ExecutorOptions {
    pub fn from_config(config: &MagmaConfig) -> Result<Self, AppError> {
        if !(1..=100).contains(&config.semantic_top_k) {
            return Err(AppError::Validation(
                "semantic_top_k must be in [1, 100]".into(),
            ));
        }
        if !(0.0..=1.0).contains(&config.min_semantic_score) {
            return Err(AppError::Validation(
                "min_semantic_score must be in [0, 1]".into(),
            ));
        }
        if !(100..=60_000).contains(&config.timeout_ms) {
            return Err(AppError::Validation(
                "timeout must be in [100ms, 60s]".into(),
            ));
        }
        Ok(Self {
            semantic_top_k: config.semantic_top_k,
            min_semantic_score: config.min_semantic_score,
            timeout: Duration::from_millis(config.timeout_ms),
        })
    }
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self::from_config(&MagmaConfig::default()).expect("built-in defaults are always valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let options = ExecutorOptions::from_config(&MagmaConfig::default()).unwrap();
        assert_eq!(options.semantic_top_k, 10);
        assert_eq!(options.min_semantic_score, 0.5);
        assert_eq!(options.timeout, Duration::from_millis(5_000));
    }

    #[test]
    fn rejects_top_k_out_of_range() {
        let config = MagmaConfig {
            semantic_top_k: 0,
            ..MagmaConfig::default()
        };
        assert!(ExecutorOptions::from_config(&config).is_err());

        let config = MagmaConfig {
            semantic_top_k: 101,
            ..MagmaConfig::default()
        };
        assert!(ExecutorOptions::from_config(&config).is_err());
    }

    #[test]
    fn rejects_min_score_out_of_range() {
        let config = MagmaConfig {
            min_semantic_score: -0.1,
            ..MagmaConfig::default()
        };
        assert!(ExecutorOptions::from_config(&config).is_err());

        let config = MagmaConfig {
            min_semantic_score: 1.5,
            ..MagmaConfig::default()
        };
        assert!(ExecutorOptions::from_config(&config).is_err());
    }

    #[test]
    fn rejects_timeout_out_of_range() {
        let config = MagmaConfig {
            timeout_ms: 50,
            ..MagmaConfig::default()
        };
        assert!(ExecutorOptions::from_config(&config).is_err());

        let config = MagmaConfig {
            timeout_ms: 100_000,
            ..MagmaConfig::default()
        };
        assert!(ExecutorOptions::from_config(&config).is_err());
    }
}
