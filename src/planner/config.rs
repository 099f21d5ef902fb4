//! Value iteration hyperparameters

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::game::{ConfigError, RewardTable};

/// How a sweep decides that the value table has settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum StoppingRule {
    /// Largest absolute change over the whole sweep
    MaxDelta,
    /// Absolute change of the last cell updated in the sweep
    LastCell,
}

/// Configuration for the value iteration planner
///
/// # Example
///
/// ```rust
/// use dp_snake::planner::{PlannerConfig, StoppingRule};
///
/// let config = PlannerConfig {
///     stopping: StoppingRule::LastCell,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Discount factor applied to the best neighbour value (gamma)
    ///
    /// Default: 0.95
    pub discount: f64,

    /// Sweep delta at or below which the table counts as converged (epsilon)
    ///
    /// Default: 0.0001
    pub threshold: f64,

    /// Upper bound on sweeps per solve
    ///
    /// Default: 10000
    pub max_sweeps: usize,

    /// Which delta is compared against `threshold`
    ///
    /// Default: `MaxDelta`
    pub stopping: StoppingRule,

    /// Reward assigned to each cell kind
    pub rewards: RewardTable,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            discount: 0.95,
            threshold: 0.0001,
            max_sweeps: 10_000,
            stopping: StoppingRule::MaxDelta,
            rewards: RewardTable::default(),
        }
    }
}

impl PlannerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..1.0).contains(&self.discount) {
            return Err(ConfigError::InvalidDiscount(self.discount));
        }

        if self.threshold.is_nan() || self.threshold <= 0.0 {
            return Err(ConfigError::InvalidThreshold(self.threshold));
        }

        if self.max_sweeps == 0 {
            return Err(ConfigError::ZeroSweeps);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PlannerConfig::default();
        assert_eq!(config.discount, 0.95);
        assert_eq!(config.threshold, 0.0001);
        assert_eq!(config.max_sweeps, 10_000);
        assert_eq!(config.stopping, StoppingRule::MaxDelta);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_discount_out_of_range() {
        let mut config = PlannerConfig::default();
        config.discount = 1.0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidDiscount(1.0)));

        config.discount = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_threshold() {
        let mut config = PlannerConfig::default();
        config.threshold = 0.0;
        assert!(config.validate().is_err());

        config.threshold = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_zero_sweeps() {
        let config = PlannerConfig {
            max_sweeps: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroSweeps));
    }
}
