//! Pool configuration
//!
//! Caps default to unbounded, so every deposit is fully committed until the
//! admin narrows them with `set_contribution_settings`.

use serde::{Deserialize, Serialize};
use types::amount::Amount;
use types::ids::Address;

use crate::errors::{ConfigError, PoolError};

/// Per-participant and aggregate contribution caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionSettings {
    pub min_contribution: Amount,
    pub max_contribution: Amount,
    pub pool_cap: Amount,
}

impl ContributionSettings {
    pub fn new(min_contribution: Amount, max_contribution: Amount, pool_cap: Amount) -> Self {
        Self {
            min_contribution,
            max_contribution,
            pool_cap,
        }
    }

    /// `min > max` would leave no legal contribution.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.min_contribution > self.max_contribution {
            return Err(PoolError::InvalidContributionSettings {
                min: self.min_contribution,
                max: self.max_contribution,
            });
        }
        Ok(())
    }
}

impl Default for ContributionSettings {
    fn default() -> Self {
        Self {
            min_contribution: 0,
            max_contribution: Amount::MAX,
            pool_cap: Amount::MAX,
        }
    }
}

fn unbounded() -> Amount {
    Amount::MAX
}

/// Configuration for a pool deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    pub admin: Address,
    #[serde(default)]
    pub min_contribution: Amount,
    #[serde(default = "unbounded")]
    pub max_contribution: Amount,
    #[serde(default = "unbounded")]
    pub pool_cap: Amount,
}

impl PoolConfig {
    /// Config with unbounded caps
    pub fn new(admin: Address) -> Self {
        let settings = ContributionSettings::default();
        Self {
            admin,
            min_contribution: settings.min_contribution,
            max_contribution: settings.max_contribution,
            pool_cap: settings.pool_cap,
        }
    }

    pub fn with_settings(mut self, settings: ContributionSettings) -> Self {
        self.min_contribution = settings.min_contribution;
        self.max_contribution = settings.max_contribution;
        self.pool_cap = settings.pool_cap;
        self
    }

    pub fn settings(&self) -> ContributionSettings {
        ContributionSettings::new(self.min_contribution, self.max_contribution, self.pool_cap)
    }

    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: PoolConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PoolError> {
        self.settings().validate()
    }
}
