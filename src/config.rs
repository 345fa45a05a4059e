//! Ledger configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::types::*;

/// Tunables applied by the ledger when persisting amounts and rates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Decimal places kept on transaction amounts
    pub amount_scale: i64,
    /// Decimal places kept on interest rates (extra digits are truncated)
    pub interest_rate_scale: i64,
    /// Description given to synthesized opening-balance transactions
    pub opening_description: String,
    /// Description given to posted interest transactions
    pub interest_description: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            amount_scale: 2,
            interest_rate_scale: 4,
            opening_description: "Opening balance".to_string(),
            interest_description: "Interest".to_string(),
        }
    }
}

impl LedgerConfig {
    /// Parse a JSON document; absent keys keep their defaults
    pub fn from_json_str(json: &str) -> LedgerResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| LedgerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> LedgerResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| LedgerError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> LedgerResult<()> {
        if !(0..=8).contains(&self.amount_scale) {
            return Err(LedgerError::Config(format!(
                "amount_scale must be between 0 and 8, got {}",
                self.amount_scale
            )));
        }

        if !(0..=8).contains(&self.interest_rate_scale) {
            return Err(LedgerError::Config(format!(
                "interest_rate_scale must be between 0 and 8, got {}",
                self.interest_rate_scale
            )));
        }

        Ok(())
    }
}
