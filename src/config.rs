//! Runtime settings loaded from environment variables (and `.env`).
//!
//! | Variable               | Default           |
//! |------------------------|-------------------|
//! | `GYM_DATA_FILE`        | `gym_records.csv` |
//! | `GYM_REGULAR_FEE`      | `50.0`            |
//! | `GYM_PREMIUM_BASE_FEE` | `80.0`            |
//! | `GYM_FROZEN_FEE`       | `10.0`            |
//! | `GYM_GOAL_DISCOUNT`    | `0.10`            |

use crate::entities::FeeSchedule;
use crate::storage::DEFAULT_DATA_FILE;
use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub data_file: PathBuf,
    pub fees: FeeSchedule,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            fees: FeeSchedule::default(),
        }
    }
}

impl Settings {
    pub fn from_env_or_default() -> (Self, Option<anyhow::Error>) {
        Self::from_lookup_or_default(|key| env::var(key).ok())
    }

    /// Like `from_lookup`, but any bad value drops back to the defaults.
    /// The error comes back alongside so the caller can report it.
    pub fn from_lookup_or_default<F>(lookup: F) -> (Self, Option<anyhow::Error>)
    where
        F: Fn(&str) -> Option<String>,
    {
        match Self::from_lookup(lookup) {
            Ok(settings) => (settings, None),
            Err(e) => (Settings::default(), Some(e)),
        }
    }

    /// Build settings from any key lookup; unset keys fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();

        let data_file = lookup("GYM_DATA_FILE")
            .filter(|v| !v.trim().is_empty())
            .map(|v| PathBuf::from(v.trim()))
            .unwrap_or(defaults.data_file);

        let fees = FeeSchedule {
            regular_fee: read_amount(&lookup, "GYM_REGULAR_FEE", defaults.fees.regular_fee)?,
            premium_base_fee: read_amount(
                &lookup,
                "GYM_PREMIUM_BASE_FEE",
                defaults.fees.premium_base_fee,
            )?,
            frozen_fee: read_amount(&lookup, "GYM_FROZEN_FEE", defaults.fees.frozen_fee)?,
            goal_discount: read_amount(&lookup, "GYM_GOAL_DISCOUNT", defaults.fees.goal_discount)?,
        };

        if !(0.0..1.0).contains(&fees.goal_discount) {
            bail!(
                "Invalid GYM_GOAL_DISCOUNT: {}. Must be at least 0 and below 1",
                fees.goal_discount
            );
        }

        Ok(Settings { data_file, fees })
    }
}

fn read_amount<F>(lookup: &F, key: &str, default: f64) -> Result<f64>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };

    let value: f64 = raw
        .trim()
        .parse()
        .with_context(|| format!("Invalid {}: '{}' is not a number", key, raw))?;

    if !value.is_finite() || value < 0.0 {
        bail!("Invalid {}: {} must be a non-negative amount", key, value);
    }
    Ok(value)
}
