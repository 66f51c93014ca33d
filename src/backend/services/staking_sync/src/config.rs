use serde::{Deserialize, Serialize};
use staking_models::balance::{parse_planck, unit_to_planck, Planck};
use staking_models::pool::{pallet_id_from_str, DEFAULT_POOLS_PALLET_ID};
use std::{fs, path::Path, path::PathBuf};

use crate::utils::errors::{Result, SyncError};

/// Per-network constants the staking services depend on.
///
/// Amounts are decimal strings so they survive TOML untruncated: plain
/// integers are planck, values with a decimal point are whole tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Network name, part of every context identity
    pub network: String,
    /// Token symbol
    pub unit: String,
    /// Decimal places of one token
    pub units: u32,
    /// Balance an account must keep to stay alive, in planck
    pub existential_deposit: String,
    /// Nominators paid per validator per era
    pub max_nominator_rewarded_per_validator: u32,
    /// Pallet id the pool accounts are derived from
    pub pools_pallet_id: String,
    /// Pending rewards at or below this planck value are not worth showing
    pub min_unclaimed_display: String,
    /// Queue depth between the coordinator and the aggregation worker
    pub worker_channel_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            network: "polkadot".to_string(),
            unit: "DOT".to_string(),
            units: 10,
            existential_deposit: "10000000000".to_string(),
            max_nominator_rewarded_per_validator: 512,
            pools_pallet_id: DEFAULT_POOLS_PALLET_ID.to_string(),
            min_unclaimed_display: "1000000".to_string(),
            worker_channel_capacity: 32,
        }
    }
}

impl SyncConfig {
    /// Built-in preset for a known network.
    pub fn for_network(name: &str) -> Result<Self> {
        let config = match name {
            "polkadot" => Self::default(),
            "kusama" => Self {
                network: "kusama".to_string(),
                unit: "KSM".to_string(),
                units: 12,
                existential_deposit: "333333333".to_string(),
                ..Self::default()
            },
            "westend" => Self {
                network: "westend".to_string(),
                unit: "WND".to_string(),
                units: 12,
                existential_deposit: "10000000000".to_string(),
                max_nominator_rewarded_per_validator: 64,
                ..Self::default()
            },
            other => return Err(SyncError::Config(format!("Unknown network: {other}"))),
        };
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config = toml::from_str::<SyncConfig>(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Load configuration from the user config directory, writing the
    /// default there if none exists yet.
    pub fn load() -> Result<Self> {
        let config_path = Self::default_path();

        if !config_path.exists() {
            let default_config = Self::default();
            default_config.save_to(&config_path)?;
            return Ok(default_config);
        }

        Self::load_from(&config_path)
    }

    /// Save configuration to a file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let toml = toml::to_string_pretty(self)?;
        fs::write(path, toml)?;
        Ok(())
    }

    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_default()
            .join("staking-sync")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        if self.network.trim().is_empty() {
            return Err(SyncError::Config("network must not be empty".to_string()));
        }
        if self.worker_channel_capacity == 0 {
            return Err(SyncError::Config(
                "worker_channel_capacity must be positive".to_string(),
            ));
        }
        self.existential_deposit()?;
        self.min_unclaimed_display()?;
        self.pallet_id()?;
        Ok(())
    }

    pub fn existential_deposit(&self) -> Result<Planck> {
        self.amount(&self.existential_deposit)
    }

    pub fn min_unclaimed_display(&self) -> Result<Planck> {
        self.amount(&self.min_unclaimed_display)
    }

    fn amount(&self, raw: &str) -> Result<Planck> {
        if raw.contains('.') {
            Ok(unit_to_planck(raw, self.units)?)
        } else {
            Ok(parse_planck(raw)?)
        }
    }

    pub fn pallet_id(&self) -> Result<[u8; 8]> {
        Ok(pallet_id_from_str(&self.pools_pallet_id)?)
    }
}
