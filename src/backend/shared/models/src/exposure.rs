use serde::{Deserialize, Serialize};
use sp_core::crypto::Ss58Codec;
use tracing::debug;

use crate::balance::{parse_planck, Planck};
use crate::errors::{ModelError, Result};
use crate::{AccountId, Addressable};

/// A nominator's bond behind one validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndividualExposure {
    pub who: AccountId,
    pub value: Planck,
}

/// Stake backing one validator in an era.
///
/// `others` keeps the order the chain delivered, normally descending by
/// bonded amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExposureEntry {
    pub validator: AccountId,
    pub total: Planck,
    pub own: Planck,
    pub others: Vec<IndividualExposure>,
}

impl Addressable for IndividualExposure {
    fn address(&self) -> &AccountId {
        &self.who
    }
}

impl Addressable for ExposureEntry {
    fn address(&self) -> &AccountId {
        &self.validator
    }
}

impl ExposureEntry {
    /// Whether `who` backs this validator at all, rewarded or not.
    pub fn is_backed_by(&self, who: &AccountId) -> bool {
        self.others.iter().any(|backer| backer.address() == who)
    }
}

/// Humanised backer as delivered by the chain client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawIndividualExposure {
    pub who: Option<String>,
    pub value: Option<String>,
}

/// Humanised exposure as delivered by the chain client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawExposure {
    pub validator: Option<String>,
    pub total: Option<String>,
    pub own: Option<String>,
    #[serde(default)]
    pub others: Vec<RawIndividualExposure>,
}

/// Outcome of decoding a raw exposure list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedExposures {
    pub entries: Vec<ExposureEntry>,
    pub skipped_exposures: usize,
    pub skipped_backers: usize,
}

impl DecodedExposures {
    pub fn skipped(&self) -> usize {
        self.skipped_exposures + self.skipped_backers
    }
}

pub fn parse_address(raw: &str) -> Result<AccountId> {
    AccountId::from_ss58check(raw.trim()).map_err(|_| ModelError::InvalidAddress(raw.to_string()))
}

fn required<'a>(field: &'a Option<String>, name: &'static str) -> Result<&'a str> {
    field.as_deref().ok_or(ModelError::MissingField(name))
}

impl TryFrom<&RawIndividualExposure> for IndividualExposure {
    type Error = ModelError;

    fn try_from(raw: &RawIndividualExposure) -> Result<Self> {
        Ok(Self {
            who: parse_address(required(&raw.who, "who")?)?,
            value: parse_planck(required(&raw.value, "value")?)?,
        })
    }
}

impl RawExposure {
    /// Decodes the validator-level fields, dropping malformed backers.
    ///
    /// Returns the entry and the number of backers that were dropped.
    pub fn decode(&self) -> Result<(ExposureEntry, usize)> {
        let validator = parse_address(required(&self.validator, "validator")?)?;
        let total = parse_planck(required(&self.total, "total")?)?;
        let own = parse_planck(required(&self.own, "own")?)?;

        let mut skipped = 0;
        let mut others = Vec::with_capacity(self.others.len());
        for raw in &self.others {
            match IndividualExposure::try_from(raw) {
                Ok(backer) => others.push(backer),
                Err(err) => {
                    debug!(validator = %validator, error = %err, "Skipping malformed backer");
                    skipped += 1;
                }
            }
        }

        Ok((
            ExposureEntry {
                validator,
                total,
                own,
                others,
            },
            skipped,
        ))
    }
}

/// Decodes a full era delivery. Malformed entries are skipped, never fatal.
pub fn decode_exposures(raw: &[RawExposure]) -> DecodedExposures {
    let mut decoded = DecodedExposures {
        entries: Vec::with_capacity(raw.len()),
        ..Default::default()
    };

    for exposure in raw {
        match exposure.decode() {
            Ok((entry, skipped)) => {
                decoded.skipped_backers += skipped;
                decoded.entries.push(entry);
            }
            Err(err) => {
                debug!(validator = ?exposure.validator, error = %err, "Skipping malformed exposure");
                decoded.skipped_exposures += 1;
            }
        }
    }

    decoded
}
