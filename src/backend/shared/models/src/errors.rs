use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Invalid amount: {0:?}")]
    InvalidAmount(String),

    #[error("Invalid address: {0:?}")]
    InvalidAddress(String),

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Too many decimals: {found} given, chain supports {units}")]
    TooManyDecimals { found: usize, units: u32 },

    #[error("Invalid pallet id: expected 8 bytes, got {0}")]
    InvalidPalletId(usize),
}

pub type Result<T> = std::result::Result<T, ModelError>;
