use crate::models::ScanMode;
use bs58;
use thiserror::Error;

pub const MAX_SCAN_LIMIT: usize = 100;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid scan mode: {0}. Must be 'recent_block' or 'watch_list'")]
    InvalidMode(String),

    #[error("Invalid Solana address format: {0}")]
    InvalidSolanaAddress(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

pub fn validate_mode(mode: &str) -> Result<ScanMode, ValidationError> {
    mode.parse()
        .map_err(|_| ValidationError::InvalidMode(mode.to_string()))
}

pub fn validate_solana_address(address: &str) -> Result<(), ValidationError> {
    if address.trim().is_empty() {
        return Err(ValidationError::MissingParameter("address".to_string()));
    }

    let decoded = match bs58::decode(address).into_vec() {
        Ok(bytes) => bytes,
        Err(_) => return Err(ValidationError::InvalidSolanaAddress(address.to_string())),
    };

    // Solana addresses are 32 bytes
    if decoded.len() != 32 {
        return Err(ValidationError::InvalidSolanaAddress(address.to_string()));
    }

    Ok(())
}

/// Threshold in SOL. Zero would make the first account of every transaction qualify.
pub fn validate_threshold(raw: &str) -> Result<f64, ValidationError> {
    let threshold: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidParameter(format!("threshold '{}' is not a number", raw)))?;

    if !threshold.is_finite() || threshold <= 0.0 {
        return Err(ValidationError::InvalidParameter(
            "threshold must be a positive number".to_string(),
        ));
    }

    Ok(threshold)
}

pub fn validate_limit(raw: &str) -> Result<usize, ValidationError> {
    let limit: usize = raw
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidParameter(format!("limit '{}' is not a number", raw)))?;

    if limit == 0 || limit > MAX_SCAN_LIMIT {
        return Err(ValidationError::InvalidParameter(format!(
            "limit must be between 1 and {}",
            MAX_SCAN_LIMIT
        )));
    }

    Ok(limit)
}
