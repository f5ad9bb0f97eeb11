use crate::error::{Error, Result};

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";
const MIN_ADDRESS_LEN: usize = 32;
const MAX_ADDRESS_LEN: usize = 44;

/// Solana mint addresses are 32-44 base58 characters.
pub fn validate_address(address: &str) -> Result<()> {
    if address.is_empty() {
        return Err(Error::ValidationError("Address cannot be empty".to_string()));
    }
    if !(MIN_ADDRESS_LEN..=MAX_ADDRESS_LEN).contains(&address.len()) {
        return Err(Error::ValidationError(format!(
            "Address {} must be {}-{} characters",
            address, MIN_ADDRESS_LEN, MAX_ADDRESS_LEN
        )));
    }
    if let Some(c) = address.chars().find(|c| !BASE58_ALPHABET.contains(*c)) {
        return Err(Error::ValidationError(format!(
            "Address {} contains invalid character '{}'",
            address, c
        )));
    }
    Ok(())
}

pub fn validate_api_key(api_key: &str) -> Result<()> {
    if api_key.trim().is_empty() {
        return Err(Error::ConfigError("API key cannot be empty".to_string()));
    }
    if api_key.chars().any(char::is_whitespace) {
        return Err(Error::ConfigError("API key contains whitespace".to_string()));
    }
    Ok(())
}
