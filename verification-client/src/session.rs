use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::wallet::WalletError;

/// `0x` followed by 40 hex characters
static ADDRESS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("Invalid address pattern"));

/// Characters kept at the start of the display form, `0x` included
const DISPLAY_PREFIX_CHARS: usize = 4;
/// Characters kept at the end of the display form
const DISPLAY_SUFFIX_CHARS: usize = 3;

/// Wallet connected for the lifetime of the flow. There is no disconnect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletSession {
    raw_address: String,
    display_address: String,
}

impl WalletSession {
    /// # Errors
    ///
    /// `WalletError::InvalidAddress` unless `address` is `0x` + 40 hex characters
    pub fn new(address: impl Into<String>) -> Result<Self, WalletError> {
        let raw_address = address.into();
        if !ADDRESS_PATTERN.is_match(&raw_address) {
            return Err(WalletError::InvalidAddress(raw_address));
        }

        Ok(Self {
            display_address: display_form(&raw_address),
            raw_address,
        })
    }

    /// Session for the first account a provider returned
    ///
    /// # Errors
    ///
    /// `WalletError::NoAccounts` for an empty list, `WalletError::InvalidAddress` for a
    /// malformed first account
    pub fn from_accounts(accounts: &[String]) -> Result<Self, WalletError> {
        let first = accounts.first().ok_or(WalletError::NoAccounts)?;
        Self::new(first.clone())
    }

    #[must_use]
    pub fn raw_address(&self) -> &str {
        &self.raw_address
    }

    #[must_use]
    pub fn display_address(&self) -> &str {
        &self.display_address
    }
}

/// Truncated address for display: first 4 characters, `...`, last 3 characters.
///
/// Strings too short to truncate are returned unchanged.
#[must_use]
pub fn display_form(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= DISPLAY_PREFIX_CHARS + DISPLAY_SUFFIX_CHARS {
        return address.to_string();
    }

    let prefix: String = chars[..DISPLAY_PREFIX_CHARS].iter().collect();
    let suffix: String = chars[chars.len() - DISPLAY_SUFFIX_CHARS..].iter().collect();
    format!("{prefix}...{suffix}")
}
