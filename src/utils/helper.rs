use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

use crate::models::AccountKey;

/// Length of a base58-encoded wallet address accepted by the web surface
pub const WALLET_ADDRESS_LEN: usize = 44;

/// Lamports in one SOL
pub const LAMPORTS_PER_SOL: f64 = 1e9;

/// Parse a pubkey from string, with better error messages
pub fn parse_pubkey(s: &str) -> anyhow::Result<Pubkey> {
    Pubkey::from_str(s).map_err(|e| anyhow::anyhow!("Invalid pubkey {}: {}", s, e))
}

/// Format lamports as SOL
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL
}

/// 44 base58 characters that decode to a 32-byte public key
pub fn is_valid_wallet_address(address: &str) -> bool {
    address.len() == WALLET_ADDRESS_LEN && Pubkey::from_str(address).is_ok()
}

/// Accept `address` as a tracked account only if it is a valid wallet address
pub fn parse_account_key(address: &str) -> Option<AccountKey> {
    let address = address.trim();
    is_valid_wallet_address(address).then(|| AccountKey::new(address))
}

/// Format an account for display (truncated)
pub fn format_account(account: &AccountKey) -> String {
    let s = account.as_str();
    if s.len() <= 8 || !s.is_ascii() {
        return s.to_string();
    }
    format!("{}...{}", &s[..4], &s[s.len() - 4..])
}

/// Signed two-decimal SOL amount, `+` prefix on gains
pub fn format_signed_sol(value: f64) -> String {
    if value > 0.0 {
        format!("+{:.2}", value)
    } else {
        format!("{:.2}", value)
    }
}
