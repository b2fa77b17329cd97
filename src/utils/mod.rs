//! Small helpers shared across the crate

pub mod helper;

pub use helper::{format_account, format_signed_sol, is_valid_wallet_address, lamports_to_sol, parse_account_key};
