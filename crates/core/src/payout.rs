//! Pure payout validation.
//!
//! A payout request never touches `current_balance`; it reserves part of
//! it by appending a pending PAYOUT transaction. Validation therefore runs
//! against the *available* balance: `current_balance` minus the sum of
//! payouts already pending.

use crate::error::CoreError;
use crate::types::MinorUnits;

/// Default minimum payout, in minor units ($10.00).
pub const DEFAULT_MIN_PAYOUT_THRESHOLD: MinorUnits = 1_000;

/// How a confirmed payout leaves the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutMethod {
    BankTransfer,
    CryptoWallet,
}

impl PayoutMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BankTransfer => "bank_transfer",
            Self::CryptoWallet => "crypto_wallet",
        }
    }
}

/// Validate a payout request amount.
///
/// `requested` of `None` means "withdraw everything available".
/// Returns the concrete amount to reserve.
pub fn validate_payout(
    requested: Option<MinorUnits>,
    current_balance: MinorUnits,
    pending_payouts: MinorUnits,
    min_threshold: MinorUnits,
) -> Result<MinorUnits, CoreError> {
    let available = current_balance - pending_payouts;
    let amount = requested.unwrap_or(available);

    if amount <= 0 {
        return Err(CoreError::Validation(
            "payout amount must be positive".into(),
        ));
    }
    if amount > available {
        return Err(CoreError::Validation(format!(
            "insufficient balance: requested {amount}, available {available}"
        )));
    }
    if amount < min_threshold {
        return Err(CoreError::Validation(format!(
            "payout amount {amount} is below the minimum threshold {min_threshold}"
        )));
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn defaults_to_full_available_balance() {
        let amount = validate_payout(None, 5_000, 0, 1_000).unwrap();
        assert_eq!(amount, 5_000);
    }

    #[test]
    fn pending_payouts_reserve_balance() {
        // $50 balance with $45 already pending leaves only $5 available.
        assert_matches!(
            validate_payout(Some(1_000), 5_000, 4_500, 1_000),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn over_balance_is_insufficient() {
        assert_matches!(
            validate_payout(Some(5_001), 5_000, 0, 1_000),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn exactly_available_is_fine() {
        assert_eq!(validate_payout(Some(5_000), 5_000, 0, 1_000).unwrap(), 5_000);
    }

    #[test]
    fn below_threshold_is_rejected() {
        assert_matches!(
            validate_payout(Some(999), 5_000, 0, 1_000),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn zero_and_negative_amounts_are_rejected() {
        assert_matches!(
            validate_payout(Some(0), 5_000, 0, 1_000),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            validate_payout(Some(-100), 5_000, 0, 1_000),
            Err(CoreError::Validation(_))
        );
        // Empty ledger, default amount resolves to zero.
        assert_matches!(
            validate_payout(None, 0, 0, 1_000),
            Err(CoreError::Validation(_))
        );
    }
}
