//! Who a ledger credit is for.
//!
//! Reference authors are not always registered users, so a balance ledger
//! is keyed either by user id or by email. Modelling the two cases as an
//! enum (rather than two nullable columns in application code) keeps every
//! call site exhaustive.

use crate::error::CoreError;
use crate::types::DbId;

/// A beneficiary of a revenue credit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BeneficiaryRef {
    /// A registered platform account.
    RegisteredUser { user_id: DbId },
    /// A reference author known only by email (never signed up).
    ExternalEmail { email: String },
}

impl BeneficiaryRef {
    pub fn registered(user_id: DbId) -> Self {
        Self::RegisteredUser { user_id }
    }

    /// Build an email-keyed beneficiary. Emails are lowercased so the
    /// ledger key is case-insensitive.
    pub fn external(email: &str) -> Result<Self, CoreError> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(CoreError::Validation(format!(
                "invalid beneficiary email: {email:?}"
            )));
        }
        Ok(Self::ExternalEmail { email })
    }

    /// Stable unique key for the `user_balance_ledgers.beneficiary_key`
    /// column, the upsert conflict target for all balance mutations.
    pub fn ledger_key(&self) -> String {
        match self {
            Self::RegisteredUser { user_id } => format!("user:{user_id}"),
            Self::ExternalEmail { email } => format!("email:{email}"),
        }
    }

    pub fn user_id(&self) -> Option<DbId> {
        match self {
            Self::RegisteredUser { user_id } => Some(*user_id),
            Self::ExternalEmail { .. } => None,
        }
    }

    pub fn email(&self) -> Option<&str> {
        match self {
            Self::RegisteredUser { .. } => None,
            Self::ExternalEmail { email } => Some(email),
        }
    }
}
